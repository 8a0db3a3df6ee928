//! Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet.

use crate::api::{column_letter, Sheet, TokenProvider};
use crate::{Config, Result};
use anyhow::Context;
use sheets::types::{
    BatchClearValuesRequest, BatchUpdateValuesRequest, DateTimeRenderOption, Dimension,
    ValueInputOption, ValueRange, ValueRenderOption,
};
use sheets::ClientError;
use tracing::trace;

/// Implements the `Sheet` trait using the `sheets::Client` to interact with a Google sheet. It
/// takes a `TokenProvider`, on which it calls refresh to keep the token up-to-date.
pub(super) struct GoogleSheet {
    config: Config,
    token_provider: TokenProvider,
    client: sheets::Client,
}

impl GoogleSheet {
    pub(super) async fn new(config: Config, mut token_provider: TokenProvider) -> Result<Self> {
        let client = create_sheets_client(&mut token_provider).await?;
        Ok(Self {
            config,
            token_provider,
            client,
        })
    }

    /// Refreshes the sheets client with a new access token if needed.
    async fn refresh_client(&mut self) -> Result<()> {
        self.client = create_sheets_client(&mut self.token_provider).await?;
        Ok(())
    }

    async fn clear_ranges(&mut self, ranges: Vec<String>) -> Result<()> {
        let request = BatchClearValuesRequest { ranges };
        self.client
            .spreadsheets()
            .values_batch_clear(self.config.spreadsheet_id(), &request)
            .await
            .map_err(map_client_error)?;
        Ok(())
    }

    async fn write_range(&mut self, value_range: ValueRange) -> Result<()> {
        let request = BatchUpdateValuesRequest {
            data: vec![value_range],
            include_values_in_response: Some(false),
            response_date_time_render_option: None,
            response_value_render_option: None,
            value_input_option: Some(ValueInputOption::UserEntered),
        };
        self.client
            .spreadsheets()
            .values_batch_update(self.config.spreadsheet_id(), &request)
            .await
            .map_err(map_client_error)?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Sheet for GoogleSheet {
    async fn get(&mut self, sheet_name: &str) -> Result<Vec<Vec<String>>> {
        trace!("get for {sheet_name}");
        self.refresh_client().await?;
        let range = format!("{sheet_name}!A:ZZ"); // Get all columns
        let response = self
            .client
            .spreadsheets()
            .values_get(
                self.config.spreadsheet_id(),
                &range,
                DateTimeRenderOption::FormattedString,
                Dimension::Rows,
                ValueRenderOption::FormattedValue,
            )
            .await
            .map_err(map_client_error)
            .with_context(|| format!("Failed to fetch {sheet_name} sheet data"))?;
        Ok(response.body.values)
    }

    async fn put(&mut self, sheet_name: &str, rows: &[Vec<String>]) -> Result<()> {
        trace!("put {} rows to {sheet_name}", rows.len());
        self.refresh_client().await?;
        self.clear_ranges(vec![sheet_name.to_string()])
            .await
            .with_context(|| format!("Failed to clear the {sheet_name} sheet"))?;
        let value_range = ValueRange {
            major_dimension: Some(Dimension::Rows),
            range: format!("{sheet_name}!A1"),
            values: rows.to_vec(),
        };
        self.write_range(value_range).await.with_context(|| {
            format!(
                "Failed to write {} rows to the {sheet_name} sheet",
                rows.len()
            )
        })
    }

    async fn put_column(
        &mut self,
        sheet_name: &str,
        column: usize,
        cells: &[String],
    ) -> Result<()> {
        trace!("put_column {column} for {sheet_name}");
        self.refresh_client().await?;
        let letter = column_letter(column);
        self.clear_ranges(vec![format!("{sheet_name}!{letter}:{letter}")])
            .await
            .with_context(|| {
                format!("Failed to clear column {letter} of the {sheet_name} sheet")
            })?;
        let value_range = ValueRange {
            major_dimension: Some(Dimension::Columns),
            range: format!("{sheet_name}!{letter}1"),
            values: vec![cells.to_vec()],
        };
        self.write_range(value_range)
            .await
            .with_context(|| format!("Failed to write column {letter} of the {sheet_name} sheet"))
    }
}

/// Creates a new sheets client with a refreshed access token.
async fn create_sheets_client(token_provider: &mut TokenProvider) -> Result<sheets::Client> {
    // Get the access token (will refresh if needed)
    let access_token = token_provider.token_with_refresh().await?;

    // The sheets crate asks for OAuth client credentials, but only the access token matters for
    // API calls; token refresh is handled by the TokenProvider.
    Ok(sheets::Client::new(
        String::new(),
        String::new(),
        String::new(),
        access_token.to_string(),
        String::new(),
    ))
}

fn map_client_error(e: sheets::ClientError) -> anyhow::Error {
    let error_name = match &e {
        ClientError::EmptyRefreshToken => "EmptyRefreshToken".to_string(),
        ClientError::FromUtf8Error(inner) => format!("FromUtf8Error {inner}"),
        ClientError::UrlParserError(inner) => format!("UrlParserError {inner}"),
        ClientError::SerdeJsonError(inner) => format!("SerdeJsonError {inner}"),
        ClientError::ReqwestError(inner) => format!("ReqwestError {inner}"),
        ClientError::InvalidHeaderValue(inner) => format!("InvalidHeaderValue {inner}"),
        ClientError::ReqwestMiddleWareError(inner) => format!("ReqwestMiddleWareError {inner}"),
        ClientError::HttpError { .. } => "HttpError".to_string(),
        ClientError::Other(_) => "Other".to_string(),
    };
    anyhow::anyhow!(e).context(error_name)
}
