//! Google OAuth credential handling: the client-secret and token files, the one-time consent
//! flow, and the token refresh used by the sheets client.

use crate::{utils, Result};
use anyhow::{anyhow, bail, Context};
use chrono::{DateTime, Utc};
use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    PkceCodeChallenge, RedirectUrl, RefreshToken, Scope, TokenResponse, TokenUrl,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// OAuth scopes required for Sheets API access.
const OAUTH_SCOPES: &[&str] = &["https://www.googleapis.com/auth/spreadsheets"];

/// Port of the loopback listener that catches the OAuth redirect.
const OAUTH_CALLBACK_PORT: u16 = 3030;

type OauthClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Owns the OAuth client secret and the current token, and keeps the token fresh.
pub(crate) struct TokenProvider {
    secret: File<SecretFile>,
    token: File<TokenFile>,
}

impl TokenProvider {
    /// Loads both credential files. Fails if either is missing or malformed; the auth command
    /// creates the token file.
    pub(crate) async fn load(
        secret_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let secret = File::<SecretFile>::load(secret_path).await?;
        let token = File::<TokenFile>::load(token_path).await?;
        token.data().validate_scopes()?;
        Ok(Self { secret, token })
    }

    /// Runs the one-time consent flow and writes the token file.
    ///
    /// Prints an authorization URL for the user to open in a browser, then waits for Google to
    /// redirect the browser to a loopback listener with the authorization code.
    pub(crate) async fn initialize(
        secret_path: impl Into<PathBuf>,
        token_path: impl Into<PathBuf>,
    ) -> Result<Self> {
        let secret = File::<SecretFile>::load(secret_path).await?;
        if !secret.data().has_loopback_redirect() {
            bail!(
                "The client secret file must list 'http://localhost' or 'http://127.0.0.1' \
                among its redirect URIs. Add the loopback redirect to your OAuth client in the \
                Google Cloud Console and download the file again."
            );
        }
        let redirect = RedirectUrl::new(format!("http://127.0.0.1:{OAUTH_CALLBACK_PORT}"))
            .context("Unable to construct the loopback redirect URL")?;
        let client = oauth_client(secret.data())?.set_redirect_uri(redirect);

        let (pkce_challenge, pkce_verifier) = PkceCodeChallenge::new_random_sha256();
        let (auth_url, csrf_token) = client
            .authorize_url(CsrfToken::new_random)
            .add_scopes(OAUTH_SCOPES.iter().map(|s| Scope::new((*s).to_string())))
            .add_extra_param("access_type", "offline")
            .add_extra_param("prompt", "consent")
            .set_pkce_challenge(pkce_challenge)
            .url();

        info!("Waiting for authorization on 127.0.0.1:{OAUTH_CALLBACK_PORT}");
        println!("Open this URL in your browser to authorize access:\n{auth_url}");

        let (code, state) = receive_redirect(OAUTH_CALLBACK_PORT).await?;
        if state != *csrf_token.secret() {
            bail!("The OAuth state parameter did not match; aborting");
        }

        let http_client = http_client()?;
        let response = client
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(pkce_verifier)
            .request_async(&http_client)
            .await
            .context("Unable to exchange the authorization code for a token")?;

        let refresh_token = response
            .refresh_token()
            .context(
                "Google did not return a refresh token. Remove this app's access under your \
                Google account permissions and run auth again.",
            )?
            .secret()
            .to_string();
        let token_data = TokenFile::new(
            OAUTH_SCOPES.iter().map(|s| (*s).to_string()).collect(),
            response.access_token().secret().to_string(),
            refresh_token,
            expiry(response.expires_in())?,
        );
        let token = File::new(token_path, token_data);
        token.save().await?;
        Ok(Self { secret, token })
    }

    /// Returns the bearer token, refreshing it first when it is near expiry.
    pub(crate) async fn token_with_refresh(&mut self) -> Result<&str> {
        if self.token.data().is_expired() {
            self.refresh().await?;
        }
        Ok(self.token.data().access_token())
    }

    /// Exchanges the refresh token for a new access token and persists it.
    pub(crate) async fn refresh(&mut self) -> Result<()> {
        debug!("refreshing the access token");
        let client = oauth_client(self.secret.data())?;
        let http_client = http_client()?;
        let refresh_token = RefreshToken::new(self.token.data().refresh_token().to_string());
        let response = client
            .exchange_refresh_token(&refresh_token)
            .request_async(&http_client)
            .await
            .context("Unable to refresh the access token")?;
        let new_refresh = response.refresh_token().map(|rt| rt.secret().to_string());
        let expires_at = expiry(response.expires_in())?;
        self.token.data_mut().update(
            response.access_token().secret().to_string(),
            expires_at,
            new_refresh,
        );
        self.token.save().await?;
        Ok(())
    }
}

fn oauth_client(secret: &SecretFile) -> Result<OauthClient> {
    Ok(
        BasicClient::new(ClientId::new(secret.client_id().to_string()))
            .set_client_secret(ClientSecret::new(secret.client_secret().to_string()))
            .set_auth_uri(
                AuthUrl::new(secret.auth_uri().to_string())
                    .context("Invalid auth_uri in the client secret file")?,
            )
            .set_token_uri(
                TokenUrl::new(secret.token_uri().to_string())
                    .context("Invalid token_uri in the client secret file")?,
            ),
    )
}

fn http_client() -> Result<reqwest::Client> {
    // oauth2 requires a client that does not follow redirects.
    reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .context("Unable to build the HTTP client for OAuth")
}

fn expiry(expires_in: Option<std::time::Duration>) -> Result<DateTime<Utc>> {
    let duration = expires_in.context("Google did not return a token expiry")?;
    let duration = chrono::Duration::from_std(duration).context("Token expiry is out of range")?;
    Ok(Utc::now() + duration)
}

/// Listens for the single OAuth redirect request and returns its `code` and `state` query
/// parameters.
async fn receive_redirect(port: u16) -> Result<(String, String)> {
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .with_context(|| format!("Unable to listen on 127.0.0.1:{port} for the OAuth redirect"))?;
    let (stream, _) = listener
        .accept()
        .await
        .context("Unable to accept the OAuth redirect connection")?;
    let io = TokioIo::new(stream);

    let (tx, rx) = tokio::sync::oneshot::channel::<(String, String)>();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let service = service_fn(move |request: Request<Incoming>| {
        let tx = Arc::clone(&tx);
        async move {
            let query = request.uri().query().unwrap_or_default();
            let mut code = None;
            let mut state = None;
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                match key.as_ref() {
                    "code" => code = Some(value.into_owned()),
                    "state" => state = Some(value.into_owned()),
                    _ => {}
                }
            }
            let message = match (code, state) {
                (Some(code), Some(state)) => {
                    if let Ok(mut guard) = tx.lock() {
                        if let Some(tx) = guard.take() {
                            let _ = tx.send((code, state));
                        }
                    }
                    "Authorization received. You can close this tab and return to the terminal."
                }
                _ => "The authorization response was missing the code or state parameter.",
            };
            Ok::<_, Infallible>(Response::new(Full::new(Bytes::from(message))))
        }
    });

    tokio::spawn(async move {
        if let Err(e) = http1::Builder::new().serve_connection(io, service).await {
            debug!("OAuth redirect connection ended: {e}");
        }
    });

    rx.await.context("The OAuth redirect was never received")
}

/// Represents a JSON file that we keep both on disk and in memory: basically just a `path` and
/// the parsed `data`.
#[derive(Default, Debug, Clone)]
struct File<F>
where
    F: Serialize + DeserializeOwned + Clone + Debug,
{
    path: PathBuf,
    data: F,
}

impl<F> File<F>
where
    F: Serialize + DeserializeOwned + Clone + Debug,
{
    /// Load data from a file and create a File instance.
    async fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let data: F = utils::deserialize(&path).await?;
        Ok(Self { path, data })
    }

    /// Create a File instance with the given path and data.
    fn new(path: impl Into<PathBuf>, data: F) -> Self {
        Self {
            path: path.into(),
            data,
        }
    }

    /// Save the current data to the file.
    async fn save(&self) -> Result<()> {
        let json =
            serde_json::to_string_pretty(&self.data).context("Failed to serialize data to JSON")?;
        utils::write(&self.path, json).await?;

        // Set restrictive permissions on Unix-like systems
        #[cfg(unix)]
        {
            use std::fs::Permissions;
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, Permissions::from_mode(0o600))
                .context("Failed to set file permissions")?;
        }

        Ok(())
    }

    /// Get a reference to the data.
    fn data(&self) -> &F {
        &self.data
    }

    /// Get a mutable reference to the data.
    fn data_mut(&mut self) -> &mut F {
        &mut self.data
    }
}

/// Represents the structure of the `client_secret.json` file downloaded from Google Cloud
/// Console. This file contains OAuth 2.0 Desktop Application credentials; the standard format
/// from Google wraps the actual credentials in an "installed" object.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct SecretFile {
    installed: InstalledCredentials,
}

impl SecretFile {
    fn client_id(&self) -> &str {
        &self.installed.client_id
    }

    fn client_secret(&self) -> &str {
        &self.installed.client_secret
    }

    fn auth_uri(&self) -> &str {
        &self.installed.auth_uri
    }

    fn token_uri(&self) -> &str {
        &self.installed.token_uri
    }

    /// The consent flow redirects to a loopback address, which Google only allows when a
    /// loopback redirect is registered for the OAuth client.
    fn has_loopback_redirect(&self) -> bool {
        self.installed
            .redirect_uris
            .iter()
            .any(|s| s == "http://localhost" || s == "http://127.0.0.1")
    }
}

/// The actual OAuth credentials nested within the `client_secret.json` file.
#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct InstalledCredentials {
    /// OAuth client ID.
    client_id: String,

    /// OAuth client secret.
    client_secret: String,

    /// List of valid redirect URIs for OAuth callbacks.
    redirect_uris: Vec<String>,

    /// Google's OAuth authorization endpoint.
    auth_uri: String,

    /// Google's OAuth token endpoint.
    token_uri: String,
}

/// This is how we save the token information that we receive from Google OAuth. We use our own
/// structure instead of saving Google's response shape.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
struct TokenFile {
    scopes: Vec<String>,
    access_token: String,
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

impl TokenFile {
    fn new(
        scopes: Vec<String>,
        access_token: String,
        refresh_token: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            scopes,
            access_token,
            refresh_token,
            expires_at,
        }
    }

    fn validate_scopes(&self) -> Result<()> {
        let found_scopes: HashSet<&str> = self.scopes.iter().map(|s| s.as_str()).collect();
        for &required_scope in OAUTH_SCOPES {
            if !found_scopes.contains(required_scope) {
                return Err(anyhow!(
                    "OAuth scope '{required_scope}' is missing. Run the auth command again."
                ));
            }
        }
        Ok(())
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }

    fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Check if the token is expired or will expire soon (within 5 minutes).
    fn is_expired(&self) -> bool {
        let now = Utc::now();
        let buffer = chrono::Duration::minutes(5);
        self.expires_at <= now + buffer
    }

    /// Update the token with new values.
    fn update(
        &mut self,
        access_token: String,
        expires_at: DateTime<Utc>,
        refresh_token: Option<String>,
    ) {
        self.access_token = access_token;
        self.expires_at = expires_at;
        if let Some(rt) = refresh_token {
            self.refresh_token = rt;
        }
    }
}
