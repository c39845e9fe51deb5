//! Google OAuth for the Docs API: cached token, refresh grant, and an
//! interactive consent flow that receives the code on a loopback listener.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tiny_http::{Response, Server};
use tracing::{info, warn};
use url::Url;

const SCOPE: &str = "https://www.googleapis.com/auth/documents.readonly";
const AUTH_URI: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const STATE: &str = "reel_post";
/// Tokens this close to expiry are treated as expired.
const EXPIRY_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<DateTime<Utc>>,
}

/// Where a cached credential stands before the Docs API is called.
#[derive(Debug, Clone, PartialEq)]
pub enum CredentialState {
    Absent,
    Valid(Token),
    ExpiredRefreshable(Token),
    ExpiredTerminal,
}

impl CredentialState {
    pub fn assess(cached: Option<Token>, now: DateTime<Utc>) -> Self {
        let Some(token) = cached else {
            return Self::Absent;
        };
        let fresh = token
            .expiry
            .map_or(true, |exp| exp - Duration::seconds(EXPIRY_SKEW_SECS) > now);
        if fresh && !token.access_token.is_empty() {
            return Self::Valid(token);
        }
        match token.refresh_token.as_deref() {
            Some(rt) if !rt.is_empty() => Self::ExpiredRefreshable(token),
            _ => Self::ExpiredTerminal,
        }
    }
}

/// Installed-app client secrets as downloaded from the Cloud console.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSecrets {
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_auth_uri")]
    pub auth_uri: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

#[derive(Deserialize)]
struct SecretsFile {
    installed: Option<ClientSecrets>,
    web: Option<ClientSecrets>,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

fn default_auth_uri() -> String {
    AUTH_URI.to_string()
}

fn default_token_uri() -> String {
    TOKEN_URI.to_string()
}

impl TokenResponse {
    fn into_token(self, previous_refresh: Option<String>, now: DateTime<Utc>) -> Token {
        Token {
            access_token: self.access_token,
            refresh_token: self.refresh_token.or(previous_refresh),
            expiry: self.expires_in.map(|s| now + Duration::seconds(s)),
        }
    }
}

pub fn reauth_hint(cache: &Path) -> String {
    format!(
        "Delete {} and re-run to authorize Google Docs access again.",
        cache.display()
    )
}

pub fn load_secrets(path: &Path) -> Result<ClientSecrets> {
    let raw = std::fs::read_to_string(path).with_context(|| {
        format!(
            "Google OAuth client secrets not found at {}. Download an installed-app credentials file from the Cloud console.",
            path.display()
        )
    })?;
    let file: SecretsFile = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a valid client secrets file", path.display()))?;
    file.installed
        .or(file.web)
        .ok_or_else(|| anyhow!("{} has no \"installed\" or \"web\" client", path.display()))
}

pub fn load_token(path: &Path) -> Result<Option<Token>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let token = serde_json::from_str(&raw)
        .with_context(|| format!("Cached token is unreadable. {}", reauth_hint(path)))?;
    Ok(Some(token))
}

pub fn save_token(path: &Path, token: &Token) -> Result<()> {
    let json = serde_json::to_string_pretty(token)?;
    std::fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn consent_url(secrets: &ClientSecrets, redirect_uri: &str) -> String {
    format!(
        "{}?response_type=code&client_id={}&redirect_uri={}&scope={}&access_type=offline&prompt=consent&state={}",
        secrets.auth_uri,
        urlencoding::encode(&secrets.client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode(SCOPE),
        STATE
    )
}

/// Authorization code from the loopback redirect's request path.
///
/// A code is only accepted alongside the `state` sent in the consent URL.
pub fn code_from_callback(path: &str) -> Result<Option<String>> {
    let url = Url::parse(&format!("http://127.0.0.1{path}"))
        .with_context(|| format!("Bad OAuth callback path: {path}"))?;
    let mut code = None;
    let mut state = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "error" => bail!("Google authorization was refused: {value}"),
            "code" => code = Some(value.into_owned()),
            "state" => state = Some(value.into_owned()),
            _ => {}
        }
    }
    if code.is_some() && state.as_deref() != Some(STATE) {
        warn!("Ignoring OAuth callback with unexpected state {state:?}");
        return Ok(None);
    }
    Ok(code)
}

/// Hands out a valid Docs API access token, refreshing or re-authorizing
/// against the cache file as needed.
pub struct GoogleAuth {
    client: reqwest::Client,
    secrets_path: PathBuf,
    cache_path: PathBuf,
    port: u16,
}

impl GoogleAuth {
    pub fn new(secrets_path: &Path, cache_path: &Path, port: u16) -> Self {
        Self {
            client: reqwest::Client::new(),
            secrets_path: secrets_path.to_path_buf(),
            cache_path: cache_path.to_path_buf(),
            port,
        }
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub async fn access_token(&self) -> Result<String> {
        let cached = load_token(&self.cache_path)?;
        let token = match CredentialState::assess(cached, Utc::now()) {
            CredentialState::Valid(token) => token,
            CredentialState::ExpiredRefreshable(token) => {
                info!("Cached Google token expired, refreshing");
                let secrets = load_secrets(&self.secrets_path)?;
                let refreshed = self.refresh(&secrets, token).await.with_context(|| {
                    format!("Token refresh failed. {}", reauth_hint(&self.cache_path))
                })?;
                save_token(&self.cache_path, &refreshed)?;
                refreshed
            }
            CredentialState::Absent | CredentialState::ExpiredTerminal => {
                let secrets = load_secrets(&self.secrets_path)?;
                let granted = self.interactive_grant(&secrets).await?;
                save_token(&self.cache_path, &granted)?;
                println!("Saved Google credentials to {}", self.cache_path.display());
                granted
            }
        };
        Ok(token.access_token)
    }

    async fn refresh(&self, secrets: &ClientSecrets, token: Token) -> Result<Token> {
        let refresh_token = token.refresh_token.unwrap_or_default();
        let form = [
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token.as_str()),
        ];
        let resp = self.post_token(&secrets.token_uri, &form).await?;
        Ok(resp.into_token(Some(refresh_token), Utc::now()))
    }

    async fn interactive_grant(&self, secrets: &ClientSecrets) -> Result<Token> {
        let redirect_uri = format!("http://127.0.0.1:{}/", self.port);
        println!(
            "\nOpen this URL to authorize Google Docs access:\n{}",
            consent_url(secrets, &redirect_uri)
        );
        let port = self.port;
        let code = tokio::task::spawn_blocking(move || wait_for_code(port))
            .await
            .context("OAuth listener task failed")??;
        let form = [
            ("client_id", secrets.client_id.as_str()),
            ("client_secret", secrets.client_secret.as_str()),
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", redirect_uri.as_str()),
        ];
        let resp = self.post_token(&secrets.token_uri, &form).await?;
        if resp.refresh_token.is_none() {
            warn!("Google did not return a refresh token; the next expiry will need a new grant");
        }
        Ok(resp.into_token(None, Utc::now()))
    }

    async fn post_token(&self, token_uri: &str, form: &[(&str, &str)]) -> Result<TokenResponse> {
        let resp = self
            .client
            .post(token_uri)
            .form(form)
            .send()
            .await
            .context("Token request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            bail!("Token endpoint returned {}: {}", status.as_u16(), text.trim());
        }
        resp.json().await.context("Token endpoint returned malformed JSON")
    }
}

fn wait_for_code(port: u16) -> Result<String> {
    let server = Server::http(("127.0.0.1", port))
        .map_err(|e| anyhow!("Failed to listen for the OAuth redirect on port {port}: {e}"))?;
    info!("Waiting for OAuth redirect on 127.0.0.1:{port}");
    for request in server.incoming_requests() {
        match code_from_callback(request.url()) {
            Ok(Some(code)) => {
                respond(
                    request,
                    "Authorized. You can close this tab and return to the terminal.",
                );
                return Ok(code);
            }
            Ok(None) => respond(request, "missing or unexpected code"),
            Err(e) => {
                respond(request, "Authorization failed.");
                return Err(e);
            }
        }
    }
    bail!("OAuth listener closed before a code arrived")
}

fn respond(request: tiny_http::Request, body: &str) {
    if let Err(e) = request.respond(Response::from_string(body)) {
        warn!("Failed to answer OAuth redirect: {e}");
    }
}
