//! Interactive OAuth authorization for installed applications.

use std::future::Future;
use std::process::{Command, Stdio};
use std::time::Duration;

use oauth2::reqwest::async_http_client;
use oauth2::{AuthorizationCode, CsrfToken, PkceCodeChallenge, RedirectUrl, Scope};

use super::client_config::ClientConfig;
use super::credential::{UserCredential, token_request_error};
use super::redirect::{CallbackParams, RedirectListener};
use crate::error::{FeedstatError, Result};

/// How long to wait for the user to finish in the browser.
pub const DEFAULT_CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Obtains a user credential with a human in the loop.
pub trait AuthorizationFlow {
    fn authorize(
        &self,
        client: &ClientConfig,
        scopes: &[String],
    ) -> impl Future<Output = Result<UserCredential>>;
}

/// Authorization-code flow with PKCE and a loopback redirect.
#[derive(Debug, Clone)]
pub struct LocalServerFlow {
    /// 0 picks an ephemeral port.
    pub redirect_port: u16,
    pub open_browser: bool,
    pub callback_timeout: Duration,
}

impl LocalServerFlow {
    #[must_use]
    pub const fn new(redirect_port: u16) -> Self {
        Self {
            redirect_port,
            open_browser: true,
            callback_timeout: DEFAULT_CALLBACK_TIMEOUT,
        }
    }
}

impl AuthorizationFlow for LocalServerFlow {
    async fn authorize(&self, client: &ClientConfig, scopes: &[String]) -> Result<UserCredential> {
        let listener = RedirectListener::bind(self.redirect_port).await?;
        let redirect = RedirectUrl::new(listener.redirect_uri())
            .map_err(|e| FeedstatError::Config(format!("invalid redirect URI: {e}")))?;
        let oauth = client.oauth_client()?.set_redirect_uri(redirect);

        let (challenge, verifier) = PkceCodeChallenge::new_random_sha256();
        let mut request = oauth.authorize_url(CsrfToken::new_random);
        for scope in scopes {
            request = request.add_scope(Scope::new(scope.clone()));
        }
        let (url, state) = request
            .set_pkce_challenge(challenge)
            .add_extra_param("access_type", "offline")
            .url();

        tracing::info!(%url, "Requesting user authorization");
        if !(self.open_browser && open_in_browser(url.as_str())) {
            eprintln!("Please visit this URL to authorize this application: {url}");
        }

        let callback = listener.wait_for_callback(self.callback_timeout).await?;
        let code = check_callback(callback, state.secret())?;

        let token = oauth
            .exchange_code(AuthorizationCode::new(code))
            .set_pkce_verifier(verifier)
            .request_async(async_http_client)
            .await
            .map_err(|e| {
                token_request_error("token.exchange", e, |reason| {
                    FeedstatError::AuthorizationFailed { reason }
                })
            })?;

        tracing::info!("Authorization complete");
        Ok(UserCredential::from_token_response(
            client.clone(),
            scopes.to_vec(),
            &token,
        ))
    }
}

/// Authorization code from a redirect, once its state matches.
fn check_callback(callback: CallbackParams, expected_state: &str) -> Result<String> {
    if let Some(error) = callback.error {
        return Err(FeedstatError::AuthorizationFailed { reason: error });
    }
    if callback.state.as_deref() != Some(expected_state) {
        return Err(FeedstatError::AuthorizationFailed {
            reason: "state parameter mismatch in redirect".to_string(),
        });
    }
    callback.code.ok_or_else(|| FeedstatError::AuthorizationFailed {
        reason: "redirect carried no authorization code".to_string(),
    })
}

fn open_in_browser(url: &str) -> bool {
    let mut command = if cfg!(target_os = "macos") {
        Command::new("open")
    } else if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else {
        Command::new("xdg-open")
    };
    match command
        .arg(url)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_) => true,
        Err(e) => {
            tracing::debug!(error = %e, "Could not open a browser");
            false
        }
    }
}
