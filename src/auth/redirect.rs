//! Loopback HTTP listener that receives the OAuth authorization redirect.

use std::convert::Infallible;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{CONTENT_TYPE, HeaderValue};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::error::{FeedstatError, Result};

const CLOSE_PAGE: &str = "<html><head><title>feedstat</title></head><body>\
<p>The authentication flow has completed. You may close this window.</p>\
</body></html>";

/// Query parameters of the redirect request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

impl CallbackParams {
    /// Parse a request query string. `None` unless it carries `code` or `error`.
    #[must_use]
    pub fn from_query(query: &str) -> Option<Self> {
        let mut params = Self::default();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "code" => params.code = Some(value.into_owned()),
                "state" => params.state = Some(value.into_owned()),
                "error" => params.error = Some(value.into_owned()),
                _ => {}
            }
        }
        (params.code.is_some() || params.error.is_some()).then_some(params)
    }
}

pub struct RedirectListener {
    listener: TcpListener,
    port: u16,
}

impl RedirectListener {
    /// Bind on `127.0.0.1:port`; port 0 picks an ephemeral port.
    ///
    /// # Errors
    ///
    /// I/O errors from binding.
    pub async fn bind(port: u16) -> Result<Self> {
        let listener = TcpListener::bind(("127.0.0.1", port)).await?;
        let port = listener.local_addr()?.port();
        tracing::debug!(port, "Redirect listener bound");
        Ok(Self { listener, port })
    }

    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!("http://localhost:{}/", self.port)
    }

    /// Serve until a request carrying `code` or `error` arrives.
    ///
    /// Other requests (favicon, preconnects) get a 404.
    ///
    /// # Errors
    ///
    /// `AuthorizationFailed` when nothing arrives within `timeout`; I/O
    /// errors from accepting connections.
    pub async fn wait_for_callback(self, timeout: Duration) -> Result<CallbackParams> {
        tokio::time::timeout(timeout, self.accept_loop())
            .await
            .map_err(|_| FeedstatError::AuthorizationFailed {
                reason: format!(
                    "no authorization response received within {} seconds",
                    timeout.as_secs()
                ),
            })?
    }

    async fn accept_loop(&self) -> Result<CallbackParams> {
        let (tx, mut rx) = mpsc::channel::<CallbackParams>(1);
        loop {
            tokio::select! {
                Some(params) = rx.recv() => return Ok(params),
                accepted = self.listener.accept() => {
                    let (stream, _) = accepted?;
                    let tx = tx.clone();
                    tokio::spawn(async move {
                        let service = service_fn(move |req: Request<Incoming>| {
                            let tx = tx.clone();
                            async move { Ok::<_, Infallible>(respond(&req, &tx)) }
                        });
                        if let Err(e) = http1::Builder::new()
                            .keep_alive(false)
                            .serve_connection(TokioIo::new(stream), service)
                            .await
                        {
                            tracing::debug!(error = %e, "Redirect connection closed with error");
                        }
                    });
                }
            }
        }
    }
}

fn respond(req: &Request<Incoming>, tx: &mpsc::Sender<CallbackParams>) -> Response<Full<Bytes>> {
    let Some(params) = req.uri().query().and_then(CallbackParams::from_query) else {
        let mut response = Response::new(Full::new(Bytes::from_static(b"not found")));
        *response.status_mut() = StatusCode::NOT_FOUND;
        return response;
    };

    // A second callback after the first is ignored.
    let _ = tx.try_send(params);

    let mut response = Response::new(Full::new(Bytes::from_static(CLOSE_PAGE.as_bytes())));
    response.headers_mut().insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_without_code_or_error_is_ignored() {
        assert!(CallbackParams::from_query("state=abc").is_none());
        assert!(CallbackParams::from_query("").is_none());
    }

    #[test]
    fn query_values_are_decoded() {
        let params = CallbackParams::from_query("code=4%2F0Ab&state=xyz&scope=a+b").unwrap();
        assert_eq!(params.code.as_deref(), Some("4/0Ab"));
        assert_eq!(params.state.as_deref(), Some("xyz"));
        assert!(params.error.is_none());
    }

    #[tokio::test]
    async fn callback_is_captured() {
        let listener = RedirectListener::bind(0).await.unwrap();
        let port = listener.port();
        assert_eq!(listener.redirect_uri(), format!("http://localhost:{port}/"));

        let waiter = tokio::spawn(listener.wait_for_callback(Duration::from_secs(5)));

        let http = reqwest::Client::new();
        let miss = http
            .get(format!("http://127.0.0.1:{port}/favicon.ico"))
            .send()
            .await
            .unwrap();
        assert_eq!(miss.status(), reqwest::StatusCode::NOT_FOUND);

        let hit = http
            .get(format!("http://127.0.0.1:{port}/?code=abc&state=s1"))
            .send()
            .await
            .unwrap();
        assert!(hit.status().is_success());
        assert!(hit.text().await.unwrap().contains("close this window"));

        let params = waiter.await.unwrap().unwrap();
        assert_eq!(params.code.as_deref(), Some("abc"));
        assert_eq!(params.state.as_deref(), Some("s1"));
    }

    #[tokio::test]
    async fn waiting_times_out() {
        let listener = RedirectListener::bind(0).await.unwrap();
        let err = listener
            .wait_for_callback(Duration::from_millis(50))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedstatError::AuthorizationFailed { .. }));
    }
}
