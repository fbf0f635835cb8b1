use reqwest::multipart::Form;
use reqwest::Url;
use serde::Deserialize;
use tracing::{debug, warn};

use bk_core::ports::UrlShortenerPort;
use bk_core::NetworkError;

use super::{ensure_success, transport_error};

/// Response body of `POST /api/shorten_url`.
#[derive(Debug, Deserialize)]
struct ShortenResponse {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    short_url: Option<String>,
}

/// Client for `POST /api/shorten_url` (multipart field `long_url`).
pub struct HttpUrlShortener {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpUrlShortener {
    pub fn new(client: reqwest::Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait::async_trait]
impl UrlShortenerPort for HttpUrlShortener {
    async fn shorten(&self, long_url: &str) -> Result<String, NetworkError> {
        let url = self.endpoint.as_str();
        let form = Form::new().text("long_url", long_url.to_string());

        let response = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error(url, e))?;
        ensure_success(url, &response)?;

        let body: ShortenResponse = response.json().await.map_err(|e| NetworkError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        debug!(code = ?body.code, short_url = ?body.short_url, "Shorten response");

        if let Some(code) = body.code.filter(|code| *code != 0) {
            warn!(code, "Shortener answered with non-zero code");
        }

        body.short_url
            .filter(|short| !short.trim().is_empty())
            .ok_or_else(|| NetworkError::Decode {
                url: url.to_string(),
                message: "response has no short_url".to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn shortener(server: &Server) -> HttpUrlShortener {
        let endpoint = Url::parse(&format!("{}/api/shorten_url", server.url())).unwrap();
        HttpUrlShortener::new(reqwest::Client::new(), endpoint)
    }

    #[tokio::test]
    async fn test_shorten_returns_short_url() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/shorten_url")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#"name="long_url""#.to_string()),
                Matcher::Regex("https://example.com/very/long/path".to_string()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":0,"short_url":"https://s.ly/ab12"}"#)
            .create_async()
            .await;

        let short = shortener(&server)
            .shorten("https://example.com/very/long/path")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(short, "https://s.ly/ab12");
    }

    #[tokio::test]
    async fn test_non_success_status_is_network_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/shorten_url")
            .with_status(502)
            .create_async()
            .await;

        let err = shortener(&server).shorten("https://example.com").await.unwrap_err();

        assert!(matches!(err, NetworkError::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_missing_short_url_is_decode_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/shorten_url")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":1001}"#)
            .create_async()
            .await;

        let err = shortener(&server).shorten("https://example.com").await.unwrap_err();

        assert!(matches!(err, NetworkError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/shorten_url")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let err = shortener(&server).shorten("https://example.com").await.unwrap_err();

        assert!(matches!(err, NetworkError::Decode { .. }));
    }
}
