use std::time::Duration;

use log::debug;
use reqwest::Client;
use url::Url;

use crate::error::{JenError, Result};

pub struct JenkinsClient {
    client: Client,
}

impl JenkinsClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("jen-tools/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| JenError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Issues a single GET and returns the body.
    ///
    /// Timeouts and non-2xx statuses come back as [`JenError::Timeout`] and
    /// [`JenError::Status`]; each caller decides whether those are fatal.
    pub async fn fetch(&self, url: &Url) -> Result<String> {
        debug!("GET {url}");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(JenError::Status {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
                url: url.clone(),
            });
        }

        let body = response.text().await.map_err(|e| classify(e, url))?;
        debug!("Fetched {} bytes from {url}", body.len());
        Ok(body)
    }
}

fn classify(error: reqwest::Error, url: &Url) -> JenError {
    if error.is_timeout() {
        JenError::Timeout { url: url.clone() }
    } else {
        JenError::Network(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn client() -> JenkinsClient {
        JenkinsClient::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/job/main/api/json")
            .with_status(200)
            .with_body(r#"{"builds":[]}"#)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/job/main/api/json", server.url())).unwrap();
        let body = client().fetch(&url).await.unwrap();

        assert_eq!(body, r#"{"builds":[]}"#);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_reports_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/job/missing/api/json")
            .match_query(mockito::Matcher::Any)
            .with_status(404)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/job/missing/api/json?depth=1", server.url())).unwrap();
        let err = client().fetch(&url).await.unwrap_err();

        assert!(err.is_fetch_failure());
        assert_eq!(
            err.to_string(),
            format!("404 Not Found: {}/job/missing/api/json?depth=1", server.url())
        );
    }

    #[tokio::test]
    async fn test_fetch_server_error_is_fetch_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/")
            .with_status(503)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/", server.url())).unwrap();
        let err = client().fetch(&url).await.unwrap_err();

        assert!(matches!(err, JenError::Status { code: 503, .. }));
    }

    #[tokio::test]
    async fn test_fetch_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept the connection but never answer.
        let server = tokio::spawn(async move {
            let (socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(10)).await;
            drop(socket);
        });

        let client = JenkinsClient::new(Duration::from_millis(200)).unwrap();
        let url = Url::parse(&format!("http://{addr}/slow")).unwrap();
        let err = client.fetch(&url).await.unwrap_err();

        assert_eq!(err.to_string(), format!("Timed out: http://{addr}/slow"));
        server.abort();
    }
}
