use crate::error::{Error, Result};
use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// API key sent as the HTTP Basic username with an empty password.
#[derive(Clone)]
pub struct Credentials {
    api_key: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Status code and full body of an HTTP response, whatever the status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    pub fn is_rate_limited(&self) -> bool {
        self.status == 429
    }
}

/// Authenticated GET. Non-2xx statuses come back as data; only I/O-level
/// failures are errors.
pub trait Transport: Send + Sync {
    fn get<'a>(
        &'a self,
        url: &'a str,
        query: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<Response>>;
}

pub struct HttpTransport {
    client: Client,
    credentials: Credentials,
}

impl HttpTransport {
    pub fn new(credentials: Credentials, timeout: Duration, proxy: Option<&str>) -> Result<Self> {
        let mut client_builder = Client::builder().timeout(timeout);

        if let Some(proxy_url) = proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| Error::Config(format!("invalid proxy {proxy_url}: {e}")))?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder.build()?;

        Ok(Self {
            client,
            credentials,
        })
    }
}

impl Transport for HttpTransport {
    fn get<'a>(
        &'a self,
        url: &'a str,
        query: &'a [(&'a str, String)],
    ) -> BoxFuture<'a, Result<Response>> {
        async move {
            debug!(url, ?query, "GET");
            let response = self
                .client
                .get(url)
                .basic_auth(self.credentials.api_key(), Some(""))
                .query(query)
                .send()
                .await?;

            let status = response.status().as_u16();
            let body = response.bytes().await?.to_vec();
            debug!(url, status, bytes = body.len(), "response");

            Ok(Response { status, body })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{basic_auth, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn transport() -> HttpTransport {
        HttpTransport::new(Credentials::new("secret-key"), Duration::from_secs(5), None).unwrap()
    }

    #[test]
    fn credentials_debug_hides_key() {
        let shown = format!("{:?}", Credentials::new("secret-key"));
        assert!(!shown.contains("secret-key"));
        assert!(shown.contains("redacted"));
    }

    #[test]
    fn invalid_proxy_is_a_config_error() {
        let err = HttpTransport::new(
            Credentials::new("k"),
            Duration::from_secs(5),
            Some("not a proxy"),
        )
        .err()
        .unwrap();

        assert!(matches!(err, Error::Config(_)));
        assert!(!err.is_transient());
        assert!(err.to_string().contains("not a proxy"));
    }

    #[tokio::test]
    async fn sends_basic_auth_and_encoded_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/signature_request/list"))
            .and(basic_auth("secret-key", ""))
            .and(query_param("q", "a b&c"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/signature_request/list", server.uri());
        let query = [("q", "a b&c".to_string())];
        let response = transport().get(&url, &query).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"ok");
    }

    #[tokio::test]
    async fn non_success_status_is_returned_as_data() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        let url = format!("{}/anything", server.uri());
        let response = transport().get(&url, &[]).await.unwrap();

        assert_eq!(response.status, 503);
        assert_eq!(response.body, b"down");
    }

    #[tokio::test]
    async fn connection_refused_is_a_transport_error() {
        // Bind then drop to get a port with nothing listening.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = format!("http://127.0.0.1:{port}/x");

        let err = transport().get(&url, &[]).await.unwrap_err();
        assert!(matches!(err, Error::Transport(_)));
        assert!(err.is_transient());
    }
}
