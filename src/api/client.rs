use super::types::*;
use super::{AuthApi, PricingApi};
use crate::errors::{ClientError, ClientResult};
use crate::token::TokenStore;
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;

/// Pricing-service REST client. All methods return Result, never panic.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout_secs: u64, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .pool_max_idle_per_host(4)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer_token(&self) -> ClientResult<String> {
        self.tokens
            .get()?
            .ok_or_else(|| ClientError::Auth("no bearer token persisted".into()))
    }

    /// GET the identity endpoint with an explicit bearer token.
    async fn fetch_identity(&self, token: &str) -> ClientResult<Identity> {
        let resp = self
            .client
            .get(self.url("/"))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(error_from_response(status, resp).await);
        }

        let envelope: UserEnvelope = resp
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("GET /: {e}")))?;
        Ok(envelope.user)
    }
}

impl AuthApi for ApiClient {
    /// Token endpoint takes form-url-encoded credentials, not JSON.
    /// On success the token is persisted before the follow-up identity fetch.
    async fn login(&self, credentials: &Credentials) -> ClientResult<Identity> {
        let resp = self
            .client
            .post(self.url("/auth/token"))
            .form(&[
                ("username", credentials.username.as_str()),
                ("password", credentials.password.as_str()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(error_from_response(status, resp).await);
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ClientError::Parse(format!("POST /auth/token: {e}")))?;

        let token = body
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ClientError::Auth("token endpoint returned no access token".into()))?;

        self.tokens.set(&token)?;
        self.fetch_identity(&token).await
    }

    async fn register(&self, credentials: &Credentials) -> ClientResult<RegisterAck> {
        let resp = self
            .client
            .post(self.url("/auth"))
            .json(&RegisterRequest {
                username: &credentials.username,
                password: &credentials.password,
            })
            .send()
            .await?;

        let status = resp.status();
        if status.is_client_error() {
            let detail = read_detail(resp).await;
            return Err(ClientError::Validation(detail.unwrap_or_else(|| {
                "Registration rejected. Check username and password.".to_string()
            })));
        }
        if !status.is_success() {
            return Err(error_from_response(status, resp).await);
        }

        resp.json()
            .await
            .map_err(|e| ClientError::Parse(format!("POST /auth: {e}")))
    }

    /// Short-circuits to None when no token is persisted: an anonymous
    /// client never sends an unauthenticated probe to the server.
    async fn current_user(&self) -> ClientResult<Option<Identity>> {
        let Some(token) = self.tokens.get()? else {
            return Ok(None);
        };
        Ok(Some(self.fetch_identity(&token).await?))
    }

    fn logout(&self) -> ClientResult<()> {
        self.tokens.clear()
    }
}

impl PricingApi for ApiClient {
    async fn calculate(&self, request: &CalculationRequest) -> ClientResult<CalculationResult> {
        let resp = self
            .client
            .post(self.url("/black-scholes/calculate"))
            .json(request)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(error_from_response(status, resp).await);
        }

        resp.json()
            .await
            .map_err(|e| ClientError::Parse(format!("POST /black-scholes/calculate: {e}")))
    }

    async fn calculations(&self) -> ClientResult<Vec<CalculationRecord>> {
        let token = self.bearer_token()?;
        let resp = self
            .client
            .get(self.url("/black-scholes/calculations"))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(error_from_response(status, resp).await);
        }

        resp.json()
            .await
            .map_err(|e| ClientError::Parse(format!("GET /black-scholes/calculations: {e}")))
    }
}

/// Read an optional `detail` message out of an error response body.
async fn read_detail(resp: Response) -> Option<String> {
    let text = resp.text().await.ok()?;
    match serde_json::from_str::<ErrorBody>(&text) {
        Ok(body) => body.detail,
        Err(_) if !text.is_empty() => Some(text),
        Err(_) => None,
    }
}

/// Map a non-success response to the error taxonomy: 401 is always Auth,
/// everything else carries the status and server detail.
async fn error_from_response(status: StatusCode, resp: Response) -> ClientError {
    let detail = read_detail(resp).await.unwrap_or_default();
    if status == StatusCode::UNAUTHORIZED {
        ClientError::Auth(if detail.is_empty() {
            "invalid or expired credentials".to_string()
        } else {
            detail
        })
    } else {
        ClientError::Server {
            status: status.as_u16(),
            detail,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::MemoryTokenStore;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn http_response(status_line: &str, json: &str) -> String {
        format!(
            "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{json}",
            json.len()
        )
    }

    fn request_complete(raw: &[u8]) -> bool {
        let Some(split) = raw.windows(4).position(|w| w == b"\r\n\r\n") else {
            return false;
        };
        let head = String::from_utf8_lossy(&raw[..split]);
        let content_length = head
            .lines()
            .find_map(|line| {
                let (name, value) = line.split_once(':')?;
                if name.eq_ignore_ascii_case("content-length") {
                    value.trim().parse::<usize>().ok()
                } else {
                    None
                }
            })
            .unwrap_or(0);
        raw.len() >= split + 4 + content_length
    }

    /// Minimal local fixture: one canned response per connection, in order.
    /// Responses carry connection: close so each request dials fresh.
    async fn canned_server(responses: Vec<String>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            for response in responses {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                loop {
                    let Ok(n) = socket.read(&mut buf).await else { return };
                    if n == 0 {
                        break;
                    }
                    request.extend_from_slice(&buf[..n]);
                    if request_complete(&request) {
                        break;
                    }
                }
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });
        format!("http://{addr}")
    }

    fn credentials() -> Credentials {
        Credentials { username: "alice".into(), password: "pw".into() }
    }

    fn store_with(token: Option<&str>) -> Arc<MemoryTokenStore> {
        let store = Arc::new(MemoryTokenStore::new());
        if let Some(t) = token {
            store.set(t).unwrap();
        }
        store
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ApiClient::new("http://localhost:5000/", 1, store_with(None));
        assert_eq!(client.url("/auth/token"), "http://localhost:5000/auth/token");
    }

    #[tokio::test]
    async fn current_user_short_circuits_without_token() {
        // Unroutable base url: any network attempt would fail, so Ok(None)
        // proves the probe never left the client
        let client = ApiClient::new("http://127.0.0.1:1", 1, store_with(None));
        assert!(client.current_user().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn current_user_with_token_surfaces_transport_failure() {
        let client = ApiClient::new("http://127.0.0.1:1", 1, store_with(Some("tok")));
        let err = client.current_user().await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }

    #[tokio::test]
    async fn login_persists_token_and_returns_identity() {
        let base = canned_server(vec![
            http_response("200 OK", r#"{"access_token":"tok123","token_type":"bearer"}"#),
            http_response("200 OK", r#"{"User":{"id":1,"username":"alice"}}"#),
        ])
        .await;
        let tokens = store_with(None);
        let client = ApiClient::new(&base, 2, tokens.clone());

        let identity = client.login(&credentials()).await.unwrap();
        assert_eq!(identity, Identity { id: 1, username: "alice".into() });
        assert_eq!(tokens.get().unwrap().as_deref(), Some("tok123"));
    }

    #[tokio::test]
    async fn login_without_access_token_is_an_auth_error() {
        let base = canned_server(vec![http_response("200 OK", r#"{"token_type":"bearer"}"#)]).await;
        let tokens = store_with(None);
        let client = ApiClient::new(&base, 2, tokens.clone());

        let err = client.login(&credentials()).await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(_)));
        assert!(tokens.get().unwrap().is_none());
    }

    #[tokio::test]
    async fn empty_access_token_is_an_auth_error() {
        let base = canned_server(vec![http_response(
            "200 OK",
            r#"{"access_token":"","token_type":"bearer"}"#,
        )])
        .await;
        let tokens = store_with(None);
        let client = ApiClient::new(&base, 2, tokens.clone());

        let err = client.login(&credentials()).await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(_)));
        assert!(tokens.get().unwrap().is_none());
    }

    #[tokio::test]
    async fn rejected_credentials_surface_the_server_detail() {
        let base = canned_server(vec![http_response(
            "401 Unauthorized",
            r#"{"detail":"Could not validate user."}"#,
        )])
        .await;
        let client = ApiClient::new(&base, 2, store_with(None));

        let err = client.login(&credentials()).await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(_)));
        assert_eq!(err.user_message(), "Could not validate user.");
    }

    #[test]
    fn logout_purges_the_persisted_token() {
        let tokens = store_with(Some("tok"));
        let client = ApiClient::new("http://localhost:5000", 1, tokens.clone());
        client.logout().unwrap();
        assert!(tokens.get().unwrap().is_none());
        // Idempotent
        client.logout().unwrap();
    }
}
