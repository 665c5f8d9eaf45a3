// src/api/mod.rs
//
// Every outbound call to the match/auth API crosses ApiClient::request
// exactly once: bearer injection before send, error normalization after,
// and single-flight credential renewal in between when the server says 401.

pub mod auth;
pub mod matches;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::{ApiError, ClientError, Result};
use crate::models::{RefreshTokenRequest, RefreshTokenResponse};
use crate::session::CredentialStore;
use crate::storage::KeyValueStore;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, Method, ReqwestTransport};

const RENEWAL_PATH: &str = "/auth/refresh-token";

/// Whether a 401 on this request may trigger a credential renewal.
///
/// Login, registration, and the renewal call itself are exempt: they fail
/// with business errors, not recoverable authorization errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    Renewable,
    Exempt,
}

pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    credentials: Arc<CredentialStore>,
    config: ClientConfig,
    renewal_in_flight: AtomicBool,
}

impl ApiClient {
    pub fn new(config: ClientConfig, storage: Arc<dyn KeyValueStore>) -> Self {
        let transport = Arc::new(ReqwestTransport::new(Duration::from_secs(
            config.request_timeout_secs,
        )));
        Self::with_transport(config, storage, transport)
    }

    pub fn with_transport(
        config: ClientConfig,
        storage: Arc<dyn KeyValueStore>,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            transport,
            credentials: Arc::new(CredentialStore::new(storage)),
            config,
            renewal_in_flight: AtomicBool::new(false),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    pub(crate) async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        policy: AuthPolicy,
    ) -> Result<Value> {
        let response = self.send_once(method.clone(), path, body.clone()).await?;
        if response.is_success() {
            return Ok(response.body.unwrap_or(Value::Null));
        }

        if response.status == 401 && policy == AuthPolicy::Renewable {
            return self.renew_and_retry(method, path, body, response).await;
        }

        Err(normalize_error_response(response))
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<HttpResponse> {
        let request = HttpRequest {
            method,
            url: self.endpoint(path),
            bearer: self.credentials.access_token(),
            body,
        };
        self.transport
            .send(request)
            .await
            .map_err(|failure| ClientError::Api(ApiError::transport(failure.message)))
    }

    /// One renewal attempt, then exactly one resubmission of the original
    /// request. A request that meets an in-flight renewal fails fast with the
    /// original 401 instead of waiting; callers may resubmit the user's
    /// action.
    async fn renew_and_retry(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        original: HttpResponse,
    ) -> Result<Value> {
        let Some(guard) = RenewalGuard::try_acquire(&self.renewal_in_flight) else {
            tracing::debug!(path, "credential renewal already in flight; failing fast");
            return Err(normalize_error_response(original));
        };

        let Some(refresh_token) = self.credentials.refresh_token() else {
            self.credentials.clear_credentials();
            tracing::warn!("no refresh token available; session terminated");
            return Err(ClientError::SessionExpired);
        };

        let renewal = HttpRequest {
            method: Method::POST,
            url: self.endpoint(RENEWAL_PATH),
            bearer: None,
            body: Some(
                serde_json::to_value(RefreshTokenRequest { refresh_token })
                    .expect("refresh request serializes"),
            ),
        };

        let tokens = match self.transport.send(renewal).await {
            Ok(response) if response.is_success() => {
                serde_json::from_value::<RefreshTokenResponse>(
                    response.body.unwrap_or(Value::Null),
                )
                .ok()
            }
            _ => None,
        };

        let Some(tokens) = tokens else {
            self.credentials.clear_credentials();
            tracing::warn!("credential renewal failed; session terminated");
            return Err(ClientError::SessionExpired);
        };

        self.credentials
            .set_credentials(&tokens.access_token, &tokens.refresh_token);
        drop(guard);
        tracing::debug!(path, "credentials renewed; retrying original request once");

        // Already-retried: whatever comes back now is final, another 401
        // included.
        let retry = self.send_once(method, path, body).await?;
        if retry.is_success() {
            return Ok(retry.body.unwrap_or(Value::Null));
        }
        Err(normalize_error_response(retry))
    }

    pub(crate) async fn get_json<R: DeserializeOwned>(
        &self,
        path: &str,
        policy: AuthPolicy,
    ) -> Result<R> {
        decode(self.request(Method::GET, path, None, policy).await?)
    }

    pub(crate) async fn post_json<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        policy: AuthPolicy,
    ) -> Result<R> {
        let body = serde_json::to_value(body)
            .map_err(|e| ClientError::Decode(format!("request body: {e}")))?;
        decode(self.request(Method::POST, path, Some(body), policy).await?)
    }

    /// POST whose response body is irrelevant (or absent).
    pub(crate) async fn post_unit<B: Serialize>(
        &self,
        path: &str,
        body: Option<&B>,
        policy: AuthPolicy,
    ) -> Result<()> {
        let body = match body {
            Some(b) => Some(
                serde_json::to_value(b)
                    .map_err(|e| ClientError::Decode(format!("request body: {e}")))?,
            ),
            None => None,
        };
        self.request(Method::POST, path, body, policy).await?;
        Ok(())
    }
}

fn decode<R: DeserializeOwned>(value: Value) -> Result<R> {
    serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Normalizes an error response into the uniform `{ message, status, code }`
/// shape. The body's top-level `message`/`code` fields win; a nested
/// `error: { message, code }` object is accepted as a fallback.
fn normalize_error_response(response: HttpResponse) -> ClientError {
    let body = response.body.unwrap_or(Value::Null);
    let nested = body.get("error");

    let message = field(&body, nested, "message")
        .unwrap_or_else(|| format!("request failed with status {}", response.status));
    let code = field(&body, nested, "code");

    ClientError::Api(ApiError {
        message,
        status: Some(response.status),
        code,
    })
}

fn field(body: &Value, nested: Option<&Value>, key: &str) -> Option<String> {
    body.get(key)
        .or_else(|| nested.and_then(|e| e.get(key)))
        .and_then(Value::as_str)
        .map(str::to_owned)
}

/// Single-flight guard over the renewal flag. Dropping the handle releases
/// the flag on every exit path.
struct RenewalGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RenewalGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for RenewalGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN};
    use crate::storage::MemoryStorage;
    use crate::transport::mock::MockTransport;
    use serde_json::json;

    fn client() -> (ApiClient, Arc<MockTransport>, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::new());
        let transport = Arc::new(MockTransport::new());
        let api = ApiClient::with_transport(
            ClientConfig::default(),
            storage.clone(),
            transport.clone(),
        );
        (api, transport, storage)
    }

    #[tokio::test]
    async fn attaches_bearer_when_token_present() {
        let (api, transport, _storage) = client();
        api.credentials().set_credentials("acc", "ref");
        transport.push_response(200, json!({"ok": true}));

        api.request(Method::GET, "/users/profile", None, AuthPolicy::Renewable)
            .await
            .expect("request should succeed");

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].bearer.as_deref(), Some("acc"));
        assert!(requests[0].url.ends_with("/users/profile"));
    }

    #[tokio::test]
    async fn renewal_happy_path_retries_exactly_once() {
        let (api, transport, _storage) = client();
        api.credentials().set_credentials("stale", "ref-1");
        transport.push_response(401, json!({"message": "Unauthorized"}));
        transport.push_response(
            200,
            json!({"accessToken": "fresh", "refreshToken": "ref-2"}),
        );
        transport.push_response(200, json!({"rankPoints": 1, "wins": 0, "losses": 0}));

        let value = api
            .request(Method::GET, "/users/profile", None, AuthPolicy::Renewable)
            .await
            .expect("retry should succeed");
        assert_eq!(value["rankPoints"], 1);

        let requests = transport.requests();
        assert_eq!(requests.len(), 3, "original, renewal, retry; nothing more");

        // Exactly one renewal call, carrying the stored refresh token and no
        // bearer credential.
        assert!(requests[1].url.ends_with(RENEWAL_PATH));
        assert_eq!(requests[1].bearer, None);
        assert_eq!(requests[1].body.as_ref().unwrap()["refreshToken"], "ref-1");

        // Exactly one retry, carrying the new access token.
        assert_eq!(requests[2].bearer.as_deref(), Some("fresh"));

        assert_eq!(api.credentials().access_token().as_deref(), Some("fresh"));
        assert_eq!(api.credentials().refresh_token().as_deref(), Some("ref-2"));
        assert!(!api.renewal_in_flight.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn renewal_rejection_terminates_the_session() {
        let (api, transport, _storage) = client();
        api.credentials().set_credentials("stale", "ref-1");
        transport.push_response(401, json!({"message": "Unauthorized"}));
        transport.push_response(401, json!({"message": "refresh token revoked"}));

        let err = api
            .request(Method::GET, "/users/profile", None, AuthPolicy::Renewable)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired));

        assert_eq!(transport.requests().len(), 2, "no retry after failed renewal");
        assert!(!api.credentials().is_authenticated());
        assert_eq!(api.credentials().refresh_token(), None);
        assert!(!api.renewal_in_flight.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn renewal_transport_failure_terminates_the_session() {
        let (api, transport, _storage) = client();
        api.credentials().set_credentials("stale", "ref-1");
        transport.push_response(401, json!({"message": "Unauthorized"}));
        transport.push_failure("connection reset");

        let err = api
            .request(Method::GET, "/match/m-1", None, AuthPolicy::Renewable)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired));
        assert!(!api.credentials().is_authenticated());
    }

    #[tokio::test]
    async fn missing_refresh_token_terminates_immediately() {
        let (api, transport, storage) = client();
        storage.set(KEY_ACCESS_TOKEN, "stale");
        assert_eq!(storage.get(KEY_REFRESH_TOKEN), None);
        transport.push_response(401, json!({"message": "Unauthorized"}));

        let err = api
            .request(Method::GET, "/users/profile", None, AuthPolicy::Renewable)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::SessionExpired));
        assert_eq!(transport.requests().len(), 1, "no renewal call was possible");
        assert!(!api.credentials().is_authenticated());
    }

    #[tokio::test]
    async fn exempt_requests_never_renew() {
        let (api, transport, _storage) = client();
        api.credentials().set_credentials("acc", "ref");
        transport.push_response(401, json!({"message": "Invalid credentials"}));

        let err = api
            .request(
                Method::POST,
                "/auth/login",
                Some(json!({"username": "u", "password": "p"})),
                AuthPolicy::Exempt,
            )
            .await
            .unwrap_err();

        match err {
            ClientError::Api(api_error) => {
                assert_eq!(api_error.status, Some(401));
                assert_eq!(api_error.message, "Invalid credentials");
            }
            other => panic!("expected normalized 401, got {other:?}"),
        }
        assert_eq!(transport.requests().len(), 1);
        // Business auth failure, not a stale session: credentials survive.
        assert!(api.credentials().is_authenticated());
    }

    #[tokio::test]
    async fn concurrent_renewal_fails_fast() {
        let (api, transport, _storage) = client();
        api.credentials().set_credentials("stale", "ref-1");
        api.renewal_in_flight.store(true, Ordering::Release);
        transport.push_response(401, json!({"message": "Unauthorized"}));

        let err = api
            .request(Method::GET, "/match/m-1", None, AuthPolicy::Renewable)
            .await
            .unwrap_err();

        // The caller sees the normalized 401 and may resubmit; the in-flight
        // renewal owns the credential lifecycle.
        match err {
            ClientError::Api(api_error) => assert!(api_error.is_unauthorized()),
            other => panic!("expected normalized 401, got {other:?}"),
        }
        assert_eq!(transport.requests().len(), 1);
        assert!(api.credentials().is_authenticated());
    }

    #[tokio::test]
    async fn retried_request_is_never_renewed_twice() {
        let (api, transport, _storage) = client();
        api.credentials().set_credentials("stale", "ref-1");
        transport.push_response(401, json!({"message": "Unauthorized"}));
        transport.push_response(
            200,
            json!({"accessToken": "fresh", "refreshToken": "ref-2"}),
        );
        transport.push_response(401, json!({"message": "still unauthorized"}));

        let err = api
            .request(Method::GET, "/users/profile", None, AuthPolicy::Renewable)
            .await
            .unwrap_err();

        match err {
            ClientError::Api(api_error) => {
                assert_eq!(api_error.status, Some(401));
                assert_eq!(api_error.message, "still unauthorized");
            }
            other => panic!("expected normalized 401, got {other:?}"),
        }
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn transport_failures_normalize_without_status() {
        let (api, transport, _storage) = client();
        transport.push_failure("connection refused");

        let err = api
            .request(Method::GET, "/match", None, AuthPolicy::Renewable)
            .await
            .unwrap_err();
        match err {
            ClientError::Api(api_error) => {
                assert_eq!(api_error.status, None);
                assert_eq!(api_error.message, "connection refused");
            }
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn business_errors_carry_message_status_and_code() {
        let (api, transport, _storage) = client();
        transport.push_response(
            409,
            json!({"message": "cell already attacked", "code": "CELL_TAKEN"}),
        );

        let err = api
            .request(Method::POST, "/match/shot", Some(json!({})), AuthPolicy::Renewable)
            .await
            .unwrap_err();
        match err {
            ClientError::Api(api_error) => {
                assert_eq!(api_error.message, "cell already attacked");
                assert_eq!(api_error.status, Some(409));
                assert_eq!(api_error.code.as_deref(), Some("CELL_TAKEN"));
            }
            other => panic!("expected normalized error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn nested_error_bodies_are_accepted() {
        let (api, transport, _storage) = client();
        transport.push_response(
            400,
            json!({"success": false, "error": {"code": "BAD_REQUEST", "message": "nope"}}),
        );

        let err = api
            .request(Method::GET, "/match", None, AuthPolicy::Renewable)
            .await
            .unwrap_err();
        match err {
            ClientError::Api(api_error) => {
                assert_eq!(api_error.message, "nope");
                assert_eq!(api_error.code.as_deref(), Some("BAD_REQUEST"));
            }
            other => panic!("expected normalized error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn empty_success_bodies_read_as_null() {
        let (api, transport, _storage) = client();
        transport.push_empty_response(204);

        let value = api
            .request(Method::POST, "/match/m-1/cancel", None, AuthPolicy::Renewable)
            .await
            .expect("204 is success");
        assert!(value.is_null());
    }
}
