//! The data-access contract consumed by the dashboard, and its HTTP
//! implementation.
//!
//! `Backend` is the seam services are generic over; tests substitute an
//! in-memory implementation. `HttpBackend` drives `BackendClient` through a
//! host-supplied `Transport`.

use std::future::Future;

use serde::de::DeserializeOwned;

use crate::client::BackendClient;
use crate::error::ApiError;
use crate::http::Transport;
use crate::types::SessionUser;

pub trait Backend: Send + Sync {
    /// Fetch the single row of `table` whose `key` column equals `value`.
    fn lookup_record_by_key<T>(
        &self,
        table: &str,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<T, ApiError>> + Send
    where
        T: DeserializeOwned + Send;

    /// Fetch rows of `table` owned by `owner_id`, newest first.
    fn list_records_by_owner<T>(
        &self,
        table: &str,
        owner_column: &str,
        owner_id: &str,
        limit: Option<u32>,
    ) -> impl Future<Output = Result<Vec<T>, ApiError>> + Send
    where
        T: DeserializeOwned + Send;

    /// The signed-in user, if any.
    fn current_session_user(
        &self,
    ) -> impl Future<Output = Result<Option<SessionUser>, ApiError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpBackend<T> {
    client: BackendClient,
    transport: T,
}

impl<T: Transport> HttpBackend<T> {
    pub fn new(client: BackendClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }
}

impl<T: Transport> Backend for HttpBackend<T> {
    async fn lookup_record_by_key<R>(&self, table: &str, key: &str, value: &str) -> Result<R, ApiError>
    where
        R: DeserializeOwned + Send,
    {
        tracing::debug!(table, key, "lookup by key");
        let request = self.client.build_lookup_by_key(table, key, value);
        let response = self.transport.execute(request).await?;
        self.client.parse_lookup(response)
    }

    async fn list_records_by_owner<R>(
        &self,
        table: &str,
        owner_column: &str,
        owner_id: &str,
        limit: Option<u32>,
    ) -> Result<Vec<R>, ApiError>
    where
        R: DeserializeOwned + Send,
    {
        tracing::debug!(table, owner_id, ?limit, "list by owner");
        let request = self
            .client
            .build_list_by_owner(table, owner_column, owner_id, limit);
        let response = self.transport.execute(request).await?;
        self.client.parse_list(response)
    }

    async fn current_session_user(&self) -> Result<Option<SessionUser>, ApiError> {
        let request = self.client.build_session_user();
        let response = self.transport.execute(request).await?;
        self.client.parse_session_user(response)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::http::{HttpRequest, HttpResponse};
    use crate::types::Profile;

    /// Replays canned responses and records the paths it was asked for.
    struct Canned {
        responses: Mutex<Vec<HttpResponse>>,
        seen: Mutex<Vec<String>>,
    }

    impl Canned {
        fn new(responses: Vec<HttpResponse>) -> Self {
            Self {
                responses: Mutex::new(responses),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Transport for Canned {
        async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
            self.seen.lock().unwrap().push(request.path);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(ApiError::Transport("no canned response".into()));
            }
            Ok(responses.remove(0))
        }
    }

    fn backend(responses: Vec<HttpResponse>) -> HttpBackend<Canned> {
        HttpBackend::new(BackendClient::new("http://db", "k"), Canned::new(responses))
    }

    #[tokio::test]
    async fn lookup_goes_through_transport() {
        let backend = backend(vec![HttpResponse::new(
            200,
            r#"[{"id":"00000000-0000-0000-0000-000000000001","email":"a@b.com"}]"#,
        )]);
        let profile: Profile = backend
            .lookup_record_by_key("profiles", "id", "00000000-0000-0000-0000-000000000001")
            .await
            .unwrap();
        assert_eq!(profile.email, "a@b.com");
        let seen = backend.transport.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].starts_with("http://db/rest/v1/profiles?"));
    }

    #[tokio::test]
    async fn transport_failure_is_propagated() {
        let backend = backend(Vec::new());
        let err = backend.current_session_user().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn missing_session_is_none() {
        let backend = backend(vec![HttpResponse::new(401, "")]);
        assert!(backend.current_session_user().await.unwrap().is_none());
    }
}
