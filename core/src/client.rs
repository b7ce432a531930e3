//! Stateless HTTP request builder and response parser for the hosted backend.
//!
//! # Design
//! `BackendClient` holds the base URL and credentials and carries no mutable
//! state between calls. Each query is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller executes the actual HTTP round-trip, keeping the
//! client deterministic and free of I/O dependencies.
//!
//! Table queries go to `{base}/rest/v1/{table}` with `column=eq.value`
//! filters; the session endpoint is `{base}/auth/v1/user`.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::SessionUser;

/// Everything except RFC 3986 unreserved characters.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: &str, anon_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: None,
        }
    }

    /// Attach the signed-in user's JWT. Without one, the anon key is sent
    /// as the bearer token.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn set_access_token(&mut self, token: Option<String>) {
        self.access_token = token;
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn auth_headers(&self) -> Vec<(String, String)> {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        vec![
            ("apikey".to_string(), self.anon_key.clone()),
            ("authorization".to_string(), format!("Bearer {bearer}")),
        ]
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, encode(table))
    }

    /// `GET` the single row of `table` where `key = value`.
    pub fn build_lookup_by_key(&self, table: &str, key: &str, value: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!(
                "{}?select=*&{}=eq.{}&limit=1",
                self.table_url(table),
                encode(key),
                encode(value)
            ),
            headers: self.auth_headers(),
            body: None,
        }
    }

    /// `GET` the rows of `table` owned by `owner_id`, newest first.
    pub fn build_list_by_owner(
        &self,
        table: &str,
        owner_column: &str,
        owner_id: &str,
        limit: Option<u32>,
    ) -> HttpRequest {
        let mut path = format!(
            "{}?select=*&{}=eq.{}&order=created_at.desc",
            self.table_url(table),
            encode(owner_column),
            encode(owner_id)
        );
        if let Some(limit) = limit {
            path.push_str(&format!("&limit={limit}"));
        }
        HttpRequest {
            method: HttpMethod::Get,
            path,
            headers: self.auth_headers(),
            body: None,
        }
    }

    /// `POST` a new row into `table`, asking the backend to echo it back.
    pub fn build_insert_record<T: Serialize>(
        &self,
        table: &str,
        row: &T,
    ) -> Result<HttpRequest, ApiError> {
        let body =
            serde_json::to_string(row).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut headers = self.auth_headers();
        headers.push(("content-type".to_string(), "application/json".to_string()));
        headers.push(("prefer".to_string(), "return=representation".to_string()));
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path: self.table_url(table),
            headers,
            body: Some(body),
        })
    }

    pub fn build_session_user(&self) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: format!("{}/auth/v1/user", self.base_url),
            headers: self.auth_headers(),
            body: None,
        }
    }

    /// Parse a lookup response. An empty result set is `NotFound`.
    pub fn parse_lookup<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        let rows: Vec<T> = self.parse_list(response)?;
        rows.into_iter().next().ok_or(ApiError::NotFound)
    }

    pub fn parse_list<T: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<Vec<T>, ApiError> {
        check_status(&response, 200)?;
        decode(&response.body)
    }

    /// The backend echoes inserted rows as an array; return the first.
    pub fn parse_insert_record<T: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<T, ApiError> {
        check_status(&response, 201)?;
        let rows: Vec<T> = decode(&response.body)?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ApiError::DeserializationError("empty insert response".to_string()))
    }

    /// `None` means no signed-in user; other failures are errors.
    pub fn parse_session_user(
        &self,
        response: HttpResponse,
    ) -> Result<Option<SessionUser>, ApiError> {
        match check_status(&response, 200) {
            Ok(()) => decode(&response.body).map(Some),
            Err(ApiError::Unauthorized { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

fn encode(raw: &str) -> String {
    utf8_percent_encode(raw, QUERY_VALUE).to_string()
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    match response.status {
        s if s == expected => Ok(()),
        404 => Err(ApiError::NotFound),
        401 | 403 => Err(ApiError::Unauthorized {
            status: response.status,
        }),
        status => Err(ApiError::HttpError {
            status,
            body: response.body.clone(),
        }),
    }
}
