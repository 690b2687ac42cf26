//! HTTP client for the hosted auth + persistence service.
//!
//! DESIGN
//! ======
//! Thin wrapper over the service's REST surface: auth endpoints under
//! `/auth/v1` and table-like collections under `/rest/v1`. Inserts and
//! updates ask for the stored row back (`Prefer: return=representation`)
//! so the stores can treat the response as the source of truth.
//!
//! The bearer token for the current session lives inside the client; the
//! stores never see it. When a [`TokenCache`] is attached, the token is
//! also written through to disk and loaded back at construction, so a
//! fresh process can still re-validate the previous session.

use std::time::Duration;

use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AuthBackend, BackendError, PropertyBackend};
use crate::model::{AdminUser, Property, PropertyDraft, PropertyPatch};
use crate::persist::TokenCache;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpBackend {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    token: RwLock<Option<String>>,
    token_cache: Option<TokenCache>,
}

impl HttpBackend {
    /// Build a client for the service at `base_url`. A previously cached
    /// token, if any, is loaded so the session can be re-validated.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(
        base_url: &str,
        api_key: &str,
        request_timeout_secs: u64,
        connect_timeout_secs: u64,
        token_cache: Option<TokenCache>,
    ) -> Result<Self, BackendError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs))
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let token = token_cache.as_ref().and_then(TokenCache::load);
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
            token: RwLock::new(token),
            token_cache,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn bearer(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    /// Replace the in-memory token and write the change through to the
    /// durable cache.
    async fn store_token(&self, token: Option<String>) {
        if let Some(cache) = &self.token_cache {
            match &token {
                Some(t) => cache.save(t),
                None => cache.clear(),
            }
        }
        *self.token.write().await = token;
    }

    /// Attach the service API key and, when a session exists, the bearer
    /// token.
    async fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req.header("apikey", &self.api_key);
        match self.bearer().await {
            Some(token) => req.header("Authorization", format!("Bearer {token}")),
            None => req,
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        req.send().await.map_err(|e| BackendError::Network(e.to_string()))
    }
}

async fn service_error(resp: reqwest::Response) -> BackendError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    BackendError::Service(format!("{status}: {body}"))
}

/// Build an `eq.` filter with the value double-quoted, so reserved filter
/// characters (`,`, `(`, `)`, `.`) in the value cannot alter the
/// expression.
fn filter_eq(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("eq.\"{escaped}\"")
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, serde::Deserialize)]
struct SignInResponse {
    access_token: String,
    user: AdminUser,
}

#[derive(Debug, serde::Serialize)]
struct PasswordChange<'a> {
    password: &'a str,
}

// =============================================================================
// AUTH
// =============================================================================

#[async_trait::async_trait]
impl AuthBackend for HttpBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AdminUser, BackendError> {
        let req = self
            .http
            .post(self.endpoint("/auth/v1/token?grant_type=password"))
            .header("apikey", &self.api_key)
            .json(&serde_json::json!({ "email": email, "password": password }));
        let resp = self.send(req).await?;

        if resp.status() == reqwest::StatusCode::BAD_REQUEST || resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            return Err(BackendError::InvalidCredentials);
        }
        if !resp.status().is_success() {
            return Err(service_error(resp).await);
        }

        let body: SignInResponse = resp
            .json()
            .await
            .map_err(|e| BackendError::Service(e.to_string()))?;
        self.store_token(Some(body.access_token)).await;
        Ok(body.user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        let Some(token) = self.bearer().await else {
            return Ok(());
        };
        // Drop the token first: local invalidation must stick even when
        // the remote call fails.
        self.store_token(None).await;
        let req = self
            .http
            .post(self.endpoint("/auth/v1/logout"))
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {token}"));
        let resp = self.send(req).await?;
        if !resp.status().is_success() {
            return Err(service_error(resp).await);
        }
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AdminUser>, BackendError> {
        if self.bearer().await.is_none() {
            return Ok(None);
        }
        let req = self.authed(self.http.get(self.endpoint("/auth/v1/user"))).await;
        let resp = self.send(req).await?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Token expired or revoked server-side.
            self.store_token(None).await;
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(service_error(resp).await);
        }

        let user: AdminUser = resp
            .json()
            .await
            .map_err(|e| BackendError::Service(e.to_string()))?;
        Ok(Some(user))
    }

    async fn update_password(&self, new_password: &str) -> Result<(), BackendError> {
        if self.bearer().await.is_none() {
            return Err(BackendError::NotAuthenticated);
        }
        let req = self
            .authed(self.http.put(self.endpoint("/auth/v1/user")))
            .await
            .json(&PasswordChange { password: new_password });
        let resp = self.send(req).await?;
        if !resp.status().is_success() {
            return Err(service_error(resp).await);
        }
        Ok(())
    }

    async fn is_admin(&self, email: &str) -> Result<bool, BackendError> {
        let filter = filter_eq(email);
        let req = self
            .authed(
                self.http
                    .get(self.endpoint("/rest/v1/admin_users"))
                    .query(&[("select", "id"), ("email", filter.as_str())]),
            )
            .await;
        let resp = self.send(req).await?;
        if !resp.status().is_success() {
            return Err(service_error(resp).await);
        }
        let rows: Vec<serde_json::Value> = resp
            .json()
            .await
            .map_err(|e| BackendError::Service(e.to_string()))?;
        Ok(!rows.is_empty())
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

#[async_trait::async_trait]
impl PropertyBackend for HttpBackend {
    async fn list_properties(&self) -> Result<Vec<Property>, BackendError> {
        let req = self
            .authed(
                self.http
                    .get(self.endpoint("/rest/v1/properties"))
                    .query(&[("select", "*"), ("order", "price.desc")]),
            )
            .await;
        let resp = self.send(req).await?;
        if !resp.status().is_success() {
            return Err(service_error(resp).await);
        }
        resp.json().await.map_err(|e| BackendError::Service(e.to_string()))
    }

    async fn insert_property(&self, draft: &PropertyDraft) -> Result<Property, BackendError> {
        let req = self
            .authed(self.http.post(self.endpoint("/rest/v1/properties")))
            .await
            .header("Prefer", "return=representation")
            .json(draft);
        let resp = self.send(req).await?;
        if !resp.status().is_success() {
            return Err(service_error(resp).await);
        }
        let mut rows: Vec<Property> = resp
            .json()
            .await
            .map_err(|e| BackendError::Service(e.to_string()))?;
        rows.pop()
            .ok_or_else(|| BackendError::Service("insert returned no row".to_owned()))
    }

    async fn update_property(&self, id: Uuid, patch: &PropertyPatch) -> Result<Property, BackendError> {
        let req = self
            .authed(
                self.http
                    .patch(self.endpoint("/rest/v1/properties"))
                    .query(&[("id", format!("eq.{id}"))]),
            )
            .await
            .header("Prefer", "return=representation")
            .json(patch);
        let resp = self.send(req).await?;
        if !resp.status().is_success() {
            return Err(service_error(resp).await);
        }
        let mut rows: Vec<Property> = resp
            .json()
            .await
            .map_err(|e| BackendError::Service(e.to_string()))?;
        rows.pop().ok_or(BackendError::NotFound(id))
    }

    async fn delete_property(&self, id: Uuid) -> Result<(), BackendError> {
        let req = self
            .authed(
                self.http
                    .delete(self.endpoint("/rest/v1/properties"))
                    .query(&[("id", format!("eq.{id}"))]),
            )
            .await
            .header("Prefer", "return=representation");
        let resp = self.send(req).await?;
        if !resp.status().is_success() {
            return Err(service_error(resp).await);
        }
        let rows: Vec<serde_json::Value> = resp
            .json()
            .await
            .map_err(|e| BackendError::Service(e.to_string()))?;
        if rows.is_empty() {
            return Err(BackendError::NotFound(id));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "http_test.rs"]
mod tests;
