//! External identity service client
//!
//! Token issuance and verification are owned by the managed auth backend;
//! this module only calls it. `IdentityProvider` is the seam handlers and
//! the billing synchronizer depend on, so tests can stub identities without
//! a network.

use reqwest::Client;
use serde::Deserialize;
use std::fmt;
use std::time::Duration;
use tracing::{error, instrument};
use uuid::Uuid;

use crate::error::{Error, Result};

/// An authenticated user as reported by the identity service
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    /// Auth subject, equals the profile id
    pub id: Uuid,
    /// Account email, if any
    pub email: Option<String>,
}

/// Capability interface over the external identity service
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to a user; any failure is `Unauthorized`
    async fn verify_token(&self, token: &str) -> Result<AuthUser>;

    /// Look up a user by exact email via the admin API
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>>;
}

/// Client for a GoTrue-compatible auth service
pub struct GoTrueClient {
    http: Client,
    base_url: String,
    anon_key: String,
    service_role_key: String,
}

// Keys never appear in Debug output
impl fmt::Debug for GoTrueClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GoTrueClient")
            .field("base_url", &self.base_url)
            .field("anon_key", &"****")
            .field("service_role_key", &"****")
            .finish()
    }
}

impl GoTrueClient {
    /// Create a new client
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        service_role_key: impl Into<String>,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| Error::Internal(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            service_role_key: service_role_key.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct UserListResponse {
    users: Vec<AuthUser>,
}

#[async_trait::async_trait]
impl IdentityProvider for GoTrueClient {
    #[instrument(skip(self, token))]
    async fn verify_token(&self, token: &str) -> Result<AuthUser> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::Internal(format!("auth service unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Unauthorized);
        }

        response.json().await.map_err(|_| Error::Unauthorized)
    }

    #[instrument(skip(self))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<AuthUser>> {
        let response = self
            .http
            .get(format!("{}/auth/v1/admin/users", self.base_url))
            .query(&[("per_page", "1000")])
            .header("apikey", &self.service_role_key)
            .bearer_auth(&self.service_role_key)
            .send()
            .await
            .map_err(|e| Error::Internal(format!("auth service unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Admin user listing failed");
            return Err(Error::Internal(format!(
                "auth admin lookup returned HTTP {status}"
            )));
        }

        let list: UserListResponse = response
            .json()
            .await
            .map_err(|e| Error::Internal(format!("auth admin response: {e}")))?;

        Ok(list
            .users
            .into_iter()
            .find(|u| u.email.as_deref() == Some(email)))
    }
}
