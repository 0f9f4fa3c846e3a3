//! Bearer-token authentication against the hosted auth provider.
//!
//! The provider signs access tokens with a shared HS256 secret. Every
//! authenticated request carries `Authorization: Bearer <token>`; the
//! extractor resolves it to the owning user or rejects with 401.

use std::time::Duration;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Audience the provider stamps on end-user access tokens.
const TOKEN_AUDIENCE: &str = "authenticated";

/// Decoded access-token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// User ID
    pub sub: String,
    /// Email (if available)
    pub email: Option<String>,
    /// Audience
    pub aud: String,
    /// Expiration
    pub exp: i64,
    /// Issued at
    #[serde(default)]
    pub iat: Option<i64>,
    /// Provider role
    #[serde(default)]
    pub role: Option<String>,
}

/// Authenticated user extracted from a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

impl From<AccessClaims> for AuthUser {
    fn from(claims: AccessClaims) -> Self {
        Self {
            uid: claims.sub,
            email: claims.email,
        }
    }
}

/// Verifies provider-issued access tokens.
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    /// Create a verifier from the provider's shared signing secret.
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[TOKEN_AUDIENCE]);

        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Create from environment variables.
    pub fn from_env() -> ApiResult<Self> {
        let secret = std::env::var("SUPABASE_JWT_SECRET")
            .map_err(|_| ApiError::internal("SUPABASE_JWT_SECRET must be set"))?;
        if secret.is_empty() {
            return Err(ApiError::internal("SUPABASE_JWT_SECRET cannot be empty"));
        }
        Ok(Self::new(&secret))
    }

    /// Verify an access token and return its claims.
    pub fn verify(&self, token: &str) -> Result<AccessClaims, ApiError> {
        let data = decode::<AccessClaims>(token, &self.key, &self.validation)
            .map_err(|e| ApiError::unauthorized(format!("Invalid or expired token: {}", e)))?;
        Ok(data.claims)
    }
}

/// Axum extractor for the authenticated user.
#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("No access token provided"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::unauthorized("Invalid Authorization header format"))?;

        let claims = state.verifier.verify(token)?;

        Ok(AuthUser::from(claims))
    }
}

/// A user created through the provider's admin API.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedUser {
    pub id: String,
    pub email: Option<String>,
}

/// Admin client for the auth provider, used at signup.
pub struct AuthAdmin {
    http: Client,
    admin_users_url: String,
    service_key: String,
}

impl AuthAdmin {
    /// Create a new admin client.
    pub fn new(base_url: &str, service_key: impl Into<String>) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ApiError::internal(format!("Failed to build auth client: {}", e)))?;

        Ok(Self {
            http,
            admin_users_url: format!("{}/auth/v1/admin/users", base_url.trim_end_matches('/')),
            service_key: service_key.into(),
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ApiResult<Self> {
        let base_url = std::env::var("SUPABASE_URL")
            .map_err(|_| ApiError::internal("SUPABASE_URL must be set"))?;
        let service_key = std::env::var("SUPABASE_SERVICE_ROLE_KEY")
            .map_err(|_| ApiError::internal("SUPABASE_SERVICE_ROLE_KEY must be set"))?;
        Self::new(&base_url, service_key)
    }

    /// Create a user account, auto-confirming the e-mail address since no
    /// mail server is configured.
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> ApiResult<CreatedUser> {
        let body = serde_json::json!({
            "email": email,
            "password": password,
            "email_confirm": true,
            "user_metadata": { "name": name },
        });

        let response = self
            .http
            .post(&self.admin_users_url)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::internal(format!("Auth provider unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let detail = provider_error_detail(response).await;
            // Provider rejections (duplicate e-mail, weak password) are the
            // caller's problem, not ours.
            return Err(ApiError::validation(detail));
        }

        let user: CreatedUser = response
            .json()
            .await
            .map_err(|e| ApiError::internal(format!("Malformed auth provider response: {}", e)))?;

        info!(user_id = %user.id, "created auth account");
        Ok(user)
    }
}

/// Pull the most useful message out of a provider error body.
async fn provider_error_detail(response: reqwest::Response) -> String {
    let fallback = "Failed to create user".to_string();
    let Ok(body) = response.json::<Value>().await else {
        return fallback;
    };

    ["msg", "message", "error_description", "error"]
        .iter()
        .find_map(|field| body.get(field).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
        .unwrap_or(fallback)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn make_token(secret: &str, claims: &AccessClaims) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn valid_claims() -> AccessClaims {
        AccessClaims {
            sub: "user-1".to_string(),
            email: Some("jo@example.com".to_string()),
            aud: TOKEN_AUDIENCE.to_string(),
            exp: chrono::Utc::now().timestamp() + 3600,
            iat: None,
            role: Some("authenticated".to_string()),
        }
    }

    #[test]
    fn test_verify_accepts_valid_token() {
        let verifier = TokenVerifier::new("secret");
        let token = make_token("secret", &valid_claims());

        let claims = verifier.verify(&token).unwrap();
        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email.as_deref(), Some("jo@example.com"));
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let verifier = TokenVerifier::new("secret");
        let token = make_token("other-secret", &valid_claims());
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_expired_token() {
        let verifier = TokenVerifier::new("secret");
        let mut claims = valid_claims();
        claims.exp = chrono::Utc::now().timestamp() - 3600;
        let token = make_token("secret", &claims);
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_wrong_audience() {
        let verifier = TokenVerifier::new("secret");
        let mut claims = valid_claims();
        claims.aud = "anon".to_string();
        let token = make_token("secret", &claims);
        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let verifier = TokenVerifier::new("secret");
        assert!(verifier.verify("not-a-token").is_err());
    }
}
