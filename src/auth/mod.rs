use std::ops::RangeInclusive;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Session token payload. Field names follow the public wire format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: impl Into<String>, lifetime: Duration) -> Self {
        let now = Utc::now();

        Self {
            user_id,
            email: email.into(),
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Invalid security configuration: {0}")]
    InvalidConfig(String),

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("Password hashing error: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("Password hashing task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Work factors bcrypt accepts
const BCRYPT_COST_RANGE: RangeInclusive<u32> = 4..=31;

/// Password hashing and session token handling, configured once at startup.
pub struct Credentials {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_lifetime: Duration,
    bcrypt_cost: u32,
}

impl Credentials {
    pub fn new(security: &SecurityConfig) -> Result<Self, AuthError> {
        let secret = &security.jwt_secret;

        if secret.is_empty() {
            return Err(AuthError::InvalidSecret);
        }

        if !BCRYPT_COST_RANGE.contains(&security.bcrypt_cost) {
            return Err(AuthError::InvalidConfig(format!(
                "bcrypt cost {} is outside {}..={}",
                security.bcrypt_cost,
                BCRYPT_COST_RANGE.start(),
                BCRYPT_COST_RANGE.end()
            )));
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            token_lifetime: token_lifetime(security.jwt_expiry_hours)?,
            bcrypt_cost: security.bcrypt_cost,
        })
    }

    /// Salted bcrypt hash, computed on the blocking pool.
    pub async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;

        let hashed = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hashed)
    }

    /// `Ok(false)` means the password does not match; `Err` means the hash
    /// could not be checked at all.
    pub async fn verify_password(&self, password: &str, hashed: &str) -> Result<bool, AuthError> {
        let password = password.to_owned();
        let hashed = hashed.to_owned();

        let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hashed)).await??;
        Ok(matches)
    }

    pub fn issue_token(&self, user_id: Uuid, email: &str) -> Result<String, AuthError> {
        let claims = Claims::new(user_id, email, self.token_lifetime);
        self.encode(&claims)
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let validation = Validation::default();

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn encode(&self, claims: &Claims) -> Result<String, AuthError> {
        encode(&Header::default(), claims, &self.encoding_key).map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }
}

/// Expiry must be positive and leave `now + lifetime` representable.
fn token_lifetime(hours: u64) -> Result<Duration, AuthError> {
    let invalid = || AuthError::InvalidConfig(format!("JWT expiry of {} hours is not usable", hours));

    if hours == 0 {
        return Err(invalid());
    }

    let lifetime = i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .ok_or_else(invalid)?;

    Utc::now().checked_add_signed(lifetime).ok_or_else(invalid)?;
    Ok(lifetime)
}
