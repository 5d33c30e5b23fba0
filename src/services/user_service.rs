use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::Credentials;
use crate::database::{DatabaseError, User, UserRepository};

use super::validation::{normalize_email, Validator, MIN_PASSWORD_LENGTH};
use super::ServiceError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Signup {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Login {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Returned by signup and login
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user_id: Uuid,
    pub email: String,
    pub token: String,
}

const INVALID_CREDENTIALS: &str = "Invalid credentials, could not log you in.";

pub struct UserService {
    users: Arc<dyn UserRepository>,
    credentials: Arc<Credentials>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>, credentials: Arc<Credentials>) -> Self {
        Self { users, credentials }
    }

    pub async fn list_all(&self) -> Result<Vec<User>, ServiceError> {
        self.users
            .list()
            .await
            .map_err(ServiceError::infra("Fetching users failed, please try again later."))
    }

    pub async fn signup(&self, input: Signup, image: Option<String>) -> Result<AuthSession, ServiceError> {
        Validator::new()
            .not_empty("name", &input.name)
            .email("email", &input.email)
            .min_length("password", &input.password, MIN_PASSWORD_LENGTH)
            .present("image", image.as_ref())
            .finish()?;

        let email = normalize_email(&input.email);

        let existing = self
            .users
            .find_by_email(&email)
            .await
            .map_err(ServiceError::infra("Signing up failed, please try again later."))?;

        if existing.is_some() {
            return Err(ServiceError::Conflict("User exists already, please login instead.".into()));
        }

        let hashed = self
            .credentials
            .hash_password(&input.password)
            .await
            .map_err(ServiceError::infra("Could not create user, please try again."))?;

        let user = User::new(input.name.trim().to_string(), email, hashed, image.unwrap_or_default());

        self.users.insert(&user).await.map_err(|e| match e {
            // Lost a race with a concurrent signup for the same email
            DatabaseError::Conflict(_) => ServiceError::Conflict("User exists already, please login instead.".into()),
            other => ServiceError::infra("Signing up failed, please try again later.")(other),
        })?;

        let token = self
            .credentials
            .issue_token(user.id, &user.email)
            .map_err(ServiceError::infra("Signing up failed, please try again later."))?;

        tracing::info!("Registered user {}", user.id);
        Ok(AuthSession {
            user_id: user.id,
            email: user.email,
            token,
        })
    }

    pub async fn login(&self, input: Login) -> Result<AuthSession, ServiceError> {
        let email = normalize_email(&input.email);

        let user = self
            .users
            .find_by_email(&email)
            .await
            .map_err(ServiceError::infra("Logging in failed, please try again later."))?
            .ok_or_else(|| ServiceError::Authentication(INVALID_CREDENTIALS.into()))?;

        let valid = self
            .credentials
            .verify_password(&input.password, &user.password)
            .await
            .map_err(ServiceError::infra(
                "Could not log you in, please check your credentials and try again.",
            ))?;

        if !valid {
            return Err(ServiceError::InvalidCredentials(INVALID_CREDENTIALS.into()));
        }

        let token = self
            .credentials
            .issue_token(user.id, &user.email)
            .map_err(ServiceError::infra("Logging in failed, please try again later."))?;

        Ok(AuthSession {
            user_id: user.id,
            email: user.email,
            token,
        })
    }

    pub async fn ping(&self) -> Result<(), DatabaseError> {
        self.users.ping().await
    }
}
