use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// bcrypt hash; never leaves the server
    #[serde(skip_serializing)]
    pub password: String,
    pub image: String,
    /// Owned place ids, in creation order
    #[sqlx(rename = "place_ids")]
    pub places: Vec<Uuid>,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(name: String, email: String, password: String, image: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password,
            image,
            places: Vec::new(),
            created_at: Utc::now(),
        }
    }
}
