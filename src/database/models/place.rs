use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::geocoding::Coordinates;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
    pub address: String,
    pub location: Coordinates,
    /// Owning user; mirrored in that user's `places`
    pub creator: Uuid,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

impl Place {
    pub fn new(
        title: String,
        description: String,
        image: String,
        address: String,
        location: Coordinates,
        creator: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description,
            image,
            address,
            location,
            creator,
            created_at: Utc::now(),
        }
    }
}

/// Flat row shape of the `places` table
#[derive(Debug, FromRow)]
pub(crate) struct PlaceRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image: String,
    pub address: String,
    pub lat: f64,
    pub lng: f64,
    pub creator: Uuid,
    pub created_at: DateTime<Utc>,
}

impl From<PlaceRow> for Place {
    fn from(row: PlaceRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            image: row.image,
            address: row.address,
            location: Coordinates { lat: row.lat, lng: row.lng },
            creator: row.creator,
            created_at: row.created_at,
        }
    }
}
