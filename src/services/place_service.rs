use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use crate::database::{DatabaseError, Place, PlaceRepository, UserRepository};
use crate::geocoding::{GeocodeError, Geocoder};
use crate::storage::ImageStore;

use super::validation::Validator;
use super::ServiceError;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewPlace {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceUpdate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

pub struct PlaceService {
    places: Arc<dyn PlaceRepository>,
    users: Arc<dyn UserRepository>,
    geocoder: Arc<dyn Geocoder>,
    images: Arc<ImageStore>,
}

impl PlaceService {
    pub fn new(
        places: Arc<dyn PlaceRepository>,
        users: Arc<dyn UserRepository>,
        geocoder: Arc<dyn Geocoder>,
        images: Arc<ImageStore>,
    ) -> Self {
        Self {
            places,
            users,
            geocoder,
            images,
        }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Place, ServiceError> {
        self.places
            .find_by_id(id)
            .await
            .map_err(ServiceError::infra("Something went wrong, could not find a place."))?
            .ok_or_else(|| ServiceError::NotFound("Could not find a place for the provided id.".into()))
    }

    /// An empty result is reported as not found.
    pub async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Place>, ServiceError> {
        let places = self
            .places
            .find_by_creator(user_id)
            .await
            .map_err(ServiceError::infra("Fetching places failed, please try again later."))?;

        if places.is_empty() {
            return Err(ServiceError::NotFound("Could not find a place for the provided user.".into()));
        }

        Ok(places)
    }

    pub async fn create(&self, input: NewPlace, image: Option<String>, creator: Uuid) -> Result<Place, ServiceError> {
        Validator::new()
            .not_empty("title", &input.title)
            .not_empty("description", &input.description)
            .not_empty("address", &input.address)
            .present("image", image.as_ref())
            .finish()?;

        let location = self.geocoder.resolve(input.address.trim()).await.map_err(|e| match e {
            GeocodeError::NotFound => {
                let message = GeocodeError::NotFound.to_string();
                let mut field_errors = HashMap::new();
                field_errors.insert("address".to_string(), message.clone());
                ServiceError::validation(message, field_errors)
            }
            other => ServiceError::infra("Could not resolve the address, please try again.")(other),
        })?;

        let user = self
            .users
            .find_by_id(creator)
            .await
            .map_err(ServiceError::infra("Finding user failed, please try again."))?
            .ok_or_else(|| ServiceError::NotFound("Could not find user for provided id.".into()))?;

        let place = Place::new(
            input.title.trim().to_string(),
            input.description.trim().to_string(),
            image.unwrap_or_default(),
            input.address.trim().to_string(),
            location,
            user.id,
        );

        self.places.insert_owned(&place).await.map_err(|e| match e {
            // The creator vanished between the lookup and the transaction
            DatabaseError::NotFound(_) => ServiceError::NotFound("Could not find user for provided id.".into()),
            other => ServiceError::infra("Creating place failed, please try again.")(other),
        })?;

        tracing::info!("User {} created place {}", place.creator, place.id);
        Ok(place)
    }

    pub async fn update(&self, id: Uuid, input: PlaceUpdate, requester: Uuid) -> Result<Place, ServiceError> {
        Validator::new()
            .not_empty("title", &input.title)
            .not_empty("description", &input.description)
            .finish()?;

        let mut place = self
            .places
            .find_by_id(id)
            .await
            .map_err(ServiceError::infra("Something went wrong, could not update place."))?
            .ok_or_else(|| ServiceError::NotFound("Could not find a place for the provided id.".into()))?;

        if place.creator != requester {
            return Err(ServiceError::Authorization("You are not allowed to edit this place.".into()));
        }

        place.title = input.title.trim().to_string();
        place.description = input.description.trim().to_string();

        self.places.update_details(&place).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => ServiceError::NotFound("Could not find a place for the provided id.".into()),
            other => ServiceError::infra("Something went wrong, could not update place.")(other),
        })?;

        Ok(place)
    }

    pub async fn delete(&self, id: Uuid, requester: Uuid) -> Result<(), ServiceError> {
        let place = self
            .places
            .find_by_id(id)
            .await
            .map_err(ServiceError::infra("Something went wrong, could not delete place."))?
            .ok_or_else(|| ServiceError::NotFound("Could not find place for this id.".into()))?;

        let owner = self
            .users
            .find_by_id(place.creator)
            .await
            .map_err(ServiceError::infra("Something went wrong, could not delete place."))?
            .ok_or_else(|| ServiceError::NotFound("Could not find the creator of this place.".into()))?;

        if owner.id != requester {
            return Err(ServiceError::Authorization("You are not allowed to delete this place.".into()));
        }

        self.places.delete_owned(&place).await.map_err(|e| match e {
            DatabaseError::NotFound(_) => ServiceError::NotFound("Could not find place for this id.".into()),
            other => ServiceError::infra("Something went wrong, could not delete place.")(other),
        })?;

        self.images.remove(&place.image).await;

        tracing::info!("User {} deleted place {}", requester, place.id);
        Ok(())
    }
}
