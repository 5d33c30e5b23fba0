use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::place::PlaceRow;
use crate::database::models::{Place, User};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    async fn list(&self) -> Result<Vec<User>, DatabaseError>;

    /// Fails with `DatabaseError::Conflict` when the email is taken
    async fn insert(&self, user: &User) -> Result<(), DatabaseError>;

    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// Places plus the two writes that also touch the creator's `places` list.
/// Those run as a single transaction: both sides commit or neither does.
#[async_trait]
pub trait PlaceRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Place>, DatabaseError>;

    async fn find_by_creator(&self, creator: Uuid) -> Result<Vec<Place>, DatabaseError>;

    /// Persists title and description only
    async fn update_details(&self, place: &Place) -> Result<(), DatabaseError>;

    /// Inserts the place and appends its id to the creator's `places`
    async fn insert_owned(&self, place: &Place) -> Result<(), DatabaseError>;

    /// Deletes the place and pulls its id from the creator's `places`
    async fn delete_owned(&self, place: &Place) -> Result<(), DatabaseError>;
}

const USER_COLUMNS: &str = "id, name, email, password, image, place_ids, created_at";
const PLACE_COLUMNS: &str = "id, title, description, image, address, lat, lng, creator, created_at";

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql).bind(email).fetch_optional(&self.pool).await?;
        Ok(user)
    }

    async fn list(&self) -> Result<Vec<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users ORDER BY created_at", USER_COLUMNS);
        let users = sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?;
        Ok(users)
    }

    async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, name, email, password, image, place_ids, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password)
        .bind(&user.image)
        .bind(&user.places)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        crate::database::DatabaseManager::health_check(&self.pool).await
    }
}

pub struct PgPlaceRepository {
    pool: PgPool,
}

impl PgPlaceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PlaceRepository for PgPlaceRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Place>, DatabaseError> {
        let sql = format!("SELECT {} FROM places WHERE id = $1", PLACE_COLUMNS);
        let row = sqlx::query_as::<_, PlaceRow>(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(Place::from))
    }

    async fn find_by_creator(&self, creator: Uuid) -> Result<Vec<Place>, DatabaseError> {
        let sql = format!("SELECT {} FROM places WHERE creator = $1 ORDER BY created_at", PLACE_COLUMNS);
        let rows = sqlx::query_as::<_, PlaceRow>(&sql).bind(creator).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Place::from).collect())
    }

    async fn update_details(&self, place: &Place) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE places SET title = $1, description = $2 WHERE id = $3")
            .bind(&place.title)
            .bind(&place.description)
            .bind(place.id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("place {}", place.id)));
        }
        Ok(())
    }

    async fn insert_owned(&self, place: &Place) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO places (id, title, description, image, address, lat, lng, creator, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(place.id)
        .bind(&place.title)
        .bind(&place.description)
        .bind(&place.image)
        .bind(&place.address)
        .bind(place.location.lat)
        .bind(place.location.lng)
        .bind(place.creator)
        .bind(place.created_at)
        .execute(&mut *tx)
        .await?;

        let owner = sqlx::query("UPDATE users SET place_ids = array_append(place_ids, $1) WHERE id = $2")
            .bind(place.id)
            .bind(place.creator)
            .execute(&mut *tx)
            .await?;

        // Dropping the uncommitted transaction rolls the insert back
        if owner.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", place.creator)));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn delete_owned(&self, place: &Place) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(place.id)
            .execute(&mut *tx)
            .await?;

        if deleted.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("place {}", place.id)));
        }

        let owner = sqlx::query("UPDATE users SET place_ids = array_remove(place_ids, $1) WHERE id = $2")
            .bind(place.id)
            .bind(place.creator)
            .execute(&mut *tx)
            .await?;

        if owner.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!("user {}", place.creator)));
        }

        tx.commit().await?;
        Ok(())
    }
}
