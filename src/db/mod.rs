use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::Config;
use crate::error::StoreError;
use crate::models::{Client, ClientId, NewClient, NewService, Service, ServiceId};

#[cfg(test)]
pub mod memory;

/// Owner-scoped document store holding the `clients` and `services` collections.
///
/// Every read and delete is filtered by `owner_id`. Deleting an id that is
/// already gone, or that belongs to another owner, is a no-op.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn list_clients(&self, owner_id: &str) -> Result<Vec<Client>, StoreError>;

    async fn add_client(
        &self,
        fields: &NewClient,
        owner_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ClientId, StoreError>;

    async fn delete_client(&self, id: ClientId, owner_id: &str) -> Result<(), StoreError>;

    async fn list_services(&self, owner_id: &str) -> Result<Vec<Service>, StoreError>;

    async fn add_service(
        &self,
        fields: &NewService,
        owner_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ServiceId, StoreError>;

    async fn delete_service(&self, id: ServiceId, owner_id: &str) -> Result<(), StoreError>;
}

/// Database connection pool
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new Database instance with a connection pool
    pub async fn new(config: &Config) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(config.database_url())
            .await?;

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DocumentStore for Database {
    // Client operations
    async fn list_clients(&self, owner_id: &str) -> Result<Vec<Client>, StoreError> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT id, name, address, email, phone, owner_id, created_at
            FROM clients
            WHERE owner_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(clients)
    }

    async fn add_client(
        &self,
        fields: &NewClient,
        owner_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ClientId, StoreError> {
        let id = sqlx::query_scalar::<_, ClientId>(
            r#"
            INSERT INTO clients (name, address, email, phone, owner_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.address)
        .bind(&fields.email)
        .bind(&fields.phone)
        .bind(owner_id)
        .bind(created_at)
        .fetch_one(self.get_pool())
        .await?;

        tracing::debug!(client_id = id, owner_id, "client stored");
        Ok(id)
    }

    async fn delete_client(&self, id: ClientId, owner_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(self.get_pool())
            .await?;

        tracing::debug!(client_id = id, rows = result.rows_affected(), "client deleted");
        Ok(())
    }

    // Service operations
    async fn list_services(&self, owner_id: &str) -> Result<Vec<Service>, StoreError> {
        let services = sqlx::query_as::<_, Service>(
            r#"
            SELECT id, name, description, default_rate, owner_id, created_at
            FROM services
            WHERE owner_id = $1
            ORDER BY id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(self.get_pool())
        .await?;

        Ok(services)
    }

    async fn add_service(
        &self,
        fields: &NewService,
        owner_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ServiceId, StoreError> {
        let id = sqlx::query_scalar::<_, ServiceId>(
            r#"
            INSERT INTO services (name, description, default_rate, owner_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.default_rate)
        .bind(owner_id)
        .bind(created_at)
        .fetch_one(self.get_pool())
        .await?;

        tracing::debug!(service_id = id, owner_id, "service stored");
        Ok(id)
    }

    async fn delete_service(&self, id: ServiceId, owner_id: &str) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM services WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(self.get_pool())
            .await?;

        tracing::debug!(service_id = id, rows = result.rows_affected(), "service deleted");
        Ok(())
    }
}

/// Initialize the database connection pool and bring the schema up to date
pub async fn init(config: &Config) -> Result<Database> {
    let db = Database::new(config).await?;

    sqlx::migrate!().run(db.get_pool()).await?;

    Ok(db)
}
