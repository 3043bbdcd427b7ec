//! Owner-scoped CRUD over the client and service collections.
//!
//! Both registries share one contract: the in-memory list is only ever
//! replaced by a fresh `list()` from the store, never patched locally. A
//! failed store call leaves the last-known list in place.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::db::DocumentStore;
use crate::error::{AppError, StoreError};
use crate::models::{Client, NewClient, NewService, Service};
use crate::session::Session;

/// An entity kept in one of the store's collections.
#[async_trait]
pub trait Record: Clone + Send + Sync + Sized {
    /// Form fields accepted by `add`.
    type Fields: Send + Sync;

    /// Singular name used in messages, e.g. "client".
    const NOUN: &'static str;

    fn id(&self) -> i32;

    fn validate(fields: &Self::Fields) -> Result<(), AppError>;

    async fn fetch_all(store: &dyn DocumentStore, owner_id: &str) -> Result<Vec<Self>, StoreError>;

    async fn insert(
        store: &dyn DocumentStore,
        fields: &Self::Fields,
        owner_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i32, StoreError>;

    async fn remove(store: &dyn DocumentStore, id: i32, owner_id: &str) -> Result<(), StoreError>;
}

#[async_trait]
impl Record for Client {
    type Fields = NewClient;
    const NOUN: &'static str = "client";

    fn id(&self) -> i32 {
        self.id
    }

    fn validate(fields: &NewClient) -> Result<(), AppError> {
        fields.validate()
    }

    async fn fetch_all(store: &dyn DocumentStore, owner_id: &str) -> Result<Vec<Self>, StoreError> {
        store.list_clients(owner_id).await
    }

    async fn insert(
        store: &dyn DocumentStore,
        fields: &NewClient,
        owner_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i32, StoreError> {
        store.add_client(fields, owner_id, created_at).await
    }

    async fn remove(store: &dyn DocumentStore, id: i32, owner_id: &str) -> Result<(), StoreError> {
        store.delete_client(id, owner_id).await
    }
}

#[async_trait]
impl Record for Service {
    type Fields = NewService;
    const NOUN: &'static str = "service";

    fn id(&self) -> i32 {
        self.id
    }

    fn validate(fields: &NewService) -> Result<(), AppError> {
        fields.validate()
    }

    async fn fetch_all(store: &dyn DocumentStore, owner_id: &str) -> Result<Vec<Self>, StoreError> {
        store.list_services(owner_id).await
    }

    async fn insert(
        store: &dyn DocumentStore,
        fields: &NewService,
        owner_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<i32, StoreError> {
        store.add_service(fields, owner_id, created_at).await
    }

    async fn remove(store: &dyn DocumentStore, id: i32, owner_id: &str) -> Result<(), StoreError> {
        store.delete_service(id, owner_id).await
    }
}

/// Answer to the "are you sure?" prompt shown before a delete.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Confirmation {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
}

pub struct Registry<R: Record> {
    items: Vec<R>,
}

impl<R: Record> Default for Registry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Record> Registry<R> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Last list the store returned.
    pub fn items(&self) -> &[R] {
        &self.items
    }

    pub fn get(&self, id: i32) -> Option<&R> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Reloads every record the signed-in user owns.
    pub async fn list(&mut self, store: &dyn DocumentStore, session: &Session) -> Result<&[R], AppError> {
        let owner_id = session.owner_id()?;
        match R::fetch_all(store, owner_id).await {
            Ok(items) => {
                tracing::debug!(count = items.len(), "loaded {}s", R::NOUN);
                self.items = items;
                Ok(&self.items)
            }
            Err(err) => {
                tracing::error!(error = %err, "error loading {}s", R::NOUN);
                Err(err.into())
            }
        }
    }

    /// Validates and stores a new record, then refreshes the list.
    pub async fn add(
        &mut self,
        store: &dyn DocumentStore,
        session: &Session,
        fields: R::Fields,
    ) -> Result<i32, AppError> {
        let owner_id = session.owner_id()?;
        R::validate(&fields)?;

        let id = R::insert(store, &fields, owner_id, Utc::now())
            .await
            .map_err(|err| {
                tracing::error!(error = %err, "error adding {}", R::NOUN);
                AppError::from(err)
            })?;
        tracing::info!(id, "added {}", R::NOUN);

        self.refresh_after_write(store, session).await;
        Ok(id)
    }

    /// Deletes a record once the user has confirmed, then refreshes the list.
    pub async fn delete(
        &mut self,
        store: &dyn DocumentStore,
        session: &Session,
        id: i32,
        confirmation: Confirmation,
    ) -> Result<DeleteOutcome, AppError> {
        let owner_id = session.owner_id()?;
        if confirmation == Confirmation::No {
            return Ok(DeleteOutcome::Cancelled);
        }

        R::remove(store, id, owner_id).await.map_err(|err| {
            tracing::error!(error = %err, id, "error deleting {}", R::NOUN);
            AppError::from(err)
        })?;
        tracing::info!(id, "deleted {}", R::NOUN);

        self.refresh_after_write(store, session).await;
        Ok(DeleteOutcome::Deleted)
    }

    // The write already happened; a failed reload keeps the last-known list.
    async fn refresh_after_write(&mut self, store: &dyn DocumentStore, session: &Session) {
        if let Err(err) = self.list(store, session).await {
            tracing::warn!(error = %err, "{} list may be stale", R::NOUN);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;

    fn session() -> Session {
        Session::new(Some("owner-1".to_string()))
    }

    fn acme() -> NewClient {
        NewClient::from_form("Acme", "1 Main St", "billing@acme.test", "")
    }

    #[tokio::test]
    async fn list_is_empty_when_nothing_is_stored() {
        let store = MemoryStore::new();
        let mut services = Registry::<Service>::new();

        let listed = services.list(&store, &session()).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn add_stamps_owner_and_refreshes() {
        let store = MemoryStore::new();
        let mut clients = Registry::<Client>::new();

        let id = clients.add(&store, &session(), acme()).await.unwrap();

        let stored = clients.get(id).expect("new client should be listed");
        assert_eq!(stored.owner_id, "owner-1");
        assert_eq!(stored.email.as_deref(), Some("billing@acme.test"));
        assert_eq!(clients.items().len(), 1);
    }

    #[tokio::test]
    async fn records_are_scoped_to_their_owner() {
        let store = MemoryStore::new();
        let mut clients = Registry::<Client>::new();
        clients.add(&store, &session(), acme()).await.unwrap();

        let other = Session::new(Some("owner-2".to_string()));
        let listed = clients.list(&store, &other).await.unwrap();
        assert!(listed.is_empty());
    }

    #[tokio::test]
    async fn delete_cannot_reach_another_owners_records() {
        let store = MemoryStore::new();
        let mut owner_clients = Registry::<Client>::new();
        let id = owner_clients.add(&store, &session(), acme()).await.unwrap();

        let other = Session::new(Some("owner-2".to_string()));
        let mut other_clients = Registry::<Client>::new();
        other_clients.delete(&store, &other, id, Confirmation::Yes).await.unwrap();

        let listed = owner_clients.list(&store, &session()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, id);
    }

    #[tokio::test]
    async fn service_delete_is_scoped_to_the_owner() {
        let store = MemoryStore::new();
        let mut services = Registry::<Service>::new();
        let id = services
            .add(&store, &session(), NewService::from_form("Design", "", "60").unwrap())
            .await
            .unwrap();

        let other = Session::new(Some("owner-2".to_string()));
        Registry::<Service>::new()
            .delete(&store, &other, id, Confirmation::Yes)
            .await
            .unwrap();

        assert_eq!(services.list(&store, &session()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn invalid_fields_never_reach_the_store() {
        let store = MemoryStore::new();
        let mut clients = Registry::<Client>::new();

        let result = clients
            .add(&store, &session(), NewClient::from_form("", "1 Main St", "", ""))
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn unauthenticated_session_is_refused() {
        let store = MemoryStore::new();
        let mut clients = Registry::<Client>::new();
        let anonymous = Session::anonymous();

        assert!(matches!(clients.list(&store, &anonymous).await, Err(AppError::Unauthenticated)));
        assert!(matches!(clients.add(&store, &anonymous, acme()).await, Err(AppError::Unauthenticated)));
        assert!(matches!(
            clients.delete(&store, &anonymous, 1, Confirmation::Yes).await,
            Err(AppError::Unauthenticated)
        ));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn failed_add_keeps_the_previous_list() {
        let store = MemoryStore::new();
        let mut clients = Registry::<Client>::new();
        clients.add(&store, &session(), acme()).await.unwrap();
        let before = clients.items().to_vec();

        store.set_failing(true);
        let result = clients
            .add(&store, &session(), NewClient::from_form("Globex", "2 Side St", "", ""))
            .await;

        assert!(matches!(result, Err(AppError::Persistence(_))));
        assert_eq!(clients.items(), before.as_slice());
    }

    #[tokio::test]
    async fn declined_delete_does_not_touch_the_store() {
        let store = MemoryStore::new();
        let mut clients = Registry::<Client>::new();
        let id = clients.add(&store, &session(), acme()).await.unwrap();
        let calls = store.calls();

        let outcome = clients.delete(&store, &session(), id, Confirmation::No).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Cancelled);
        assert_eq!(store.calls(), calls);
        assert!(clients.get(id).is_some());
    }

    #[tokio::test]
    async fn deleting_a_missing_client_reflects_the_store() {
        let store = MemoryStore::new();
        let mut clients = Registry::<Client>::new();
        let kept = clients.add(&store, &session(), acme()).await.unwrap();
        let gone = clients
            .add(&store, &session(), NewClient::from_form("Globex", "2 Side St", "", ""))
            .await
            .unwrap();

        clients.delete(&store, &session(), gone, Confirmation::Yes).await.unwrap();
        let outcome = clients.delete(&store, &session(), gone, Confirmation::Yes).await.unwrap();

        assert_eq!(outcome, DeleteOutcome::Deleted);
        let ids: Vec<i32> = clients.items().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![kept]);
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_previous_list() {
        let store = MemoryStore::new();
        let mut services = Registry::<Service>::new();
        let id = services
            .add(&store, &session(), NewService::from_form("Consulting", "", "75").unwrap())
            .await
            .unwrap();

        store.set_failing(true);
        let result = services.delete(&store, &session(), id, Confirmation::Yes).await;

        assert!(matches!(result, Err(AppError::Persistence(_))));
        assert_eq!(services.items().len(), 1);

        store.set_failing(false);
        let listed = services.list(&store, &session()).await.unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn failed_list_keeps_last_known_items() {
        let store = MemoryStore::new();
        let mut services = Registry::<Service>::new();
        services
            .add(&store, &session(), NewService::from_form("Design", "", "60").unwrap())
            .await
            .unwrap();

        store.set_failing(true);
        assert!(services.list(&store, &session()).await.is_err());
        assert_eq!(services.items()[0].name, "Design");
    }
}
