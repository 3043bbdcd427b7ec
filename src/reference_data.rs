use crate::db::DocumentStore;
use crate::error::AppError;
use crate::models::{Client, ClientId, Service, ServiceId};
use crate::session::Session;

/// Clients and services of the signed-in user, as the store returned them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceData {
    pub clients: Vec<Client>,
    pub services: Vec<Service>,
}

impl ReferenceData {
    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    pub fn service(&self, id: ServiceId) -> Option<&Service> {
        self.services.iter().find(|s| s.id == id)
    }
}

/// Fetches both collections for the session's user.
///
/// Nothing is cached: call it again whenever the identity changes.
pub async fn load_reference_data(
    store: &dyn DocumentStore,
    session: &Session,
) -> Result<ReferenceData, AppError> {
    let owner_id = session.owner_id()?;

    let (clients, services) = tokio::try_join!(
        store.list_clients(owner_id),
        store.list_services(owner_id),
    )
    .map_err(|err| {
        tracing::error!(error = %err, "error loading clients and services");
        AppError::from(err)
    })?;

    tracing::debug!(
        clients = clients.len(),
        services = services.len(),
        owner_id,
        "reference data loaded"
    );
    Ok(ReferenceData { clients, services })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::{NewClient, NewService};
    use chrono::Utc;

    #[tokio::test]
    async fn requires_an_identity() {
        let store = MemoryStore::new();
        let result = load_reference_data(&store, &Session::anonymous()).await;

        assert!(matches!(result, Err(AppError::Unauthenticated)));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn loads_both_collections_in_store_order() {
        let store = MemoryStore::new();
        let now = Utc::now();
        store
            .add_client(&NewClient::from_form("Acme", "1 Main St", "", ""), "u-1", now)
            .await
            .unwrap();
        store
            .add_service(&NewService::from_form("Design", "", "60").unwrap(), "u-1", now)
            .await
            .unwrap();
        store
            .add_service(&NewService::from_form("Consulting", "", "75").unwrap(), "u-1", now)
            .await
            .unwrap();
        store
            .add_service(&NewService::from_form("Audit", "", "90").unwrap(), "u-2", now)
            .await
            .unwrap();

        let data = load_reference_data(&store, &Session::new(Some("u-1".to_string())))
            .await
            .unwrap();

        assert_eq!(data.clients.len(), 1);
        let names: Vec<&str> = data.services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Design", "Consulting"]);
    }

    #[tokio::test]
    async fn reloading_after_an_identity_change_sees_the_new_owner() {
        let store = MemoryStore::new();
        store
            .add_client(&NewClient::from_form("Acme", "1 Main St", "", ""), "u-2", Utc::now())
            .await
            .unwrap();
        let mut session = Session::new(Some("u-1".to_string()));

        let first = load_reference_data(&store, &session).await.unwrap();
        assert!(first.clients.is_empty());

        assert!(session.switch_user(Some("u-2".to_string())));
        let second = load_reference_data(&store, &session).await.unwrap();
        assert_eq!(second.clients[0].name, "Acme");
    }

    #[tokio::test]
    async fn store_failure_is_a_persistence_error() {
        let store = MemoryStore::new();
        store.set_failing(true);

        let result = load_reference_data(&store, &Session::new(Some("u-1".to_string()))).await;
        assert!(matches!(result, Err(AppError::Persistence(_))));
    }
}
