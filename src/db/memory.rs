//! In-memory store used by the tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::DocumentStore;
use crate::error::StoreError;
use crate::models::{Client, ClientId, NewClient, NewService, Service, ServiceId};

#[derive(Default)]
pub struct MemoryStore {
    clients: Mutex<Vec<Client>>,
    services: Mutex<Vec<Service>>,
    next_id: Mutex<i32>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following call fail until switched back.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of store calls made so far, failed ones included.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn begin(&self) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Other("store unavailable".to_string()));
        }
        Ok(())
    }

    fn allocate_id(&self) -> i32 {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        *next
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn list_clients(&self, owner_id: &str) -> Result<Vec<Client>, StoreError> {
        self.begin()?;
        let clients = self.clients.lock().unwrap();
        Ok(clients.iter().filter(|c| c.owner_id == owner_id).cloned().collect())
    }

    async fn add_client(
        &self,
        fields: &NewClient,
        owner_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ClientId, StoreError> {
        self.begin()?;
        let id = self.allocate_id();
        self.clients.lock().unwrap().push(Client {
            id,
            name: fields.name.clone(),
            address: fields.address.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            owner_id: owner_id.to_string(),
            created_at,
        });
        Ok(id)
    }

    async fn delete_client(&self, id: ClientId, owner_id: &str) -> Result<(), StoreError> {
        self.begin()?;
        self.clients
            .lock()
            .unwrap()
            .retain(|c| c.id != id || c.owner_id != owner_id);
        Ok(())
    }

    async fn list_services(&self, owner_id: &str) -> Result<Vec<Service>, StoreError> {
        self.begin()?;
        let services = self.services.lock().unwrap();
        Ok(services.iter().filter(|s| s.owner_id == owner_id).cloned().collect())
    }

    async fn add_service(
        &self,
        fields: &NewService,
        owner_id: &str,
        created_at: DateTime<Utc>,
    ) -> Result<ServiceId, StoreError> {
        self.begin()?;
        let id = self.allocate_id();
        self.services.lock().unwrap().push(Service {
            id,
            name: fields.name.clone(),
            description: fields.description.clone(),
            default_rate: fields.default_rate,
            owner_id: owner_id.to_string(),
            created_at,
        });
        Ok(id)
    }

    async fn delete_service(&self, id: ServiceId, owner_id: &str) -> Result<(), StoreError> {
        self.begin()?;
        self.services
            .lock()
            .unwrap()
            .retain(|s| s.id != id || s.owner_id != owner_id);
        Ok(())
    }
}
