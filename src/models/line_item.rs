use super::{Service, ServiceId};

/// One billable row of an invoice draft. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItem {
    pub service_ref: Option<ServiceId>,
    pub service_name: String,
    pub hours: f64,
    pub rate: f64,
}

impl LineItem {
    pub fn blank() -> Self {
        Self::default()
    }

    /// Copies the service's name and default rate into this item.
    /// Later changes to the service do not reach the copy.
    pub fn snapshot(&mut self, service: &Service) {
        self.service_ref = Some(service.id);
        self.service_name = service.name.clone();
        self.rate = service.default_rate;
    }

    pub fn amount(&self) -> f64 {
        self.hours * self.rate
    }
}
