use crate::error::{AppError, LineItemError};
use crate::models::{LineItem, Service, ServiceId};

/// A single-field change to one line item.
#[derive(Debug, Clone, PartialEq)]
pub enum LineItemUpdate {
    /// Select a service from the catalog, or `None` for "no service".
    Service(Option<ServiceId>),
    ServiceName(String),
    Hours(f64),
    Rate(f64),
}

/// Ordered list of billable items on an invoice draft.
///
/// Indexes are positional; the editor assumes one writer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemEditor {
    items: Vec<LineItem>,
}

impl LineItemEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn add_blank_item(&mut self) {
        self.items.push(LineItem::blank());
    }

    /// Applies `update` to the item at `index`.
    ///
    /// Selecting a service copies its name and default rate into the item
    /// and leaves the hours alone. An id missing from `catalog` is reported
    /// and the item stays as it was.
    pub fn update_item(
        &mut self,
        index: usize,
        update: LineItemUpdate,
        catalog: &[Service],
    ) -> Result<(), LineItemError> {
        let len = self.items.len();
        let item = self
            .items
            .get_mut(index)
            .ok_or(LineItemError::IndexOutOfRange { index, len })?;

        match update {
            LineItemUpdate::Service(Some(id)) => {
                let Some(service) = catalog.iter().find(|s| s.id == id) else {
                    tracing::warn!(service_id = id, index, "selected service is not in the loaded catalog");
                    return Err(LineItemError::ServiceNotFound(id));
                };
                item.snapshot(service);
            }
            LineItemUpdate::Service(None) => item.service_ref = None,
            LineItemUpdate::ServiceName(name) => item.service_name = name,
            LineItemUpdate::Hours(hours) => item.hours = hours,
            LineItemUpdate::Rate(rate) => item.rate = rate,
        }

        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> Result<LineItem, LineItemError> {
        if index >= self.items.len() {
            return Err(LineItemError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Sum of `hours * rate` over every item, unrounded.
    pub fn total(&self) -> f64 {
        self.items.iter().map(LineItem::amount).sum()
    }
}

/// Parses hours or rate text typed into a numeric field.
pub fn parse_non_negative(field: &str, text: &str) -> Result<f64, AppError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    let value = trimmed
        .parse::<f64>()
        .map_err(|_| AppError::validation(format!("{} must be a number", field)))?;

    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!("{} must be zero or more", field)));
    }

    Ok(value)
}

/// An entry of the service selector shown on each line item.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOption {
    pub service_ref: Option<ServiceId>,
    pub label: String,
}

pub const NO_SERVICE_LABEL: &str = "Select a service...";

/// Selector entries: "none selected" first, then one per service.
pub fn service_options(catalog: &[Service]) -> Vec<ServiceOption> {
    let mut options = Vec::with_capacity(catalog.len() + 1);
    options.push(ServiceOption {
        service_ref: None,
        label: NO_SERVICE_LABEL.to_string(),
    });
    options.extend(catalog.iter().map(|service| ServiceOption {
        service_ref: Some(service.id),
        label: format!("{} (${}/hr)", service.name, service.default_rate),
    }));
    options
}
