mod client;
mod service;
mod line_item;

pub use client::{Client, ClientId, NewClient};
pub use service::{NewService, Service, ServiceId};
pub use line_item::LineItem;

/// Turns a blank form value into `None`.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
