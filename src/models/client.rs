use chrono::{DateTime, Utc};

use crate::error::AppError;
use super::non_blank;

pub type ClientId = i32;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub address: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// Fields entered on the client form, before the store assigns an id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewClient {
    pub name: String,
    pub address: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl NewClient {
    pub fn from_form(name: &str, address: &str, email: &str, phone: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            address: address.trim().to_string(),
            email: non_blank(email),
            phone: non_blank(phone),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Client name is required"));
        }
        if self.address.trim().is_empty() {
            return Err(AppError::validation("Client address is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_fields_become_none() {
        let client = NewClient::from_form(" Acme ", "1 Main St", "  ", "");
        assert_eq!(client.name, "Acme");
        assert_eq!(client.email, None);
        assert_eq!(client.phone, None);
        assert!(client.validate().is_ok());
    }

    #[test]
    fn name_and_address_are_required() {
        let missing_name = NewClient::from_form("", "1 Main St", "", "");
        let missing_address = NewClient::from_form("Acme", "   ", "", "");

        assert!(matches!(missing_name.validate(), Err(AppError::Validation(_))));
        assert!(matches!(missing_address.validate(), Err(AppError::Validation(_))));
    }
}
