use chrono::{DateTime, Utc};

use crate::error::AppError;
use super::non_blank;

pub type ServiceId = i32;

#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct Service {
    pub id: ServiceId,
    pub name: String,
    pub description: Option<String>,
    pub default_rate: f64,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// Fields entered on the service form, before the store assigns an id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewService {
    pub name: String,
    pub description: Option<String>,
    pub default_rate: f64,
}

impl NewService {
    /// Builds a service from raw form text. The rate must parse as a number.
    pub fn from_form(name: &str, description: &str, default_rate: &str) -> Result<Self, AppError> {
        let default_rate = default_rate
            .trim()
            .parse::<f64>()
            .map_err(|_| AppError::validation("Default rate must be a number"))?;

        Ok(Self {
            name: name.trim().to_string(),
            description: non_blank(description),
            default_rate,
        })
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("Service name is required"));
        }
        if !self.default_rate.is_finite() || self.default_rate < 0.0 {
            return Err(AppError::validation("Default rate must be zero or more"));
        }
        Ok(())
    }
}
