use crate::error::AppError;

/// Identity of whoever is using the app. Passed to every registry operation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user_id: Option<String>,
}

impl Session {
    pub fn new(user_id: Option<String>) -> Self {
        Self {
            user_id: user_id.filter(|id| !id.trim().is_empty()),
        }
    }

    #[cfg(test)]
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user_id.is_some()
    }

    /// The owner id every store read is filtered by.
    pub fn owner_id(&self) -> Result<&str, AppError> {
        self.user_id.as_deref().ok_or(AppError::Unauthenticated)
    }

    /// Replaces the identity. Returns true when it actually changed, in which
    /// case callers must reload anything they loaded for the old identity.
    pub fn switch_user(&mut self, user_id: Option<String>) -> bool {
        let next = Session::new(user_id);
        if next == *self {
            return false;
        }
        tracing::info!(user = ?next.user_id, "session identity changed");
        *self = next;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_user_id_is_unauthenticated() {
        let session = Session::new(Some("   ".to_string()));
        assert!(!session.is_authenticated());
        assert!(matches!(session.owner_id(), Err(AppError::Unauthenticated)));
    }

    #[test]
    fn owner_id_comes_from_the_user() {
        let session = Session::new(Some("u-1".to_string()));
        assert_eq!(session.owner_id().unwrap(), "u-1");
    }

    #[test]
    fn switch_user_reports_changes_only() {
        let mut session = Session::anonymous();
        assert!(session.switch_user(Some("u-1".to_string())));
        assert!(!session.switch_user(Some("u-1".to_string())));
        assert!(session.switch_user(None));
        assert!(!session.is_authenticated());
    }
}
