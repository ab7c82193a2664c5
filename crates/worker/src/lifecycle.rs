//! Router lifecycle states.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Pre-caching has not finished.
    #[default]
    Installing,
    /// Installed; waiting for the host to activate.
    WaitingToActivate,
    /// Intercepting requests.
    Active,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Installing => "installing",
            LifecycleState::WaitingToActivate => "waiting_to_activate",
            LifecycleState::Active => "active",
        }
    }

    pub fn can_activate(&self) -> bool {
        !matches!(self, LifecycleState::Installing)
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_installing() {
        assert_eq!(LifecycleState::default(), LifecycleState::Installing);
        assert!(!LifecycleState::Installing.can_activate());
        assert!(LifecycleState::WaitingToActivate.can_activate());
        assert!(LifecycleState::Active.can_activate());
    }

    #[test]
    fn test_serialized_names() {
        assert_eq!(serde_json::to_string(&LifecycleState::WaitingToActivate).unwrap(), r#""waiting_to_activate""#);
        assert_eq!(LifecycleState::Active.to_string(), "active");
    }
}
