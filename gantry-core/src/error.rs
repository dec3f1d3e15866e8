// Error types for the Gantry engine

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unresolvable scan root: {0}")]
    UnresolvedNamespace(String),

    #[error("Component instantiation failed: {0}")]
    Instantiation(String),

    #[error("Bean name conflict: {0}")]
    BeanNameConflict(String),

    #[error("Duplicate route: {0}")]
    DuplicateRoute(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Injection failed: {0}")]
    Injection(String),

    #[error("Missing dependency: {0}")]
    MissingDependency(String),

    #[error("Parameter binding failed: {0}")]
    Binding(String),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Dispatch failure: {0}")]
    Dispatch(String),
}

impl Error {
    /// True for errors that abort startup; per-request errors return false.
    pub fn is_startup_fault(&self) -> bool {
        matches!(
            self,
            Error::UnresolvedNamespace(_)
                | Error::Instantiation(_)
                | Error::BeanNameConflict(_)
                | Error::DuplicateRoute(_)
                | Error::Config(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startup_faults_are_classified() {
        assert!(Error::UnresolvedNamespace("app".into()).is_startup_fault());
        assert!(Error::Instantiation("app::Svc".into()).is_startup_fault());
        assert!(!Error::RouteNotFound("/nope".into()).is_startup_fault());
        assert!(!Error::Binding("a".into()).is_startup_fault());
    }
}
