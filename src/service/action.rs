use std::fmt;

/// Actions understood by the [`ServiceStore`](super::ServiceStore).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceAction {
    /// Invert the selection of the record with this `serviceID`.
    Select { service_id: String },
}

impl ServiceAction {
    pub fn select(service_id: impl Into<String>) -> Self {
        Self::Select {
            service_id: service_id.into(),
        }
    }

    /// Build an action from its textual tag (e.g. from a script or log replay).
    pub fn from_tag(tag: &str, service_id: impl Into<String>) -> Result<Self, ActionError> {
        match tag {
            "select" => Ok(Self::select(service_id)),
            other => Err(ActionError::UnhandledAction(other.to_string())),
        }
    }

    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Select { .. } => "select",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    UnhandledAction(String),
}

impl fmt::Display for ActionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnhandledAction(tag) => write!(f, "unhandled action type: {tag}"),
        }
    }
}

impl std::error::Error for ActionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_tag_select() {
        assert_eq!(
            ServiceAction::from_tag("select", "cargill-target1"),
            Ok(ServiceAction::select("cargill-target1"))
        );
    }

    #[test]
    fn test_from_tag_unhandled() {
        let err = ServiceAction::from_tag("deselect", "cargill-target1").unwrap_err();
        assert_eq!(err, ActionError::UnhandledAction("deselect".to_string()));
        assert_eq!(err.to_string(), "unhandled action type: deselect");
    }

    #[test]
    fn test_tag_matches_parser() {
        let action = ServiceAction::select("x");
        assert_eq!(ServiceAction::from_tag(action.tag(), "x"), Ok(action));
    }
}
