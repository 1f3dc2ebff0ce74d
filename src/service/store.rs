use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, warn};

use super::{ActionError, ServiceAction, ServiceCollection};

/// What a dispatch did to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Toggled { service_id: String, selected: bool },
    NotFound { service_id: String },
}

/// Apply `action` to `state`, returning the next state.
///
/// `None` means the action matched nothing and the state is unchanged.
pub fn reduce(state: &ServiceCollection, action: &ServiceAction) -> Option<ServiceCollection> {
    match action {
        ServiceAction::Select { service_id } => state.with_toggled(service_id),
    }
}

/// Shared handle to the current service selection.
///
/// Clones point at the same state. The store lives on the UI thread only.
#[derive(Debug, Clone)]
pub struct ServiceStore {
    state: Rc<RefCell<ServiceCollection>>,
}

impl ServiceStore {
    pub fn new(initial: ServiceCollection) -> Self {
        Self {
            state: Rc::new(RefCell::new(initial)),
        }
    }

    /// Snapshot of the current collection.
    pub fn state(&self) -> ServiceCollection {
        self.state.borrow().clone()
    }

    pub fn dispatch(&self, action: ServiceAction) -> DispatchOutcome {
        let next = reduce(&self.state.borrow(), &action);
        let tag = action.tag();

        let ServiceAction::Select { service_id } = action;
        if let Some(next) = next {
            let selected = next.get(&service_id).is_some_and(|r| r.selected);
            *self.state.borrow_mut() = next;
            debug!("Dispatched {tag} for {service_id}, selected={selected}");
            DispatchOutcome::Toggled {
                service_id,
                selected,
            }
        } else {
            warn!("Ignoring {tag} for unknown service {service_id:?}");
            DispatchOutcome::NotFound { service_id }
        }
    }

    /// Parse and apply `(tag, serviceID)` pairs in order.
    ///
    /// Every tag is parsed before anything is applied, so an unknown tag
    /// leaves the state untouched.
    pub fn dispatch_tagged(
        &self,
        tagged: &[(String, String)],
    ) -> Result<Vec<DispatchOutcome>, ActionError> {
        let actions = tagged
            .iter()
            .map(|(tag, service_id)| ServiceAction::from_tag(tag, service_id.as_str()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(actions
            .into_iter()
            .map(|action| self.dispatch(action))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::ServiceRecord;

    #[test]
    fn test_select_toggles_one_record() {
        let store = ServiceStore::new(ServiceCollection::mock());

        let outcome = store.dispatch(ServiceAction::select("cargill-target2"));
        assert_eq!(
            outcome,
            DispatchOutcome::Toggled {
                service_id: "cargill-target2".to_string(),
                selected: true,
            }
        );

        let state = store.state();
        let selected: Vec<_> = state.selected().map(|r| r.service_id.as_str()).collect();
        assert_eq!(selected, vec!["cargill-target2"]);
    }

    #[test]
    fn test_select_twice_restores_state() {
        let collections = [
            ServiceCollection::mock(),
            ServiceCollection::from_records(vec![
                ServiceRecord {
                    selected: true,
                    ..ServiceRecord::new(3, "alpha", "location")
                },
                ServiceRecord::new(9, "beta", ""),
            ])
            .unwrap(),
        ];

        for initial in collections {
            for record in initial.iter() {
                let store = ServiceStore::new(initial.clone());
                store.dispatch(ServiceAction::select(record.service_id.clone()));
                store.dispatch(ServiceAction::select(record.service_id.clone()));
                assert_eq!(store.state(), initial);
            }
        }
    }

    #[test]
    fn test_select_unknown_is_noop() {
        let store = ServiceStore::new(ServiceCollection::mock());
        let before = store.state();

        let outcome = store.dispatch(ServiceAction::select("missing"));
        assert_eq!(
            outcome,
            DispatchOutcome::NotFound {
                service_id: "missing".to_string(),
            }
        );
        assert_eq!(store.state(), before);
    }

    #[test]
    fn test_unhandled_tag_leaves_state_unchanged() {
        let store = ServiceStore::new(ServiceCollection::mock());
        let before = store.state();

        let result = ServiceAction::from_tag("remove", "cargill-target0")
            .map(|action| store.dispatch(action));
        assert!(result.is_err());
        assert_eq!(store.state(), before);
    }

    fn tagged(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(tag, service_id)| ((*tag).to_string(), (*service_id).to_string()))
            .collect()
    }

    #[test]
    fn test_dispatch_tagged_applies_in_order() {
        let store = ServiceStore::new(ServiceCollection::mock());

        let outcomes = store
            .dispatch_tagged(&tagged(&[
                ("select", "cargill-target1"),
                ("select", "cargill-target3"),
                ("select", "cargill-target1"),
                ("select", "nope"),
            ]))
            .unwrap();

        assert_eq!(outcomes.len(), 4);
        assert_eq!(
            outcomes[2],
            DispatchOutcome::Toggled {
                service_id: "cargill-target1".to_string(),
                selected: false,
            }
        );
        assert_eq!(
            outcomes[3],
            DispatchOutcome::NotFound {
                service_id: "nope".to_string(),
            }
        );
        let selected: Vec<_> = store
            .state()
            .selected()
            .map(|r| r.service_id.clone())
            .collect();
        assert_eq!(selected, vec!["cargill-target3"]);
    }

    #[test]
    fn test_dispatch_tagged_unknown_tag_applies_nothing() {
        let store = ServiceStore::new(ServiceCollection::mock());

        let err = store
            .dispatch_tagged(&tagged(&[
                ("select", "cargill-target0"),
                ("remove", "cargill-target1"),
            ]))
            .unwrap_err();

        assert_eq!(err.to_string(), "unhandled action type: remove");
        assert_eq!(store.state(), ServiceCollection::mock());
    }

    #[test]
    fn test_clones_share_state() {
        let store = ServiceStore::new(ServiceCollection::mock());
        let other = store.clone();

        other.dispatch(ServiceAction::select("cargill-target4"));
        assert!(store.state().get("cargill-target4").unwrap().selected);
    }

    #[test]
    fn test_reduce_does_not_mutate_input() {
        let state = ServiceCollection::mock();
        let next = reduce(&state, &ServiceAction::select("cargill-target0")).unwrap();

        assert_eq!(state.selected_count(), 0);
        assert_eq!(next.selected_count(), 1);
    }
}
