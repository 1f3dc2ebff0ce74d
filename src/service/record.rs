use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

const MOCK_SERVICE_COUNT: u32 = 6;
const MOCK_SERVICE_PREFIX: &str = "cargill-target";
const MOCK_SERVICE_KEY: &str = "location";

/// A selectable service endpoint of a circuit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    /// Stable identifier, unique within a collection.
    pub id: u32,
    /// Display name, unique within a collection.
    #[serde(rename = "serviceID")]
    pub service_id: String,
    #[serde(default)]
    pub selected: bool,
    /// Grouping tag (e.g. "location").
    #[serde(default)]
    pub key: String,
}

impl ServiceRecord {
    pub fn new(id: u32, service_id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id,
            service_id: service_id.into(),
            selected: false,
            key: key.into(),
        }
    }

    /// Copy of this record with the selection flag inverted.
    #[must_use]
    pub fn toggled(&self) -> Self {
        Self {
            selected: !self.selected,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedError {
    DuplicateId(u32),
    DuplicateServiceId(String),
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "duplicate service id: {id}"),
            Self::DuplicateServiceId(service_id) => {
                write!(f, "duplicate serviceID: {service_id}")
            }
        }
    }
}

impl std::error::Error for SeedError {}

fn validate_unique(records: &[ServiceRecord]) -> Result<(), SeedError> {
    let mut ids = HashSet::new();
    let mut service_ids = HashSet::new();
    for record in records {
        if !ids.insert(record.id) {
            return Err(SeedError::DuplicateId(record.id));
        }
        if !service_ids.insert(record.service_id.as_str()) {
            return Err(SeedError::DuplicateServiceId(record.service_id.clone()));
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct SeedFile {
    #[serde(default)]
    services: Vec<ServiceRecord>,
}

/// Ordered list of service records. Insertion order is display order.
///
/// Records are reference counted so that a toggle can produce a new collection
/// sharing every untouched record with the previous one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceCollection {
    records: Vec<Rc<ServiceRecord>>,
}

impl ServiceCollection {
    /// Build a collection, rejecting duplicate ids or service ids.
    pub fn from_records(records: Vec<ServiceRecord>) -> Result<Self, SeedError> {
        validate_unique(&records)?;
        Ok(Self {
            records: records.into_iter().map(Rc::new).collect(),
        })
    }

    /// The built-in mock circuit: `cargill-target0` through `cargill-target5`, none selected.
    pub fn mock() -> Self {
        let records = (0..MOCK_SERVICE_COUNT)
            .map(|id| {
                Rc::new(ServiceRecord::new(
                    id,
                    format!("{MOCK_SERVICE_PREFIX}{id}"),
                    MOCK_SERVICE_KEY,
                ))
            })
            .collect();
        Self { records }
    }

    /// Load a collection from a TOML seed file with `[[services]]` entries.
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = fs::read_to_string(path)?;
        let seed: SeedFile = toml::from_str(&content)?;
        let collection = Self::from_records(seed.services)?;
        tracing::debug!("Loaded {} services from {:?}", collection.len(), path);
        Ok(collection)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ServiceRecord> {
        self.records.iter().map(AsRef::as_ref)
    }

    pub fn get(&self, service_id: &str) -> Option<&ServiceRecord> {
        self.iter().find(|r| r.service_id == service_id)
    }

    pub fn selected(&self) -> impl Iterator<Item = &ServiceRecord> {
        self.iter().filter(|r| r.selected)
    }

    pub fn selected_count(&self) -> usize {
        self.selected().count()
    }

    /// New collection with the first record named `service_id` toggled.
    ///
    /// Returns `None` when no record matches. All other records are shared
    /// with `self`.
    #[must_use]
    pub fn with_toggled(&self, service_id: &str) -> Option<Self> {
        let index = self
            .records
            .iter()
            .position(|r| r.service_id == service_id)?;

        let mut records = self.records.clone();
        records[index] = Rc::new(records[index].toggled());
        Some(Self { records })
    }

    #[cfg(test)]
    pub(crate) fn record_rc(&self, index: usize) -> &Rc<ServiceRecord> {
        &self.records[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_collection() {
        let services = ServiceCollection::mock();
        assert_eq!(services.len(), 6);
        assert_eq!(services.selected_count(), 0);

        let names: Vec<_> = services.iter().map(|r| r.service_id.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "cargill-target0",
                "cargill-target1",
                "cargill-target2",
                "cargill-target3",
                "cargill-target4",
                "cargill-target5",
            ]
        );
        assert!(services.iter().all(|r| r.key == "location"));
        assert!(services.iter().enumerate().all(|(i, r)| r.id as usize == i));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let result = ServiceCollection::from_records(vec![
            ServiceRecord::new(1, "a", "location"),
            ServiceRecord::new(1, "b", "location"),
        ]);
        assert_eq!(result, Err(SeedError::DuplicateId(1)));
    }

    #[test]
    fn test_duplicate_service_id_rejected() {
        let result = ServiceCollection::from_records(vec![
            ServiceRecord::new(1, "a", "location"),
            ServiceRecord::new(2, "a", "location"),
        ]);
        assert_eq!(result, Err(SeedError::DuplicateServiceId("a".to_string())));
    }

    #[test]
    fn test_with_toggled_shares_untouched_records() {
        let services = ServiceCollection::mock();
        let toggled = services.with_toggled("cargill-target2").unwrap();

        assert!(toggled.get("cargill-target2").unwrap().selected);
        assert!(!services.get("cargill-target2").unwrap().selected);
        assert!(Rc::ptr_eq(services.record_rc(0), toggled.record_rc(0)));
        assert!(!Rc::ptr_eq(services.record_rc(2), toggled.record_rc(2)));
    }

    #[test]
    fn test_with_toggled_unknown() {
        let services = ServiceCollection::mock();
        assert!(services.with_toggled("cargill-target9").is_none());
    }

    #[test]
    fn test_seed_file_parsing() {
        let seed: SeedFile = toml::from_str(
            r#"
            [[services]]
            id = 7
            serviceID = "acme-east"
            key = "location"

            [[services]]
            id = 8
            serviceID = "acme-west"
            selected = true
            "#,
        )
        .unwrap();

        let services = ServiceCollection::from_records(seed.services).unwrap();
        assert_eq!(services.len(), 2);
        assert!(!services.get("acme-east").unwrap().selected);
        assert!(services.get("acme-west").unwrap().selected);
        assert_eq!(services.get("acme-west").unwrap().key, "");
    }

    fn write_seed(name: &str, content: &str) -> std::path::PathBuf {
        let pid = std::process::id();
        let dir = std::env::temp_dir().join(format!("circuit-picker-seed-{pid}-{name}"));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("services.toml");
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_seed_file() {
        let path = write_seed(
            "valid",
            r#"
            [[services]]
            id = 0
            serviceID = "acme-east"
            key = "location"

            [[services]]
            id = 1
            serviceID = "acme-west"
            "#,
        );

        let services = ServiceCollection::load(&path).unwrap();
        let names: Vec<_> = services.iter().map(|r| r.service_id.as_str()).collect();
        assert_eq!(names, vec!["acme-east", "acme-west"]);
        assert_eq!(services.selected_count(), 0);
        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_load_rejects_duplicate_service_id() {
        let path = write_seed(
            "duplicate",
            r#"
            [[services]]
            id = 0
            serviceID = "acme-east"

            [[services]]
            id = 1
            serviceID = "acme-east"
            "#,
        );

        let err = ServiceCollection::load(&path).unwrap_err();
        assert_eq!(err.to_string(), "duplicate serviceID: acme-east");
        fs::remove_dir_all(path.parent().unwrap()).unwrap();
    }

    #[test]
    fn test_load_missing_file_is_error() {
        let path = std::env::temp_dir()
            .join("circuit-picker-seed-missing")
            .join("services.toml");
        assert!(ServiceCollection::load(&path).is_err());
    }
}
