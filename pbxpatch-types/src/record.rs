use crate::isa::Isa;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Opaque, globally unique object identifier (usually 24 hex digits).
///
/// Identifiers are compared as plain strings; that order is the order records
/// appear in within a section.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One typed object of the project graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: ObjectId,
    pub isa: Isa,
    /// Every field except `isa`, as decoded.
    #[serde(default)]
    pub fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn str_field(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(Value::as_str)
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name")
    }

    /// The ordered reference list stored in `field`, or `None` if the field is absent.
    ///
    /// Non-string entries are skipped.
    pub fn reference_list(&self, field: &str) -> Option<Vec<&str>> {
        let items = self.fields.get(field)?.as_array()?;
        Some(items.iter().filter_map(Value::as_str).collect())
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn references(&self, field: &str, id: &ObjectId) -> bool {
        self.reference_list(field)
            .is_some_and(|refs| refs.contains(&id.as_str()))
    }
}

/// Object graph view of a whole descriptor: every record keyed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectGraph {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_object: Option<ObjectId>,
    #[serde(default)]
    pub records: BTreeMap<ObjectId, Record>,
}

impl ProjectGraph {
    pub fn get(&self, id: &ObjectId) -> Option<&Record> {
        self.records.get(id)
    }

    pub fn contains(&self, id: &ObjectId, isa: &Isa) -> bool {
        self.get(id).is_some_and(|r| &r.isa == isa)
    }

    /// Records of one type, in ascending identifier order.
    pub fn of_type<'a>(&'a self, isa: &Isa) -> impl Iterator<Item = &'a Record> + use<'a> {
        let isa = isa.clone();
        self.records.values().filter(move |r| r.isa == isa)
    }

    /// Records grouped by type tag.
    pub fn by_type(&self) -> BTreeMap<&Isa, Vec<&Record>> {
        let mut groups: BTreeMap<&Isa, Vec<&Record>> = BTreeMap::new();
        for record in self.records.values() {
            groups.entry(&record.isa).or_default().push(record);
        }
        groups
    }

    pub fn native_target_named(&self, name: &str) -> Option<&Record> {
        self.of_type(&Isa::NativeTarget)
            .find(|r| r.name() == Some(name))
    }

    /// The `PBXProject` named by `rootObject`, or the only `PBXProject` when the
    /// root is not recorded.
    pub fn project(&self) -> Option<&Record> {
        if let Some(root) = &self.root_object {
            return self.get(root).filter(|r| r.isa == Isa::Project);
        }
        let mut projects = self.of_type(&Isa::Project);
        let first = projects.next()?;
        projects.next().is_none().then_some(first)
    }

    /// First `PBXFrameworksBuildPhase` linked from `target`'s `buildPhases`.
    pub fn frameworks_phase_of(&self, target: &Record) -> Option<&Record> {
        target
            .reference_list("buildPhases")?
            .into_iter()
            .filter_map(|id| self.get(&ObjectId::from(id)))
            .find(|r| r.isa == Isa::FrameworksBuildPhase)
    }
}
