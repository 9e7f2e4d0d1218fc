//! Instance recording and the object-graph dump
//!
//! Only active when the injector was created with `debug` on. Every recorded
//! object stays alive as long as the injector does.

use std::collections::{BTreeMap, BTreeSet};

use parking_lot::Mutex;

use super::instance::Instance;
use super::key::TypeKey;

/// One resolved object, as seen from the type it was requested as
#[derive(Debug, Clone)]
pub struct InstanceRecord {
    /// The type that was asked for
    pub requested: TypeKey,
    /// The type the object was created as
    pub implementation: TypeKey,
    /// Whether an explicit binding satisfied the request
    pub explicit: bool,
    /// Constructor parameters of the implementation, when it has exactly one
    /// constructor
    pub dependencies: Vec<TypeKey>,
    instance: Instance,
}

#[derive(Default)]
pub(crate) struct Recorder {
    records: Mutex<Vec<InstanceRecord>>,
}

impl Recorder {
    /// Remember `instance` for `requested` unless that exact object is
    /// already recorded for it
    pub(crate) fn record(
        &self,
        requested: TypeKey,
        instance: &Instance,
        explicit: bool,
        dependencies: Vec<TypeKey>,
    ) {
        let mut records = self.records.lock();
        let seen = records
            .iter()
            .any(|r| r.requested == requested && r.instance.same_as(instance));
        if !seen {
            records.push(InstanceRecord {
                requested,
                implementation: instance.concrete_type(),
                explicit,
                dependencies,
                instance: instance.clone(),
            });
        }
    }

    pub(crate) fn records(&self) -> Vec<InstanceRecord> {
        self.records.lock().clone()
    }
}

/// Render records as a PlantUML class diagram, one line per entry
pub(crate) fn render(records: &[InstanceRecord]) -> Vec<String> {
    let mut interfaces = BTreeSet::new();
    let mut implemented_by = BTreeSet::new();
    let mut dependees: BTreeMap<String, Vec<String>> = BTreeMap::new();

    for record in records {
        let implementation = diagram_name(&record.implementation);
        let abstraction = diagram_name(&record.requested);

        if implementation != abstraction {
            implemented_by.insert(format!("{} .up.|> {}", implementation, abstraction));
        }
        if record.requested.is_trait_object() {
            interfaces.insert(format!("interface {}", abstraction));
        }
        for dependency in &record.dependencies {
            dependees
                .entry(diagram_name(dependency))
                .or_default()
                .push(implementation.clone());
        }
    }

    let mut depends_on = BTreeSet::new();
    for (dependency, users) in &dependees {
        let arrow = if users.len() > 5 { "o---down-" } else { "o-down-" };
        for user in users {
            depends_on.insert(format!("{} {} {}", user, arrow, dependency));
        }
    }

    let mut lines = vec![
        "@startuml".to_string(),
        "hide empty methods".to_string(),
        "hide empty fields".to_string(),
    ];
    lines.extend(interfaces);
    lines.extend(implemented_by);
    lines.extend(depends_on);
    lines.push("@enduml".to_string());
    lines
}

/// PlantUML-safe identifier: short name, no `dyn`, punctuation as `_`
fn diagram_name(key: &TypeKey) -> String {
    let short = key.short_name();
    let short = short.strip_prefix("dyn ").unwrap_or(&short);
    short
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
