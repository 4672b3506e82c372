//! Precedence resolution across source providers
//!
//! Tables from all active providers collapse into one key space. Tables
//! combine recursively, so nested keys with disjoint paths are additively
//! combined and every leaf is independently subject to precedence. Scalars
//! and sequences are replaced whole; a higher-precedence scalar landing on a
//! lower-precedence subtree replaces the entire subtree.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::debug;

use crate::source::SourceKind;
use crate::value::{self, Table, Value};

/// One provider's table plus its provenance tag
pub type Layer = (SourceKind, Table);

/// The resolved key space after applying precedence across all sources
///
/// Retains, per leaf key path, which source supplied the winning value.
#[derive(Debug, Clone, Default)]
pub struct MergedTree {
    root: Table,
    origins: BTreeMap<String, SourceKind>,
}

/// Merge provider tables given from lowest to highest precedence.
pub fn resolve(layers: Vec<Layer>) -> MergedTree {
    let mut tree = MergedTree::default();
    for (kind, table) in layers {
        apply(&mut tree.root, table, kind, "", &mut tree.origins);
    }
    debug!(leaves = tree.origins.len(), "merged configuration sources");
    tree
}

fn apply(
    dst: &mut Table,
    src: Table,
    kind: SourceKind,
    prefix: &str,
    origins: &mut BTreeMap<String, SourceKind>,
) {
    for (key, incoming) in src {
        let path = join(prefix, &key);
        match dst.entry(key) {
            Entry::Occupied(mut slot) => match (slot.get_mut(), incoming) {
                (Value::Table(existing), Value::Table(incoming)) => {
                    apply(existing, incoming, kind, &path, origins);
                }
                (slot_value, incoming) => {
                    clear_origins(origins, &path);
                    record_origins(origins, &path, &incoming, kind);
                    *slot_value = incoming;
                }
            },
            Entry::Vacant(slot) => {
                record_origins(origins, &path, &incoming, kind);
                slot.insert(incoming);
            }
        }
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Drop origin records at and under a path whose subtree is being replaced.
fn clear_origins(origins: &mut BTreeMap<String, SourceKind>, path: &str) {
    let prefix = format!("{path}.");
    origins.retain(|recorded, _| recorded != path && !recorded.starts_with(&prefix));
}

fn record_origins(
    origins: &mut BTreeMap<String, SourceKind>,
    path: &str,
    incoming: &Value,
    kind: SourceKind,
) {
    match incoming {
        Value::Table(table) => {
            for (key, child) in table {
                record_origins(origins, &join(path, key), child, kind);
            }
        }
        _ => {
            origins.insert(path.to_string(), kind);
        }
    }
}

impl MergedTree {
    /// The merged table itself.
    pub fn root(&self) -> &Table {
        &self.root
    }

    /// Raw value at a dotted key path.
    pub fn get(&self, key: &str) -> Option<&Value> {
        value::get_path(&self.root, key)
    }

    /// String at a key path; scalars render to their display form.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key)?.coerce_string()
    }

    /// Integer at a key path; strings parse strictly.
    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.get(key)?.coerce_i64()
    }

    /// Boolean at a key path; accepts `true`/`false`, `1`/`0`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key)?.coerce_bool()
    }

    /// Which source supplied the winning value at a leaf key path.
    pub fn origin(&self, key: &str) -> Option<SourceKind> {
        self.origins.get(&key.to_ascii_lowercase()).copied()
    }
}
