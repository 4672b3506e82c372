//! Raw configuration value tree.
//!
//! Every source provider produces a [`Table`] of [`Value`] nodes, the
//! precedence resolver merges those tables, and the typed decoder walks the
//! merged result. Mapping keys are lowercased on ingestion so that key paths
//! compare case-insensitively throughout the pipeline.

use std::collections::BTreeMap;
use std::fmt;

/// Nested mapping of lowercased keys to raw values.
pub type Table = BTreeMap<String, Value>;

/// A raw configuration value prior to typed decoding.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Sequence(Vec<Value>),
    Table(Table),
}

impl Value {
    /// Short name of the variant, used in decode diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Sequence(_) => "sequence",
            Value::Table(_) => "table",
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(table) => Some(table),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// String form of a scalar. Integers, floats, and booleans render to
    /// their display form; sequences and tables do not coerce.
    pub fn coerce_string(&self) -> Option<String> {
        match self {
            Value::String(s) => Some(s.clone()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Integer form of a scalar. Strings parse strictly after trimming;
    /// floats never coerce (no silent truncation).
    pub fn coerce_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Boolean form of a scalar. Accepts `true`/`false` in any case,
    /// `"1"`/`"0"`, and the integers 1/0.
    pub fn coerce_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            Value::String(s) => parse_bool(s),
            Value::Int(1) => Some(true),
            Value::Int(0) => Some(false),
            _ => None,
        }
    }
}

/// Strict boolean parse shared by the decoder and the raw getters.
pub(crate) fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::String(s) => write!(f, "{s}"),
            Value::Sequence(_) => write!(f, "sequence"),
            Value::Table(_) => write!(f, "table"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u16> for Value {
    fn from(i: u16) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl From<Table> for Value {
    fn from(table: Table) -> Self {
        Value::Table(table)
    }
}

/// Convert a parsed YAML node into the crate's value tree, lowercasing
/// mapping keys along the way.
pub(crate) fn from_yaml(yaml: serde_yaml::Value) -> Value {
    match yaml {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Sequence(items.into_iter().map(from_yaml).collect())
        }
        serde_yaml::Value::Mapping(mapping) => {
            let mut table = Table::new();
            for (key, value) in mapping {
                // Non-scalar mapping keys have no dotted-path form; skip them.
                if let Some(key) = yaml_key(&key) {
                    table.insert(key, from_yaml(value));
                }
            }
            Value::Table(table)
        }
        serde_yaml::Value::Tagged(tagged) => from_yaml(tagged.value),
    }
}

fn yaml_key(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.to_ascii_lowercase()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Insert `value` at a dotted key path, creating intermediate tables as
/// needed. A non-table node already sitting on the path is replaced, since
/// the caller is describing a deeper structure than what was there.
pub(crate) fn insert_path(table: &mut Table, path: &str, value: Value) {
    let path = path.to_ascii_lowercase();
    let mut segments = path.split('.').peekable();
    let mut current = table;
    while let Some(segment) = segments.next() {
        if segments.peek().is_none() {
            current.insert(segment.to_string(), value);
            return;
        }
        let entry = current
            .entry(segment.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        if !matches!(entry, Value::Table(_)) {
            *entry = Value::Table(Table::new());
        }
        match entry {
            Value::Table(child) => current = child,
            _ => unreachable!(),
        }
    }
}

/// Walk a dotted key path through nested tables.
pub(crate) fn get_path<'a>(table: &'a Table, path: &str) -> Option<&'a Value> {
    let path = path.to_ascii_lowercase();
    let mut segments = path.split('.');
    let first = segments.next()?;
    let mut current = table.get(first)?;
    for segment in segments {
        current = current.as_table()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_yaml_lowercases_mapping_keys() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("Database:\n  Host: localhost\n  PORT: 5432").unwrap();
        let value = from_yaml(yaml);
        let table = value.as_table().unwrap();
        let database = table.get("database").unwrap().as_table().unwrap();
        assert_eq!(
            database.get("host"),
            Some(&Value::String("localhost".to_string()))
        );
        assert_eq!(database.get("port"), Some(&Value::Int(5432)));
    }

    #[test]
    fn test_from_yaml_scalar_variants() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("int: 7\nfloat: 1.5\nflag: true\nnone: null\ntext: hi").unwrap();
        let value = from_yaml(yaml);
        let table = value.as_table().unwrap();
        assert_eq!(table.get("int"), Some(&Value::Int(7)));
        assert_eq!(table.get("float"), Some(&Value::Float(1.5)));
        assert_eq!(table.get("flag"), Some(&Value::Bool(true)));
        assert_eq!(table.get("none"), Some(&Value::Null));
        assert_eq!(table.get("text"), Some(&Value::String("hi".to_string())));
    }

    #[test]
    fn test_from_yaml_sequence() {
        let yaml: serde_yaml::Value =
            serde_yaml::from_str("endpoints:\n  - a:2379\n  - b:2379").unwrap();
        let value = from_yaml(yaml);
        let table = value.as_table().unwrap();
        assert_eq!(
            table.get("endpoints"),
            Some(&Value::Sequence(vec![
                Value::String("a:2379".to_string()),
                Value::String("b:2379".to_string()),
            ]))
        );
    }

    #[test]
    fn test_insert_path_creates_nested_tables() {
        let mut table = Table::new();
        insert_path(&mut table, "database.pool.size", Value::Int(10));
        assert_eq!(get_path(&table, "database.pool.size"), Some(&Value::Int(10)));
    }

    #[test]
    fn test_insert_path_lowercases() {
        let mut table = Table::new();
        insert_path(&mut table, "Database.Host", Value::from("x"));
        assert_eq!(get_path(&table, "database.host"), Some(&Value::from("x")));
        assert_eq!(get_path(&table, "DATABASE.HOST"), Some(&Value::from("x")));
    }

    #[test]
    fn test_insert_path_replaces_scalar_on_path() {
        let mut table = Table::new();
        insert_path(&mut table, "database", Value::from("flat"));
        insert_path(&mut table, "database.host", Value::from("localhost"));
        assert_eq!(
            get_path(&table, "database.host"),
            Some(&Value::from("localhost"))
        );
    }

    #[test]
    fn test_get_path_missing() {
        let mut table = Table::new();
        insert_path(&mut table, "database.host", Value::from("x"));
        assert_eq!(get_path(&table, "database.port"), None);
        assert_eq!(get_path(&table, "database.host.deeper"), None);
        assert_eq!(get_path(&table, "redis"), None);
    }

    #[test]
    fn test_coerce_string() {
        assert_eq!(Value::from("x").coerce_string(), Some("x".to_string()));
        assert_eq!(Value::Int(5432).coerce_string(), Some("5432".to_string()));
        assert_eq!(Value::Bool(true).coerce_string(), Some("true".to_string()));
        assert_eq!(Value::Float(1.5).coerce_string(), Some("1.5".to_string()));
        assert_eq!(Value::Sequence(vec![]).coerce_string(), None);
    }

    #[test]
    fn test_coerce_i64() {
        assert_eq!(Value::Int(7).coerce_i64(), Some(7));
        assert_eq!(Value::from("5432").coerce_i64(), Some(5432));
        assert_eq!(Value::from(" 42 ").coerce_i64(), Some(42));
        assert_eq!(Value::from("abc").coerce_i64(), None);
        assert_eq!(Value::Float(1.0).coerce_i64(), None);
    }

    #[test]
    fn test_coerce_bool() {
        assert_eq!(Value::Bool(true).coerce_bool(), Some(true));
        assert_eq!(Value::from("TRUE").coerce_bool(), Some(true));
        assert_eq!(Value::from("0").coerce_bool(), Some(false));
        assert_eq!(Value::Int(1).coerce_bool(), Some(true));
        assert_eq!(Value::Int(2).coerce_bool(), None);
        assert_eq!(Value::from("yes").coerce_bool(), None);
    }
}
