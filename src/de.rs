//! Typed decoding of the merged configuration tree
//!
//! Drives any [`serde::de::DeserializeOwned`] target over the raw value
//! tree. The binding and coercion rules:
//!
//! - field names are lowercased before lookup; mapping keys were lowercased
//!   at ingestion, so the whole pipeline is case-insensitive. An explicit
//!   `#[serde(rename = "...")]` tag overrides the field name and is subject
//!   to the same lowercasing.
//! - a field name containing underscores also binds the nested path obtained
//!   by splitting on them (`ssl_mode` binds `ssl.mode`). The nested form is
//!   consulted before the literal key, because environment variable names
//!   cannot distinguish `_` from `.` and their values must dominate file
//!   content.
//! - strings coerce into integers, floats, and booleans by strict parsing;
//!   integers, floats, and booleans render into string fields. A failed
//!   coercion aborts the decode with a [`ConfigError::DecodeError`] naming
//!   the dotted key path and the offending value.
//! - absent fields are skipped rather than errored, leaving them to the
//!   target's `#[serde(default)]`; `Option` fields become `None`. A null
//!   value decodes as an empty section. Unknown keys are ignored.

use serde::de::{self, DeserializeOwned, Visitor};

use crate::error::ConfigError;
use crate::value::{Table, Value};

/// Decode a merged table into a typed structure.
pub fn decode<T: DeserializeOwned>(root: Table) -> Result<T, ConfigError> {
    let root = Value::Table(root);
    T::deserialize(ValueDe {
        value: &root,
        path: String::new(),
    })
}

/// Deserializer over one node of the value tree, carrying the dotted key
/// path of that node for diagnostics.
struct ValueDe<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> ValueDe<'a> {
    fn type_err(&self, expected: &str) -> ConfigError {
        let found = match self.value {
            Value::Null | Value::Sequence(_) | Value::Table(_) => self.value.type_name().to_string(),
            scalar => format!("{} `{}`", scalar.type_name(), scalar),
        };
        ConfigError::decode(&self.path, format!("expected {expected}, found {found}"))
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

/// Resolve a struct field name against a table.
///
/// The underscore-split nested walk runs first so that values which arrived
/// through `_`-separated environment variable names shadow a file's literal
/// flat key for the same field.
fn lookup<'a>(table: &'a Table, field: &str) -> Option<&'a Value> {
    let name = field.to_ascii_lowercase();
    if name.contains('_') {
        if let Some(found) = walk(table, &name) {
            return Some(found);
        }
    }
    table.get(&name)
}

fn walk<'a>(table: &'a Table, name: &str) -> Option<&'a Value> {
    let mut current = table;
    let mut segments = name.split('_').peekable();
    loop {
        let segment = segments.next()?;
        let entry = current.get(segment)?;
        if segments.peek().is_none() {
            return Some(entry);
        }
        current = entry.as_table()?;
    }
}

impl<'de, 'a> de::Deserializer<'de> for ValueDe<'a> {
    type Error = ConfigError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(*b),
            Value::Int(i) => visitor.visit_i64(*i),
            Value::Float(x) => visitor.visit_f64(*x),
            Value::String(s) => visitor.visit_str(s),
            Value::Sequence(_) => self.deserialize_seq(visitor),
            Value::Table(_) => self.deserialize_map(visitor),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        match self.value.coerce_bool() {
            Some(b) => visitor.visit_bool(b),
            None => Err(self.type_err("boolean")),
        }
    }

    fn deserialize_i8<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i16<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i32<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_i64(visitor)
    }

    fn deserialize_i64<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Int(i) => visitor.visit_i64(*i),
            Value::String(s) => match s.trim().parse::<i64>() {
                Ok(i) => visitor.visit_i64(i),
                Err(_) => Err(ConfigError::decode(
                    &self.path,
                    format!("invalid integer `{s}`"),
                )),
            },
            _ => Err(self.type_err("integer")),
        }
    }

    fn deserialize_u8<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_u64(visitor)
    }

    fn deserialize_u16<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_u64(visitor)
    }

    fn deserialize_u32<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_u64(visitor)
    }

    fn deserialize_u64<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Int(i) => visitor.visit_i64(*i),
            Value::String(s) => match s.trim().parse::<u64>() {
                Ok(u) => visitor.visit_u64(u),
                Err(_) => Err(ConfigError::decode(
                    &self.path,
                    format!("invalid integer `{s}`"),
                )),
            },
            _ => Err(self.type_err("integer")),
        }
    }

    fn deserialize_f32<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_f64(visitor)
    }

    fn deserialize_f64<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Float(x) => visitor.visit_f64(*x),
            Value::Int(i) => visitor.visit_f64(*i as f64),
            Value::String(s) => match s.trim().parse::<f64>() {
                Ok(x) => visitor.visit_f64(x),
                Err(_) => Err(ConfigError::decode(
                    &self.path,
                    format!("invalid float `{s}`"),
                )),
            },
            _ => Err(self.type_err("float")),
        }
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(s) => visitor.visit_str(s),
            Value::Int(i) => visitor.visit_string(i.to_string()),
            Value::Float(x) => visitor.visit_string(x.to_string()),
            Value::Bool(b) => visitor.visit_string(b.to_string()),
            _ => Err(self.type_err("string")),
        }
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_any(visitor)
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_any(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            _ => Err(self.type_err("null")),
        }
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Sequence(items) => {
                let path = self.path;
                visitor
                    .visit_seq(SeqItems {
                        items: items.iter(),
                        index: 0,
                        path: path.clone(),
                    })
                    .map_err(|e| e.with_path(&path))
            }
            _ => Err(self.type_err("sequence")),
        }
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        let entries: Vec<(&'a String, &'a Value)> = match self.value {
            Value::Table(table) => table.iter().collect(),
            Value::Null => Vec::new(),
            _ => return Err(self.type_err("table")),
        };
        let path = self.path;
        visitor
            .visit_map(MapEntries {
                entries: entries.into_iter(),
                pending: None,
                path: path.clone(),
            })
            .map_err(|e| e.with_path(&path))
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        let resolved: Vec<(&'static str, &'a Value)> = match self.value {
            Value::Table(table) => fields
                .iter()
                .filter_map(|field| lookup(table, field).map(|value| (*field, value)))
                .collect(),
            Value::Null => Vec::new(),
            _ => return Err(self.type_err("table")),
        };
        let path = self.path;
        visitor
            .visit_map(StructFields {
                fields: resolved.into_iter(),
                pending: None,
                path: path.clone(),
            })
            .map_err(|e| e.with_path(&path))
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(s) => {
                let path = self.path;
                visitor
                    .visit_enum(de::value::StrDeserializer::<ConfigError>::new(s))
                    .map_err(|e| e.with_path(&path))
            }
            _ => Err(self.type_err("string")),
        }
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, ConfigError>
    where
        V: Visitor<'de>,
    {
        self.deserialize_any(visitor)
    }
}

/// Sequence access reporting element paths as `path[index]`.
struct SeqItems<'a> {
    items: std::slice::Iter<'a, Value>,
    index: usize,
    path: String,
}

impl<'de, 'a> de::SeqAccess<'de> for SeqItems<'a> {
    type Error = ConfigError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, ConfigError>
    where
        T: de::DeserializeSeed<'de>,
    {
        let Some(item) = self.items.next() else {
            return Ok(None);
        };
        let path = format!("{}[{}]", self.path, self.index);
        self.index += 1;
        seed.deserialize(ValueDe {
            value: item,
            path: path.clone(),
        })
        .map(Some)
        .map_err(|e| e.with_path(&path))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

/// Field-driven access for struct targets: fields are resolved against the
/// table up front, so absent fields are skipped and unknown keys never reach
/// serde.
struct StructFields<'a> {
    fields: std::vec::IntoIter<(&'static str, &'a Value)>,
    pending: Option<(&'static str, &'a Value)>,
    path: String,
}

impl<'de, 'a> de::MapAccess<'de> for StructFields<'a> {
    type Error = ConfigError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, ConfigError>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.fields.next() {
            Some((field, value)) => {
                self.pending = Some((field, value));
                seed.deserialize(de::value::StrDeserializer::<ConfigError>::new(field))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, ConfigError>
    where
        V: de::DeserializeSeed<'de>,
    {
        let Some((field, value)) = self.pending.take() else {
            return Err(de::Error::custom("value requested before key"));
        };
        let path = join(&self.path, field);
        seed.deserialize(ValueDe {
            value,
            path: path.clone(),
        })
        .map_err(|e| e.with_path(&path))
    }
}

/// Entry-driven access for map targets.
struct MapEntries<'a> {
    entries: std::vec::IntoIter<(&'a String, &'a Value)>,
    pending: Option<(&'a String, &'a Value)>,
    path: String,
}

impl<'de, 'a> de::MapAccess<'de> for MapEntries<'a> {
    type Error = ConfigError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, ConfigError>
    where
        K: de::DeserializeSeed<'de>,
    {
        match self.entries.next() {
            Some((key, value)) => {
                self.pending = Some((key, value));
                seed.deserialize(de::value::StrDeserializer::<ConfigError>::new(key))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, ConfigError>
    where
        V: de::DeserializeSeed<'de>,
    {
        let Some((key, value)) = self.pending.take() else {
            return Err(de::Error::custom("value requested before key"));
        };
        let path = join(&self.path, key);
        seed.deserialize(ValueDe {
            value,
            path: path.clone(),
        })
        .map_err(|e| e.with_path(&path))
    }
}
