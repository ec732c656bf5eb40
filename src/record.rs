// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Record model for parsed metadata documents.
//!
//! A metadata file is an open-ended YAML mapping. Values are kept as a tagged
//! union so that sorting, grouping and the template helpers can match on the
//! concrete kind instead of relying on implicit coercion.

use std::{collections::BTreeMap, path::Path};

use serde::Serialize;

/// Field holding the file base name without extension.
pub const FILENAME_FIELD: &str = "filename";
/// Field holding the name of the directory that contains the file.
pub const PARENTNAME_FIELD: &str = "parentname";
/// Field holding the path of the file as it was matched.
pub const FULLPATH_FIELD: &str = "fullpath";
/// Field that excludes a record from every collection when set to `true`.
pub const IGNORE_FIELD: &str = "ignore";

/// Synthetic fields attached to every loaded record.
pub const TEMPLATE_VARIABLES: &[&str] = &[FILENAME_FIELD, PARENTNAME_FIELD, FULLPATH_FIELD];

/// Dynamically typed value of a metadata field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetadataValue {
    /// Explicit `null` or `~`.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar that fits in `i64`.
    Integer(i64),
    /// Integer scalar above `i64::MAX`.
    Unsigned(u64),
    /// Any other number.
    Float(f64),
    /// String scalar.
    String(String),
    /// YAML sequence.
    Sequence(Vec<MetadataValue>),
    /// Nested YAML mapping with stringified keys.
    Mapping(BTreeMap<String, MetadataValue>)
}

impl MetadataValue {
    /// Returns the string slice when the value is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None
        }
    }

    /// Renders a scalar for use as a group key.
    ///
    /// Empty strings, nulls and collections have no key.
    pub fn group_key(&self) -> Option<String> {
        match self {
            Self::String(value) if !value.is_empty() => Some(value.clone()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Unsigned(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::Bool(value) => Some(value.to_string()),
            _ => None
        }
    }
}

impl From<serde_yaml::Value> for MetadataValue {
    fn from(value: serde_yaml::Value) -> Self {
        use serde_yaml::Value;

        match value {
            Value::Null => Self::Null,
            Value::Bool(flag) => Self::Bool(flag),
            Value::Number(number) => match (number.as_i64(), number.as_u64()) {
                (Some(integer), _) => Self::Integer(integer),
                (None, Some(unsigned)) => Self::Unsigned(unsigned),
                (None, None) => Self::Float(number.as_f64().unwrap_or(f64::NAN))
            },
            Value::String(text) => Self::String(text),
            Value::Sequence(items) => Self::Sequence(items.into_iter().map(Self::from).collect()),
            Value::Mapping(mapping) => Self::Mapping(
                mapping
                    .into_iter()
                    .map(|(key, value)| (key_to_string(key), Self::from(value)))
                    .collect()
            ),
            Value::Tagged(tagged) => Self::from(tagged.value)
        }
    }
}

impl From<&str> for MetadataValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

fn key_to_string(key: serde_yaml::Value) -> String {
    use serde_yaml::Value;

    match key {
        Value::String(text) => text,
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Null => "null".to_owned(),
        Value::Tagged(tagged) => key_to_string(tagged.value),
        other => serde_yaml::to_string(&other)
            .map(|text| text.trim_end().to_owned())
            .unwrap_or_default()
    }
}

/// One parsed metadata file plus its synthetic provenance fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MetadataRecord {
    fields: BTreeMap<String, MetadataValue>
}

impl MetadataRecord {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from a YAML document.
    ///
    /// An empty document (`null`) becomes an empty record. Any other
    /// non-mapping document is rejected with a short description of its shape.
    pub fn from_yaml(document: serde_yaml::Value) -> Result<Self, String> {
        match MetadataValue::from(document) {
            MetadataValue::Mapping(fields) => Ok(Self {
                fields
            }),
            MetadataValue::Null => Ok(Self::new()),
            MetadataValue::Sequence(_) => Err("found a sequence".to_owned()),
            _ => Err("found a scalar".to_owned())
        }
    }

    /// Returns the value stored under `field`.
    pub fn get(&self, field: &str) -> Option<&MetadataValue> {
        self.fields.get(field)
    }

    /// Inserts or replaces a field.
    pub fn insert<K, V>(&mut self, field: K, value: V) -> Option<MetadataValue>
    where
        K: Into<String>,
        V: Into<MetadataValue>
    {
        self.fields.insert(field.into(), value.into())
    }

    /// Iterates fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetadataValue)> {
        self.fields.iter()
    }

    /// Number of fields, synthetic ones included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when the record holds no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` when the record carries `ignore: true`.
    pub fn is_ignored(&self) -> bool {
        matches!(self.get(IGNORE_FIELD), Some(MetadataValue::Bool(true)))
    }

    /// String value of `field`, used as the sort key.
    pub fn sort_value(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(MetadataValue::as_str)
    }

    /// Group key derived from `field`, if the record can be grouped by it.
    pub fn group_key(&self, field: &str) -> Option<String> {
        self.get(field).and_then(MetadataValue::group_key)
    }

    /// Attaches `filename`, `parentname` and `fullpath` for `path`.
    ///
    /// User values under the same names are overwritten.
    pub fn attach_source(&mut self, path: &Path) {
        let filename = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.insert(FILENAME_FIELD, filename.as_str());
        self.insert(PARENTNAME_FIELD, parent_name(path).as_str());
        self.insert(FULLPATH_FIELD, &*path.to_string_lossy());
    }
}

fn parent_name(path: &Path) -> String {
    match path.parent() {
        None => path.to_string_lossy().into_owned(),
        Some(parent) if parent.as_os_str().is_empty() => ".".to_owned(),
        Some(parent) => parent
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| parent.to_string_lossy().into_owned())
    }
}

impl FromIterator<(String, MetadataValue)> for MetadataRecord {
    fn from_iter<I: IntoIterator<Item = (String, MetadataValue)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect()
        }
    }
}
