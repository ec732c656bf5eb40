// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Discovery and parsing of metadata files.
//!
//! Files are matched by a glob pattern, parsed as YAML mappings and turned
//! into [`MetadataRecord`] values. A single unreadable or malformed file never
//! aborts the batch: it is reported through `tracing` and skipped. Only an
//! invalid pattern is fatal.

use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf}
};

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::{
    error::{self, Error},
    record::MetadataRecord
};

/// Records partitioned by the string form of the group-by field.
pub type GroupedRecords = BTreeMap<String, Vec<MetadataRecord>>;

/// Result of loading every metadata file matched by a pattern.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedRecords {
    /// All retained records in discovery order.
    pub records: Vec<MetadataRecord>,
    /// Records grouped by the group-by field; empty when grouping is off.
    pub groups:  GroupedRecords
}

/// Loads all metadata files matching `pattern`.
///
/// # Parameters
///
/// * `pattern` - Glob pattern (`*`, `?`, `[...]`) selecting metadata files.
///   Wildcards never cross a directory separator; `**` acts as `*`.
/// * `group_by` - Optional field used to partition records into groups.
///
/// # Errors
///
/// Returns [`Error::Pattern`] when the pattern cannot be compiled. Per-file
/// failures are logged and skipped.
///
/// # Example
///
/// ```no_run
/// use yaml_readme::load_records;
///
/// # fn main() -> Result<(), yaml_readme::Error> {
/// let loaded = load_records("items/*.yaml", Some("year"))?;
/// println!("{} records in {} groups", loaded.records.len(), loaded.groups.len());
/// # Ok(())
/// # }
/// ```
pub fn load_records(pattern: &str, group_by: Option<&str>) -> Result<LoadedRecords, Error> {
    let single_level = single_level_pattern(pattern);
    let entries = glob::glob(&single_level).map_err(|source| Error::Pattern {
        pattern: pattern.to_owned(),
        source
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => paths.push(path),
            Err(error) => warn!("failed to inspect {}: {}", error.path().display(), error)
        }
    }

    info!("Pattern {} matched {} metadata files", pattern, paths.len());
    Ok(load_records_from_paths(paths, group_by))
}

/// Collapses runs of `*` so that every wildcard stays within one path
/// component; `**` never recurses into subdirectories.
fn single_level_pattern(pattern: &str) -> String {
    let mut collapsed = String::with_capacity(pattern.len());
    for ch in pattern.chars() {
        if ch == '*' && collapsed.ends_with('*') {
            continue;
        }
        collapsed.push(ch);
    }
    collapsed
}

/// Loads metadata records from an explicit list of paths.
///
/// Applies the same parsing, ignore filter, synthetic fields and grouping as
/// [`load_records`].
pub fn load_records_from_paths<I, P>(paths: I, group_by: Option<&str>) -> LoadedRecords
where
    I: IntoIterator<Item = P>,
    P: AsRef<Path>
{
    let group_by = group_by.filter(|field| !field.is_empty());
    let mut loaded = LoadedRecords::default();

    for path in paths {
        let path = path.as_ref();
        let mut record = match read_record(path) {
            Ok(record) => record,
            Err(error) => {
                warn!("{}", error);
                continue;
            }
        };

        if record.is_ignored() {
            debug!("Skipping ignored metadata file {}", path.display());
            continue;
        }

        record.attach_source(path);

        if let Some(key) = group_by.and_then(|field| record.group_key(field)) {
            loaded.groups.entry(key).or_default().push(record.clone());
        }
        loaded.records.push(record);
    }

    debug!(
        "Loaded {} records into {} groups",
        loaded.records.len(),
        loaded.groups.len()
    );
    loaded
}

/// Reads and parses a single metadata file.
///
/// # Errors
///
/// Returns [`Error::Io`], [`Error::Parse`] or [`Error::Document`] describing
/// why the file cannot become a record.
pub fn read_record(path: &Path) -> Result<MetadataRecord, Error> {
    let bytes = fs::read(path).map_err(|source| error::io_error(path, source))?;
    parse_record(path, &bytes)
}

/// Parses raw metadata bytes read from `path`.
///
/// Only the first document of a multi-document stream is used.
///
/// # Errors
///
/// Returns [`Error::Parse`] for invalid YAML and [`Error::Document`] when the
/// document is not a mapping.
pub fn parse_record(path: &Path, bytes: &[u8]) -> Result<MetadataRecord, Error> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(MetadataRecord::new());
    }
    let document = match serde_yaml::Deserializer::from_slice(bytes).next() {
        Some(first) => serde_yaml::Value::deserialize(first)
            .map_err(|source| error::parse_error(path, source))?,
        None => serde_yaml::Value::Null
    };
    MetadataRecord::from_yaml(document).map_err(|message| Error::Document {
        path: PathBuf::from(path),
        message
    })
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::record::MetadataValue;

    fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("failed to create fixture dir");
        }
        fs::write(&path, contents).expect("failed to write fixture");
        path
    }

    fn pattern(dir: &Path, suffix: &str) -> String {
        format!("{}/{}", dir.display(), suffix)
    }

    #[test]
    fn loads_records_in_discovery_order_with_synthetic_fields() {
        let temp = tempdir().expect("failed to create tempdir");
        write(temp.path(), "items/b.yaml", "name: second\n");
        write(temp.path(), "items/a.yaml", "name: first\n");

        let loaded = load_records(&pattern(temp.path(), "items/*.yaml"), None).expect("loaded");

        let names: Vec<_> = loaded.records.iter().filter_map(|r| r.sort_value("name")).collect();
        assert_eq!(names, ["first", "second"]);
        let first = &loaded.records[0];
        assert_eq!(first.sort_value("filename"), Some("a"));
        assert_eq!(first.sort_value("parentname"), Some("items"));
        assert!(first.sort_value("fullpath").expect("fullpath").ends_with("items/a.yaml"));
        assert!(loaded.groups.is_empty());
    }

    #[test]
    fn ignored_records_never_reach_list_or_groups() {
        let temp = tempdir().expect("failed to create tempdir");
        write(temp.path(), "a.yaml", "year: 2021\n");
        write(temp.path(), "b.yaml", "year: 2021\nignore: true\n");
        write(temp.path(), "c.yaml", "year: 2022\nignore: false\n");

        let loaded =
            load_records(&pattern(temp.path(), "*.yaml"), Some("year")).expect("loaded");

        assert_eq!(loaded.records.len(), 2);
        assert!(loaded.records.iter().all(|record| !record.is_ignored()));
        assert_eq!(loaded.groups["2021"].len(), 1);
        assert_eq!(loaded.groups["2022"].len(), 1);
    }

    #[test]
    fn groups_by_integer_year() {
        let temp = tempdir().expect("failed to create tempdir");
        write(temp.path(), "a.yaml", "name: a\nyear: 2021\n");
        write(temp.path(), "b.yaml", "name: b\nyear: 2022\n");
        write(temp.path(), "c.yaml", "name: c\nyear: 2021\n");

        let loaded =
            load_records(&pattern(temp.path(), "*.yaml"), Some("year")).expect("loaded");

        let keys: Vec<_> = loaded.groups.keys().cloned().collect();
        assert_eq!(keys, ["2021", "2022"]);
        let in_2021: Vec<_> =
            loaded.groups["2021"].iter().filter_map(|r| r.sort_value("name")).collect();
        assert_eq!(in_2021, ["a", "c"]);
        assert_eq!(loaded.groups["2022"][0].get("year"), Some(&MetadataValue::Integer(2022)));
    }

    #[test]
    fn records_without_group_value_stay_in_flat_list() {
        let temp = tempdir().expect("failed to create tempdir");
        write(temp.path(), "a.yaml", "year: 2021\n");
        write(temp.path(), "b.yaml", "name: no-year\n");
        write(temp.path(), "c.yaml", "year: ''\n");

        let loaded =
            load_records(&pattern(temp.path(), "*.yaml"), Some("year")).expect("loaded");

        assert_eq!(loaded.records.len(), 3);
        assert_eq!(loaded.groups.len(), 1);
        assert_eq!(loaded.groups["2021"].len(), 1);
    }

    #[test]
    fn can_group_by_synthetic_parentname() {
        let temp = tempdir().expect("failed to create tempdir");
        write(temp.path(), "tools/a.yaml", "name: a\n");
        write(temp.path(), "books/b.yaml", "name: b\n");

        let loaded =
            load_records(&pattern(temp.path(), "*/*.yaml"), Some("parentname")).expect("loaded");

        assert_eq!(loaded.groups["tools"].len(), 1);
        assert_eq!(loaded.groups["books"].len(), 1);
    }

    #[test]
    fn malformed_and_unreadable_files_are_skipped() {
        let temp = tempdir().expect("failed to create tempdir");
        let good = write(temp.path(), "good.yaml", "name: ok\n");
        let broken = write(temp.path(), "broken.yaml", "name: [unclosed\n");
        let list = write(temp.path(), "list.yaml", "- a\n- b\n");
        let missing = temp.path().join("missing.yaml");

        let loaded = load_records_from_paths([&broken, &missing, &list, &good], None);

        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].sort_value("name"), Some("ok"));
    }

    #[test]
    fn read_record_reports_specific_errors() {
        let temp = tempdir().expect("failed to create tempdir");
        let broken = write(temp.path(), "broken.yaml", "key: [1, 2\n");
        let scalar = write(temp.path(), "scalar.yaml", "hello\n");

        assert!(matches!(
            read_record(&temp.path().join("nope.yaml")),
            Err(Error::Io { .. })
        ));
        assert!(matches!(read_record(&broken), Err(Error::Parse { .. })));
        assert!(matches!(read_record(&scalar), Err(Error::Document { .. })));
    }

    #[test]
    fn empty_file_yields_record_with_synthetic_fields_only() {
        let temp = tempdir().expect("failed to create tempdir");
        let empty = write(temp.path(), "empty.yaml", "");

        let loaded = load_records_from_paths([empty], None);

        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].len(), 3);
    }

    #[test]
    fn double_star_stays_within_one_directory() {
        let temp = tempdir().expect("failed to create tempdir");
        write(temp.path(), "items/deep/er/x.yaml", "name: nested\n");
        write(temp.path(), "items/deep/y.yaml", "name: one-level\n");

        let loaded =
            load_records(&pattern(temp.path(), "items/**/*.yaml"), None).expect("loaded");

        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].sort_value("name"), Some("one-level"));
    }

    #[test]
    fn repeated_stars_inside_a_component_are_accepted() {
        let temp = tempdir().expect("failed to create tempdir");
        write(temp.path(), "abc.yaml", "name: abc\n");
        write(temp.path(), "other.yaml", "name: other\n");

        let loaded = load_records(&pattern(temp.path(), "a**.yaml"), None).expect("loaded");

        assert_eq!(loaded.records.len(), 1);
        assert_eq!(loaded.records[0].sort_value("filename"), Some("abc"));
    }

    #[test]
    fn single_level_pattern_collapses_star_runs() {
        assert_eq!(single_level_pattern("items/**/*.yaml"), "items/*/*.yaml");
        assert_eq!(single_level_pattern("a***b?[xy]"), "a*b?[xy]");
    }

    #[test]
    fn multi_document_file_uses_first_document() {
        let record = parse_record(Path::new("multi.yaml"), b"name: first\n---\nname: second\n")
            .expect("parsed");
        assert_eq!(record.sort_value("name"), Some("first"));
    }

    #[test]
    fn invalid_pattern_is_fatal() {
        let error = load_records("items/[.yaml", None).expect_err("expected pattern error");
        assert!(matches!(error, Error::Pattern { .. }));
    }

    #[test]
    fn empty_match_is_not_an_error() {
        let temp = tempdir().expect("failed to create tempdir");
        let loaded = load_records(&pattern(temp.path(), "*.yaml"), None).expect("loaded");
        assert!(loaded.records.is_empty());
    }
}
