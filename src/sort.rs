// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Stable ordering of metadata records by a named field.
//!
//! Only string values take part in the comparison. Records whose field is
//! missing or holds any other kind rank below every string, so they gather at
//! the start of an ascending sort and at the end of a descending one while
//! keeping their discovery order.

use std::cmp::Ordering;

use crate::record::MetadataRecord;

/// Prefix that selects ascending order on the command line.
const ASCENDING_PREFIX: char = '!';

/// Sort field and direction parsed from a `--sort-by` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    /// Record field compared during sorting.
    pub field:      String,
    /// `true` for descending order.
    pub descending: bool
}

impl SortKey {
    /// Parses `field` (descending) or `!field` (ascending).
    ///
    /// Returns `None` for blank input or a bare `!`.
    ///
    /// # Examples
    ///
    /// ```
    /// use yaml_readme::SortKey;
    ///
    /// let key = SortKey::parse("!year").expect("sort key");
    /// assert_eq!(key.field, "year");
    /// assert!(!key.descending);
    /// assert!(SortKey::parse("").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let (field, descending) = match raw.strip_prefix(ASCENDING_PREFIX) {
            Some(rest) => (rest.trim(), false),
            None => (raw, true)
        };
        if field.is_empty() {
            return None;
        }
        Some(Self {
            field: field.to_owned(),
            descending
        })
    }

    /// Sorts `records` in place according to this key.
    pub fn apply(&self, records: &mut [MetadataRecord]) {
        sort_records(records, &self.field, self.descending);
    }
}

/// Sorts records in place by the string value of `field`.
///
/// The sort is stable: records with equal keys, and records without a string
/// key, retain their relative order.
pub fn sort_records(records: &mut [MetadataRecord], field: &str, descending: bool) {
    records.sort_by(|left, right| {
        let ordering = compare_keys(left.sort_value(field), right.sort_value(field));
        if descending {
            ordering.reverse()
        } else {
            ordering
        }
    });
}

fn compare_keys(left: Option<&str>, right: Option<&str>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.as_bytes().cmp(right.as_bytes()),
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (None, None) => Ordering::Equal
    }
}
