// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Template execution against loaded records.
//!
//! Flat record lists are exposed to templates as `items`; grouped records as
//! `groups`, a map from group key to the records of that group.
//!
//! Records are sparse: a field present in one record may be missing from
//! another. Every record handed to the template carries each field seen in
//! the rendered collection, with `null` where its own document has none, so
//! `{{ item.ok | render }}` works on columns only some records fill in.

use std::collections::{BTreeMap, BTreeSet};

use tera::{Context, Tera};
use tracing::debug;

use crate::{
    error::Error,
    functions::FunctionRegistry,
    loader::GroupedRecords,
    record::{MetadataRecord, MetadataValue}
};

/// Name under which the template is registered in Tera.
const TEMPLATE_NAME: &str = "readme";
/// Context key holding the flat record list.
pub const ITEMS_KEY: &str = "items";
/// Context key holding the grouped records.
pub const GROUPS_KEY: &str = "groups";

/// Data a template is rendered against.
#[derive(Debug, Clone, Copy)]
pub enum RenderData<'a> {
    /// Flat record list, iterated as `items`.
    Records(&'a [MetadataRecord]),
    /// Grouped records, iterated as `groups`.
    Groups(&'a GroupedRecords)
}

impl RenderData<'_> {
    fn context(&self) -> Result<Context, Error> {
        let (key, value) = match self {
            Self::Records(records) => {
                let fields = field_names(records.iter());
                (ITEMS_KEY, serde_json::to_value(fill_absent(records, &fields))?)
            }
            Self::Groups(groups) => {
                let fields = field_names(groups.values().flatten());
                let filled: BTreeMap<&String, Vec<MetadataRecord>> = groups
                    .iter()
                    .map(|(group, records)| (group, fill_absent(records, &fields)))
                    .collect();
                (GROUPS_KEY, serde_json::to_value(filled)?)
            }
        };
        let mut context = Context::new();
        context.insert(key, &value);
        Ok(context)
    }
}

fn field_names<'r, I>(records: I) -> BTreeSet<&'r str>
where
    I: IntoIterator<Item = &'r MetadataRecord>
{
    records
        .into_iter()
        .flat_map(|record| record.iter().map(|(field, _)| field.as_str()))
        .collect()
}

fn fill_absent(records: &[MetadataRecord], fields: &BTreeSet<&str>) -> Vec<MetadataRecord> {
    records
        .iter()
        .map(|record| {
            let mut filled = record.clone();
            for field in fields {
                if filled.get(field).is_none() {
                    filled.insert(*field, MetadataValue::Null);
                }
            }
            filled
        })
        .collect()
}

/// Renders `template` with the helpers of `registry` against `data`.
///
/// # Errors
///
/// Returns [`Error::Template`] when the template cannot be parsed or its
/// execution fails (unknown function, bad argument, type mismatch). No
/// partial output is returned in that case.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use yaml_readme::{FunctionRegistry, MetadataRecord, OfflineApi, RenderData, render};
///
/// let mut record = MetadataRecord::new();
/// record.insert("name", "demo");
/// let template = "{% for item in items %}{{ item.name }}{% endfor %}";
/// let registry = FunctionRegistry::new(template, Arc::new(OfflineApi));
/// let output = render(template, &registry, RenderData::Records(&[record]))?;
/// assert_eq!(output, "demo");
/// # Ok::<(), yaml_readme::Error>(())
/// ```
pub fn render(
    template: &str,
    registry: &FunctionRegistry,
    data: RenderData<'_>
) -> Result<String, Error> {
    let mut tera = Tera::default();
    tera.autoescape_on(Vec::new());
    registry.install(&mut tera);
    tera.add_raw_template(TEMPLATE_NAME, template)
        .map_err(|error| Error::template(&error))?;

    let context = data.context()?;
    debug!("Rendering template of {} bytes", template.len());
    tera.render(TEMPLATE_NAME, &context)
        .map_err(|error| Error::template(&error))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{github::OfflineApi, loader::load_records_from_paths, record::MetadataValue};

    fn registry(template: &str) -> FunctionRegistry {
        FunctionRegistry::new(template, Arc::new(OfflineApi))
    }

    fn record(fields: &[(&str, MetadataValue)]) -> MetadataRecord {
        fields
            .iter()
            .map(|(key, value)| ((*key).to_owned(), value.clone()))
            .collect()
    }

    fn run(template: &str, data: RenderData<'_>) -> Result<String, Error> {
        render(template, &registry(template), data)
    }

    #[test]
    fn renders_flat_records_as_items() {
        let records = vec![
            record(&[("name", "a".into()), ("ok", MetadataValue::Bool(true))]),
            record(&[("name", "b".into()), ("ok", MetadataValue::Bool(false))]),
        ];
        let template = "{% for item in items %}|{{ item.name }}|{{ item.ok | render }}|\n{% endfor %}";

        let output = run(template, RenderData::Records(&records)).expect("rendered");

        assert_eq!(output, "|a|:white_check_mark:|\n|b|:x:|\n");
    }

    #[test]
    fn renders_groups_by_key() {
        let mut groups = GroupedRecords::new();
        groups.insert("2021".into(), vec![record(&[("name", "a".into())])]);
        groups.insert(
            "2022".into(),
            vec![record(&[("name", "b".into())]), record(&[("name", "c".into())])]
        );
        let template = "{% for year, records in groups %}## {{ year }}\n{% for r in records %}- {{ r.name }}\n{% endfor %}{% endfor %}";

        let output = run(template, RenderData::Groups(&groups)).expect("rendered");

        assert_eq!(output, "## 2021\n- a\n## 2022\n- b\n- c\n");
    }

    #[test]
    fn fields_missing_from_some_records_render_as_empty() {
        let records = vec![
            record(&[("name", "a".into()), ("ok", MetadataValue::Bool(true))]),
            record(&[("name", "b".into())]),
        ];
        let template = "{% for i in items %}{{ i.name }}={{ i.ok | render }}/{{ render(value=i.ok) }};{% endfor %}";

        let output = run(template, RenderData::Records(&records)).expect("rendered");

        assert_eq!(output, "a=:white_check_mark:/:white_check_mark:;b=/;");
    }

    #[test]
    fn sparse_fields_are_filled_across_groups() {
        let mut groups = GroupedRecords::new();
        groups.insert("2021".into(), vec![record(&[("name", "a".into())])]);
        groups.insert(
            "2022".into(),
            vec![record(&[("name", "b".into()), ("ok", MetadataValue::Bool(false))])]
        );
        let template = "{% for year, records in groups %}{% for r in records %}{{ r.name }}{{ r.ok | render }};{% endfor %}{% endfor %}";

        let output = run(template, RenderData::Groups(&groups)).expect("rendered");

        assert_eq!(output, "a;b:x:;");
    }

    #[test]
    fn does_not_escape_html() {
        let records = vec![record(&[("html", "<b>&</b>".into())])];
        let output = run("{{ items.0.html }}", RenderData::Records(&records)).expect("rendered");
        assert_eq!(output, "<b>&</b>");
    }

    #[test]
    fn parse_errors_are_template_errors() {
        let error = run("{% for item in items %}", RenderData::Records(&[])).expect_err("parse error");
        assert!(matches!(error, Error::Template { .. }));
    }

    #[test]
    fn unknown_functions_are_template_errors() {
        let error = run("{{ nope() }}", RenderData::Records(&[])).expect_err("render error");
        match error {
            Error::Template {
                message
            } => assert!(message.contains("nope")),
            other => panic!("unexpected error variant: {other:?}")
        }
    }

    #[test]
    fn echo_round_trip_reproduces_parsed_values() {
        let temp = tempfile::tempdir().expect("failed to create tempdir");
        let path = temp.path().join("item.yaml");
        std::fs::write(
            &path,
            "name: demo\nyear: 2022\nscore: 1.5\nactive: true\ntags: [x, y]\nmeta:\n  k: v\n"
        )
        .expect("failed to write fixture");
        let loaded = load_records_from_paths([&path], None);

        let template = "{% for item in items %}{{ item | json_encode() }}{% endfor %}";
        let output = run(template, RenderData::Records(&loaded.records)).expect("rendered");

        let mut echoed: serde_json::Value = serde_json::from_str(&output).expect("json output");
        let object = echoed.as_object_mut().expect("object");
        for synthetic in crate::record::TEMPLATE_VARIABLES {
            assert!(object.remove(*synthetic).is_some());
        }
        assert_eq!(
            echoed,
            serde_json::json!({
                "name": "demo",
                "year": 2022,
                "score": 1.5,
                "active": true,
                "tags": ["x", "y"],
                "meta": {"k": "v"}
            })
        );
    }
}
