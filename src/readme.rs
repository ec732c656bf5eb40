// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! End-to-end README generation.
//!
//! Loads metadata, orders it, resolves the template and renders the result
//! in one synchronous pass.

use std::sync::Arc;

use tracing::{debug, info};

use crate::{
    config::RenderOptions,
    error::Error,
    functions::FunctionRegistry,
    github::GitHubApi,
    loader::load_records,
    render::{RenderData, render},
    template::load_template
};

/// Generates the README text described by `options`.
///
/// # Arguments
///
/// * `options` - Pattern, template, header, sort and group settings.
/// * `api` - GitHub collaborator used by the fetching template helpers.
///
/// # Errors
///
/// Returns [`Error::Pattern`] for an invalid glob and [`Error::Template`]
/// when the template cannot be parsed or executed. Unreadable metadata files
/// and a missing template are logged, not returned.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use yaml_readme::{OfflineApi, RenderOptions, generate_readme};
///
/// # fn main() -> Result<(), yaml_readme::Error> {
/// let options = RenderOptions::default().with_sort_by("!year");
/// let readme = generate_readme(&options, Arc::new(OfflineApi))?;
/// print!("{readme}");
/// # Ok(())
/// # }
/// ```
pub fn generate_readme(options: &RenderOptions, api: Arc<dyn GitHubApi>) -> Result<String, Error> {
    let group_by = options.group_by.as_deref();
    let mut loaded = load_records(&options.pattern, group_by)?;

    if let Some(sort) = &options.sort {
        debug!(
            "Sorting {} records by {} ({})",
            loaded.records.len(),
            sort.field,
            if sort.descending { "descending" } else { "ascending" }
        );
        sort.apply(&mut loaded.records);
    }

    let template = load_template(&options.template, options.include_header)?;
    let registry = FunctionRegistry::new(&template, api);

    let data = match group_by {
        Some(_) => RenderData::Groups(&loaded.groups),
        None => RenderData::Records(&loaded.records)
    };
    let output = render(&template, &registry, data)?;

    info!(
        "Rendered {} records from {} into {} bytes",
        loaded.records.len(),
        options.pattern,
        output.len()
    );
    Ok(output)
}
