// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Template source resolution.
//!
//! A missing or unreadable template is not fatal: the built-in table template
//! is used instead and the fallback is logged.

use std::{fs, path::Path};

use tracing::{debug, warn};

use crate::error::Error;

/// Project link used in the generated-by notice.
pub const PROJECT_URL: &str = "https://github.com/LinuxSuRen/yaml-readme";

/// Template used when the configured template file cannot be read.
pub const DEFAULT_TEMPLATE: &str = r#"
|中文名称|英文名称|JD|
|---|---|---|
{%- for val in items %}
|{{ val.zh | default(value="") }}|{{ val.en | default(value="") }}|{{ val.jd | default(value="") }}|
{% endfor %}
"#;

/// Loads the template body from `path`, optionally prefixed with the
/// generated-by notice.
///
/// # Parameters
///
/// * `path` - Template file to read.
/// * `include_header` - Whether to prepend the notice line and a blank line.
///
/// # Errors
///
/// The current implementation always succeeds; read failures fall back to
/// [`DEFAULT_TEMPLATE`].
///
/// # Example
///
/// ```
/// use std::path::Path;
///
/// use yaml_readme::{DEFAULT_TEMPLATE, load_template};
///
/// let template = load_template(Path::new("missing.tpl"), false)?;
/// assert_eq!(template, DEFAULT_TEMPLATE);
/// # Ok::<(), yaml_readme::Error>(())
/// ```
pub fn load_template(path: &Path, include_header: bool) -> Result<String, Error> {
    let body = match fs::read_to_string(path) {
        Ok(body) => {
            debug!("Loaded template from {}", path.display());
            body
        }
        Err(error) => {
            warn!(
                "failed to load README template {}, using the default template: {error}",
                path.display()
            );
            DEFAULT_TEMPLATE.to_owned()
        }
    };

    if !include_header {
        return Ok(body);
    }

    let mut template = header_notice(path);
    template.push_str(&body);
    Ok(template)
}

/// Builds the generated-by notice followed by a blank line.
pub fn header_notice(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    format!(
        "> This file was generated by [{name}]({name}) via [yaml-readme]({PROJECT_URL}), please don't edit it directly!\n\n"
    )
}
