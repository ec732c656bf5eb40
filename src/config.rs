// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Options controlling a single README generation run.
//!
//! The CLI builds a [`RenderOptions`] from its flags; library callers can
//! start from [`RenderOptions::default`], which mirrors the CLI defaults.

use std::path::PathBuf;

use crate::sort::SortKey;

/// Default glob pattern for metadata files.
pub const DEFAULT_PATTERN: &str = "items/*.yaml";
/// Default template file.
pub const DEFAULT_TEMPLATE_PATH: &str = "README.tpl";
/// Environment variable consulted when no explicit token is given.
pub const FALLBACK_TOKEN_ENV: &str = "GH_TOKEN";

/// Inputs of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Glob pattern selecting metadata files.
    pub pattern:        String,
    /// Template file; a missing file falls back to the default template.
    pub template:       PathBuf,
    /// Whether to prepend the generated-by notice.
    pub include_header: bool,
    /// Optional ordering of the flat record list.
    pub sort:           Option<SortKey>,
    /// Optional group-by field; when set, templates receive `groups`.
    pub group_by:       Option<String>
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pattern:        DEFAULT_PATTERN.to_owned(),
            template:       PathBuf::from(DEFAULT_TEMPLATE_PATH),
            include_header: true,
            sort:           None,
            group_by:       None
        }
    }
}

impl RenderOptions {
    /// Sets the sort key from a `--sort-by` style value (`field` or `!field`).
    pub fn with_sort_by(mut self, raw: &str) -> Self {
        self.sort = SortKey::parse(raw);
        self
    }

    /// Sets the group-by field; blank values disable grouping.
    pub fn with_group_by(mut self, field: &str) -> Self {
        let field = field.trim();
        self.group_by = (!field.is_empty()).then(|| field.to_owned());
        self
    }
}

/// Resolves the GitHub token: the explicit value when present, otherwise
/// `GH_TOKEN`. Blank values count as absent.
pub fn resolve_token(explicit: Option<String>) -> Option<String> {
    resolve_token_with(explicit, |name| std::env::var(name).ok())
}

fn resolve_token_with<F>(explicit: Option<String>, lookup: F) -> Option<String>
where
    F: FnOnce(&str) -> Option<String>
{
    explicit
        .filter(|token| !token.trim().is_empty())
        .or_else(|| lookup(FALLBACK_TOKEN_ENV).filter(|token| !token.trim().is_empty()))
}
