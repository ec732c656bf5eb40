//! Generate README documents from YAML metadata and a template.
//!
//! The library collects metadata files selected by a glob pattern, attaches
//! file-derived fields, optionally sorts or groups the records, and renders a
//! Tera template against them. Templates get a set of markdown and GitHub
//! helpers (tables of contents, contributor tables, user links) registered as
//! functions and filters.

mod config;
mod error;
mod functions;
mod github;
mod loader;
mod markdown;
mod readme;
mod record;
mod render;
mod sort;
mod tables;
mod template;

pub use config::{
    DEFAULT_PATTERN, DEFAULT_TEMPLATE_PATH, FALLBACK_TOKEN_ENV, RenderOptions, resolve_token
};
pub use error::{Error, io_error, parse_error};
pub use functions::{FUNCTION_NAMES, FunctionRegistry, print_help};
pub use github::{
    Contributor, GitHubApi, OctocrabApi, OfflineApi, Repository, RepositoryOwner, Stargazer,
    UserProfile
};
pub use loader::{
    GroupedRecords, LoadedRecords, load_records, load_records_from_paths, parse_record,
    read_record
};
pub use markdown::{
    CHECK_MARK, CROSS_MARK, emoji_link, generate_toc, id_from_link, link, link_or_empty,
    render_value, star_history, visitor_count
};
pub use readme::generate_readme;
pub use record::{
    FILENAME_FIELD, FULLPATH_FIELD, IGNORE_FIELD, MetadataRecord, MetadataValue,
    PARENTNAME_FIELD, TEMPLATE_VARIABLES
};
pub use render::{GROUPS_KEY, ITEMS_KEY, RenderData, render};
pub use sort::{SortKey, sort_records};
pub use tables::{
    contributors_table, pages_table, stargazer_companies, user_link, user_links, user_table
};
pub use template::{DEFAULT_TEMPLATE, PROJECT_URL, header_notice, load_template};
