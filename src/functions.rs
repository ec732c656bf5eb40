// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Named helpers injected into the Tera environment.
//!
//! A [`FunctionRegistry`] is built for each render. It carries the raw
//! template text (for `printToc`) and the GitHub collaborator (for the
//! fetching helpers) instead of reaching for process-wide state.
//!
//! Tera passes arguments by name, e.g. `{{ printContributors(owner="o",
//! repo="r") }}`. A missing or mistyped argument is a render error; a failed
//! fetch or subprocess is not. Record fields that a record lacks reach the
//! helpers as `null` (see [`crate::render`]); `render` turns them into empty
//! text.

use std::{collections::HashMap, process::Command, sync::Arc};

use tera::{Tera, Value};
use tracing::warn;

use crate::{github::GitHubApi, markdown, tables};

/// Names of every function and filter registered by [`FunctionRegistry`].
pub const FUNCTION_NAMES: &[&str] = &[
    "gh",
    "ghEmoji",
    "ghID",
    "ghs",
    "link",
    "linkOrEmpty",
    "printContributors",
    "printGHTable",
    "printHelp",
    "printPages",
    "printStarHistory",
    "printStargazers",
    "printToc",
    "printVisitorCount",
    "render",
    "repeat"
];

type Args = HashMap<String, Value>;

/// Per-render set of template helpers.
#[derive(Clone)]
pub struct FunctionRegistry {
    template: Arc<str>,
    api:      Arc<dyn GitHubApi>
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("template_len", &self.template.len())
            .finish_non_exhaustive()
    }
}

impl FunctionRegistry {
    /// Creates a registry for `template`, fetching remote data through `api`.
    pub fn new(template: &str, api: Arc<dyn GitHubApi>) -> Self {
        Self {
            template: Arc::from(template),
            api
        }
    }

    /// Registers every helper on `tera`.
    pub fn install(&self, tera: &mut Tera) {
        let template = Arc::clone(&self.template);
        tera.register_function("printToc", move |_: &Args| -> tera::Result<Value> {
            Ok(Value::String(markdown::generate_toc(&template)))
        });

        tera.register_function("printHelp", |args: &Args| -> tera::Result<Value> {
            let cmd = string_arg(args, "printHelp", "cmd")?;
            Ok(Value::String(print_help(&cmd)))
        });

        let api = Arc::clone(&self.api);
        tera.register_function("printContributors", move |args: &Args| -> tera::Result<Value> {
            let owner = string_arg(args, "printContributors", "owner")?;
            let repo = string_arg(args, "printContributors", "repo")?;
            Ok(Value::String(tables::contributors_table(api.as_ref(), &owner, &repo)))
        });

        let api = Arc::clone(&self.api);
        tera.register_function("printStargazers", move |args: &Args| -> tera::Result<Value> {
            let owner = string_arg(args, "printStargazers", "owner")?;
            let repo = string_arg(args, "printStargazers", "repo")?;
            Ok(Value::String(tables::stargazer_companies(api.as_ref(), &owner, &repo)))
        });

        let api = Arc::clone(&self.api);
        tera.register_function("printPages", move |args: &Args| -> tera::Result<Value> {
            let owner = string_arg(args, "printPages", "owner")?;
            Ok(Value::String(tables::pages_table(api.as_ref(), &owner)))
        });

        let api = Arc::clone(&self.api);
        tera.register_function("gh", move |args: &Args| -> tera::Result<Value> {
            let id = string_arg(args, "gh", "id")?;
            let bio = bool_arg(args, "gh", "bio")?;
            Ok(Value::String(tables::user_link(api.as_ref(), &id, bio)))
        });

        let api = Arc::clone(&self.api);
        tera.register_function("ghs", move |args: &Args| -> tera::Result<Value> {
            let ids = string_arg(args, "ghs", "ids")?;
            let sep = optional_string_arg(args, "ghs", "sep")?.unwrap_or_default();
            Ok(Value::String(tables::user_links(api.as_ref(), &ids, &sep)))
        });

        let api = Arc::clone(&self.api);
        tera.register_function("printGHTable", move |args: &Args| -> tera::Result<Value> {
            let id = string_arg(args, "printGHTable", "id")?;
            Ok(Value::String(tables::user_table(api.as_ref(), &id)))
        });

        tera.register_function("ghID", |args: &Args| -> tera::Result<Value> {
            let link = string_arg(args, "ghID", "link")?;
            Ok(Value::String(markdown::id_from_link(&link)))
        });

        tera.register_function("ghEmoji", |args: &Args| -> tera::Result<Value> {
            let user = string_arg(args, "ghEmoji", "user")?;
            Ok(Value::String(markdown::emoji_link(&user)))
        });

        tera.register_function("printStarHistory", |args: &Args| -> tera::Result<Value> {
            let owner = string_arg(args, "printStarHistory", "owner")?;
            let repo = string_arg(args, "printStarHistory", "repo")?;
            Ok(Value::String(markdown::star_history(&owner, &repo)))
        });

        tera.register_function("printVisitorCount", |args: &Args| -> tera::Result<Value> {
            let id = string_arg(args, "printVisitorCount", "id")?;
            Ok(Value::String(markdown::visitor_count(&id)))
        });

        tera.register_function("link", |args: &Args| -> tera::Result<Value> {
            let text = string_arg(args, "link", "text")?;
            let target = optional_string_arg(args, "link", "link")?.unwrap_or_default();
            Ok(Value::String(markdown::link(&text, &target)))
        });

        tera.register_function("linkOrEmpty", |args: &Args| -> tera::Result<Value> {
            let text = string_arg(args, "linkOrEmpty", "text")?;
            let target = optional_string_arg(args, "linkOrEmpty", "link")?.unwrap_or_default();
            Ok(Value::String(markdown::link_or_empty(&text, &target)))
        });

        tera.register_function("render", |args: &Args| -> tera::Result<Value> {
            let value = args.get("value").unwrap_or(&Value::Null);
            Ok(Value::String(markdown::render_value(value)))
        });
        tera.register_filter("render", render_filter);
        tera.register_filter("repeat", repeat_filter);
    }
}

/// Runs `<cmd> --help` and wraps its output in a shell code fence.
///
/// Returns an empty string, after logging, when the command cannot be run or
/// exits unsuccessfully.
pub fn print_help(cmd: &str) -> String {
    match Command::new(cmd).arg("--help").output() {
        Ok(output) if output.status.success() => {
            format!("```shell\n{}\n```", String::from_utf8_lossy(&output.stdout))
        }
        Ok(output) => {
            warn!("failed to run command {} --help: exited with {}", cmd, output.status);
            String::new()
        }
        Err(error) => {
            warn!("failed to run command {} --help: {}", cmd, error);
            String::new()
        }
    }
}

fn render_filter(value: &Value, _: &Args) -> tera::Result<Value> {
    Ok(Value::String(markdown::render_value(value)))
}

fn repeat_filter(value: &Value, args: &Args) -> tera::Result<Value> {
    let text = match value {
        Value::String(text) => text.clone(),
        other => other.to_string()
    };
    let count = args
        .get("n")
        .and_then(Value::as_u64)
        .ok_or_else(|| tera::Error::msg("filter `repeat` expects a non-negative integer `n`"))?;
    let count = usize::try_from(count).map_err(|e| tera::Error::msg(e.to_string()))?;
    Ok(Value::String(text.repeat(count)))
}

fn optional_string_arg(args: &Args, function: &str, name: &str) -> tera::Result<Option<String>> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(tera::Error::msg(format!(
            "function `{function}` expects `{name}` to be a string, got {other}"
        )))
    }
}

fn string_arg(args: &Args, function: &str, name: &str) -> tera::Result<String> {
    optional_string_arg(args, function, name)?.ok_or_else(|| {
        tera::Error::msg(format!("function `{function}` requires argument `{name}`"))
    })
}

fn bool_arg(args: &Args, function: &str, name: &str) -> tera::Result<bool> {
    match args.get(name) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(value)) => Ok(*value),
        Some(other) => Err(tera::Error::msg(format!(
            "function `{function}` expects `{name}` to be a boolean, got {other}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::{github::OfflineApi, tables::tests::FakeApi};

    fn render_with(template: &str, api: Arc<dyn GitHubApi>) -> tera::Result<String> {
        let mut tera = Tera::default();
        FunctionRegistry::new(template, api).install(&mut tera);
        tera.add_raw_template("t", template)?;
        tera.render("t", &tera::Context::new())
    }

    fn offline(template: &str) -> tera::Result<String> {
        render_with(template, Arc::new(OfflineApi))
    }

    #[test]
    fn names_are_sorted_and_unique() {
        let mut sorted = FUNCTION_NAMES.to_vec();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(sorted, FUNCTION_NAMES);
    }

    #[test]
    fn print_toc_reads_the_registry_template() {
        let output = offline("{{ printToc() }}\n## Install\n### Usage\n").expect("rendered");
        assert!(output.starts_with("- [Install](#install)\n - [Usage](#usage)\n"));
    }

    #[test]
    fn render_function_and_filter_agree() {
        let output = offline(
            "{% set no = false %}{% set n = 3 %}{{ render(value=true) }} {{ no | render }} {{ \"x\" | render }} [{{ n | render }}]"
        )
        .expect("rendered");
        assert_eq!(output, ":white_check_mark: :x: x []");
    }

    #[test]
    fn pure_helpers_format_links() {
        let output = offline(
            "{{ link(text=\"a\", link=\"b\") }}|{{ linkOrEmpty(text=\"a\") }}|{{ ghEmoji(user=\"o\") }}|{{ ghID(link=\"[R](https://github.com/r)\") }}"
        )
        .expect("rendered");
        assert_eq!(output, "[a](b)||[:octocat:](https://github.com/o)|r");
    }

    #[test]
    fn badge_helpers_format_images() {
        let output = offline(
            "{{ printVisitorCount(id=\"me\") }}\n{{ printStarHistory(owner=\"o\", repo=\"r\") }}"
        )
        .expect("rendered");
        assert!(output.contains("profile-counter.glitch.me/me/count.svg"));
        assert!(output.contains("repos=o/r&type=Date"));
    }

    #[test]
    fn repeat_filter_repeats_strings() {
        assert_eq!(offline("{{ \"ab\" | repeat(n=3) }}").expect("rendered"), "ababab");
        assert!(offline("{{ \"ab\" | repeat }}").is_err());
    }

    #[test]
    fn missing_arguments_fail_the_render() {
        assert!(offline("{{ printContributors(owner=\"o\") }}").is_err());
        assert!(offline("{{ printVisitorCount(id=1) }}").is_err());
        assert!(offline("{{ gh(id=\"x\", bio=\"yes\") }}").is_err());
    }

    #[test]
    fn fetch_failures_render_empty_output() {
        let output =
            offline("[{{ printContributors(owner=\"o\", repo=\"r\") }}][{{ printPages(owner=\"o\") }}]")
                .expect("rendered");
        assert_eq!(output, "[][]");
    }

    #[test]
    fn injected_api_feeds_github_helpers() {
        let api = FakeApi {
            contributors: Some(vec![crate::tables::tests::contributor("octocat")]),
            ..FakeApi::default()
        }
        .with_user("octocat", "Octo", Some("hello"));

        let output = render_with(
            "{{ printContributors(owner=\"o\", repo=\"r\") }}{{ gh(id=\"octocat\", bio=true) }}|{{ ghs(ids=\"octocat,nobody\", sep=\",\") }}",
            Arc::new(api)
        )
        .expect("rendered");

        assert!(output.contains("<sub><b>octocat</b></sub>"));
        assert!(output.contains("[Octo](https://github.com/octocat) (hello)|"));
        assert!(output.ends_with("[Octo](https://github.com/octocat), nobody"));
    }

    #[cfg(unix)]
    #[test]
    fn print_help_fences_command_output() {
        use std::{fs, os::unix::fs::PermissionsExt};

        let temp = tempfile::tempdir().expect("failed to create tempdir");
        let script = temp.path().join("demo-cli");
        fs::write(&script, "#!/bin/sh\necho \"usage: demo-cli $1\"\n").expect("failed to write script");
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755))
            .expect("failed to mark script executable");

        let output = print_help(script.to_str().expect("utf8 path"));

        assert_eq!(output, "```shell\nusage: demo-cli --help\n\n```");
    }

    #[test]
    fn print_help_fails_quietly_for_unknown_command() {
        assert_eq!(print_help("definitely-not-a-real-command-xyz"), "");
    }

    #[test]
    fn render_filter_handles_json_values() {
        let args = Args::new();
        assert_eq!(render_filter(&json!(true), &args).expect("ok"), json!(":white_check_mark:"));
        assert_eq!(render_filter(&json!({"a": 1}), &args).expect("ok"), json!(""));
    }
}
