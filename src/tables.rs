// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Template helpers that fetch from GitHub and format the result.
//!
//! Every helper follows the same contract: a failed fetch is logged and the
//! helper returns its empty form instead of an error, so a flaky network never
//! breaks a render.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::{
    github::{Contributor, GitHubApi, Repository, UserProfile},
    markdown::{self, escape_html}
};

/// Contributor cells per table row.
pub const CONTRIBUTORS_PER_ROW: usize = 6;
/// Number of companies listed by [`stargazer_companies`].
pub const TOP_COMPANIES: usize = 5;

/// HTML table of contributor avatars for `owner/repo`.
///
/// Returns an empty string when the contributor list cannot be fetched.
pub fn contributors_table(api: &dyn GitHubApi, owner: &str, repo: &str) -> String {
    let contributors = match api.contributors(owner, repo) {
        Ok(contributors) => contributors,
        Err(error) => {
            warn!("failed to fetch contributors of {}/{}: {}", owner, repo, error);
            return String::new();
        }
    };
    debug!("Rendering {} contributors of {}/{}", contributors.len(), owner, repo);

    let mut rows = String::new();
    for chunk in contributors.chunks(CONTRIBUTORS_PER_ROW) {
        rows.push_str("<tr>");
        for contributor in chunk {
            rows.push_str(&contributor_cell(contributor));
        }
        rows.push_str("\n</tr>");
    }
    format!("<table>{rows}</table>\n")
}

fn contributor_cell(contributor: &Contributor) -> String {
    let login = escape_html(&contributor.login);
    format!(
        "\n\t<td align=\"center\">\n\t\t<a href=\"{}\">\n\t\t\t<img src=\"{}\" width=\"100;\" alt=\"{login}\"/>\n\t\t\t<br />\n\t\t\t<sub><b>{login}</b></sub>\n\t\t</a>\n\t</td>",
        escape_html(&contributor.html_url),
        escape_html(&contributor.avatar_url)
    )
}

/// HTML table of the most common companies among stargazers of
/// `owner/repo`, with their counts.
///
/// Stargazers whose profile cannot be fetched or has no company are skipped.
/// Ties are ordered by company name.
pub fn stargazer_companies(api: &dyn GitHubApi, owner: &str, repo: &str) -> String {
    let stargazers = match api.stargazers(owner, repo) {
        Ok(stargazers) => stargazers,
        Err(error) => {
            warn!("failed to fetch stargazers of {}/{}: {}", owner, repo, error);
            Vec::new()
        }
    };

    let mut companies: HashMap<String, usize> = HashMap::new();
    for stargazer in &stargazers {
        match api.user(&stargazer.login) {
            Ok(UserProfile {
                company: Some(company),
                ..
            }) if !company.trim().is_empty() => {
                *companies.entry(company.trim().to_owned()).or_default() += 1;
            }
            Ok(_) => {}
            Err(error) => warn!("failed to fetch user {}: {}", stargazer.login, error)
        }
    }

    let mut ranked: Vec<(String, usize)> = companies.into_iter().collect();
    ranked.sort_by(|(left_name, left), (right_name, right)| {
        right.cmp(left).then_with(|| left_name.cmp(right_name))
    });
    ranked.truncate(TOP_COMPANIES);

    let rows: String = ranked
        .iter()
        .map(|(name, count)| format!("<tr><td>{}</td><td>{count}</td></tr>", escape_html(name)))
        .collect();
    format!("<table>{rows}</table>")
}

/// Markdown table of the repositories of `owner` that publish GitHub Pages.
///
/// Returns an empty string when the listing cannot be fetched.
pub fn pages_table(api: &dyn GitHubApi, owner: &str) -> String {
    let repositories = match api.repositories(owner) {
        Ok(repositories) => repositories,
        Err(error) => {
            warn!("failed to fetch repositories of {}: {}", owner, error);
            return String::new();
        }
    };

    let rows: Vec<String> = repositories
        .iter()
        .filter(|repository| repository.has_pages)
        .map(pages_row)
        .collect();
    format!("||||\n|---|---|---|\n{}", rows.join("\n"))
}

fn pages_row(repository: &Repository) -> String {
    let owner = &repository.owner.login;
    let name = &repository.name;
    format!(
        "|{name}|![GitHub Repo stars](https://img.shields.io/github/stars/{owner}/{name}?style=social)|[view](https://{owner}.github.io/{name}/)|"
    )
}

/// Markdown link to the GitHub profile of `id`, optionally followed by the
/// user's bio.
///
/// Text containing whitespace is not an id and is returned unchanged. Text
/// that already is a markdown link is returned unchanged, or re-resolved from
/// the id it points at when `bio` is requested. A failed lookup returns `id`.
pub fn user_link(api: &dyn GitHubApi, id: &str, bio: bool) -> String {
    if id.contains(' ') {
        return id.to_owned();
    }

    if markdown::has_link(id) {
        if bio {
            let extracted = markdown::id_from_link(id);
            if extracted != id {
                return user_link(api, &extracted, bio);
            }
        }
        return id.to_owned();
    }

    let user = match api.user(id) {
        Ok(user) => user,
        Err(error) => {
            warn!("failed to fetch user {}: {}", id, error);
            return id.to_owned();
        }
    };

    let name = user
        .name
        .as_deref()
        .filter(|name| !name.is_empty())
        .unwrap_or(id);
    let mut output = format!("[{name}]({})", user.html_url);
    if bio && let Some(text) = user.bio.as_deref().filter(|text| !text.is_empty()) {
        output.push_str(&format!(" ({text})"));
    }
    output
}

/// Applies [`user_link`] to every id in `ids` separated by `sep`.
///
/// An empty separator means a single space. Comma-separated input is joined
/// back with `", "`.
pub fn user_links(api: &dyn GitHubApi, ids: &str, sep: &str) -> String {
    let sep = if sep.is_empty() { " " } else { sep };
    let links: Vec<String> = ids
        .split(sep)
        .map(|id| user_link(api, id.trim(), false))
        .collect();
    let joiner = if sep == "," { ", " } else { sep };
    links.join(joiner)
}

/// Two-column markdown table describing user `id`.
///
/// Only the header is returned when the profile cannot be fetched; empty
/// fields are omitted.
pub fn user_table(api: &dyn GitHubApi, id: &str) -> String {
    let mut table = String::from("|||\n|---|---|\n");
    let user = match api.user(id) {
        Ok(user) => user,
        Err(error) => {
            warn!("failed to fetch user {}: {}", id, error);
            return table;
        }
    };

    let twitter = user
        .twitter_username
        .as_deref()
        .map(|handle| format!("[{handle}](https://twitter.com/{handle})"));
    let rows = [
        ("Name", user.name.clone()),
        ("Location", user.location.clone()),
        ("Bio", user.bio.clone()),
        ("Blog", user.blog.clone()),
        ("Twitter", twitter),
        ("Organization", user.company.clone())
    ];
    for (title, value) in rows {
        if let Some(value) = value.filter(|value| !value.is_empty()) {
            table.push_str(&format!("| {title} | {value} |\n"));
        }
    }
    table
}
