// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! GitHub REST API collaborator used by the template helpers.
//!
//! Template functions only see the [`GitHubApi`] trait, so tests can swap in a
//! fake implementation. [`OctocrabApi`] is the production implementation; it
//! owns a current-thread tokio runtime and blocks on every request, keeping
//! the rendering pipeline synchronous.

use masterror::AppError;
use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use serde::{Deserialize, Serialize};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// Contributor entry from `/repos/{owner}/{repo}/contributors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    /// GitHub login.
    pub login:      String,
    /// Avatar image URL.
    pub avatar_url: String,
    /// Profile page URL.
    pub html_url:   String
}

/// Stargazer entry from `/repos/{owner}/{repo}/stargazers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stargazer {
    /// GitHub login.
    pub login: String
}

/// Repository owner as embedded in repository listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryOwner {
    /// GitHub login of the owner.
    pub login: String
}

/// Repository entry from `/users/{owner}/repos`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    /// Repository name.
    pub name:      String,
    /// Owning account.
    pub owner:     RepositoryOwner,
    /// Whether GitHub Pages is enabled.
    #[serde(default)]
    pub has_pages: bool
}

/// User profile from `/users/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// GitHub login.
    #[serde(default)]
    pub login:            String,
    /// Display name.
    #[serde(default)]
    pub name:             Option<String>,
    /// Profile page URL.
    #[serde(default)]
    pub html_url:         String,
    /// Free-form biography.
    #[serde(default)]
    pub bio:              Option<String>,
    /// Location text.
    #[serde(default)]
    pub location:         Option<String>,
    /// Blog or homepage URL.
    #[serde(default)]
    pub blog:             Option<String>,
    /// Twitter handle without `@`.
    #[serde(default)]
    pub twitter_username: Option<String>,
    /// Company text.
    #[serde(default)]
    pub company:          Option<String>
}

/// Narrow view of the GitHub REST API needed by the template helpers.
///
/// Implementations report failures as [`AppError`]; the helpers translate
/// any error into empty output.
pub trait GitHubApi: Send + Sync {
    /// Lists contributors of `owner/repo`.
    fn contributors(&self, owner: &str, repo: &str) -> Result<Vec<Contributor>, AppError>;

    /// Lists users that starred `owner/repo`.
    fn stargazers(&self, owner: &str, repo: &str) -> Result<Vec<Stargazer>, AppError>;

    /// Fetches the profile of user `id`.
    fn user(&self, id: &str) -> Result<UserProfile, AppError>;

    /// Lists repositories owned by `owner`, most recently updated first.
    fn repositories(&self, owner: &str) -> Result<Vec<Repository>, AppError>;
}

#[derive(Debug, Serialize)]
struct RepositoryQuery {
    #[serde(rename = "type")]
    kind:     &'static str,
    per_page: u8,
    sort:     &'static str
}

/// [`GitHubApi`] backed by octocrab.
pub struct OctocrabApi {
    client:  Octocrab,
    runtime: Runtime
}

impl OctocrabApi {
    /// Builds a client, authenticated when `token` is provided.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the runtime or HTTP client cannot be
    /// initialized.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use yaml_readme::{GitHubApi, OctocrabApi};
    ///
    /// # fn example() -> Result<(), masterror::AppError> {
    /// let api = OctocrabApi::new(std::env::var("GITHUB_TOKEN").ok())?;
    /// for contributor in api.contributors("LinuxSuRen", "yaml-readme")? {
    ///     println!("{}", contributor.login);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(token: Option<String>) -> Result<Self, AppError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AppError::internal(format!("failed to start runtime: {e}")))?;

        let client = {
            let _guard = runtime.enter();
            let builder = Octocrab::builder().add_retry_config(RetryConfig::None);
            let builder = match token {
                Some(token) => builder.personal_token(token),
                None => builder
            };
            builder.build().map_err(|e| {
                AppError::unauthorized(format!("failed to initialize GitHub client: {e}"))
            })?
        };

        Ok(Self {
            client,
            runtime
        })
    }

    fn get<R>(&self, route: String) -> Result<R, AppError>
    where
        R: serde::de::DeserializeOwned
    {
        debug!("GET {}", route);
        self.runtime
            .block_on(self.client.get(route.as_str(), None::<&()>))
            .map_err(|e| AppError::service(format!("GitHub request {route} failed: {e}")))
    }
}

impl GitHubApi for OctocrabApi {
    fn contributors(&self, owner: &str, repo: &str) -> Result<Vec<Contributor>, AppError> {
        self.get(format!("/repos/{owner}/{repo}/contributors"))
    }

    fn stargazers(&self, owner: &str, repo: &str) -> Result<Vec<Stargazer>, AppError> {
        self.get(format!("/repos/{owner}/{repo}/stargazers"))
    }

    fn user(&self, id: &str) -> Result<UserProfile, AppError> {
        self.get(format!("/users/{id}"))
    }

    fn repositories(&self, owner: &str) -> Result<Vec<Repository>, AppError> {
        let route = format!("/users/{owner}/repos");
        let query = RepositoryQuery {
            kind:     "owner",
            per_page: 100,
            sort:     "updated"
        };
        debug!("GET {} {:?}", route, query);
        self.runtime
            .block_on(self.client.get(route.as_str(), Some(&query)))
            .map_err(|e| AppError::service(format!("GitHub request {route} failed: {e}")))
    }
}

/// [`GitHubApi`] that fails every call.
///
/// Used where rendering must not touch the network; helpers relying on the
/// API then produce their empty output.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineApi;

impl GitHubApi for OfflineApi {
    fn contributors(&self, owner: &str, repo: &str) -> Result<Vec<Contributor>, AppError> {
        Err(offline(&format!("{owner}/{repo} contributors")))
    }

    fn stargazers(&self, owner: &str, repo: &str) -> Result<Vec<Stargazer>, AppError> {
        Err(offline(&format!("{owner}/{repo} stargazers")))
    }

    fn user(&self, id: &str) -> Result<UserProfile, AppError> {
        Err(offline(&format!("user {id}")))
    }

    fn repositories(&self, owner: &str) -> Result<Vec<Repository>, AppError> {
        Err(offline(&format!("{owner} repositories")))
    }
}

fn offline(what: &str) -> AppError {
    AppError::service(format!("offline: cannot fetch {what}"))
}
