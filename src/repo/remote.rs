//! Repository identity derived from the `origin` remote.
use git_url_parse::GitUrl;
use log::*;

use crate::{
    Result,
    error::ReleaseError,
    repo::{Git, ORIGIN},
};

/// Identity of the repository a run operates on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    /// Forge host (e.g. "github.com").
    pub host: String,
    /// Owning organization or user.
    pub organization: String,
    /// Repository name without `.git`.
    pub repository: String,
    /// Commit the release is cut from.
    pub sha: String,
}

impl RepoRef {
    /// Resolve identity from the origin remote. The release commit is `sha`
    /// when given, otherwise HEAD.
    pub fn resolve(git: &dyn Git, sha: Option<String>) -> Result<Self> {
        let url = git.origin_url()?.ok_or_else(|| {
            ReleaseError::remote_resolution(format!(
                "unable to find remote with name '{ORIGIN}'"
            ))
        })?;

        let (host, organization, repository) = parse_remote_url(&url)?;

        let sha = match sha {
            Some(sha) => sha,
            None => git.head_sha()?,
        };

        let repo_ref = Self {
            host,
            organization,
            repository,
            sha,
        };

        info!(
            "resolved repository {}/{} on {} at {}",
            repo_ref.organization,
            repo_ref.repository,
            repo_ref.host,
            repo_ref.sha
        );

        Ok(repo_ref)
    }

    /// Web URL of the repository.
    pub fn web_url(&self) -> String {
        format!(
            "https://{}/{}/{}",
            self.host, self.organization, self.repository
        )
    }

    /// Web link comparing two refs.
    pub fn compare_link(&self, from: &str, to: &str) -> String {
        format!("{}/compare/{from}...{to}", self.web_url())
    }
}

/// Splits a remote URL into host, organization, and repository name.
fn parse_remote_url(url: &str) -> Result<(String, String, String)> {
    let parsed = GitUrl::parse(url).map_err(|err| {
        ReleaseError::remote_resolution(format!(
            "unable to parse remote url {url}: {err}"
        ))
    })?;

    let host = parsed.host.ok_or_else(|| {
        ReleaseError::remote_resolution(format!(
            "unable to extract host from {url}"
        ))
    })?;

    let organization = parsed.owner.filter(|o| !o.is_empty()).ok_or_else(|| {
        ReleaseError::remote_resolution(format!(
            "unable to extract organization from {url}"
        ))
    })?;

    if parsed.name.is_empty() {
        return Err(ReleaseError::remote_resolution(format!(
            "unable to extract repo from {url}"
        )));
    }

    Ok((host, organization, parsed.name))
}
