//! Resolved run configuration.
use log::*;
use secrecy::SecretString;
use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use crate::{Result, cli::Args, error::ReleaseError};

/// Environment variable consulted when no repo token input is given.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Release actions a run can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Tag the next prerelease and publish a draft release.
    Prerelease,
    /// Tag the next patch release and publish it.
    Postrelease,
}

impl FromStr for Action {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "prerelease" => Ok(Action::Prerelease),
            "postrelease" => Ok(Action::Postrelease),
            other => Err(ReleaseError::UnknownAction(other.to_string())),
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Prerelease => f.write_str("prerelease"),
            Action::Postrelease => f.write_str("postrelease"),
        }
    }
}

/// Inputs of one release run after normalization.
#[derive(Debug, Clone)]
pub struct ReleaseConfig {
    /// Requested action, validated when the run starts.
    pub action: String,
    pub token: SecretString,
    /// Maintain a floating `v<major>` tag.
    pub major_tag: bool,
    /// Artifact files attached to published releases.
    pub files: Vec<PathBuf>,
    pub release_branch: Option<String>,
    pub commit_message_prefix: String,
    /// Analytics opt-out.
    pub dnt: bool,
    /// Commit to release, HEAD when unset.
    pub sha: Option<String>,
}

impl ReleaseConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        let token = non_empty(args.repo_token.clone())
            .or_else(|| non_empty(env::var(TOKEN_ENV_VAR).ok()))
            .ok_or_else(|| {
                ReleaseError::invalid_args(format!(
                    "must set repo-token or {TOKEN_ENV_VAR}"
                ))
            })?;

        if non_empty(args.root_email.clone()).is_some()
            || non_empty(args.terraform_cloud_token.clone()).is_some()
        {
            debug!("ignoring organization setup inputs");
        }

        Ok(Self {
            action: args.action.trim().to_string(),
            token: SecretString::from(token),
            major_tag: parse_flag("major-tag", &args.major_tag)?,
            files: parse_files(&args.files),
            release_branch: non_empty(args.release_branch.clone()),
            commit_message_prefix: args.commit_message_prefix.clone(),
            dnt: parse_flag("dnt", &args.dnt)?,
            sha: non_empty(args.sha.clone()),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parses boolean-ish input values. Empty means false.
pub fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "y" | "on" | "1" => Ok(true),
        "false" | "no" | "n" | "off" | "0" | "" => Ok(false),
        other => Err(ReleaseError::invalid_args(format!(
            "{name} must be a boolean, got '{other}'"
        ))),
    }
}

/// Splits a newline-separated path list, skipping blank lines.
pub fn parse_files(value: &str) -> Vec<PathBuf> {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}
