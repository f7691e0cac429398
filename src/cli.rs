//! CLI argument parsing.
//!
//! Every input can be given as a flag or through the environment variable
//! the CI runner sets for action inputs (`INPUT_<NAME>`).
use clap::Parser;

/// Release helper inputs.
#[derive(Parser, Debug, Clone, Default)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[arg(long, env = "INPUT_ACTION")]
    /// Action to run: prerelease or postrelease.
    pub action: String,

    #[arg(long, env = "INPUT_REPO-TOKEN", hide_env_values = true)]
    /// Repository token. Falls back to GITHUB_TOKEN env var.
    pub repo_token: Option<String>,

    #[arg(long, env = "INPUT_MAJOR-TAG", default_value = "false")]
    /// Move a floating vMAJOR tag to each release.
    pub major_tag: String,

    #[arg(long, env = "INPUT_FILES", default_value = "")]
    /// Newline-separated artifact paths to attach to the release.
    pub files: String,

    #[arg(long, env = "INPUT_RELEASE-BRANCH")]
    /// Branch prerelease commits are pushed to. Defaults to the
    /// repository's default branch.
    pub release_branch: Option<String>,

    #[arg(long, env = "INPUT_COMMIT-MESSAGE-PREFIX", default_value = "")]
    /// Prefix for the release commit message.
    pub commit_message_prefix: String,

    #[arg(long, env = "INPUT_DNT", default_value = "false")]
    /// Opt out of analytics.
    pub dnt: String,

    #[arg(long, env = "INPUT_ROOT-EMAIL", hide = true)]
    /// Used by the organization setup workflow only.
    pub root_email: Option<String>,

    #[arg(
        long,
        env = "INPUT_TERRAFORM-CLOUD-TOKEN",
        hide = true,
        hide_env_values = true
    )]
    /// Used by the organization setup workflow only.
    pub terraform_cloud_token: Option<String>,

    #[arg(long, env = "GITHUB_SHA")]
    /// Commit to release. Defaults to HEAD.
    pub sha: Option<String>,

    #[arg(long, default_value = ".")]
    /// Path to the repository working copy.
    pub repo_path: String,

    #[arg(long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,
}
