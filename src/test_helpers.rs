//! Common test helper functions shared across test modules.
use secrecy::SecretString;

use crate::{
    config::ReleaseConfig,
    forge::request::ForgeRelease,
    repo::{CommitRecord, remote::RepoRef},
};

/// Creates a RepoRef for `github.com/test/repo`.
pub fn test_repo_ref() -> RepoRef {
    RepoRef {
        host: "github.com".to_string(),
        organization: "test".to_string(),
        repository: "repo".to_string(),
        sha: "abc1234def5678abc1234def5678abc1234def56".to_string(),
    }
}

/// Creates a commit whose full message is its summary.
pub fn commit_record(hash: &str, summary: &str, author: &str) -> CommitRecord {
    CommitRecord {
        hash: hash.to_string(),
        summary: summary.to_string(),
        message: summary.to_string(),
        author: author.to_string(),
    }
}

/// Creates a ReleaseConfig for `action` with everything else off.
pub fn test_config(action: &str) -> ReleaseConfig {
    ReleaseConfig {
        action: action.to_string(),
        token: SecretString::from("test-token".to_string()),
        major_tag: false,
        files: vec![],
        release_branch: None,
        commit_message_prefix: String::new(),
        dnt: false,
        sha: None,
    }
}

/// Published release for `tag`.
pub fn published_release(id: u64, tag: &str) -> ForgeRelease {
    ForgeRelease {
        id,
        tag: tag.to_string(),
        name: tag.to_string(),
        body: String::new(),
        draft: false,
        url: format!("https://github.com/test/repo/releases/tag/{tag}"),
    }
}
