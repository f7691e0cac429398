//! Common test utilities for orchestrator tests.

use std::rc::Rc;

use crate::{
    config::ReleaseConfig,
    forge::{request::ForgeRelease, traits::MockForge},
    orchestrator::{BOT_EMAIL, BOT_NAME, Orchestrator},
    repo::MockGit,
    test_helpers::{published_release, test_repo_ref},
};

pub use crate::test_helpers::{commit_record, test_config};

/// Commit HEAD points at after the release commit.
pub const HEAD_SHA: &str = "1234567890abcdef1234567890abcdef12345678";

/// Release commit of [`test_repo_ref`].
pub const RELEASE_SHA: &str = "abc1234def5678abc1234def5678abc1234def56";

/// Creates a test Orchestrator for `github.com/test/repo` at [`RELEASE_SHA`].
/// Set expectations on the mocks before calling this.
pub fn create_test_orchestrator(
    config: ReleaseConfig,
    git: MockGit,
    forge: MockForge,
) -> Orchestrator {
    Orchestrator::builder()
        .config(Rc::new(config))
        .repo_ref(Rc::new(test_repo_ref()))
        .git(Rc::new(git))
        .forge(Rc::new(forge))
        .build()
        .unwrap()
}

/// Expects the bot identity to be configured and history to be fetched.
pub fn expect_repository_setup(git: &mut MockGit) {
    git.expect_set_identity()
        .withf(|name, email| name == BOT_NAME && email == BOT_EMAIL)
        .times(1)
        .returning(|_, _| Ok(()));
    git.expect_fetch()
        .withf(|unshallow| *unshallow)
        .times(1)
        .returning(|_| Ok(()));
}

/// Expects the latest published release lookup to return `tag`.
pub fn expect_latest_release(forge: &mut MockForge, tag: Option<&str>) {
    let release = tag.map(|tag| published_release(1, tag));
    forge
        .expect_get_latest_release()
        .times(1)
        .returning(move || Ok(release.clone()));
}

/// Expects one lookup of local tag names returning `tags`.
pub fn expect_tags(git: &mut MockGit, tags: &[&str]) {
    let tags = tags.iter().map(|t| t.to_string()).collect::<Vec<String>>();
    git.expect_tag_names()
        .times(1)
        .returning(move || Ok(tags.clone()));
}

/// Echoes a created release back with the given id.
pub fn created_release(id: u64, tag: &str, draft: bool) -> ForgeRelease {
    ForgeRelease {
        draft,
        ..published_release(id, tag)
    }
}
