//! Tests for the postrelease workflow.
//!
//! Tests for:
//! - Tagging the release commit with the next patch version
//! - Moving the floating major tag when enabled
//! - Publishing a non-draft release
//! - Uploading artifact files

use std::fs;
use tempfile::TempDir;

use super::common::*;
use crate::{ReleaseError, forge::traits::MockForge, repo::MockGit};

/// Expectations shared by every successful postrelease run up to the
/// version tag push.
fn expect_release_commit(git: &mut MockGit, tag: &'static str) {
    expect_repository_setup(git);

    git.expect_checkout()
        .withf(|reference| reference == RELEASE_SHA)
        .times(1)
        .returning(|_| Ok(()));
    git.expect_create_tag()
        .withf(move |t, target| t == tag && target == RELEASE_SHA)
        .times(1)
        .returning(|_, _| Ok(()));
    git.expect_push_tag()
        .withf(move |t, force| t == tag && !*force)
        .times(1)
        .returning(|_, _| Ok(()));
}

#[test_log::test(tokio::test)]
async fn postrelease_tags_release_commit_and_publishes() {
    let mut git = MockGit::new();
    let mut forge = MockForge::new();

    expect_release_commit(&mut git, "v1.2.4");
    expect_latest_release(&mut forge, Some("v1.2.3"));

    git.expect_delete_tag().times(0);
    git.expect_delete_remote_tag().times(0);
    git.expect_commit_all().times(0);
    git.expect_push_branch().times(0);
    git.expect_log()
        .withf(|req| {
            req.from.as_deref() == Some("v1.2.3") && req.to == RELEASE_SHA
        })
        .times(1)
        .returning(|_| Ok(vec![commit_record("ccccccc3333", "Fix it", "Cy")]));

    forge
        .expect_get_release_by_tag()
        .withf(|tag| tag == "v1.2.4")
        .times(1)
        .returning(|_| Ok(None));
    forge
        .expect_create_release()
        .withf(|req| {
            req.tag == "v1.2.4"
                && req.name == "v1.2.4"
                && req.target_sha == RELEASE_SHA
                && !req.draft
                && req.body.starts_with("- ccccccc **Fix it** (Cy)")
        })
        .times(1)
        .returning(|req| Ok(created_release(20, &req.tag, req.draft)));
    forge.expect_upload_release_asset().times(0);

    let orchestrator =
        create_test_orchestrator(test_config("postrelease"), git, forge);

    let release = orchestrator.run().await.unwrap();

    assert_eq!(release.id, 20);
    assert!(!release.draft);
}

#[tokio::test]
async fn postrelease_patch_drops_prerelease_label() {
    let mut git = MockGit::new();
    let mut forge = MockForge::new();

    expect_release_commit(&mut git, "v1.2.5");
    expect_latest_release(&mut forge, Some("v1.2.4-1"));

    git.expect_log().returning(|_| Ok(vec![]));

    forge.expect_get_release_by_tag().returning(|_| Ok(None));
    forge
        .expect_create_release()
        .times(1)
        .returning(|req| Ok(created_release(21, &req.tag, req.draft)));

    let orchestrator =
        create_test_orchestrator(test_config("postrelease"), git, forge);

    let release = orchestrator.run().await.unwrap();
    assert_eq!(release.tag, "v1.2.5");
}

#[tokio::test]
async fn postrelease_moves_major_tag_when_enabled() {
    let mut git = MockGit::new();
    let mut forge = MockForge::new();

    expect_repository_setup(&mut git);
    expect_latest_release(&mut forge, Some("v1.2.3"));

    git.expect_checkout().returning(|_| Ok(()));
    git.expect_create_tag()
        .withf(|tag, target| tag == "v1.2.4" && target == RELEASE_SHA)
        .times(1)
        .returning(|_, _| Ok(()));
    git.expect_push_tag()
        .withf(|tag, force| tag == "v1.2.4" && !*force)
        .times(1)
        .returning(|_, _| Ok(()));

    // first release of the major line: nothing to delete yet
    git.expect_delete_tag()
        .withf(|tag| tag == "v1")
        .times(1)
        .returning(|tag| Err(ReleaseError::tag_deletion(tag, "not found")));
    git.expect_delete_remote_tag()
        .withf(|tag| tag == "v1")
        .times(1)
        .returning(|tag| Err(ReleaseError::tag_deletion(tag, "not found")));
    git.expect_create_tag()
        .withf(|tag, target| tag == "v1" && target == RELEASE_SHA)
        .times(1)
        .returning(|_, _| Ok(()));
    git.expect_push_tag()
        .withf(|tag, force| tag == "v1" && *force)
        .times(1)
        .returning(|_, _| Ok(()));
    git.expect_log().returning(|_| Ok(vec![]));

    forge.expect_get_release_by_tag().returning(|_| Ok(None));
    forge
        .expect_create_release()
        .times(1)
        .returning(|req| Ok(created_release(22, &req.tag, req.draft)));

    let mut config = test_config("postrelease");
    config.major_tag = true;

    let orchestrator = create_test_orchestrator(config, git, forge);

    orchestrator.run().await.unwrap();
}

#[tokio::test]
async fn postrelease_uploads_artifacts_by_file_name() {
    let dir = TempDir::new().unwrap();
    let tarball = dir.path().join("app.tar.gz");
    let checksum = dir.path().join("SHA256SUMS");
    fs::write(&tarball, b"artifact").unwrap();
    fs::write(&checksum, b"sums").unwrap();

    let mut git = MockGit::new();
    let mut forge = MockForge::new();

    expect_release_commit(&mut git, "v1.0.1");
    expect_latest_release(&mut forge, Some("v1.0.0"));
    git.expect_log().returning(|_| Ok(vec![]));

    forge.expect_get_release_by_tag().returning(|_| Ok(None));
    forge
        .expect_create_release()
        .returning(|req| Ok(created_release(42, &req.tag, req.draft)));
    forge
        .expect_upload_release_asset()
        .withf(|req| {
            req.release_id == 42
                && req.filename == "app.tar.gz"
                && req.content == b"artifact"
        })
        .times(1)
        .returning(|_| Ok(()));
    forge
        .expect_upload_release_asset()
        .withf(|req| {
            req.release_id == 42
                && req.filename == "SHA256SUMS"
                && req.content == b"sums"
        })
        .times(1)
        .returning(|_| Ok(()));

    let mut config = test_config("postrelease");
    config.files = vec![tarball, checksum];

    let orchestrator = create_test_orchestrator(config, git, forge);

    orchestrator.run().await.unwrap();
}

#[tokio::test]
async fn postrelease_missing_artifact_fails_before_tagging() {
    let dir = TempDir::new().unwrap();
    let tarball = dir.path().join("app.tar.gz");
    fs::write(&tarball, b"artifact").unwrap();

    // no expectations: any git or forge call fails the test
    let git = MockGit::new();
    let forge = MockForge::new();

    let mut config = test_config("postrelease");
    config.files = vec![tarball, dir.path().join("missing.zip")];

    let orchestrator = create_test_orchestrator(config, git, forge);

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, ReleaseError::InvalidArgs(_)));
    assert!(err.to_string().contains("missing.zip"));
}

#[tokio::test]
async fn postrelease_publish_failure_is_reported_with_tag() {
    let mut git = MockGit::new();
    let mut forge = MockForge::new();

    expect_release_commit(&mut git, "v3.1.1");
    expect_latest_release(&mut forge, Some("v3.1.0"));
    git.expect_log().returning(|_| Ok(vec![]));

    forge.expect_get_release_by_tag().returning(|_| Ok(None));
    forge
        .expect_create_release()
        .returning(|_| Err(ReleaseError::forge("422 Unprocessable Entity")));
    forge.expect_upload_release_asset().times(0);

    let orchestrator =
        create_test_orchestrator(test_config("postrelease"), git, forge);

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(err, ReleaseError::Publish { ref tag, .. } if tag == "v3.1.1"));
}
