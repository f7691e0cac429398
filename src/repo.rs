//! Git repository operations for release automation.
//!
//! The [`Git`] trait is the seam the release components use to mutate the
//! local working copy and its `origin` remote. [`Repository`] implements it
//! on top of `git2`, authenticating network operations with the repository
//! token.
use git2::{
    AutotagOption, BranchType, IndexAddOption, Oid, RemoteCallbacks, Sort,
    build::CheckoutBuilder,
};
use log::*;
use secrecy::{ExposeSecret, SecretString};
use std::path::Path;

#[cfg(test)]
use mockall::automock;

use crate::{Result, error::ReleaseError};

pub mod remote;

/// Name of the remote every run reads from and pushes to.
pub const ORIGIN: &str = "origin";

/// Username paired with a token for HTTPS authentication.
const TOKEN_USER: &str = "x-access-token";

/// libgit2's `GIT_FETCH_DEPTH_UNSHALLOW`.
const FETCH_DEPTH_UNSHALLOW: i32 = i32::MAX;

/// A commit as read from first-parent history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitRecord {
    /// Full commit hash.
    pub hash: String,
    /// First line of the commit message.
    pub summary: String,
    /// Full commit message.
    pub message: String,
    /// Author name.
    pub author: String,
}

impl CommitRecord {
    pub fn short_hash(&self) -> &str {
        self.hash.get(..7).unwrap_or(&self.hash)
    }
}

/// Range of history to read. `from` is excluded, `to` included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRequest {
    pub from: Option<String>,
    pub to: String,
    pub max_count: Option<usize>,
}

/// Version control operations needed by a release run.
#[cfg_attr(test, automock)]
pub trait Git {
    /// Push URL of the `origin` remote, if the remote exists.
    fn origin_url(&self) -> Result<Option<String>>;
    fn head_sha(&self) -> Result<String>;
    /// First-parent history, newest first.
    fn log(&self, req: LogRequest) -> Result<Vec<CommitRecord>>;
    /// Fetch branches and tags from origin, deepening shallow clones.
    fn fetch(&self, unshallow: bool) -> Result<()>;
    /// Detach HEAD at `reference` and update the working tree.
    fn checkout(&self, reference: &str) -> Result<()>;
    fn set_identity(&self, name: &str, email: &str) -> Result<()>;
    /// Stage every change and commit it. Returns false when the tree is clean.
    fn commit_all(&self, message: &str) -> Result<bool>;
    /// Names of every local tag, including fetched ones.
    fn tag_names(&self) -> Result<Vec<String>>;
    fn create_tag(&self, tag: &str, target: &str) -> Result<()>;
    fn delete_tag(&self, tag: &str) -> Result<()>;
    fn delete_remote_tag(&self, tag: &str) -> Result<()>;
    fn push_tag(&self, tag: &str, force: bool) -> Result<()>;
    /// Push HEAD to `branch` on origin together with `tags`.
    fn push_branch(&self, branch: &str, tags: &[String]) -> Result<()>;
}

/// Create Git authentication callbacks for username/token authentication.
///
/// Rejected ref updates are surfaced as errors since libgit2 otherwise
/// reports a successful push.
fn get_callbacks<'r>(token: String) -> RemoteCallbacks<'r> {
    let mut callbacks = git2::RemoteCallbacks::new();
    callbacks.credentials(move |_url, _username, _allowed| {
        git2::Cred::userpass_plaintext(TOKEN_USER, &token)
    });
    callbacks.push_update_reference(|refname, status| match status {
        Some(msg) => Err(git2::Error::from_str(&format!(
            "remote rejected {refname}: {msg}"
        ))),
        None => Ok(()),
    });
    callbacks
}

/// Local working copy backed by `git2`.
pub struct Repository {
    repo: git2::Repository,
    token: SecretString,
}

impl Repository {
    /// Open the repository containing `path`.
    pub fn open(path: &Path, token: SecretString) -> Result<Self> {
        let repo = git2::Repository::discover(path)?;
        debug!("opened repository at {}", repo.path().display());
        Ok(Self { repo, token })
    }

    fn callbacks(&self) -> RemoteCallbacks<'_> {
        get_callbacks(self.token.expose_secret().to_string())
    }

    fn push(&self, refspecs: &[String]) -> Result<()> {
        debug!("pushing refspecs: {:?}", refspecs);
        let mut push_opts = git2::PushOptions::new();
        push_opts.remote_callbacks(self.callbacks());

        let mut remote = self.repo.find_remote(ORIGIN)?;
        remote.push(refspecs, Some(&mut push_opts))?;

        Ok(())
    }

    fn resolve_commit(&self, reference: &str) -> Result<git2::Commit<'_>> {
        Ok(self.repo.revparse_single(reference)?.peel_to_commit()?)
    }
}

impl Git for Repository {
    fn origin_url(&self) -> Result<Option<String>> {
        let remote = match self.repo.find_remote(ORIGIN) {
            Ok(remote) => remote,
            Err(err) if err.code() == git2::ErrorCode::NotFound => {
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let url = remote.pushurl().or(remote.url()).map(String::from);

        Ok(url)
    }

    fn head_sha(&self) -> Result<String> {
        let commit = self.repo.head()?.peel_to_commit()?;
        Ok(commit.id().to_string())
    }

    fn log(&self, req: LogRequest) -> Result<Vec<CommitRecord>> {
        debug!("reading log: {:?}", req);
        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.simplify_first_parent()?;
        revwalk.push(self.resolve_commit(&req.to)?.id())?;

        if let Some(from) = &req.from {
            revwalk.hide(self.resolve_commit(from)?.id())?;
        }

        let max_count = req.max_count.unwrap_or(usize::MAX);
        let mut records = vec![];

        for oid in revwalk.take(max_count) {
            let commit = self.repo.find_commit(oid?)?;
            records.push(CommitRecord {
                hash: commit.id().to_string(),
                summary: commit.summary().unwrap_or("").to_string(),
                message: commit.message().unwrap_or("").to_string(),
                author: commit.author().name().unwrap_or("").to_string(),
            });
        }

        Ok(records)
    }

    fn fetch(&self, unshallow: bool) -> Result<()> {
        info!("fetching from {ORIGIN}");
        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(self.callbacks());
        fetch_options.download_tags(AutotagOption::All);

        if unshallow && self.repo.is_shallow() {
            info!("repository is shallow: fetching full history");
            fetch_options.depth(FETCH_DEPTH_UNSHALLOW);
        }

        let mut remote = self.repo.find_remote(ORIGIN)?;
        remote.fetch(
            &[
                "+refs/heads/*:refs/remotes/origin/*",
                "+refs/tags/*:refs/tags/*",
            ],
            Some(&mut fetch_options),
            None,
        )?;

        Ok(())
    }

    fn checkout(&self, reference: &str) -> Result<()> {
        info!("checking out: {reference}");
        let commit = self.resolve_commit(reference)?;
        let mut checkout = CheckoutBuilder::new();
        checkout.safe();
        self.repo
            .checkout_tree(commit.as_object(), Some(&mut checkout))?;
        self.repo.set_head_detached(commit.id())?;
        Ok(())
    }

    fn set_identity(&self, name: &str, email: &str) -> Result<()> {
        debug!("setting commit identity: {name} <{email}>");
        let mut config = self.repo.config()?;
        config.set_str("user.name", name)?;
        config.set_str("user.email", email)?;
        Ok(())
    }

    fn commit_all(&self, message: &str) -> Result<bool> {
        let mut index = self.repo.index()?;
        index.add_all(["."], IndexAddOption::DEFAULT, None)?;
        index.update_all(["."], None)?;
        index.write()?;

        let tree_id = index.write_tree()?;
        let parent = self.repo.head()?.peel_to_commit()?;

        if parent.tree_id() == tree_id {
            info!("working tree is clean: nothing to commit");
            return Ok(false);
        }

        debug!("committing changes with msg: {message}");
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;
        self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;

        Ok(true)
    }

    fn tag_names(&self) -> Result<Vec<String>> {
        let names = self.repo.tag_names(None)?;
        Ok(names.iter().flatten().map(String::from).collect())
    }

    fn create_tag(&self, tag: &str, target: &str) -> Result<()> {
        info!("creating tag {tag} at {target}");
        let commit = self.resolve_commit(target)?;
        let tagger = self.repo.signature()?;
        self.repo
            .tag(tag, commit.as_object(), &tagger, tag, false)?;
        Ok(())
    }

    fn delete_tag(&self, tag: &str) -> Result<()> {
        debug!("deleting local tag {tag}");
        self.repo
            .tag_delete(tag)
            .map_err(|err| ReleaseError::tag_deletion(tag, err))
    }

    fn delete_remote_tag(&self, tag: &str) -> Result<()> {
        debug!("deleting remote tag {tag}");
        self.push(&[format!(":refs/tags/{tag}")])
            .map_err(|err| ReleaseError::tag_deletion(tag, err))
    }

    fn push_tag(&self, tag: &str, force: bool) -> Result<()> {
        info!("pushing tag {tag} (force: {force})");
        // + indicates "force" push
        let force = if force { "+" } else { "" };
        self.push(&[format!("{force}refs/tags/{tag}:refs/tags/{tag}")])
    }

    fn push_branch(&self, branch: &str, tags: &[String]) -> Result<()> {
        info!("pushing HEAD to {branch} with tags {:?}", tags);
        let head = self.repo.head()?.peel_to_commit()?;

        // make sure a local branch of that name sits on HEAD so it can be
        // used as the push source, even when HEAD is detached
        let on_branch = self
            .repo
            .find_branch(branch, BranchType::Local)
            .ok()
            .and_then(|b| b.get().target())
            .is_some_and(|oid: Oid| oid == head.id());

        if !on_branch {
            self.repo.reference(
                &format!("refs/heads/{branch}"),
                head.id(),
                true,
                "release: update branch to HEAD",
            )?;
        }

        let mut refspecs = vec![format!("refs/heads/{branch}:refs/heads/{branch}")];
        refspecs.extend(
            tags.iter()
                .map(|tag| format!("refs/tags/{tag}:refs/tags/{tag}")),
        );

        self.push(&refspecs)
    }
}
