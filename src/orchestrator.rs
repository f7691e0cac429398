use derive_builder::Builder;
use log::*;
use std::{path::Path, rc::Rc};
use tokio::fs;

use crate::{
    ReleaseError, Result,
    changelog::ChangelogComposer,
    config::{Action, ReleaseConfig},
    forge::{
        request::{ForgeRelease, ReleaseDraft, UploadAssetRequest},
        traits::Forge,
    },
    major_tag::MajorTagReconciler,
    repo::{Git, LogRequest, remote::RepoRef},
    version::{Baseline, BumpKind, VersionResolver, next_version, version_tag},
};

/// Message of the commit created for a prerelease, followed by the tag.
pub const RELEASE_COMMIT_MESSAGE: &str = "chore(release): ";

/// Identity release commits and tags are authored with.
pub const BOT_NAME: &str = "github-actions[bot]";
pub const BOT_EMAIL: &str =
    "41898282+github-actions[bot]@users.noreply.github.com";

#[derive(Builder)]
#[builder(build_fn(private, name = "_build"))]
pub struct OrchestratorParams {
    pub config: Rc<ReleaseConfig>,
    pub repo_ref: Rc<RepoRef>,
    pub git: Rc<dyn Git>,
    pub forge: Rc<dyn Forge>,
}

impl OrchestratorParamsBuilder {
    pub fn build(&self) -> Result<Orchestrator> {
        let params = self._build().map_err(|e| {
            ReleaseError::invalid_args(format!(
                "Failed to build release orchestrator: {}",
                e
            ))
        })?;
        Ok(Orchestrator::new(params))
    }
}

/// Runs one release action against a repository and its forge.
pub struct Orchestrator {
    config: Rc<ReleaseConfig>,
    repo_ref: Rc<RepoRef>,
    git: Rc<dyn Git>,
    forge: Rc<dyn Forge>,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorParamsBuilder {
        OrchestratorParamsBuilder::default()
    }

    pub fn new(params: OrchestratorParams) -> Self {
        Self {
            config: params.config,
            repo_ref: params.repo_ref,
            git: params.git,
            forge: params.forge,
        }
    }

    /// Validates the configured action and runs it. Unknown actions fail
    /// before the repository or forge is touched.
    pub async fn run(&self) -> Result<ForgeRelease> {
        let action: Action = self.config.action.parse()?;

        if self.config.dnt {
            debug!("analytics opt-out requested");
        }

        info!(
            "running {action} for {}/{}",
            self.repo_ref.organization, self.repo_ref.repository
        );

        let release = match action {
            Action::Prerelease => self.prerelease().await?,
            Action::Postrelease => self.postrelease().await?,
        };

        info!("release {} available at {}", release.tag, release.url);

        Ok(release)
    }

    /// Commits pending changes, tags HEAD with the next prerelease version,
    /// pushes both, and publishes a draft release.
    pub async fn prerelease(&self) -> Result<ForgeRelease> {
        self.prepare_repository()?;

        let resolver = self.resolver();
        let baseline = resolver.current_version().await?;
        let next = resolver.next_prerelease(&baseline)?;
        let tag = version_tag(&next);

        info!("next prerelease: {tag} (from {baseline})");

        let message = format!(
            "{}{RELEASE_COMMIT_MESSAGE}{tag}",
            self.config.commit_message_prefix
        );

        if !self.git.commit_all(&message)? {
            info!("working tree clean: tagging HEAD without a release commit");
        }

        let head = self.git.head_sha()?;
        self.git.create_tag(&tag, &head)?;

        let branch = match &self.config.release_branch {
            Some(branch) => branch.clone(),
            None => self.forge.default_branch().await?,
        };

        self.git.push_branch(&branch, std::slice::from_ref(&tag))?;

        let body = self.compose_notes(&baseline, &head)?;

        let draft = ReleaseDraft {
            version: next,
            title: tag.clone(),
            tag,
            body,
            draft: true,
        };

        self.publish(&draft, &head).await
    }

    /// Tags the release commit with the next patch version, moves the
    /// floating major tag, publishes the release and attaches artifacts.
    pub async fn postrelease(&self) -> Result<ForgeRelease> {
        // read before any tag exists
        let assets = self.load_assets().await?;

        self.prepare_repository()?;

        let sha = self.repo_ref.sha.as_str();
        self.git.checkout(sha)?;

        let baseline = self.resolver().current_version().await?;
        let next = next_version(&baseline.version(), BumpKind::Patch)?;
        let tag = version_tag(&next);

        info!("next release: {tag} (from {baseline})");

        self.git.create_tag(&tag, sha)?;
        self.git.push_tag(&tag, false)?;

        MajorTagReconciler::new(self.git.as_ref(), self.config.major_tag)
            .reconcile(&next, sha)?;

        let body = self.compose_notes(&baseline, sha)?;

        let draft = ReleaseDraft {
            version: next,
            title: tag.clone(),
            tag,
            body,
            draft: false,
        };

        let release = self.publish(&draft, sha).await?;

        self.upload_assets(&release, assets).await?;

        Ok(release)
    }

    fn prepare_repository(&self) -> Result<()> {
        self.git.set_identity(BOT_NAME, BOT_EMAIL)?;
        self.git.fetch(true)
    }

    fn resolver(&self) -> VersionResolver<'_> {
        VersionResolver::new(self.git.as_ref(), self.forge.as_ref())
    }

    fn compose_notes(&self, baseline: &Baseline, to: &str) -> Result<String> {
        // an anchor is the first commit and belongs in the notes
        let from = match baseline {
            Baseline::Tagged { tag, .. } => Some(tag.clone()),
            Baseline::Anchor { .. } => None,
        };

        let commits = self.git.log(LogRequest {
            from,
            to: to.to_string(),
            max_count: None,
        })?;

        debug!("found {} commits since {baseline}", commits.len());

        Ok(ChangelogComposer::new(&self.repo_ref)
            .compose(&commits, baseline.from_ref()))
    }

    /// Updates the release for the draft's tag in place when one exists,
    /// otherwise creates it.
    async fn publish(
        &self,
        draft: &ReleaseDraft,
        target_sha: &str,
    ) -> Result<ForgeRelease> {
        let existing = self
            .forge
            .get_release_by_tag(&draft.tag)
            .await
            .map_err(|e| ReleaseError::publish(&draft.tag, e))?;

        let result = match existing {
            Some(release) => {
                info!("updating existing release {} ({})", draft.tag, release.id);
                self.forge
                    .update_release(draft.to_update_request(release.id))
                    .await
            }
            None => {
                info!(
                    "creating {} release {}",
                    if draft.draft { "draft" } else { "published" },
                    draft.tag
                );
                self.forge
                    .create_release(draft.to_create_request(target_sha))
                    .await
            }
        };

        result.map_err(|e| ReleaseError::publish(&draft.tag, e))
    }

    async fn load_assets(&self) -> Result<Vec<(String, Vec<u8>)>> {
        let mut assets = vec![];

        for file in self.config.files.iter() {
            let filename = asset_name(file)?;

            let content = fs::read(file).await.map_err(|e| {
                ReleaseError::invalid_args(format!(
                    "unable to read release asset {}: {e}",
                    file.display()
                ))
            })?;

            debug!("loaded asset {} ({} bytes)", file.display(), content.len());
            assets.push((filename, content));
        }

        Ok(assets)
    }

    async fn upload_assets(
        &self,
        release: &ForgeRelease,
        assets: Vec<(String, Vec<u8>)>,
    ) -> Result<()> {
        for (filename, content) in assets {
            info!("uploading {filename} to release {}", release.tag);

            self.forge
                .upload_release_asset(UploadAssetRequest {
                    release_id: release.id,
                    filename,
                    content,
                })
                .await?;
        }

        Ok(())
    }
}

fn asset_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .ok_or_else(|| {
            ReleaseError::invalid_args(format!(
                "release asset path has no file name: {}",
                path.display()
            ))
        })
}
