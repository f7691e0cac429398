//! Traits related to remote git forges
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

use crate::{
    Result,
    forge::request::{
        CreateReleaseRequest, ForgeRelease, UpdateReleaseRequest,
        UploadAssetRequest,
    },
};

/// Release API of a hosting platform.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Forge: Send + Sync {
    /// Default branch from the repository metadata.
    async fn default_branch(&self) -> Result<String>;

    /// Most recent published (non-draft, non-prerelease) release.
    async fn get_latest_release(&self) -> Result<Option<ForgeRelease>>;

    /// Release attached to `tag`, drafts included.
    async fn get_release_by_tag(&self, tag: &str)
    -> Result<Option<ForgeRelease>>;

    async fn create_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<ForgeRelease>;

    async fn update_release(
        &self,
        req: UpdateReleaseRequest,
    ) -> Result<ForgeRelease>;

    async fn upload_release_asset(&self, req: UploadAssetRequest)
    -> Result<()>;
}
