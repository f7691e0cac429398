//! Implements the Forge trait for Github
use async_trait::async_trait;
use bytes::Bytes;
use color_eyre::eyre::OptionExt;
use log::*;
use octocrab::{Octocrab, models::repos::Release};
use reqwest::StatusCode;

use crate::{
    Result,
    error::ReleaseError,
    forge::{
        config::RemoteConfig,
        request::{
            CreateReleaseRequest, ForgeRelease, UpdateReleaseRequest,
            UploadAssetRequest,
        },
        traits::Forge,
    },
};

/// GitHub forge implementation using Octocrab for the releases API.
pub struct Github {
    config: RemoteConfig,
    instance: Octocrab,
}

impl Github {
    /// Create GitHub client with personal access token authentication and API
    /// base URL configuration.
    pub fn new(config: RemoteConfig) -> Result<Self> {
        let base_uri = config.api_base_uri();
        let instance = Octocrab::builder()
            .personal_token(config.token.clone())
            .base_uri(base_uri)?
            .build()?;

        Ok(Self { config, instance })
    }
}

impl From<Release> for ForgeRelease {
    fn from(release: Release) -> Self {
        Self {
            id: release.id.into_inner(),
            tag: release.tag_name,
            name: release.name.unwrap_or_default(),
            body: release.body.unwrap_or_default(),
            draft: release.draft,
            url: release.html_url.to_string(),
        }
    }
}

/// Maps a 404 from the API to `None`.
fn not_found_as_none<T>(
    result: std::result::Result<T, octocrab::Error>,
) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(octocrab::Error::GitHub { source, .. })
            if source.status_code == StatusCode::NOT_FOUND =>
        {
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl Forge for Github {
    async fn default_branch(&self) -> Result<String> {
        let repo = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .get()
            .await?;

        let err_msg = format!(
            "failed to find default branch for github repo: {}/{}",
            self.config.owner, self.config.repo
        );

        Ok(repo.default_branch.ok_or_eyre(err_msg)?)
    }

    async fn get_latest_release(&self) -> Result<Option<ForgeRelease>> {
        let result = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .get_latest()
            .await;

        let release = not_found_as_none(result)?;

        if release.is_none() {
            info!(
                "no published release found for {}/{}",
                self.config.owner, self.config.repo
            );
        }

        Ok(release.map(ForgeRelease::from))
    }

    async fn get_release_by_tag(
        &self,
        tag: &str,
    ) -> Result<Option<ForgeRelease>> {
        let result = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .get_by_tag(tag)
            .await;

        if let Some(release) = not_found_as_none(result)? {
            return Ok(Some(release.into()));
        }

        // drafts are not returned by the tag endpoint
        let page = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .list()
            .per_page(100)
            .send()
            .await?;

        Ok(page
            .items
            .into_iter()
            .find(|r| r.tag_name == tag)
            .map(ForgeRelease::from))
    }

    async fn create_release(
        &self,
        req: CreateReleaseRequest,
    ) -> Result<ForgeRelease> {
        debug!("creating release: {:#?}", req);

        let release = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .create(&req.tag)
            .name(&req.name)
            .body(&req.body)
            .target_commitish(&req.target_sha)
            .draft(req.draft)
            .prerelease(false)
            .send()
            .await?;

        Ok(release.into())
    }

    async fn update_release(
        &self,
        req: UpdateReleaseRequest,
    ) -> Result<ForgeRelease> {
        debug!("updating release: {:#?}", req);

        let release = self
            .instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .update(req.release_id)
            .tag_name(&req.tag)
            .name(&req.name)
            .body(&req.body)
            .draft(req.draft)
            .send()
            .await?;

        Ok(release.into())
    }

    async fn upload_release_asset(&self, req: UploadAssetRequest) -> Result<()> {
        info!(
            "uploading asset {} to release {}",
            req.filename, req.release_id
        );

        self.instance
            .repos(&self.config.owner, &self.config.repo)
            .releases()
            .upload_asset(req.release_id, &req.filename, Bytes::from(req.content))
            .send()
            .await
            .map_err(|err| {
                ReleaseError::forge(format!(
                    "failed to upload asset {}: {err}",
                    req.filename
                ))
            })?;

        Ok(())
    }
}
