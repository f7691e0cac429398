use semver::Version;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Normalized release object returned from any forge
pub struct ForgeRelease {
    pub id: u64,
    pub tag: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Release about to be published.
pub struct ReleaseDraft {
    pub version: Version,
    pub tag: String,
    pub title: String,
    pub body: String,
    pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to create a new release.
pub struct CreateReleaseRequest {
    pub tag: String,
    pub name: String,
    pub body: String,
    /// Commit the tag is created on when it doesn't exist yet
    pub target_sha: String,
    pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Request to update an existing release in place.
pub struct UpdateReleaseRequest {
    pub release_id: u64,
    pub tag: String,
    pub name: String,
    pub body: String,
    pub draft: bool,
}

#[derive(Clone, PartialEq, Eq)]
/// Request to attach a file to a release.
pub struct UploadAssetRequest {
    pub release_id: u64,
    pub filename: String,
    pub content: Vec<u8>,
}

impl std::fmt::Debug for UploadAssetRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadAssetRequest")
            .field("release_id", &self.release_id)
            .field("filename", &self.filename)
            .field("size", &self.content.len())
            .finish()
    }
}

impl ReleaseDraft {
    pub fn to_create_request(&self, target_sha: &str) -> CreateReleaseRequest {
        CreateReleaseRequest {
            tag: self.tag.clone(),
            name: self.title.clone(),
            body: self.body.clone(),
            target_sha: target_sha.to_string(),
            draft: self.draft,
        }
    }

    pub fn to_update_request(&self, release_id: u64) -> UpdateReleaseRequest {
        UpdateReleaseRequest {
            release_id,
            tag: self.tag.clone(),
            name: self.title.clone(),
            body: self.body.clone(),
            draft: self.draft,
        }
    }
}
