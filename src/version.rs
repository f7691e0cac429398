//! Current and next version resolution.
//!
//! The current version comes from the latest published release on the forge.
//! When the repository has never been released, the oldest first-parent
//! commit is used as an anchor instead and the run continues from `0.0.0`.
use log::*;
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt::Display;

use crate::{
    Result,
    error::ReleaseError,
    forge::traits::Forge,
    repo::{Git, LogRequest},
};

/// Prefix applied to every version tag this tool creates.
pub const TAG_PREFIX: &str = "v";

/// Increment rule applied to a version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BumpKind {
    /// Increment (or initialize) the prerelease counter.
    Prerelease,
    /// Increment patch and drop any prerelease label.
    Patch,
}

/// Starting point a release is measured from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Baseline {
    /// Latest published release.
    Tagged { tag: String, version: Version },
    /// Oldest known commit, used when nothing has been released yet.
    Anchor { sha: String },
}

impl Baseline {
    pub fn version(&self) -> Version {
        match self {
            Baseline::Tagged { version, .. } => version.clone(),
            Baseline::Anchor { .. } => Version::new(0, 0, 0),
        }
    }

    /// Ref the changelog range starts from.
    pub fn from_ref(&self) -> &str {
        match self {
            Baseline::Tagged { tag, .. } => tag,
            Baseline::Anchor { sha } => sha,
        }
    }
}

impl Display for Baseline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Baseline::Tagged { tag, .. } => f.write_str(tag),
            Baseline::Anchor { sha } => write!(f, "anchor commit {sha}"),
        }
    }
}

/// Parses a tag name such as `v1.2.3` or `1.2.3-rc.1` into a version.
pub fn parse_version(tag: &str) -> Result<Version> {
    let raw = tag.trim();
    let raw = raw.strip_prefix(TAG_PREFIX).unwrap_or(raw);

    Version::parse(raw).map_err(|err| {
        ReleaseError::InvalidVersionFormat(format!("{tag}: {err}"))
    })
}

/// Formats the tag name for a version.
pub fn version_tag(version: &Version) -> String {
    format!("{TAG_PREFIX}{version}")
}

/// Formats the floating major tag name for a version.
pub fn major_tag(version: &Version) -> String {
    format!("{TAG_PREFIX}{}", version.major)
}

/// Applies the increment rule for `kind` to `current`.
///
/// The result always sorts strictly above `current`.
pub fn next_version(current: &Version, kind: BumpKind) -> Result<Version> {
    let mut next = current.clone();
    next.build = BuildMetadata::EMPTY;

    match kind {
        BumpKind::Patch => {
            next.patch = increment_patch(current)?;
            next.pre = Prerelease::EMPTY;
        }
        BumpKind::Prerelease => {
            if current.pre.is_empty() {
                // 1.2.3-0 would sort below 1.2.3
                next.patch = increment_patch(current)?;
                next.pre = Prerelease::new("0")?;
            } else {
                next.pre = increment_prerelease(&current.pre)?;
            }
        }
    }

    Ok(next)
}

fn increment_patch(current: &Version) -> Result<u64> {
    current.patch.checked_add(1).ok_or_else(|| {
        ReleaseError::InvalidVersionFormat(format!(
            "{current}: patch component cannot be incremented"
        ))
    })
}

fn increment_prerelease(pre: &Prerelease) -> Result<Prerelease> {
    let raw = pre.as_str();

    let (head, last) = match raw.rsplit_once('.') {
        Some((head, last)) => (Some(head), last),
        None => (None, raw),
    };

    let counter = last.parse::<u64>().ok().and_then(|c| c.checked_add(1));

    // non-numeric or exhausted counters get a fresh trailing counter
    let label = match (head, counter) {
        (Some(head), Some(counter)) => format!("{head}.{counter}"),
        (None, Some(counter)) => counter.to_string(),
        (_, None) => format!("{raw}.0"),
    };

    Ok(Prerelease::new(&label)?)
}

/// Highest prerelease among `tags` sharing `target`'s major.minor.patch.
/// Tags that don't parse as versions are ignored.
pub fn latest_prerelease_tag(
    tags: &[String],
    target: &Version,
) -> Option<Version> {
    tags.iter()
        .filter_map(|tag| parse_version(tag).ok())
        .filter(|v| {
            !v.pre.is_empty()
                && v.major == target.major
                && v.minor == target.minor
                && v.patch == target.patch
        })
        .max()
}

/// Resolves the version a release run starts from.
pub struct VersionResolver<'a> {
    git: &'a dyn Git,
    forge: &'a dyn Forge,
}

impl<'a> VersionResolver<'a> {
    pub fn new(git: &'a dyn Git, forge: &'a dyn Forge) -> Self {
        Self { git, forge }
    }

    /// Looks up the latest published release.
    ///
    /// Returns [`ReleaseError::NoPriorRelease`] when the repository has no
    /// published release.
    pub async fn latest_release(&self) -> Result<Baseline> {
        let release = self
            .forge
            .get_latest_release()
            .await?
            .ok_or(ReleaseError::NoPriorRelease)?;

        let version = parse_version(&release.tag)?;

        Ok(Baseline::Tagged {
            tag: release.tag,
            version,
        })
    }

    /// Latest published release, or the oldest first-parent commit when
    /// nothing has been released yet.
    pub async fn current_version(&self) -> Result<Baseline> {
        match self.latest_release().await {
            Ok(baseline) => {
                info!("current release: {baseline}");
                Ok(baseline)
            }
            Err(ReleaseError::NoPriorRelease) => {
                warn!(
                    "no published release found: falling back to oldest commit as version anchor"
                );
                self.anchor()
            }
            Err(err) => Err(err),
        }
    }

    /// Next prerelease after `baseline`, continuing the counter of any
    /// prerelease already tagged for the same patch version.
    pub fn next_prerelease(&self, baseline: &Baseline) -> Result<Version> {
        let next = next_version(&baseline.version(), BumpKind::Prerelease)?;
        let tags = self.git.tag_names()?;

        match latest_prerelease_tag(&tags, &next) {
            Some(tagged) if tagged >= next => {
                debug!("continuing from existing prerelease tag {tagged}");
                next_version(&tagged, BumpKind::Prerelease)
            }
            _ => Ok(next),
        }
    }

    fn anchor(&self) -> Result<Baseline> {
        let commits = self.git.log(LogRequest {
            from: None,
            to: "HEAD".into(),
            max_count: None,
        })?;

        let oldest = commits.last().ok_or_else(|| {
            ReleaseError::InvalidVersionFormat(
                "repository has no commits to anchor a version to".into(),
            )
        })?;

        info!("using anchor commit: {}", oldest.hash);

        Ok(Baseline::Anchor {
            sha: oldest.hash.clone(),
        })
    }
}
