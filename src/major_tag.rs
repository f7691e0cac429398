//! Floating major version tag maintenance.
//!
//! A floating tag such as `v2` always points at the newest release of that
//! major version, so consumers can pin to a major line.
use log::*;
use semver::Version;

use crate::{Result, repo::Git, version::major_tag};

/// Moves `v<major>` to the newest release of each major version.
pub struct MajorTagReconciler<'a> {
    git: &'a dyn Git,
    enabled: bool,
}

impl<'a> MajorTagReconciler<'a> {
    pub fn new(git: &'a dyn Git, enabled: bool) -> Self {
        Self { git, enabled }
    }

    /// Point `v<version.major>` at `target` locally and on origin.
    ///
    /// Failing to delete a previous tag is expected the first time a major
    /// version is released and only logged.
    pub fn reconcile(&self, version: &Version, target: &str) -> Result<()> {
        if !self.enabled {
            debug!("major tag tracking disabled: skipping");
            return Ok(());
        }

        let tag = major_tag(version);

        info!("moving {tag} to {target} for release {version}");

        if let Err(err) = self.git.delete_tag(&tag) {
            warn!("{err}: continuing");
        }

        if let Err(err) = self.git.delete_remote_tag(&tag) {
            warn!("{err}: continuing");
        }

        self.git.create_tag(&tag, target)?;
        self.git.push_tag(&tag, true)?;

        Ok(())
    }
}
