//! Configuration for Git forge platform connections.
use secrecy::SecretString;

use crate::repo::remote::RepoRef;

/// Public host whose API lives on a separate `api.` subdomain.
pub const GITHUB_HOST: &str = "github.com";

/// Remote repository connection configuration for authenticating and
/// interacting with forge platforms.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Remote forge host (e.g., "github.com").
    pub host: String,
    /// Repository owner.
    pub owner: String,
    /// Repository name.
    pub repo: String,
    /// Access token for authentication.
    pub token: SecretString,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            host: "".to_string(),
            owner: "".to_string(),
            repo: "".to_string(),
            token: SecretString::from("".to_string()),
        }
    }
}

impl RemoteConfig {
    pub fn new(repo_ref: &RepoRef, token: SecretString) -> Self {
        Self {
            host: repo_ref.host.clone(),
            owner: repo_ref.organization.clone(),
            repo: repo_ref.repository.clone(),
            token,
        }
    }

    /// REST API base for the host: `api.github.com` for the public
    /// instance, `/api/v3` on Enterprise hosts.
    pub fn api_base_uri(&self) -> String {
        if self.host == GITHUB_HOST {
            format!("https://api.{}", self.host)
        } else {
            format!("https://{}/api/v3", self.host)
        }
    }
}
