//! Hosting platform (forge) access for release objects.
//!
//! Provides token-based authentication, release management, and repository
//! metadata through a common trait.

/// Configuration and authentication for forge platforms.
pub mod config;

/// GitHub API client implementation for GitHub.com and Enterprise.
pub mod github;

/// Request and response types shared by forge implementations.
pub mod request;

/// Common traits for forge platform abstraction.
pub mod traits;
