//! Release note composition with size-bounded degradation.
//!
//! Each commit renders as one markdown list line. When the body grows past
//! [`MAX_BODY_LENGTH`] the whole body is re-rendered with one more category
//! of content removed, in the order listed in [`DEGRADATION_TIERS`].
use log::*;

use crate::repo::{CommitRecord, remote::RepoRef};

/// Bodies at or above this many characters are degraded.
pub const MAX_BODY_LENGTH: usize = 20_000;

/// Content categories included in each rendered commit line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    pub include_links: bool,
    pub include_messages: bool,
    pub include_authors: bool,
}

/// Tiers tried in order until a body fits.
pub const DEGRADATION_TIERS: [FormatOptions; 4] = [
    FormatOptions {
        include_links: true,
        include_messages: true,
        include_authors: true,
    },
    FormatOptions {
        include_links: false,
        include_messages: true,
        include_authors: true,
    },
    FormatOptions {
        include_links: false,
        include_messages: false,
        include_authors: true,
    },
    FormatOptions {
        include_links: false,
        include_messages: false,
        include_authors: false,
    },
];

/// Renders release note bodies for a repository.
pub struct ChangelogComposer<'a> {
    repo_ref: &'a RepoRef,
    max_length: usize,
}

impl<'a> ChangelogComposer<'a> {
    pub fn new(repo_ref: &'a RepoRef) -> Self {
        Self {
            repo_ref,
            max_length: MAX_BODY_LENGTH,
        }
    }

    #[cfg(test)]
    fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Compose the body for `commits` (newest first) released since
    /// `from_tag`.
    pub fn compose(&self, commits: &[CommitRecord], from_tag: &str) -> String {
        if commits.is_empty() {
            return String::new();
        }

        let mut body = String::new();

        for (i, options) in DEGRADATION_TIERS.iter().enumerate() {
            body = self.render(commits, from_tag, options);

            if body.chars().count() < self.max_length {
                debug!("changelog fits using tier {i}: {:?}", options);
                return body;
            }

            warn!(
                "changelog body is {} characters (limit {}): dropping content",
                body.chars().count(),
                self.max_length
            );
        }

        warn!("changelog still exceeds limit without links, messages, or authors");
        body
    }

    fn render(
        &self,
        commits: &[CommitRecord],
        from_tag: &str,
        options: &FormatOptions,
    ) -> String {
        commits
            .iter()
            .map(|commit| self.render_line(commit, from_tag, options))
            .collect::<Vec<String>>()
            .join("\n")
    }

    fn render_line(
        &self,
        commit: &CommitRecord,
        from_tag: &str,
        options: &FormatOptions,
    ) -> String {
        let mut line = format!("- {}", commit.short_hash());

        if options.include_messages {
            line.push_str(&format!(" **{}**", commit.summary.trim()));
        }

        if options.include_authors && !commit.author.is_empty() {
            line.push_str(&format!(" ({})", commit.author));
        }

        if options.include_links {
            let link = self.repo_ref.compare_link(from_tag, &commit.hash);
            line.push_str(&format!(" [compare]({link})"));
        }

        line
    }
}
