//! Repository identifiers.

use std::fmt;

use url::Url;

use crate::error::{MergeScopeError, Result};

/// An `owner/name` repository reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RepoRef {
    owner: String,
    name: String,
}

impl RepoRef {
    /// Build a reference from its parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Result<Self> {
        let owner = owner.into();
        let name = name.into();
        if !is_valid_segment(&owner) || !is_valid_segment(&name) {
            return Err(MergeScopeError::InvalidRepo(format!("{owner}/{name}")));
        }
        Ok(Self { owner, name })
    }

    /// Parse `owner/repo`, `github.com/owner/repo` or a full repository URL.
    ///
    /// Trailing `.git` suffixes and extra path segments (`/issues/12`) are ignored.
    pub fn parse(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(MergeScopeError::InvalidRepo("empty repository".to_string()));
        }

        let segments: Vec<String> = if trimmed.contains("://") {
            let url = Url::parse(trimmed)
                .map_err(|err| MergeScopeError::InvalidRepo(format!("{trimmed}: {err}")))?;
            url.path_segments()
                .map(|segments| segments.map(str::to_string).collect())
                .unwrap_or_default()
        } else {
            let mut parts: Vec<String> = trimmed.split('/').map(str::to_string).collect();
            // Owners never contain dots, so a dotted first segment is a host.
            if parts[0].contains('.') && !parts[0].starts_with('.') {
                parts.remove(0);
            }
            parts
        };

        if segments.len() < 2 {
            return Err(MergeScopeError::InvalidRepo(format!(
                "expected owner/repo: {trimmed}"
            )));
        }
        let owner = segments[0].clone();
        let name = segments[1].trim_end_matches(".git").to_string();
        Self::new(owner, name).map_err(|_| {
            MergeScopeError::InvalidRepo(format!("empty owner or repo name: {trimmed}"))
        })
    }

    /// Repository owner.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Repository name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && segment
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
}
