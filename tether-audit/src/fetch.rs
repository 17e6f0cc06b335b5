//! Remote baseline retrieval.
//!
//! [`SourceFetcher`] is the seam the orchestrators fetch through;
//! [`RawGitFetcher`] resolves GitHub sources to
//! `https://raw.githubusercontent.com/<owner>/<repo>/<commit>/<path>` and
//! downloads them with a blocking HTTP client.

use tether_core::{GitSource, RelPath, Source};

use crate::error::FetchError;

const RAW_HOST: &str = "https://raw.githubusercontent.com";

/// Resolves a manifest source to the upstream text of one file.
pub trait SourceFetcher: Send + Sync {
    fn fetch(&self, source: &Source, file: &RelPath) -> Result<String, FetchError>;
}

/// Production fetcher for GitHub-hosted repositories.
#[derive(Debug, Clone)]
pub struct RawGitFetcher {
    agent: ureq::Agent,
}

impl RawGitFetcher {
    pub fn new() -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .user_agent(concat!("tether/", env!("CARGO_PKG_VERSION")))
                .build(),
        }
    }
}

impl Default for RawGitFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl SourceFetcher for RawGitFetcher {
    fn fetch(&self, source: &Source, file: &RelPath) -> Result<String, FetchError> {
        let url = raw_url(source, file)?;
        tracing::debug!("fetching {url}");
        match self.agent.get(&url).call() {
            Ok(response) => response.into_string().map_err(|e| FetchError::Network {
                url,
                message: e.to_string(),
            }),
            Err(ureq::Error::Status(404, _)) => Err(FetchError::NotFound { url }),
            Err(ureq::Error::Status(code, response)) => Err(FetchError::Network {
                url,
                message: format!("HTTP {code} {}", response.status_text()),
            }),
            Err(err) => Err(FetchError::Network {
                url,
                message: err.to_string(),
            }),
        }
    }
}

/// Raw-content URL for `file` under `source`.
pub fn raw_url(source: &Source, file: &RelPath) -> Result<String, FetchError> {
    match source {
        Source::Git(git) => git_raw_url(git, file),
    }
}

fn git_raw_url(git: &GitSource, file: &RelPath) -> Result<String, FetchError> {
    let slug = github_slug(&git.repo).ok_or_else(|| FetchError::UnsupportedDomain {
        repo: git.repo.clone(),
    })?;
    Ok(format!(
        "{RAW_HOST}/{slug}/{}/{}",
        git.commit,
        git.resolve_path(file)
    ))
}

/// `owner/name` for a github.com repository address.
fn github_slug(repo: &str) -> Option<String> {
    let rest = repo
        .strip_prefix("https://")
        .or_else(|| repo.strip_prefix("http://"))?;
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let rest = rest.strip_prefix("github.com/")?;
    let rest = rest.trim_end_matches('/');
    let rest = rest.strip_suffix(".git").unwrap_or(rest);

    let mut parts = rest.split('/');
    let (Some(owner), Some(name), None) = (parts.next(), parts.next(), parts.next()) else {
        return None;
    };
    if owner.is_empty() || name.is_empty() {
        return None;
    }
    Some(format!("{owner}/{name}"))
}
