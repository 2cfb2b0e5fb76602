//! Release feed: implements `ReleaseFeed` using the GitHub releases API.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::application::ports::ReleaseFeed;
use crate::domain::config::AdirfConfig;

const USER_AGENT: &str = concat!("adirf/", env!("CARGO_PKG_VERSION"));

/// Subset of the `releases/latest` response we read.
#[derive(Debug, Deserialize)]
struct LatestRelease {
    tag_name: Option<String>,
}

/// Queries `https://api.github.com/repos/<owner>/<repo>/releases/latest`.
pub struct GithubReleaseFeed {
    url: String,
    timeout: Duration,
}

impl GithubReleaseFeed {
    #[must_use]
    pub fn new(config: &AdirfConfig) -> Self {
        Self {
            url: format!(
                "https://api.github.com/repos/{}/{}/releases/latest",
                config.release.owner, config.release.repo
            ),
            timeout: config.release_timeout(),
        }
    }

    fn fetch_blocking(url: &str, timeout: Duration) -> Result<String> {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        agent
            .get(url)
            .set("User-Agent", USER_AGENT)
            .set("Accept", "application/vnd.github+json")
            .call()
            .with_context(|| format!("failed to query {url}"))?
            .into_string()
            .context("failed to read release metadata")
    }
}

impl ReleaseFeed for GithubReleaseFeed {
    async fn latest_tag(&self) -> Result<Option<String>> {
        let url = self.url.clone();
        let timeout = self.timeout;
        let body = tokio::task::spawn_blocking(move || Self::fetch_blocking(&url, timeout))
            .await
            .context("release query task failed")??;
        let tag = parse_latest_tag(&body)?;
        tracing::debug!(url = %self.url, tag = ?tag, "release metadata fetched");
        Ok(tag)
    }
}

/// Extract `tag_name` from a `releases/latest` body.
///
/// A missing or blank field yields `None`.
///
/// # Errors
///
/// Returns an error if the body is not JSON.
pub(crate) fn parse_latest_tag(body: &str) -> Result<Option<String>> {
    let release: LatestRelease =
        serde_json::from_str(body).context("release metadata is not valid JSON")?;
    Ok(release
        .tag_name
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty()))
}
