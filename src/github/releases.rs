//! Paginated release fetching

use super::client::GithubApi;
use super::GithubRelease;
use crate::error::Result;
use crate::logging::log_debug;

fn releases_page_path(repo: &str, per_page: u32, page: u32) -> String {
    format!("repos/{}/releases?per_page={}&page={}", repo, per_page, page)
}

/// Fetch every release of `repo`, newest first (GitHub's default order).
pub fn fetch_releases(api: &dyn GithubApi, repo: &str, per_page: u32) -> Result<Vec<GithubRelease>> {
    fetch_releases_until(api, repo, per_page, |_| false)
}

/// Fetch releases of `repo` newest first, stopping at the first release for
/// which `is_known` returns true. That release and everything after it are
/// left out, and no further pages are requested.
///
/// Paging also stops on an empty page or one shorter than `per_page`.
pub fn fetch_releases_until<F>(
    api: &dyn GithubApi,
    repo: &str,
    per_page: u32,
    mut is_known: F,
) -> Result<Vec<GithubRelease>>
where
    F: FnMut(&GithubRelease) -> bool,
{
    let mut releases = Vec::new();
    let mut page = 1;

    loop {
        let value = api.get_json(&releases_page_path(repo, per_page, page))?;
        let batch: Vec<GithubRelease> = serde_json::from_value(value)?;

        if batch.is_empty() {
            log_debug(&format!("No more releases on page {} for {}, stopping.", page, repo));
            break;
        }
        log_debug(&format!("Fetched {} releases from {}, page {}", batch.len(), repo, page));

        let batch_len = batch.len();
        for release in batch {
            if is_known(&release) {
                log_debug(&format!(
                    "Reached known release {} in {}, stopping.",
                    release.tag_name, repo
                ));
                return Ok(releases);
            }
            releases.push(release);
        }

        if batch_len < per_page as usize {
            log_debug(&format!("Short page {} for {}, stopping.", page, repo));
            break;
        }
        page += 1;
    }

    Ok(releases)
}
