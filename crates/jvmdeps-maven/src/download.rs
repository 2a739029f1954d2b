//! HTTP downloads from Maven repositories.

use std::time::Duration;

use jvmdeps_util::errors::JvmDepsError;
use reqwest::{Client, StatusCode};

use crate::auth;
use crate::repository::MavenRepository;

const MAX_RETRIES: u32 = 3;
const RETRY_DELAY: Duration = Duration::from_secs(2);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Build the shared HTTP client for repository traffic.
pub fn build_client() -> miette::Result<Client> {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("jvmdeps/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| {
            JvmDepsError::Network {
                message: format!("Failed to create HTTP client: {e}"),
            }
            .into()
        })
}

/// Download raw bytes from a URL, with authentication and retries.
///
/// Returns `Ok(None)` for 404 (not present in this repository). Server errors,
/// timeouts and connection failures are retried with a linear backoff.
pub async fn download_bytes(
    client: &Client,
    repo: &MavenRepository,
    url: &str,
) -> miette::Result<Option<Vec<u8>>> {
    let mut last_err = String::new();

    for attempt in 0..MAX_RETRIES {
        if attempt > 0 {
            tracing::debug!("retrying {url} (attempt {})", attempt + 1);
            tokio::time::sleep(RETRY_DELAY * attempt).await;
        }

        let req = auth::apply_auth(client.get(url), repo);
        match req.send().await {
            Ok(resp) => {
                let status = resp.status();
                if status == StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if status.is_server_error() {
                    last_err = format!("HTTP {status}");
                    continue;
                }
                if !status.is_success() {
                    return Err(JvmDepsError::Network {
                        message: format!("HTTP {status} fetching {url}"),
                    }
                    .into());
                }
                let bytes = resp.bytes().await.map_err(|e| JvmDepsError::Network {
                    message: format!("Failed to read response from {url}: {e}"),
                })?;
                return Ok(Some(bytes.to_vec()));
            }
            Err(e) if e.is_timeout() || e.is_connect() => {
                last_err = e.to_string();
            }
            Err(e) => {
                return Err(JvmDepsError::Network {
                    message: format!("Request to {url} failed: {e}"),
                }
                .into());
            }
        }
    }

    Err(JvmDepsError::Network {
        message: format!("Failed after {MAX_RETRIES} attempts for {url}: {last_err}"),
    }
    .into())
}

/// Download a text file (POM, checksum sidecar).
pub async fn download_text(
    client: &Client,
    repo: &MavenRepository,
    url: &str,
) -> miette::Result<Option<String>> {
    Ok(download_bytes(client, repo, url)
        .await?
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
}
