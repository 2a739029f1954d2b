//! Checksum sidecar verification (SHA-256, SHA-1, MD5).

use md5::Md5;
use reqwest::Client;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use jvmdeps_util::errors::JvmDepsError;

use crate::download;
use crate::repository::MavenRepository;

/// Outcome of a sidecar check that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verified {
    Sha256,
    Sha1,
    Md5,
    /// The repository publishes no sidecar for this file.
    Unchecked,
}

/// Verify downloaded bytes against the strongest sidecar the repository serves.
///
/// Tries `.sha256`, then `.sha1`, then `.md5`. A mismatch is an error; a
/// repository with no sidecar at all only logs a warning.
pub async fn verify(
    client: &Client,
    repo: &MavenRepository,
    file_url: &str,
    data: &[u8],
) -> miette::Result<Verified> {
    let algorithms: [(&str, Verified, fn(&[u8]) -> String); 3] = [
        ("sha256", Verified::Sha256, hex_digest::<Sha256>),
        ("sha1", Verified::Sha1, hex_digest::<Sha1>),
        ("md5", Verified::Md5, hex_digest::<Md5>),
    ];

    for (ext, kind, digest) in algorithms {
        let sidecar = format!("{file_url}.{ext}");
        if let Some(content) = download::download_text(client, repo, &sidecar).await? {
            let expected = extract_hash(&content);
            let actual = digest(data);
            return if actual.eq_ignore_ascii_case(expected) {
                tracing::debug!("{ext} ok for {file_url}");
                Ok(kind)
            } else {
                Err(JvmDepsError::Network {
                    message: format!(
                        "{ext} mismatch for {file_url}: expected {expected}, got {actual}"
                    ),
                }
                .into())
            };
        }
    }

    tracing::warn!("No checksum sidecar found for {file_url}");
    Ok(Verified::Unchecked)
}

/// Extract the hex hash from a checksum file.
///
/// Maven checksum files may contain just the hash, or `hash  filename`.
fn extract_hash(content: &str) -> &str {
    content.split_whitespace().next().unwrap_or("")
}

fn hex_digest<D: Digest>(data: &[u8]) -> String {
    let mut out = String::new();
    for byte in D::digest(data) {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_hash_simple() {
        assert_eq!(extract_hash("abc123\n"), "abc123");
    }

    #[test]
    fn extract_hash_with_filename() {
        assert_eq!(extract_hash("abc123  my-lib-1.0.jar\n"), "abc123");
    }

    #[test]
    fn sha256_matches_util() {
        assert_eq!(
            hex_digest::<Sha256>(b"hello world"),
            jvmdeps_util::hash::sha256_bytes(b"hello world")
        );
    }

    #[test]
    fn sha1_and_md5_digests() {
        assert_eq!(
            hex_digest::<Sha1>(b"hello world"),
            "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed"
        );
        assert_eq!(
            hex_digest::<Md5>(b"hello world"),
            "5eb63bbbe01eeed093cb22bb8f5acdc3"
        );
    }
}
