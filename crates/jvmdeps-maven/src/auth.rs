//! Repository authentication.
//!
//! Credentials come from `[repositories]` in `jvmdeps.toml`, with `${env:...}`
//! references already expanded when the configuration was loaded.

use reqwest::RequestBuilder;

use crate::repository::MavenRepository;

/// Apply authentication to a request if the repository has credentials.
/// A password without a username is sent as a bearer token.
pub fn apply_auth(request: RequestBuilder, repo: &MavenRepository) -> RequestBuilder {
    if !repo.has_auth() {
        return request;
    }
    match (&repo.username, &repo.password) {
        (Some(user), pass) => request.basic_auth(user, pass.as_deref()),
        (None, Some(token)) => request.bearer_auth(token),
        (None, None) => request,
    }
}
