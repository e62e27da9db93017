//! Provisioning-link builders.
//!
//! All builders are pure: the same request always yields the same URL.

use url::{Url, form_urlencoded};

use crate::request::{BinderEnvironment, ContentSource, LaunchMode, ProvisioningRequest};

/// Hub path that forwards to the user's server and starts the pull.
pub const GIT_PULL_PATH: &str = "hub/user-redirect/git-pull";

/// Hub path that performs the LTI authentication handshake.
pub const LTI_LAUNCH_PATH: &str = "hub/lti/launch";

/// Build the link for the request's own launch mode.
pub fn build_url(req: &ProvisioningRequest) -> String {
    match req.mode() {
        LaunchMode::Direct => build_direct_url(req),
        LaunchMode::Lti => build_lti_launch_url(req),
        LaunchMode::Binder(env) => binder_url(req, env),
    }
}

/// `{hub}/hub/user-redirect/git-pull?repo=..&urlpath=..&branch=..`
pub fn build_direct_url(req: &ProvisioningRequest) -> String {
    let mut url = req.hub_url().clone();
    let path = join_path(&url, GIT_PULL_PATH);
    url.set_path(&path);
    set_query(&mut url, &pull_params(req));
    url.to_string()
}

/// `{hub}/hub/lti/launch?next=<url-encoded git-pull path and query>`
pub fn build_lti_launch_url(req: &ProvisioningRequest) -> String {
    let mut url = req.hub_url().clone();
    let next = format!(
        "{}?{}",
        join_path(&url, GIT_PULL_PATH),
        encode(&pull_params(req))
    );
    let path = join_path(&url, LTI_LAUNCH_PATH);
    url.set_path(&path);
    set_query(&mut url, &[("next", next)]);
    url.to_string()
}

/// `{binder}/v2/gh/{owner}/{repo}/{branch}?urlpath=git-pull?...`
///
/// Returns `None` unless the request is in Binder mode.
pub fn build_binder_launch_url(req: &ProvisioningRequest) -> Option<String> {
    match req.mode() {
        LaunchMode::Binder(env) => Some(binder_url(req, env)),
        _ => None,
    }
}

fn binder_url(req: &ProvisioningRequest, env: &BinderEnvironment) -> String {
    let mut url = req.hub_url().clone();
    let path = join_path(
        &url,
        &format!("v2/gh/{}/{}/{}", env.owner, env.name, env.branch),
    );
    url.set_path(&path);
    // Binder redirects to this path+query once the environment is built.
    let next = format!("git-pull?{}", encode(&pull_params(req)));
    set_query(&mut url, &[("urlpath", next)]);
    url.to_string()
}

/// The `repo`/`urlpath`/`branch`/`contentProvider` set shared by every mode.
fn pull_params(req: &ProvisioningRequest) -> Vec<(&'static str, String)> {
    let source = req.source();
    let mut params = vec![("repo", source.url().to_owned())];

    if let Some(urlpath) = req.launch_path() {
        params.push(("urlpath", urlpath));
    }

    match source {
        ContentSource::Git { .. } => {
            if let Some(branch) = source.effective_branch() {
                params.push(("branch", branch.to_owned()));
            }
        }
        ContentSource::Archive { provider, .. } => {
            params.push(("contentProvider", provider.marker().to_owned()));
        }
    }

    params
}

fn encode(params: &[(&str, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())))
        .finish()
}

/// Append `suffix` to the URL's path with exactly one separator in between.
fn join_path(url: &Url, suffix: &str) -> String {
    format!("{}/{}", url.path().trim_end_matches('/'), suffix)
}

/// Replace `params` in the query, keeping any unrelated pairs the hub URL carried.
fn set_query(url: &mut Url, params: &[(&str, String)]) {
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| !params.iter().any(|(name, _)| name == key))
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut()
        .extend_pairs(kept.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
}
