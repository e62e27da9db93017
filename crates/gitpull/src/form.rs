use url::{Url, form_urlencoded};

use crate::app::{Application, LaunchTarget};
use crate::request::{
    ArchiveProvider, BinderEnvironment, ContentSource, LaunchMode, ProvisioningRequest,
};

/// Reasons a link form is rejected. No URL is built for a rejected form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{field} is not a valid URL: {value}")]
    InvalidUrl { field: &'static str, value: String },

    #[error("unknown application: {0}")]
    UnknownApplication(String),

    #[error("unknown content provider: {0}")]
    UnknownProvider(String),

    #[error("unknown launch mode: {0}")]
    UnknownMode(String),

    #[error("environment repository must name an owner and a repository: {0}")]
    InvalidEnvironmentRepo(String),
}

/// The link generator's inputs, as typed by a user.
///
/// In Binder mode `repo`/`branch` name the environment repository and
/// `content_repo`/`content_branch` the content to pull; in the other modes
/// `repo`/`branch` name the content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkForm {
    pub hub: String,
    pub repo: String,
    pub branch: String,
    pub content_repo: String,
    pub content_branch: String,
    /// Registry name, `custom`, or empty for no launch path.
    pub app: String,
    pub file_path: String,
    pub urlpath: String,
    /// Archive provider; empty means git.
    pub provider: String,
    /// `direct`, `canvas` or `binder`; empty means `direct`.
    pub mode: String,
}

impl LinkForm {
    /// Prefill from a link-generator query string (`?hub=..&repo=..&tab=binder`).
    ///
    /// A `urlpath` implies the `custom` application.
    pub fn from_query(query: &str) -> Self {
        let mut form = Self::default();
        let query = query.strip_prefix('?').unwrap_or(query);

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.into_owned();
            match key.as_ref() {
                "hub" => form.hub = value,
                "repo" => form.repo = value,
                "content-repo" => form.content_repo = value,
                "branch" => form.branch = value,
                "app" => form.app = value.to_lowercase(),
                "urlpath" => form.urlpath = value,
                "tab" => form.mode = value.to_lowercase(),
                _ => {}
            }
        }

        if !form.urlpath.is_empty() {
            form.app = "custom".to_owned();
        }

        form
    }

    /// Validate the form and turn it into a request.
    pub fn into_request(self) -> Result<ProvisioningRequest, LinkError> {
        let hub_url = parse_http_url("hub URL", &self.hub)?;

        let mode = match self.mode.trim() {
            "" | "direct" | "default" => FormMode::Direct,
            "canvas" | "lti" => FormMode::Lti,
            "binder" => FormMode::Binder,
            other => return Err(LinkError::UnknownMode(other.to_owned())),
        };

        let (content_url, content_branch) = match mode {
            FormMode::Binder => (self.content_repo.trim(), self.content_branch.trim()),
            FormMode::Direct | FormMode::Lti => (self.repo.trim(), self.branch.trim()),
        };

        let source = content_source(&self.provider, content_url, content_branch)?;
        let launch = launch_target(&self.app, &self.file_path, &self.urlpath)?;

        let launch_mode = match mode {
            FormMode::Direct => LaunchMode::Direct,
            FormMode::Lti => LaunchMode::Lti,
            FormMode::Binder => LaunchMode::Binder(binder_environment(&self.repo, &self.branch)?),
        };

        let mut request = ProvisioningRequest::new(hub_url, source).with_mode(launch_mode);
        if let Some(launch) = launch {
            request = request.with_launch(launch);
        }
        Ok(request)
    }
}

enum FormMode {
    Direct,
    Lti,
    Binder,
}

fn parse_http_url(field: &'static str, value: &str) -> Result<Url, LinkError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(LinkError::Missing(field));
    }

    let invalid = || LinkError::InvalidUrl {
        field,
        value: value.to_owned(),
    };

    let url = Url::parse(value).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(invalid());
    }
    Ok(url)
}

fn content_source(provider: &str, url: &str, branch: &str) -> Result<ContentSource, LinkError> {
    let provider = provider.trim();
    if provider.is_empty() || provider.eq_ignore_ascii_case("git") {
        if url.is_empty() {
            return Err(LinkError::Missing("repository URL"));
        }
        if url.chars().any(char::is_whitespace) {
            return Err(LinkError::InvalidUrl {
                field: "repository URL",
                value: url.to_owned(),
            });
        }
        return Ok(ContentSource::git_branch(url, branch));
    }

    let provider = ArchiveProvider::parse(provider)
        .ok_or_else(|| LinkError::UnknownProvider(provider.to_owned()))?;
    let url = parse_http_url("content URL", url)?;
    Ok(ContentSource::archive(provider, url.as_str()))
}

fn launch_target(
    app: &str,
    file_path: &str,
    urlpath: &str,
) -> Result<Option<LaunchTarget>, LinkError> {
    match app.trim() {
        "" => Ok(None),
        "custom" => Ok(Some(LaunchTarget::custom(urlpath.trim()))),
        name => {
            let app = Application::parse(name)
                .ok_or_else(|| LinkError::UnknownApplication(name.to_owned()))?;
            Ok(Some(LaunchTarget::application(app, file_path.trim())))
        }
    }
}

/// Owner and name are the first two path segments; a `.git` suffix is dropped from the name.
fn binder_environment(repo: &str, branch: &str) -> Result<BinderEnvironment, LinkError> {
    let url = parse_http_url("environment repository URL", repo)?;
    let branch = branch.trim();
    if branch.is_empty() {
        return Err(LinkError::Missing("environment branch"));
    }

    let segments: Vec<&str> = url
        .path_segments()
        .map(|segments| segments.filter(|s| !s.is_empty()).collect())
        .unwrap_or_default();

    match segments.as_slice() {
        [owner, name, ..] => {
            let name = name.strip_suffix(".git").unwrap_or(*name);
            if name.is_empty() {
                return Err(LinkError::InvalidEnvironmentRepo(repo.trim().to_owned()));
            }
            Ok(BinderEnvironment::new(*owner, name, branch))
        }
        _ => Err(LinkError::InvalidEnvironmentRepo(repo.trim().to_owned())),
    }
}
