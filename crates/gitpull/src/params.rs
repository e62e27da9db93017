use url::Url;

use crate::paths::{default_launch_path, default_target_path};

/// Errors building a session from its parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("missing session parameter: {0}")]
    Missing(&'static str),

    #[error("session parameter {0} is not valid percent-encoded UTF-8")]
    InvalidEncoding(&'static str),

    #[error("base URL must be absolute to open the event stream: {0}")]
    RelativeBaseUrl(String),
}

/// Identity of one sync attempt, as handed over by the status page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    /// Notebook server base URL, ending in `/`.
    pub base_url: String,
    pub repo: String,
    pub branch: Option<String>,
    pub depth: Option<String>,
    pub target_path: String,
    /// In-app path to open afterwards, relative to `base_url`.
    pub path: String,
    pub xsrf: Option<String>,
    pub content_provider: Option<String>,
}

impl SessionParams {
    pub fn new(base_url: impl Into<String>, repo: impl Into<String>) -> Self {
        let repo = repo.into();
        let target_path = default_target_path(&repo).to_owned();
        let path = default_launch_path("", &target_path, ".", None, false);
        Self {
            base_url: with_trailing_slash(base_url.into()),
            repo,
            branch: None,
            depth: None,
            target_path,
            path,
            xsrf: None,
            content_provider: None,
        }
    }

    /// Read page-embedded parameters (`base-url`, `repo`, `branch`, `depth`,
    /// `targetpath`, `path`, `xsrf`, `content-provider`).
    ///
    /// Every value is percent-decoded exactly once here; nothing downstream
    /// decodes again. Absent keys stay absent.
    pub fn from_page_data<F>(lookup: F) -> Result<Self, SessionError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| -> Result<Option<String>, SessionError> {
            lookup(key)
                .map(|raw| {
                    urlencoding::decode(&raw)
                        .map(|decoded| decoded.into_owned())
                        .map_err(|_| SessionError::InvalidEncoding(key))
                })
                .transpose()
        };

        let base_url = read("base-url")?.ok_or(SessionError::Missing("base-url"))?;
        let repo = read("repo")?
            .filter(|r| !r.is_empty())
            .ok_or(SessionError::Missing("repo"))?;

        let mut params = Self::new(base_url, repo);
        params.branch = read("branch")?;
        params.depth = read("depth")?;
        params.xsrf = read("xsrf")?;
        params.content_provider = read("content-provider")?;
        if let Some(target_path) = read("targetpath")? {
            params.target_path = target_path;
        }
        params.path = match read("path")? {
            Some(path) => path,
            None => default_launch_path(
                "",
                &params.target_path,
                ".",
                None,
                params.content_provider.is_some(),
            ),
        };

        Ok(params)
    }

    /// Where to navigate once the pull has finished.
    pub fn redirect_url(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    /// `{base}git-pull/api?_xsrf=..&repo=..&targetpath=..` followed by any of
    /// `depth`, `branch` and `contentProvider` that are set.
    pub fn sync_url(&self) -> Result<Url, SessionError> {
        let mut url = Url::parse(&format!("{}git-pull/api", self.base_url))
            .map_err(|_| SessionError::RelativeBaseUrl(self.base_url.clone()))?;

        {
            let mut query = url.query_pairs_mut();
            if let Some(xsrf) = &self.xsrf {
                query.append_pair("_xsrf", xsrf);
            }
            query.append_pair("repo", &self.repo);
            query.append_pair("targetpath", &self.target_path);
            if let Some(depth) = &self.depth {
                query.append_pair("depth", depth);
            }
            if let Some(branch) = &self.branch {
                query.append_pair("branch", branch);
            }
            if let Some(provider) = &self.content_provider {
                query.append_pair("contentProvider", provider);
            }
        }

        Ok(url)
    }
}

fn with_trailing_slash(mut base_url: String) -> String {
    if !base_url.ends_with('/') {
        base_url.push('/');
    }
    base_url
}
