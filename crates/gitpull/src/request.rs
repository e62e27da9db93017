use std::fmt;

use url::Url;

use crate::app::LaunchTarget;
use crate::clone_dir::derive_clone_directory_name;

/// Branch sent for git sources when the user leaves the branch empty.
/// The pull service has no implicit default, so it is always made explicit.
pub const DEFAULT_BRANCH: &str = "main";

/// Cloud-storage providers that serve content as a downloadable archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveProvider {
    GoogleDrive,
    Dropbox,
    Web,
}

impl ArchiveProvider {
    pub fn all() -> [ArchiveProvider; 3] {
        [Self::GoogleDrive, Self::Dropbox, Self::Web]
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "googledrive" | "google-drive" | "gdrive" => Some(Self::GoogleDrive),
            "dropbox" => Some(Self::Dropbox),
            "web" | "generic-web" | "genericweb" => Some(Self::Web),
            _ => None,
        }
    }

    /// Value of the `contentProvider` marker parameter.
    pub fn marker(&self) -> &'static str {
        match self {
            Self::GoogleDrive => "googledrive",
            Self::Dropbox => "dropbox",
            Self::Web => "web",
        }
    }
}

impl fmt::Display for ArchiveProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Where the provisioned content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentSource {
    /// A git repository to clone. `branch` is `None` when the user left it empty.
    Git { url: String, branch: Option<String> },
    /// A compressed archive fetched from a storage provider.
    Archive { provider: ArchiveProvider, url: String },
}

impl ContentSource {
    pub fn git(url: impl Into<String>) -> Self {
        Self::Git {
            url: url.into(),
            branch: None,
        }
    }

    pub fn git_branch(url: impl Into<String>, branch: impl Into<String>) -> Self {
        let branch = branch.into();
        Self::Git {
            url: url.into(),
            branch: (!branch.is_empty()).then_some(branch),
        }
    }

    pub fn archive(provider: ArchiveProvider, url: impl Into<String>) -> Self {
        Self::Archive {
            provider,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        match self {
            Self::Git { url, .. } | Self::Archive { url, .. } => url,
        }
    }

    /// Branch to emit: the user's branch, or [`DEFAULT_BRANCH`] for git.
    /// Archives never carry a branch.
    pub fn effective_branch(&self) -> Option<&str> {
        match self {
            Self::Git { branch, .. } => Some(
                branch
                    .as_deref()
                    .filter(|b| !b.is_empty())
                    .unwrap_or(DEFAULT_BRANCH),
            ),
            Self::Archive { .. } => None,
        }
    }

    pub fn provider(&self) -> Option<ArchiveProvider> {
        match self {
            Self::Git { .. } => None,
            Self::Archive { provider, .. } => Some(*provider),
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Self::Archive { .. })
    }

    /// Directory the content lands in on the server.
    pub fn directory_name(&self) -> &str {
        derive_clone_directory_name(self.url())
    }
}

/// Identity of the repository Binder builds the environment from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinderEnvironment {
    pub owner: String,
    pub name: String,
    pub branch: String,
}

impl BinderEnvironment {
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
            branch: branch.into(),
        }
    }
}

/// Which redirect contract is used to reach the hub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchMode {
    Direct,
    /// LMS (Canvas) launch: the hub authenticates first, then replays `next`.
    Lti,
    Binder(BinderEnvironment),
}

impl LaunchMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Lti => "canvas",
            Self::Binder(_) => "binder",
        }
    }
}

/// Everything needed to build one provisioning link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningRequest {
    hub_url: Url,
    source: ContentSource,
    launch: Option<LaunchTarget>,
    mode: LaunchMode,
}

impl ProvisioningRequest {
    pub fn new(hub_url: Url, source: ContentSource) -> Self {
        Self {
            hub_url,
            source,
            launch: None,
            mode: LaunchMode::Direct,
        }
    }

    pub fn with_launch(mut self, launch: LaunchTarget) -> Self {
        self.launch = Some(launch);
        self
    }

    pub fn with_mode(mut self, mode: LaunchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn hub_url(&self) -> &Url {
        &self.hub_url
    }

    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    pub fn mode(&self) -> &LaunchMode {
        &self.mode
    }

    pub fn launch(&self) -> Option<&LaunchTarget> {
        self.launch.as_ref()
    }

    /// The resolved `urlpath`, or `None` when there is nothing to emit.
    pub fn launch_path(&self) -> Option<String> {
        self.launch
            .as_ref()
            .map(|target| target.resolve(self.source.directory_name()))
            .filter(|path| !path.is_empty())
    }
}
