use std::fmt;

/// A notebook-server application that a provisioning link can open.
///
/// The registry is closed: each variant knows how to turn a path inside the
/// user's workspace into the in-app URL path that opens it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Application {
    Classic,
    JupyterLab,
    Shiny,
    RStudio,
}

impl Application {
    /// All registered applications in display order.
    pub fn all() -> [Application; 4] {
        [Self::Classic, Self::JupyterLab, Self::Shiny, Self::RStudio]
    }

    /// Look up an application by its registry name. `lab` is accepted as an
    /// alias for `jupyterlab`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "classic" => Some(Self::Classic),
            "jupyterlab" | "lab" => Some(Self::JupyterLab),
            "shiny" => Some(Self::Shiny),
            "rstudio" => Some(Self::RStudio),
            _ => None,
        }
    }

    /// Registry name, as used on the command line and in link-generator queries.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Classic => "classic",
            Self::JupyterLab => "jupyterlab",
            Self::Shiny => "shiny",
            Self::RStudio => "rstudio",
        }
    }

    /// Human-readable title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Classic => "Classic Notebook",
            Self::JupyterLab => "JupyterLab",
            Self::Shiny => "Shiny",
            Self::RStudio => "RStudio",
        }
    }

    /// False for applications that always open at a fixed location.
    pub fn uses_path(&self) -> bool {
        !matches!(self, Self::RStudio)
    }

    /// Build the in-app URL path for a workspace-relative path.
    pub fn url_path(&self, path: &str) -> String {
        match self {
            Self::Classic => format!("tree/{path}"),
            Self::JupyterLab => format!("lab/tree/{path}"),
            // jupyter-shiny-proxy only routes paths ending in a slash
            Self::Shiny if path.ends_with('/') => format!("shiny/{path}"),
            Self::Shiny => format!("shiny/{path}/"),
            Self::RStudio => "rstudio/".to_owned(),
        }
    }
}

impl fmt::Display for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where the user lands once provisioning has finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchTarget {
    /// Open `file_path` (relative to the content directory) in a registered application.
    Application {
        app: Application,
        file_path: String,
    },
    /// A literal in-app path, used verbatim.
    Custom(String),
}

impl LaunchTarget {
    pub fn application(app: Application, file_path: impl Into<String>) -> Self {
        Self::Application {
            app,
            file_path: file_path.into(),
        }
    }

    pub fn custom(path: impl Into<String>) -> Self {
        Self::Custom(path.into())
    }

    /// Resolve to the `urlpath` value, given the directory the content lands in.
    pub fn resolve(&self, content_directory: &str) -> String {
        match self {
            Self::Application { app, file_path } => {
                app.url_path(&format!("{content_directory}/{file_path}"))
            }
            Self::Custom(path) => path.clone(),
        }
    }
}
