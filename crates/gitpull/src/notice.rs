use std::fmt;

/// Notification delivered to session subscribers, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncNotice {
    /// A chunk of pull output. May be empty for a bare progress tick.
    Syncing { output: String },
    /// The pull completed; navigate to `redirect_url`.
    Finished { redirect_url: String },
    /// The pull failed.
    Error(SyncFailure),
}

impl SyncNotice {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Syncing { .. })
    }
}

/// Details of a failed sync.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncFailure {
    /// Server-reported message; `None` for transport failures.
    pub message: Option<String>,
    /// Diagnostic output (typically a server-side traceback).
    pub output: Option<String>,
}

/// How a failure is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server could not merge upstream changes into the user's copy.
    MergeConflict,
    Generic,
}

impl SyncFailure {
    pub fn transport() -> Self {
        Self::default()
    }

    pub fn reported(message: impl Into<String>, output: Option<String>) -> Self {
        Self {
            message: Some(message.into()),
            output,
        }
    }

    // TODO: switch to a typed error code once the pull service sends one;
    // until then this sniffs the message text.
    pub fn kind(&self) -> FailureKind {
        match &self.message {
            Some(message) if message.to_lowercase().contains("merge") => {
                FailureKind::MergeConflict
            }
            _ => FailureKind::Generic,
        }
    }

    /// Progress-bar label: `Error: <message>`.
    pub fn headline(&self) -> String {
        match &self.message {
            Some(message) => format!("Error: {message}"),
            None => "Error: lost connection to the server".to_owned(),
        }
    }

    /// Remediation steps for merge conflicts, naming the folders the
    /// "backup and resync" action would produce. `None` for other failures.
    pub fn remediation(&self, target_path: &str) -> Option<Vec<String>> {
        if self.kind() != FailureKind::MergeConflict {
            return None;
        }

        Some(vec![
            "Unresolvable conflicts detected while syncing".to_owned(),
            "Proceed without syncing to continue with the current state of your repository without updates.".to_owned(),
            "(Recommended) Backup and resync to back up the current state of your repository and sync updates into a new separate folder:".to_owned(),
            format!("  {target_path}_YYYY-MM-DD_HH:MM:SS  Backup folder containing the current state of your repository"),
            format!("  {target_path}  New folder containing updated content. This will not merge content from your backup due to the unresolvable conflicts. You may want to manually copy backed up changes into the new folder."),
        ])
    }
}

impl fmt::Display for SyncFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.headline())
    }
}
