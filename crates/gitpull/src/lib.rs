pub mod animation;
pub mod app;
pub mod clone_dir;
pub mod event;
pub mod form;
pub mod link;
pub mod notice;
pub mod params;
pub mod paths;
pub mod request;
pub mod session;

pub use animation::{AnimationDriver, NoAnimation, ProgressUpdate};
pub use app::{Application, LaunchTarget};
pub use clone_dir::derive_clone_directory_name;
pub use event::{ChannelError, ChannelEvent, EventChannel, SyncPayload};
pub use form::{LinkError, LinkForm};
pub use link::{build_binder_launch_url, build_direct_url, build_lti_launch_url, build_url};
pub use notice::{FailureKind, SyncFailure, SyncNotice};
pub use params::{SessionError, SessionParams};
pub use paths::{default_launch_path, default_target_path, legacy_interact_redirect};
pub use request::{
    ArchiveProvider, BinderEnvironment, ContentSource, DEFAULT_BRANCH, LaunchMode,
    ProvisioningRequest,
};
pub use session::{Phase, SyncSession};

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
