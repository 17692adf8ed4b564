use thiserror::Error;

/// Convenient result type for the engine crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors reported by the platform seams.
///
/// These never escape [`crate::Switcher::activate`]; they exist so the trait
/// implementations can say precisely what went wrong before the engine logs
/// and degrades to a fallback.
#[derive(Debug, Error)]
pub enum Error {
    /// A required OS permission is missing.
    #[error("permission denied: {0}")]
    PermissionDenied(&'static str),

    /// A platform call failed with an OS status code.
    #[error("{op} failed with status {code}")]
    Platform {
        /// The operation that failed.
        op: &'static str,
        /// The raw OS status code.
        code: i32,
    },

    /// The process exists but the operation could not address it.
    #[error("process {pid} not available")]
    ProcessGone {
        /// Target process id.
        pid: i32,
    },

    /// A launch request could not be issued.
    #[error("launch failed: {0}")]
    Launch(String),

    /// The hotkey event channel has been closed.
    #[error("hotkey event channel closed")]
    ChannelClosed,
}
