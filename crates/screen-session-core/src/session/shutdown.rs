/// Warning shown when the host tries to shut down mid-recording.
pub const ACTIVE_RECORDING_WARNING: &str =
    "You have an active recording. Are you sure you want to leave?";

/// Answer to a host shutdown request.
///
/// The controller can only ask; whether a veto is honored is up to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownDecision {
    /// Nothing would be lost by shutting down now.
    Allow,
    /// A recording is running; ask the user to confirm first.
    Veto {
        /// Confirmation prompt for the user.
        message: String,
    },
}

impl ShutdownDecision {
    /// Whether the controller asked the host to hold off.
    pub fn is_veto(&self) -> bool {
        matches!(self, ShutdownDecision::Veto { .. })
    }
}
