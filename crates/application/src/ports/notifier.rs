//! Notifier port

/// Port for surfacing a human-readable error message to the user.
///
/// Used when a caller has no handler of its own for a failed request.
pub trait Notifier: Send + Sync {
    /// Shows `message` to the user.
    fn notify(&self, message: &str);
}
