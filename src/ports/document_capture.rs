use crate::domain::AppError;

/// Port for keeping a copy of each exchanged document pair.
pub trait DocumentCapture {
    /// Record `outgoing` followed by `incoming` under `name`.
    fn capture(&self, name: &str, outgoing: &str, incoming: &str) -> Result<(), AppError>;
}

/// Capture that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCapture;

impl DocumentCapture for NoopCapture {
    fn capture(&self, _name: &str, _outgoing: &str, _incoming: &str) -> Result<(), AppError> {
        Ok(())
    }
}
