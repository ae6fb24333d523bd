//! Node agent transport port definition.

use crate::domain::AppError;

/// Port for delivering a serialized RTML document to the scheduling service.
///
/// Implementations perform exactly one exchange per call and report network, authentication
/// and SOAP faults as [`AppError::Transport`].
pub trait SubmissionTransport {
    /// Send `document` and return the raw RTML response document.
    fn send(&self, document: &str) -> Result<String, AppError>;
}

impl<T: SubmissionTransport + ?Sized> SubmissionTransport for Box<T> {
    fn send(&self, document: &str) -> Result<String, AppError> {
        (**self).send(document)
    }
}
