use crate::{error::Error, family::Family};

/// Request-tagged logger for family outcomes.
///
/// Obtained from `QueryContext::log()` and lifetime-bound to that context.
/// Every event carries the request ID and the family it reports on. Only
/// counts and error messages are logged, never parameter values.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ContextLog<'a> {
    request_id: &'a str,
}

impl<'a> ContextLog<'a> {
    pub(crate) fn new(request_id: &'a str) -> Self {
        Self { request_id }
    }

    /// The request ID every event is tagged with.
    pub(crate) fn request_id(&self) -> &'a str {
        self.request_id
    }

    /// A family passed validation and was stored in the context.
    pub(crate) fn published(&self, family: Family, entries: usize) {
        tracing::debug!(
            request_id = %self.request_id,
            family = %family,
            entries,
            "query family published"
        );
    }

    /// A family was absent from the query.
    pub(crate) fn skipped(&self, family: Family) {
        tracing::trace!(
            request_id = %self.request_id,
            family = %family,
            "query family absent"
        );
    }

    /// A family failed to decode or validate.
    pub(crate) fn rejected(&self, error: &Error) {
        tracing::warn!(
            request_id = %self.request_id,
            family = %error.family(),
            kind = %error.kind(),
            error = %error,
            "query family rejected"
        );
    }
}
