//! Per-request entry point for HTTP integrations.
//!
//! # Integration Flow
//!
//! ```text
//! HTTP Request
//!   ↓
//! Framework-specific code builds RequestAdapter (or implements the traits)
//!   ↓
//! Call parse_request() with the shared SparseQuery
//!   ↓
//! Ok(QueryContext)  → request handler reads the families
//! Err(Rejection)    → client error response, built from rejection.error()
//! ```

use thiserror::Error;

use crate::{context::QueryContext, error::Error as QueryError, sparse::SparseQuery};

use super::{ExtractQuery, ExtractRequestId};

/// A query the parser refused.
///
/// Holds the failing family's error and the context as it was when handling
/// stopped. Families handled before the failing one are still published in
/// that context; most servers should ignore it and reject the request.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct Rejection {
    context: Box<QueryContext>,
    error: QueryError,
}

impl Rejection {
    /// The error of the family that failed.
    pub fn error(&self) -> &QueryError {
        &self.error
    }

    /// The partially populated context.
    pub fn context(&self) -> &QueryContext {
        &self.context
    }

    /// Splits the rejection into its context and error.
    pub fn into_parts(self) -> (QueryContext, QueryError) {
        (*self.context, self.error)
    }
}

/// Parses the query of one request into a fresh [`QueryContext`].
///
/// # Errors
///
/// Returns a [`Rejection`] when any family fails to decode or names something
/// outside its allow-list.
///
/// # Examples
///
/// ```
/// use sparse_query::web::{parse_request, RequestAdapter};
/// use sparse_query::{Family, SparseQuery};
///
/// let sparse = SparseQuery::new().accept_relations(["author"]);
/// let adapter = RequestAdapter::new("req-9").with_query_string("include=author&sort=title");
///
/// let rejection = parse_request(&sparse, &adapter).unwrap_err();
/// assert_eq!(rejection.to_string(), "unsupported sorting by: `title`");
/// assert_eq!(rejection.error().family(), Family::Sort);
/// assert_eq!(rejection.context().relations(), ["author"]);
/// ```
pub fn parse_request<R>(sparse: &SparseQuery, request: &R) -> Result<QueryContext, Rejection>
where
    R: ExtractRequestId + ExtractQuery + ?Sized,
{
    let mut context = QueryContext::new(request.extract_request_id());
    let query = request.extract_query();

    match sparse.handle(&mut context, &query) {
        Ok(()) => Ok(context),
        Err(error) => Err(Rejection {
            context: Box::new(context),
            error,
        }),
    }
}
