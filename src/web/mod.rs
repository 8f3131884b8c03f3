//! Web framework integration surface.
//!
//! This module is the boundary between HTTP frameworks and the query parser.
//! It handles:
//! - Mapping framework requests to a request ID and a [`QueryParams`](crate::QueryParams)
//! - Creating one fresh [`QueryContext`](crate::QueryContext) per request
//! - Returning the rejected family together with what was already published
//!
//! # Design Principles
//!
//! 1. **No Framework Dependencies**: This module contains no framework-specific code.
//!    It defines traits that framework-specific code can implement.
//!
//! 2. **No Status Codes**: A [`Rejection`] carries the error and its
//!    [`ErrorKind`](crate::ErrorKind). Mapping it to a response is up to the
//!    embedding server.
//!
//! 3. **Explicit Context**: No global state. Every request gets its own context
//!    value.
//!
//! # Integration Model
//!
//! Framework-specific extractors should:
//! 1. Build a `RequestAdapter` from framework request types, or implement
//!    `ExtractRequestId` and `ExtractQuery` directly
//! 2. Call `parse_request` with the shared `SparseQuery`
//! 3. Hand the `QueryContext` to the request handler, or turn the `Rejection`
//!    into a client error response
//!
//! # Example Flow
//!
//! ```
//! use sparse_query::web::{parse_request, RequestAdapter};
//! use sparse_query::{ErrorKind, SparseQuery};
//!
//! let sparse = SparseQuery::new().accept_sort_by(["title"]);
//!
//! let adapter = RequestAdapter::new("req-1").with_query_string("sort=-title&page[size]=5");
//! let ctx = parse_request(&sparse, &adapter).expect("acceptable query");
//! assert_eq!(ctx.page().size, 5);
//!
//! let adapter = RequestAdapter::new("req-2").with_query_string("sort=password");
//! let rejection = parse_request(&sparse, &adapter).unwrap_err();
//! assert_eq!(rejection.error().kind(), ErrorKind::Unsupported);
//! ```

mod adapter;
mod extract;
mod middleware;

pub use adapter::RequestAdapter;
pub use extract::{ExtractQuery, ExtractRequestId};
pub use middleware::{parse_request, Rejection};
