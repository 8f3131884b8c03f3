//! Extraction boundary traits for web integration.
//!
//! This module defines the core abstraction for reading what the query
//! parser needs out of framework-specific request types.

use crate::query::QueryParams;

/// Extracts the query-string multimap from a framework-specific request.
///
/// Implementations should keep every value of a repeated key, in arrival
/// order. Percent-decoding is expected to have happened already.
///
/// # Examples
///
/// ```
/// use sparse_query::web::ExtractQuery;
/// use sparse_query::QueryParams;
///
/// // Example framework-specific implementation
/// struct MyFrameworkRequest {
///     query: Vec<(String, String)>,
/// }
///
/// impl ExtractQuery for MyFrameworkRequest {
///     fn extract_query(&self) -> QueryParams {
///         self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
///     }
/// }
///
/// let req = MyFrameworkRequest {
///     query: vec![("sort".to_string(), "-title".to_string())],
/// };
/// assert_eq!(req.extract_query().first("sort"), Some("-title"));
/// ```
pub trait ExtractQuery {
    /// Returns the request's query parameters.
    fn extract_query(&self) -> QueryParams;
}

/// Extracts the identifier logs of this request are tagged with.
pub trait ExtractRequestId {
    /// Returns the request ID, generated or taken from a header.
    fn extract_request_id(&self) -> String;
}

/// A raw, still percent-encoded query string such as `sort=-title&page[size]=5`.
impl ExtractQuery for str {
    fn extract_query(&self) -> QueryParams {
        QueryParams::parse(self)
    }
}

impl ExtractQuery for QueryParams {
    fn extract_query(&self) -> QueryParams {
        self.clone()
    }
}
