//! JSON:API-style query parameter parsing with allow-lists.
//!
//! This crate turns the resource-shaping parameters of a request into typed,
//! validated values:
//! - **`include`**: relationship paths to side-load
//! - **`fields` / `fields[TYPE]`**: sparse fieldsets, `-` hides a field
//! - **`filter[FIELD]` / `filter[FIELD_PREDICATE]`**: filter conditions
//! - **`sort`**: sort fields, `-` for descending
//! - **`page[number]` / `page[size]`**: pagination
//!
//! Every family runs the same steps: take its own keys from the query, decode
//! them, check every decoded name against a server-declared allow-list, and
//! only then publish the result into the request's [`QueryContext`].
//!
//! # Core Types
//!
//! - [`SparseQuery`]: The configured parser, built once and shared
//! - [`QueryParams`]: The raw query-string multimap
//! - [`QueryContext`]: Per-request results of every family
//! - [`Schema`]: Declarative source for the allow-lists
//! - [`Error`]: What went wrong, with an [`ErrorKind`] and a [`Family`]
//!
//! # Examples
//!
//! ```
//! use sparse_query::{Direction, Predicate, QueryContext, QueryParams, SparseQuery};
//!
//! let sparse = SparseQuery::new()
//!     .accept_relations(["comments"])
//!     .accept_fields(["title", "body", "comments"])
//!     .accept_filters(["title"])
//!     .accept_sort_by(["created_at"]);
//!
//! let query = QueryParams::parse(
//!     "include=comments&fields[document]=title,-body&filter[title_in]=a,b&sort=-created_at",
//! );
//!
//! let mut ctx = QueryContext::new("req-123");
//! sparse.handle(&mut ctx, &query).expect("query is acceptable");
//!
//! assert_eq!(ctx.relations(), ["comments"]);
//! assert_eq!(ctx.filter("title").predicate, Predicate::In);
//! assert_eq!(ctx.direction("created_at"), Direction::Desc);
//! assert_eq!(ctx.page().number, 1);
//!
//! // Names outside the allow-lists are rejected
//! let err = sparse
//!     .handle(&mut QueryContext::new("req-124"), &QueryParams::parse("sort=password"))
//!     .unwrap_err();
//! assert_eq!(err.to_string(), "unsupported sorting by: `password`");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod allow;
mod context;
mod error;
mod family;
mod fieldset;
mod filter;
mod include;
mod logging;
mod pagination;
mod predicate;
mod query;
mod schema;
mod sort;
mod sparse;
pub mod web;

pub use allow::AllowList;
pub use context::QueryContext;
pub use error::{Error, ErrorKind};
pub use family::Family;
pub use fieldset::{FieldSelection, Fieldset, SelectedField, TypeSelection, Visibility, ROOT};
pub use filter::{Condition, FilterSet, Filters};
pub use include::{IncludePaths, Includes, ROOT_PATH};
pub use pagination::{Page, PageParam, Pagination, DEFAULT_PAGE_SIZE};
pub use predicate::{predicate_of, Predicate};
pub use query::{Iter as QueryIter, QueryParams};
pub use schema::{AllowLists, FieldSpec, Resource, Schema};
pub use sort::{Direction, SortOrder, Sorting};
pub use sparse::{Handle, SparseQuery};
