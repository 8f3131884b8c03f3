use std::fmt;

use thiserror::Error;

use crate::family::Family;

/// Errors produced while decoding or validating query parameters.
///
/// Every malformed-input path ends here; nothing in this crate panics on
/// client input. The embedding HTTP layer decides how to report it (usually
/// a 400-class response).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// A bare `filter` key with no bracketed field.
    #[error("has no filter field param")]
    MissingFilterField,

    /// A `filter` key whose bracket content does not follow the grammar.
    #[error("filter has invalid format: `{0}`")]
    InvalidFilterKey(String),

    /// A `fields` key whose bracket content does not follow the grammar.
    #[error("field has invalid format: `{0}`")]
    InvalidFieldKey(String),

    /// A `page` key without a bracketed property.
    #[error("missing prop on page param")]
    MissingPageProp,

    /// A `page[...]` property other than `number` or `size`.
    #[error("invalid pagination param `{0}`")]
    InvalidPageParam(String),

    /// A pagination value that does not parse as an integer.
    #[error("pagination param `{0}` should be int")]
    PageParamNotInt(String),

    /// A sort field with characters outside `[A-Za-z0-9_]`.
    #[error("`{0}` not acceptable, only [a-zA-Z_0-9]")]
    InvalidSortField(String),

    /// An include path absent from the include allow-list.
    #[error("unsupported include relation `{0}`")]
    UnsupportedInclude(String),

    /// A fieldset name absent from the fieldset allow-list.
    #[error("unsupported field resource: `{0}`")]
    UnsupportedField(String),

    /// A filter field absent from the filter allow-list.
    #[error("unsupported filter resource: `{0}`")]
    UnsupportedFilter(String),

    /// A sort field absent from the sort allow-list.
    #[error("unsupported sorting by: `{0}`")]
    UnsupportedSort(String),
}

impl Error {
    /// Returns the category of this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparse_query::{Error, ErrorKind};
    ///
    /// let err = Error::UnsupportedSort("posts".to_string());
    /// assert_eq!(err.kind(), ErrorKind::Unsupported);
    /// assert_eq!(err.to_string(), "unsupported sorting by: `posts`");
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingFilterField
            | Error::InvalidFilterKey(_)
            | Error::InvalidFieldKey(_)
            | Error::MissingPageProp => ErrorKind::MalformedKey,
            Error::PageParamNotInt(_) => ErrorKind::InvalidValue,
            Error::InvalidSortField(_) => ErrorKind::InvalidCharacters,
            Error::InvalidPageParam(_)
            | Error::UnsupportedInclude(_)
            | Error::UnsupportedField(_)
            | Error::UnsupportedFilter(_)
            | Error::UnsupportedSort(_) => ErrorKind::Unsupported,
        }
    }

    /// Returns the parameter family that rejected the query.
    pub fn family(&self) -> Family {
        match self {
            Error::UnsupportedInclude(_) => Family::Include,
            Error::InvalidFieldKey(_) | Error::UnsupportedField(_) => Family::Fieldset,
            Error::MissingFilterField | Error::InvalidFilterKey(_) | Error::UnsupportedFilter(_) => {
                Family::Filter
            }
            Error::MissingPageProp | Error::InvalidPageParam(_) | Error::PageParamNotInt(_) => {
                Family::Pagination
            }
            Error::InvalidSortField(_) | Error::UnsupportedSort(_) => Family::Sort,
        }
    }
}

/// Category of a query parameter error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A key inside a family does not follow that family's bracket grammar
    MalformedKey,
    /// A value has the wrong type (pagination integers)
    InvalidValue,
    /// A decoded name is not in the allow-list
    Unsupported,
    /// A sort field contains characters outside `[A-Za-z0-9_]`
    InvalidCharacters,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::MalformedKey => write!(f, "malformed_key"),
            ErrorKind::InvalidValue => write!(f, "invalid_value"),
            ErrorKind::Unsupported => write!(f, "unsupported"),
            ErrorKind::InvalidCharacters => write!(f, "invalid_characters"),
        }
    }
}
