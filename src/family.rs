//! The five query-parameter families.

use std::fmt;

/// One of the recognized query-parameter groups.
///
/// `include` and `sort` own only the key that is exactly their parameter
/// name. The bracketed families own every key starting with their name, so
/// a mistyped `page_size` or `filters` reaches the decoder and is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// `include`
    Include,
    /// `fields` / `fields[TYPE]`
    Fieldset,
    /// `filter[FIELD]`
    Filter,
    /// `page[number]` / `page[size]`
    Pagination,
    /// `sort`
    Sort,
}

impl Family {
    /// All families, in the order the composition layer runs them.
    pub const ALL: [Family; 5] = [
        Family::Include,
        Family::Fieldset,
        Family::Filter,
        Family::Pagination,
        Family::Sort,
    ];

    /// The query parameter name of this family.
    pub fn param(&self) -> &'static str {
        match self {
            Family::Include => "include",
            Family::Fieldset => "fields",
            Family::Filter => "filter",
            Family::Pagination => "page",
            Family::Sort => "sort",
        }
    }

    fn is_bracketed(&self) -> bool {
        matches!(self, Family::Fieldset | Family::Filter | Family::Pagination)
    }

    /// Returns `true` when `key` belongs to this family.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparse_query::Family;
    ///
    /// assert!(Family::Filter.owns_key("filter"));
    /// assert!(Family::Filter.owns_key("filter[username_in]"));
    /// assert!(Family::Filter.owns_key("filters"));
    /// assert!(!Family::Sort.owns_key("sort[name]"));
    /// assert!(!Family::Include.owns_key("includes"));
    /// ```
    pub fn owns_key(&self, key: &str) -> bool {
        match key.strip_prefix(self.param()) {
            Some("") => true,
            Some(_) => self.is_bracketed(),
            None => false,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.param())
    }
}
