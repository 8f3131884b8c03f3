use std::collections::BTreeSet;

/// Set of names a parameter family accepts.
///
/// Populated at startup (by hand or from a [`Schema`](crate::Schema)) and only
/// read while requests are handled. Growing it needs `&mut self`, so it cannot
/// be mutated while shared across request handlers.
///
/// # Examples
///
/// ```
/// use sparse_query::AllowList;
///
/// let mut allow: AllowList = ["title", "created_at"].into_iter().collect();
/// allow.add("title");
///
/// assert_eq!(allow.len(), 2);
/// assert!(allow.contains("created_at"));
/// assert!(!allow.contains("posts"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList {
    names: BTreeSet<String>,
}

impl AllowList {
    /// Creates an empty allow-list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts `name`. Adding a name twice has no effect.
    pub fn add(&mut self, name: impl Into<String>) {
        self.names.insert(name.into());
    }

    /// Accepts every name in `names`.
    pub fn extend<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names.extend(names.into_iter().map(Into::into));
    }

    /// Returns `true` if `name` is accepted.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Number of accepted names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns `true` if nothing is accepted.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterates accepted names in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for AllowList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut allow = AllowList::new();
        allow.extend(iter);
        allow
    }
}
