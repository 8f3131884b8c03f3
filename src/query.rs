//! The raw query multimap handed over by the HTTP layer.

use std::collections::btree_map::{self, BTreeMap};

use crate::family::Family;

/// Query-string parameters as an ordered key to values multimap.
///
/// Keys keep every value in arrival order. Iteration is sorted by key, so
/// decoding (and which error surfaces first) is deterministic.
///
/// # Examples
///
/// ```
/// use sparse_query::QueryParams;
///
/// let query = QueryParams::parse("?filter[name_in]=john,anne&filter[name_in]=paul&sort=-title");
///
/// assert_eq!(
///     query.get("filter[name_in]"),
///     Some(&["john,anne".to_string(), "paul".to_string()][..])
/// );
/// assert_eq!(query.first("sort"), Some("-title"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    params: BTreeMap<String, Vec<String>>,
}

impl QueryParams {
    /// Creates an empty multimap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an `application/x-www-form-urlencoded` query string.
    ///
    /// A leading `?` is ignored. Percent escapes and `+` are decoded in keys
    /// and values, so `fields%5Bdocument%5D=a` yields the key
    /// `fields[document]`.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);

        form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    /// Appends `value` to the values of `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.entry(key.into()).or_default().push(value.into());
    }

    /// Replaces the values of `key`, returning the previous ones.
    pub fn insert(&mut self, key: impl Into<String>, values: Vec<String>) -> Option<Vec<String>> {
        self.params.insert(key.into(), values)
    }

    /// Returns every value of `key`.
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.params.get(key).map(Vec::as_slice)
    }

    /// Returns the first value of `key`.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns `true` if `key` is present, even without values.
    pub fn contains_key(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// Iterates keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.params.keys().map(String::as_str)
    }

    /// Iterates `(key, values)` pairs in key order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            inner: self.params.iter(),
        }
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` when there are no keys.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Keeps only the keys owned by `family`.
    ///
    /// This is the extract phase every decoder runs before decoding.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparse_query::{Family, QueryParams};
    ///
    /// let query = QueryParams::parse("page[size]=5&pages=2&sort=title");
    /// let page = query.family(Family::Pagination);
    ///
    /// assert_eq!(page.keys().collect::<Vec<_>>(), vec!["page[size]", "pages"]);
    /// ```
    pub fn family(&self, family: Family) -> QueryParams {
        let params = self
            .params
            .iter()
            .filter(|(key, _)| family.owns_key(key))
            .map(|(key, values)| (key.clone(), values.clone()))
            .collect();

        QueryParams { params }
    }
}

/// Iterator over `(key, values)` pairs of a [`QueryParams`].
#[derive(Debug)]
pub struct Iter<'a> {
    inner: btree_map::Iter<'a, String, Vec<String>>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a [String]);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }
}

impl<'a> IntoIterator for &'a QueryParams {
    type Item = (&'a str, &'a [String]);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for QueryParams {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.append(key, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut query = QueryParams::new();
        query.extend(iter);
        query
    }
}

/// Splits values on `,` after joining repeated occurrences with `,`.
///
/// `["john,anne", "paul"]` becomes `["john", "anne", "paul"]`.
pub(crate) fn comma_values(values: &[String]) -> Vec<String> {
    values
        .join(",")
        .split(',')
        .map(str::to_string)
        .collect()
}
