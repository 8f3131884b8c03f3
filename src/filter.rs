use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::{
    allow::AllowList,
    context::QueryContext,
    error::Error,
    family::Family,
    predicate::{split_predicate, Predicate},
    query::{comma_values, QueryParams},
    sparse::Handle,
};

// filter[field] | filter[field_predicate] | filter[rel.field]
static FILTER_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^filter\[([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\]$")
        .expect("FILTER_KEY: invalid regex pattern")
});

/// Predicate and values requested for one filtered field.
///
/// The default value (no predicate, no values) is what readers get for a
/// field that was not filtered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Condition {
    /// Operator from the key suffix
    pub predicate: Predicate,
    /// Comma-separated values, flattened across repeated keys
    pub values: Vec<String>,
}

/// Decoded `filter[...]` parameters keyed by field.
///
/// # Examples
///
/// ```
/// use sparse_query::{FilterSet, Predicate, QueryParams};
///
/// let filters = FilterSet::decode(&QueryParams::parse("filter[username_in]=john,anne")).unwrap();
/// let condition = filters.condition("username");
///
/// assert_eq!(condition.predicate, Predicate::In);
/// assert_eq!(condition.values, ["john", "anne"]);
/// assert_eq!(filters.condition("email").values.len(), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    conditions: BTreeMap<String, Condition>,
}

impl FilterSet {
    /// Decodes every `filter` key of `query`.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingFilterField`] for a bare `filter` key
    /// - [`Error::InvalidFilterKey`] for any other key that is not
    ///   `filter[NAME]`
    pub fn decode(query: &QueryParams) -> Result<FilterSet, Error> {
        let mut conditions = BTreeMap::new();

        for (key, values) in query.family(Family::Filter).iter() {
            let (field, predicate) = parse_key(key)?;
            conditions.insert(
                field.to_string(),
                Condition {
                    predicate,
                    values: comma_values(values),
                },
            );
        }

        Ok(FilterSet { conditions })
    }

    /// The condition on `field`, if filtered.
    pub fn get(&self, field: &str) -> Option<&Condition> {
        self.conditions.get(field)
    }

    /// The condition on `field`, or an empty one if it was not filtered.
    pub fn condition(&self, field: &str) -> Condition {
        self.get(field).cloned().unwrap_or_default()
    }

    /// Returns `true` if `field` is filtered.
    pub fn contains(&self, field: &str) -> bool {
        self.conditions.contains_key(field)
    }

    /// Iterates `(field, condition)` pairs in field order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Filtered field names in sorted order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.conditions.keys().map(String::as_str)
    }

    /// Number of filtered fields.
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Returns `true` when nothing is filtered.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

fn parse_key(key: &str) -> Result<(&str, Predicate), Error> {
    if key == Family::Filter.param() {
        return Err(Error::MissingFilterField);
    }

    let name = FILTER_KEY
        .captures(key)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| Error::InvalidFilterKey(key.to_string()))?;

    Ok(split_predicate(name.as_str()))
}

/// Filter allow-list and handler.
///
/// # Examples
///
/// ```
/// use sparse_query::{Filters, Handle, QueryContext, QueryParams};
///
/// let filters = Filters::new().accept(["username"]);
/// let mut ctx = QueryContext::new("req-1");
///
/// let err = filters
///     .handle(&mut ctx, &QueryParams::parse("filter[password_eq]=x"))
///     .unwrap_err();
/// assert_eq!(err.to_string(), "unsupported filter resource: `password`");
/// assert!(ctx.filters().is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Filters {
    accepted: AllowList,
}

impl Filters {
    /// Creates a handler that accepts no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the given filterable fields.
    pub fn accept<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted.extend(fields);
        self
    }

    /// Accepts one more filterable field.
    pub fn add(&mut self, field: impl Into<String>) {
        self.accepted.add(field);
    }

    /// The accepted fields.
    pub fn allow_list(&self) -> &AllowList {
        &self.accepted
    }

    /// Checks every filtered field against the allow-list.
    pub fn validate(&self, filters: &FilterSet) -> Result<(), Error> {
        match filters.fields().find(|field| !self.accepted.contains(field)) {
            Some(field) => Err(Error::UnsupportedFilter(field.to_string())),
            None => Ok(()),
        }
    }
}

impl Handle for Filters {
    fn family(&self) -> Family {
        Family::Filter
    }

    fn handle(&self, ctx: &mut QueryContext, query: &QueryParams) -> Result<(), Error> {
        let query = query.family(Family::Filter);
        if query.is_empty() {
            ctx.log().skipped(Family::Filter);
            return Ok(());
        }

        let filters = FilterSet::decode(&query)
            .and_then(|filters| self.validate(&filters).map(|()| filters))
            .inspect_err(|err| ctx.log().rejected(err))?;

        let entries = filters.len();
        ctx.publish_filters(filters);
        ctx.log().published(Family::Filter, entries);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(pairs: &[(&str, &str)]) -> Result<FilterSet, Error> {
        let query: QueryParams = pairs.iter().copied().collect();
        FilterSet::decode(&query)
    }

    fn condition(predicate: Predicate, values: &[&str]) -> Condition {
        Condition {
            predicate,
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[test]
    fn decodes_without_predicate() {
        let filters = decode(&[("filter[username]", "john,anne")]).unwrap();
        assert_eq!(
            filters.get("username"),
            Some(&condition(Predicate::None, &["john", "anne"]))
        );
    }

    #[test]
    fn decodes_with_predicate() {
        let filters = decode(&[("filter[username_in]", "john,anne")]).unwrap();
        assert_eq!(
            filters.get("username"),
            Some(&condition(Predicate::In, &["john", "anne"]))
        );
    }

    #[test]
    fn joins_repeated_values() {
        let filters = decode(&[
            ("filter[username_nin]", "john,anne"),
            ("filter[username_nin]", "paul"),
        ])
        .unwrap();
        assert_eq!(
            filters.condition("username"),
            condition(Predicate::Nin, &["john", "anne", "paul"])
        );
    }

    #[test]
    fn separate_values_are_kept() {
        let filters =
            decode(&[("filter[username_eq]", "john"), ("filter[username_eq]", "anne")]).unwrap();
        assert_eq!(
            filters.condition("username"),
            condition(Predicate::Eq, &["john", "anne"])
        );
    }

    #[test]
    fn underscored_field_without_predicate_stays_whole() {
        let filters = decode(&[("filter[created_at]", "2023-01-01")]).unwrap();
        assert!(filters.contains("created_at"));

        let filters = decode(&[("filter[created_at_start]", "2023-01-01")]).unwrap();
        assert_eq!(filters.condition("created_at").predicate, Predicate::Start);
    }

    #[test]
    fn dotted_field_is_allowed() {
        let filters = decode(&[("filter[author.name_start]", "jo")]).unwrap();
        assert_eq!(filters.condition("author.name").predicate, Predicate::Start);
    }

    #[test]
    fn bare_filter_key_fails() {
        assert_eq!(decode(&[("filter", "anne")]), Err(Error::MissingFilterField));
    }

    #[test]
    fn malformed_keys_fail() {
        for key in ["filter[]", "filter[user-name]", "filter[name]x", "filter[name"] {
            assert_eq!(
                decode(&[(key, "x")]),
                Err(Error::InvalidFilterKey(key.to_string())),
                "{key}"
            );
        }
    }

    #[test]
    fn keys_outside_family_are_ignored() {
        let filters = decode(&[("sort", "name"), ("q", "x")]).unwrap();
        assert!(filters.is_empty());
    }

    #[test]
    fn prefixed_lookalike_keys_fail() {
        assert_eq!(
            decode(&[("filters", "x")]),
            Err(Error::InvalidFilterKey("filters".to_string()))
        );
        assert_eq!(
            decode(&[("filterx", "1")]),
            Err(Error::InvalidFilterKey("filterx".to_string()))
        );
    }

    #[test]
    fn missing_field_reads_as_empty_condition() {
        let filters = decode(&[]).unwrap();
        assert_eq!(filters.condition("anything"), Condition::default());
    }

    #[test]
    fn validate_rejects_unknown_field() {
        let filters = Filters::new().accept(["username"]);
        let decoded = decode(&[("filter[username]", "a"), ("filter[email_eq]", "b")]).unwrap();

        assert_eq!(
            filters.validate(&decoded),
            Err(Error::UnsupportedFilter("email".to_string()))
        );
    }

    #[test]
    fn handle_publishes_valid_filters() {
        let filters = Filters::new().accept(["username", "age"]);
        let mut ctx = QueryContext::new("req-1");
        let query: QueryParams = [("filter[username_in]", "john,anne"), ("filter[age_gte]", "18")]
            .into_iter()
            .collect();

        filters.handle(&mut ctx, &query).unwrap();

        assert_eq!(ctx.filter("age"), condition(Predicate::Gte, &["18"]));
        assert_eq!(ctx.filter("username").values.len(), 2);
        assert_eq!(ctx.filter("missing"), Condition::default());
    }

    #[test]
    fn handle_decode_error_leaves_context_untouched() {
        let filters = Filters::new().accept(["username"]);
        let mut ctx = QueryContext::new("req-1");
        let query: QueryParams = [("filter", "x"), ("filter[username]", "a")]
            .into_iter()
            .collect();

        assert_eq!(filters.handle(&mut ctx, &query), Err(Error::MissingFilterField));
        assert!(ctx.filters().is_none());
    }
}
