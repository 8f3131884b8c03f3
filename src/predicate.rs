use std::fmt;

/// Comparison operator attached to a `filter[...]` or `fields[...]` key.
///
/// The operator is spelled as a suffix on the bracketed name, for example
/// `filter[username_in]` or `filter[created_at_gte]`. A key without a
/// recognized suffix carries [`Predicate::None`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Predicate {
    /// No operator given
    #[default]
    None,
    /// `eq`
    Eq,
    /// `neq`
    Neq,
    /// `in`
    In,
    /// `nin`
    Nin,
    /// `gt`
    Gt,
    /// `gte`
    Gte,
    /// `lt`
    Lt,
    /// `lte`
    Lte,
    /// `blank`
    Blank,
    /// `null`
    Null,
    /// `notnull`
    NotNull,
    /// `start`
    Start,
    /// `end`
    End,
}

const TABLE: [(&str, Predicate); 13] = [
    ("eq", Predicate::Eq),
    ("neq", Predicate::Neq),
    ("in", Predicate::In),
    ("nin", Predicate::Nin),
    ("gt", Predicate::Gt),
    ("gte", Predicate::Gte),
    ("lt", Predicate::Lt),
    ("lte", Predicate::Lte),
    ("blank", Predicate::Blank),
    ("null", Predicate::Null),
    ("notnull", Predicate::NotNull),
    ("start", Predicate::Start),
    ("end", Predicate::End),
];

impl Predicate {
    /// Returns the suffix token for this predicate, or `""` for `None`.
    pub fn as_str(&self) -> &'static str {
        TABLE
            .iter()
            .find(|(_, p)| p == self)
            .map(|(token, _)| *token)
            .unwrap_or("")
    }

    /// Returns `true` unless this is [`Predicate::None`].
    pub fn is_some(&self) -> bool {
        *self != Predicate::None
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::None => write!(f, "none"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

/// Looks up the predicate spelled by `suffix`.
///
/// Matching is exact and case-sensitive. Unknown suffixes map to
/// [`Predicate::None`] instead of failing.
///
/// # Examples
///
/// ```
/// use sparse_query::{predicate_of, Predicate};
///
/// assert_eq!(predicate_of("gte"), Predicate::Gte);
/// assert_eq!(predicate_of("GTE"), Predicate::None);
/// assert_eq!(predicate_of("between"), Predicate::None);
/// ```
pub fn predicate_of(suffix: &str) -> Predicate {
    TABLE
        .iter()
        .find(|(token, _)| *token == suffix)
        .map(|(_, predicate)| *predicate)
        .unwrap_or_default()
}

/// Splits bracket content such as `created_at_gte` into field and predicate.
///
/// The split happens at the last `_`, and only when the trailing token is a
/// known predicate and the leading part is not empty. Anything else is a
/// plain field name with [`Predicate::None`].
pub(crate) fn split_predicate(name: &str) -> (&str, Predicate) {
    if let Some((field, suffix)) = name.rsplit_once('_') {
        let predicate = predicate_of(suffix);
        if !field.is_empty() && predicate.is_some() {
            return (field, predicate);
        }
    }

    (name, Predicate::None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_suffix_resolves() {
        for (token, predicate) in TABLE {
            assert_eq!(predicate_of(token), predicate);
            assert_eq!(predicate.as_str(), token);
        }
    }

    #[test]
    fn unknown_and_empty_suffixes_are_none() {
        assert_eq!(predicate_of(""), Predicate::None);
        assert_eq!(predicate_of("like"), Predicate::None);
        assert_eq!(predicate_of("Eq"), Predicate::None);
        assert_eq!(predicate_of(" eq"), Predicate::None);
    }

    #[test]
    fn default_is_none() {
        assert_eq!(Predicate::default(), Predicate::None);
        assert!(!Predicate::None.is_some());
        assert_eq!(Predicate::None.to_string(), "none");
        assert_eq!(Predicate::NotNull.to_string(), "notnull");
    }

    #[test]
    fn split_predicate_uses_last_underscore() {
        assert_eq!(split_predicate("username_in"), ("username", Predicate::In));
        assert_eq!(
            split_predicate("created_at_start"),
            ("created_at", Predicate::Start)
        );
        assert_eq!(split_predicate("username"), ("username", Predicate::None));
    }

    #[test]
    fn split_predicate_keeps_unknown_suffix_in_name() {
        // Unknown suffixes stay part of the field name instead of being
        // dropped, so `filter[created_at]` addresses `created_at`.
        assert_eq!(split_predicate("created_at"), ("created_at", Predicate::None));
        assert_eq!(split_predicate("age_between"), ("age_between", Predicate::None));
        assert_eq!(split_predicate("_nin"), ("_nin", Predicate::None));
        assert_eq!(split_predicate("_"), ("_", Predicate::None));
        assert_eq!(split_predicate("name_"), ("name_", Predicate::None));
    }
}
