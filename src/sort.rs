use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::{
    allow::AllowList, context::QueryContext, error::Error, family::Family, query::QueryParams,
    sparse::Handle,
};

static SORT_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_]+$").expect("SORT_FIELD: invalid regex pattern")
});

/// Sort direction of one field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Ascending, the default
    #[default]
    Asc,
    /// Descending, requested with a leading `-`
    Desc,
}

impl Direction {
    /// `"ASC"` or `"DESC"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded `sort=field,-other` specification.
///
/// Fields keep the position of their first occurrence; a repeated field takes
/// the direction of its last occurrence.
///
/// # Examples
///
/// ```
/// use sparse_query::{Direction, SortOrder};
///
/// let order = SortOrder::parse("-created_at,title").unwrap();
///
/// assert_eq!(order.direction("created_at"), Direction::Desc);
/// assert_eq!(order.direction("title"), Direction::Asc);
/// assert_eq!(order.direction("unknown"), Direction::Asc);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOrder {
    fields: Vec<(String, Direction)>,
}

impl SortOrder {
    /// Decodes the first `sort` value of `query`.
    ///
    /// Repeated `sort` keys are ignored. A missing key decodes to an empty
    /// order.
    pub fn decode(query: &QueryParams) -> Result<SortOrder, Error> {
        match query.first(Family::Sort.param()) {
            Some(spec) => SortOrder::parse(spec),
            None => Ok(SortOrder::default()),
        }
    }

    /// Parses one comma-separated sort specification.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidSortField`] for the first token whose name (after the
    /// `-` prefix) is not `[A-Za-z0-9_]+`. Tokens after it are not looked at.
    pub fn parse(spec: &str) -> Result<SortOrder, Error> {
        let mut order = SortOrder::default();

        for token in spec.split(',') {
            let (field, direction) = match token.strip_prefix('-') {
                Some(field) => (field, Direction::Desc),
                None => (token, Direction::Asc),
            };

            if !SORT_FIELD.is_match(field) {
                return Err(Error::InvalidSortField(field.to_string()));
            }

            order.set(field, direction);
        }

        Ok(order)
    }

    fn set(&mut self, field: &str, direction: Direction) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, existing)) => *existing = direction,
            None => self.fields.push((field.to_string(), direction)),
        }
    }

    /// The requested direction of `field`, if sorted on.
    pub fn get(&self, field: &str) -> Option<Direction> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, direction)| *direction)
    }

    /// The direction of `field`, [`Direction::Asc`] when not requested.
    pub fn direction(&self, field: &str) -> Direction {
        self.get(field).unwrap_or_default()
    }

    /// Iterates `(field, direction)` in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Direction)> {
        self.fields.iter().map(|(name, direction)| (name.as_str(), *direction))
    }

    /// Number of sorted fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` when no field is sorted on.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Sort allow-list and handler.
///
/// An absent `sort` parameter publishes nothing; readers fall back to
/// [`Direction::Asc`]. A present but empty `sort=` is an invalid field.
#[derive(Debug, Clone, Default)]
pub struct Sorting {
    accepted: AllowList,
}

impl Sorting {
    /// Creates a handler that accepts no fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the given sortable fields.
    pub fn accept<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted.extend(fields);
        self
    }

    /// Accepts one more sortable field.
    pub fn add(&mut self, field: impl Into<String>) {
        self.accepted.add(field);
    }

    /// The accepted fields.
    pub fn allow_list(&self) -> &AllowList {
        &self.accepted
    }

    /// Checks every sorted field against the allow-list.
    pub fn validate(&self, order: &SortOrder) -> Result<(), Error> {
        match order.iter().find(|(field, _)| !self.accepted.contains(field)) {
            Some((field, _)) => Err(Error::UnsupportedSort(field.to_string())),
            None => Ok(()),
        }
    }
}

impl Handle for Sorting {
    fn family(&self) -> Family {
        Family::Sort
    }

    fn handle(&self, ctx: &mut QueryContext, query: &QueryParams) -> Result<(), Error> {
        let query = query.family(Family::Sort);
        if query.first(Family::Sort.param()).is_none() {
            ctx.log().skipped(Family::Sort);
            return Ok(());
        }

        let order = SortOrder::decode(&query)
            .and_then(|order| self.validate(&order).map(|()| order))
            .inspect_err(|err| ctx.log().rejected(err))?;

        let entries = order.len();
        ctx.publish_sort(order);
        ctx.log().published(Family::Sort, entries);

        Ok(())
    }
}
