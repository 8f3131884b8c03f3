use crate::{
    family::Family,
    fieldset::{FieldSelection, SelectedField},
    filter::{Condition, FilterSet},
    include::IncludePaths,
    logging::ContextLog,
    pagination::Page,
    sort::{Direction, SortOrder},
};

/// Request-scoped results of the five query families.
///
/// Created once per request, filled by the family handlers, then read by the
/// request handler. A family's slot is set only when every name it decoded
/// passed its allow-list; otherwise the slot stays `None`.
///
/// Besides the `Option` accessors, the context has defaulting readers that
/// never fail: an unfiltered field reads as an empty [`Condition`], an
/// unsorted field as [`Direction::Asc`], and missing pagination as
/// [`Page::default`].
///
/// # Examples
///
/// ```
/// use sparse_query::{Direction, QueryContext, QueryParams, SparseQuery};
///
/// let sparse = SparseQuery::new().accept_sort_by(["title"]);
///
/// let mut ctx = QueryContext::new("req-42");
/// sparse
///     .handle(&mut ctx, &QueryParams::parse("sort=-title"))
///     .expect("title is sortable");
///
/// assert_eq!(ctx.request_id(), "req-42");
/// assert_eq!(ctx.direction("title"), Direction::Desc);
/// assert_eq!(ctx.page().size, 10);
/// assert!(ctx.filter("title").values.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryContext {
    request_id: String,
    include: Option<IncludePaths>,
    fieldset: Option<FieldSelection>,
    filters: Option<FilterSet>,
    page: Option<Page>,
    sort: Option<SortOrder>,
}

impl QueryContext {
    /// Creates an empty context for one request.
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Self::default()
        }
    }

    /// Returns the request ID for this context.
    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Validated include paths, if published.
    pub fn include(&self) -> Option<&IncludePaths> {
        self.include.as_ref()
    }

    /// Requested relation paths; empty when include was not published.
    pub fn relations(&self) -> &[String] {
        self.include
            .as_ref()
            .map(IncludePaths::relations)
            .unwrap_or_default()
    }

    /// Validated field selection, if published.
    pub fn fieldset(&self) -> Option<&FieldSelection> {
        self.fieldset.as_ref()
    }

    /// Fields selected for type `ty` (`root` or `document` for the primary
    /// resource); empty when not requested.
    pub fn fields(&self, ty: &str) -> &[SelectedField] {
        self.fieldset
            .as_ref()
            .map(|fieldset| fieldset.fields(ty))
            .unwrap_or_default()
    }

    /// Validated filters, if published.
    pub fn filters(&self) -> Option<&FilterSet> {
        self.filters.as_ref()
    }

    /// The condition on `field`; empty when not filtered.
    pub fn filter(&self, field: &str) -> Condition {
        self.filters
            .as_ref()
            .map(|filters| filters.condition(field))
            .unwrap_or_default()
    }

    /// Decoded pagination, if published.
    pub fn pagination(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    /// Decoded pagination, or page 1 of 10 when not published.
    pub fn page(&self) -> Page {
        self.page.unwrap_or_default()
    }

    /// Validated sort order, if published.
    pub fn sort(&self) -> Option<&SortOrder> {
        self.sort.as_ref()
    }

    /// Sort direction of `field`; [`Direction::Asc`] when not requested.
    pub fn direction(&self, field: &str) -> Direction {
        self.sort
            .as_ref()
            .map(|sort| sort.direction(field))
            .unwrap_or_default()
    }

    /// Returns `true` if `family` has been published to this context.
    pub fn is_published(&self, family: Family) -> bool {
        match family {
            Family::Include => self.include.is_some(),
            Family::Fieldset => self.fieldset.is_some(),
            Family::Filter => self.filters.is_some(),
            Family::Pagination => self.page.is_some(),
            Family::Sort => self.sort.is_some(),
        }
    }

    pub(crate) fn publish_include(&mut self, include: IncludePaths) {
        self.include = Some(include);
    }

    pub(crate) fn publish_fieldset(&mut self, fieldset: FieldSelection) {
        self.fieldset = Some(fieldset);
    }

    pub(crate) fn publish_filters(&mut self, filters: FilterSet) {
        self.filters = Some(filters);
    }

    pub(crate) fn publish_page(&mut self, page: Page) {
        self.page = Some(page);
    }

    pub(crate) fn publish_sort(&mut self, sort: SortOrder) {
        self.sort = Some(sort);
    }

    pub(crate) fn log(&self) -> ContextLog<'_> {
        ContextLog::new(&self.request_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::Predicate;

    #[test]
    fn new_context_is_empty() {
        let ctx = QueryContext::new("req-123");

        assert_eq!(ctx.request_id(), "req-123");
        for family in Family::ALL {
            assert!(!ctx.is_published(family), "{family}");
        }
    }

    #[test]
    fn readers_default_when_unpublished() {
        let ctx = QueryContext::new("req-1");

        assert!(ctx.relations().is_empty());
        assert!(ctx.fields("root").is_empty());
        assert_eq!(ctx.filter("name"), Condition::default());
        assert_eq!(ctx.filter("name").predicate, Predicate::None);
        assert_eq!(ctx.page(), Page { number: 1, size: 10 });
        assert_eq!(ctx.direction("name"), Direction::Asc);
    }

    #[test]
    fn publish_sets_one_slot() {
        let mut ctx = QueryContext::new("req-1");
        ctx.publish_page(Page { number: 3, size: 5 });

        assert!(ctx.is_published(Family::Pagination));
        assert!(!ctx.is_published(Family::Sort));
        assert_eq!(ctx.page().number, 3);
    }

    #[test]
    fn publish_replaces_previous_value() {
        let mut ctx = QueryContext::new("req-1");
        ctx.publish_sort(SortOrder::parse("title").unwrap());
        ctx.publish_sort(SortOrder::parse("-title").unwrap());

        assert_eq!(ctx.direction("title"), Direction::Desc);
    }

    #[test]
    fn log_is_tagged_with_request_id() {
        let ctx = QueryContext::new("req-log");
        let log = ctx.log();

        assert_eq!(log.request_id(), "req-log");
        assert_eq!(QueryContext::new("other").log().request_id(), "other");
    }
}
