use crate::{
    context::QueryContext,
    error::Error,
    family::Family,
    fieldset::Fieldset,
    filter::Filters,
    include::Includes,
    pagination::Pagination,
    query::QueryParams,
    schema::{Resource, Schema},
    sort::Sorting,
};

/// One family's extract, decode, validate and publish step.
///
/// Implementations take only their own keys from `query`. On success they may
/// publish into `ctx`; on error `ctx` is left exactly as it was.
pub trait Handle {
    /// The family this handler owns.
    fn family(&self) -> Family;

    /// Runs the family against `query`, publishing into `ctx` on success.
    ///
    /// # Errors
    ///
    /// Returns the decode or allow-list error of this family.
    fn handle(&self, ctx: &mut QueryContext, query: &QueryParams) -> Result<(), Error>;
}

/// The composed query parser: one configured handler per family.
///
/// Configure it once at startup, then share it (`&SparseQuery` is
/// `Send + Sync`) across request handlers. Growing the allow-lists needs
/// `&mut self`.
///
/// # Examples
///
/// ```
/// use sparse_query::{Direction, Predicate, QueryContext, QueryParams, SparseQuery};
///
/// let sparse = SparseQuery::new()
///     .accept_relations(["author"])
///     .accept_fields(["title", "body"])
///     .accept_filters(["title"])
///     .accept_sort_by(["title"])
///     .page_size(20);
///
/// let query = QueryParams::parse(
///     "include=author&fields=title&filter[title_start]=Rust&sort=-title&page[number]=2",
/// );
///
/// let mut ctx = QueryContext::new("req-1");
/// sparse.handle(&mut ctx, &query).expect("query is acceptable");
///
/// assert_eq!(ctx.relations(), ["author"]);
/// assert_eq!(ctx.fields("root")[0].name, "title");
/// assert_eq!(ctx.filter("title").predicate, Predicate::Start);
/// assert_eq!(ctx.direction("title"), Direction::Desc);
/// assert_eq!((ctx.page().number, ctx.page().size), (2, 20));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SparseQuery {
    include: Includes,
    fieldset: Fieldset,
    filter: Filters,
    pagination: Pagination,
    sort: Sorting,
}

impl SparseQuery {
    /// Creates a parser that accepts nothing beyond the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parser whose allow-lists are derived from `schema`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparse_query::{FieldSpec, QueryContext, QueryParams, Schema, SparseQuery};
    ///
    /// let schema = Schema::new()
    ///     .field(FieldSpec::new("title").select().sort())
    ///     .field(FieldSpec::new("author").relation(
    ///         Schema::new().field(FieldSpec::new("name").select()),
    ///     ));
    ///
    /// let sparse = SparseQuery::from_schema(&schema);
    /// let query = QueryParams::parse("include=author&fields[author.name]=name&sort=title");
    ///
    /// assert!(sparse.handle(&mut QueryContext::new("req-1"), &query).is_ok());
    /// ```
    pub fn from_schema(schema: &Schema) -> Self {
        let lists = schema.allow_lists();

        Self::new()
            .accept_relations(lists.relations.iter())
            .accept_fields(lists.fields.iter())
            .accept_filters(lists.filters.iter())
            .accept_sort_by(lists.sort.iter())
    }

    /// Creates a parser for the schema a [`Resource`] declares.
    pub fn for_resource<R: Resource>() -> Self {
        Self::from_schema(&R::schema())
    }

    /// Accepts relation paths for `include`.
    pub fn accept_relations<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = self.include.accept(relations);
        self
    }

    /// Accepts names for `fields` and `fields[TYPE]`.
    pub fn accept_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fieldset = self.fieldset.accept(fields);
        self
    }

    /// Accepts fields for `filter[FIELD]`.
    pub fn accept_filters<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = self.filter.accept(fields);
        self
    }

    /// Accepts fields for `sort`.
    pub fn accept_sort_by<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sort = self.sort.accept(fields);
        self
    }

    /// Sets the default page size. Zero means 10.
    pub fn page_size(mut self, size: u32) -> Self {
        self.pagination.set_page_size(size);
        self
    }

    /// The include handler.
    pub fn includes(&self) -> &Includes {
        &self.include
    }

    /// The include handler, for adding relations at startup.
    pub fn includes_mut(&mut self) -> &mut Includes {
        &mut self.include
    }

    /// The fieldset handler.
    pub fn fieldset(&self) -> &Fieldset {
        &self.fieldset
    }

    /// The fieldset handler, for adding names at startup.
    pub fn fieldset_mut(&mut self) -> &mut Fieldset {
        &mut self.fieldset
    }

    /// The filter handler.
    pub fn filters(&self) -> &Filters {
        &self.filter
    }

    /// The filter handler, for adding fields at startup.
    pub fn filters_mut(&mut self) -> &mut Filters {
        &mut self.filter
    }

    /// The pagination handler.
    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    /// The pagination handler, for changing the page size at startup.
    pub fn pagination_mut(&mut self) -> &mut Pagination {
        &mut self.pagination
    }

    /// The sort handler.
    pub fn sorting(&self) -> &Sorting {
        &self.sort
    }

    /// The sort handler, for adding fields at startup.
    pub fn sorting_mut(&mut self) -> &mut Sorting {
        &mut self.sort
    }

    fn handlers(&self) -> [&dyn Handle; 5] {
        [
            &self.include,
            &self.fieldset,
            &self.filter,
            &self.pagination,
            &self.sort,
        ]
    }

    /// Runs every family against `query`: include, fields, filter, page, sort.
    ///
    /// Stops at the first failing family. Families that ran before it stay
    /// published in `ctx`; treat any error as a rejected request unless
    /// partial results are explicitly wanted.
    ///
    /// # Errors
    ///
    /// Returns the first family's decode or allow-list error.
    pub fn handle(&self, ctx: &mut QueryContext, query: &QueryParams) -> Result<(), Error> {
        let span = tracing::debug_span!(
            "sparse_query.handle",
            request_id = %ctx.request_id(),
            keys = query.len()
        );
        let _entered = span.enter();

        for handler in self.handlers() {
            handler.handle(ctx, query)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pagination::Page, sort::Direction};

    fn sparse() -> SparseQuery {
        SparseQuery::new()
            .accept_relations(["author"])
            .accept_fields(["title", "author"])
            .accept_filters(["title"])
            .accept_sort_by(["title"])
    }

    #[test]
    fn handlers_run_in_family_order() {
        let families: Vec<Family> = sparse().handlers().iter().map(|h| h.family()).collect();
        assert_eq!(families, Family::ALL);
    }

    #[test]
    fn empty_query_publishes_only_pagination() {
        let mut ctx = QueryContext::new("req-1");
        sparse().handle(&mut ctx, &QueryParams::new()).unwrap();

        assert_eq!(ctx.pagination(), Some(&Page::default()));
        assert!(!ctx.is_published(Family::Include));
        assert!(!ctx.is_published(Family::Fieldset));
        assert!(!ctx.is_published(Family::Filter));
        assert!(!ctx.is_published(Family::Sort));
    }

    #[test]
    fn first_error_stops_later_families() {
        let mut ctx = QueryContext::new("req-1");
        let query = QueryParams::parse("include=author&filter[body]=x&sort=-title");

        let err = sparse().handle(&mut ctx, &query).unwrap_err();

        assert_eq!(err, Error::UnsupportedFilter("body".to_string()));
        assert!(ctx.is_published(Family::Include));
        assert!(!ctx.is_published(Family::Filter));
        assert!(!ctx.is_published(Family::Pagination));
        assert!(!ctx.is_published(Family::Sort));
    }

    #[test]
    fn builder_configures_page_size() {
        let mut ctx = QueryContext::new("req-1");
        sparse()
            .page_size(0)
            .handle(&mut ctx, &QueryParams::new())
            .unwrap();
        assert_eq!(ctx.page().size, 10);

        let sparse = sparse().page_size(30);
        assert_eq!(sparse.pagination().defaults().size, 30);
    }

    #[test]
    fn mutators_grow_allow_lists() {
        let mut sparse = SparseQuery::new();
        sparse.sorting_mut().add("created_at");
        sparse.filters_mut().add("created_at");
        sparse.includes_mut().add("tags");
        sparse.fieldset_mut().add("tags");
        sparse.pagination_mut().set_page_size(5);

        let mut ctx = QueryContext::new("req-1");
        let query = QueryParams::parse("include=tags&fields=tags&filter[created_at]=x&sort=created_at");
        sparse.handle(&mut ctx, &query).unwrap();

        assert_eq!(ctx.direction("created_at"), Direction::Asc);
        assert_eq!(ctx.page().size, 5);
        assert!(sparse.includes().allow_list().contains("tags"));
        assert!(sparse.fieldset().accepts("tags"));
        assert!(sparse.filters().allow_list().contains("created_at"));
        assert!(sparse.sorting().allow_list().contains("created_at"));
    }

    #[test]
    fn shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SparseQuery>();
        assert_send_sync::<QueryContext>();
    }
}
