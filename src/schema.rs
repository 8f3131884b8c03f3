//! Declarative allow-list derivation.
//!
//! A [`Schema`] lists the query-facing fields of a resource and what each of
//! them may be used for. [`Schema::allow_lists`] turns it into the four
//! allow-lists [`SparseQuery`](crate::SparseQuery) needs; the parser itself
//! never looks at a schema.

use crate::allow::AllowList;

/// Declaration of one query-facing field.
///
/// # Examples
///
/// ```
/// use sparse_query::FieldSpec;
///
/// let spec = FieldSpec::parse("name:created_at;select;sort:desc;filter").unwrap();
///
/// assert_eq!(spec.name(), "created_at");
/// assert!(spec.is_selectable() && spec.is_sortable() && spec.is_filterable());
/// assert!(!spec.is_relation());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSpec {
    name: String,
    select: bool,
    sort: bool,
    filter: bool,
    relation: bool,
    nested: Schema,
}

impl FieldSpec {
    /// A field that can't be used for anything yet.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parses a `name:<n>;select;sort;filter;relation` declaration.
    ///
    /// Options may appear in any order and match by prefix, so `sort:desc`
    /// marks the field sortable. Unknown options are ignored. Returns `None`
    /// for an empty or `-` declaration, or one without a name.
    pub fn parse(tag: &str) -> Option<FieldSpec> {
        if tag.is_empty() || tag == "-" {
            return None;
        }

        let mut spec = FieldSpec::default();
        for option in tag.split(';') {
            if let Some(name) = option.strip_prefix("name:") {
                spec.name = name.to_string();
            } else if option.starts_with("select") {
                spec.select = true;
            } else if option.starts_with("sort") {
                spec.sort = true;
            } else if option.starts_with("filter") {
                spec.filter = true;
            } else if option.starts_with("relation") {
                spec.relation = true;
            }
        }

        if spec.name.is_empty() {
            return None;
        }

        Some(spec)
    }

    /// Allows the field in `fields`.
    pub fn select(mut self) -> Self {
        self.select = true;
        self
    }

    /// Allows the field in `sort`.
    pub fn sort(mut self) -> Self {
        self.sort = true;
        self
    }

    /// Allows the field in `filter[...]`.
    pub fn filter(mut self) -> Self {
        self.filter = true;
        self
    }

    /// Makes the field an includable relation with the given shape.
    pub fn relation(mut self, nested: Schema) -> Self {
        self.relation = true;
        self.nested = nested;
        self
    }

    /// Attaches the shape of a relation declared through [`FieldSpec::parse`].
    ///
    /// Ignored unless the field is a relation.
    pub fn with_nested(mut self, nested: Schema) -> Self {
        self.nested = nested;
        self
    }

    /// The query-facing name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Usable in `fields`.
    pub fn is_selectable(&self) -> bool {
        self.select
    }

    /// Usable in `sort`.
    pub fn is_sortable(&self) -> bool {
        self.sort
    }

    /// Usable in `filter[...]`.
    pub fn is_filterable(&self) -> bool {
        self.filter
    }

    /// Usable in `include`.
    pub fn is_relation(&self) -> bool {
        self.relation
    }

    /// Shape of the related resource.
    pub fn nested(&self) -> &Schema {
        &self.nested
    }
}

/// The query-facing shape of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
}

impl Schema {
    /// An empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field declaration.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Builds a schema from tag declarations, skipping the ones
    /// [`FieldSpec::parse`] rejects.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparse_query::Schema;
    ///
    /// let schema = Schema::from_tags(["name:title;select;sort", "-", "name:body;select"]);
    /// assert_eq!(schema.fields().len(), 2);
    /// ```
    pub fn from_tags<'a, I>(tags: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        Self {
            fields: tags.into_iter().filter_map(FieldSpec::parse).collect(),
        }
    }

    /// Declared fields in order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Derives the allow-lists of every family.
    ///
    /// Fields of a relation are prefixed with `<relation>.`. A relation is
    /// accepted in `include` and, so that `fields[<relation>]` is usable, in
    /// `fields`.
    ///
    /// # Examples
    ///
    /// ```
    /// use sparse_query::{FieldSpec, Schema};
    ///
    /// let schema = Schema::new()
    ///     .field(FieldSpec::new("title").select().filter())
    ///     .field(FieldSpec::new("author").relation(
    ///         Schema::new().field(FieldSpec::new("name").select().sort()),
    ///     ));
    ///
    /// let lists = schema.allow_lists();
    /// assert!(lists.relations.contains("author"));
    /// assert!(lists.fields.contains("author.name"));
    /// assert!(lists.sort.contains("author.name"));
    /// assert!(!lists.filters.contains("author.name"));
    /// ```
    pub fn allow_lists(&self) -> AllowLists {
        let mut lists = AllowLists::default();
        self.collect("", &mut lists);
        lists
    }

    fn collect(&self, prefix: &str, lists: &mut AllowLists) {
        for spec in &self.fields {
            let name = format!("{prefix}{}", spec.name);

            if spec.relation {
                lists.relations.add(name.as_str());
                lists.fields.add(name.as_str());
                spec.nested.collect(&format!("{name}."), lists);
            }
            if spec.select {
                lists.fields.add(name.as_str());
            }
            if spec.filter {
                lists.filters.add(name.as_str());
            }
            if spec.sort {
                lists.sort.add(name);
            }
        }
    }
}

/// Allow-lists derived from a [`Schema`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowLists {
    /// Accepted `include` paths
    pub relations: AllowList,
    /// Accepted `fields` names
    pub fields: AllowList,
    /// Accepted `filter` fields
    pub filters: AllowList,
    /// Accepted `sort` fields
    pub sort: AllowList,
}

/// A type that declares its query-facing [`Schema`].
///
/// # Examples
///
/// ```
/// use sparse_query::{FieldSpec, Resource, Schema, SparseQuery};
///
/// struct Article;
///
/// impl Resource for Article {
///     fn schema() -> Schema {
///         Schema::new().field(FieldSpec::new("title").select().sort())
///     }
/// }
///
/// let sparse = SparseQuery::for_resource::<Article>();
/// assert!(sparse.sorting().allow_list().contains("title"));
/// ```
pub trait Resource {
    /// The schema of this resource.
    fn schema() -> Schema;
}
