use crate::{
    allow::AllowList, context::QueryContext, error::Error, family::Family, query::QueryParams,
    sparse::Handle,
};

/// Marker for the primary resource inside an `include` list.
pub const ROOT_PATH: &str = "document";

/// Relationship paths requested through `include=a,b.c`.
///
/// The primary resource is tracked separately from the relations: a request
/// without `include` (or with an empty one) decodes to "root only".
///
/// # Examples
///
/// ```
/// use sparse_query::{IncludePaths, QueryParams};
///
/// let paths = IncludePaths::decode(&QueryParams::parse("include=author,comments.author,author"));
/// assert_eq!(paths.relations(), ["author", "comments.author"]);
/// assert!(!paths.has_root());
///
/// let default = IncludePaths::decode(&QueryParams::new());
/// assert!(default.has_root());
/// assert!(default.relations().is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludePaths {
    root: bool,
    paths: Vec<String>,
}

impl Default for IncludePaths {
    fn default() -> Self {
        Self {
            root: true,
            paths: Vec::new(),
        }
    }
}

impl IncludePaths {
    /// Decodes the first `include` value of `query`.
    ///
    /// Empty tokens are dropped and repeated paths collapse to their first
    /// occurrence. Decoding never fails; validation happens in
    /// [`Includes::validate`].
    pub fn decode(query: &QueryParams) -> IncludePaths {
        let value = match query.first(Family::Include.param()) {
            Some(value) if !value.is_empty() => value,
            _ => return IncludePaths::default(),
        };

        let mut decoded = IncludePaths {
            root: false,
            paths: Vec::new(),
        };

        for token in value.split(',').filter(|token| !token.is_empty()) {
            if token == ROOT_PATH {
                decoded.root = true;
            } else if !decoded.contains(token) {
                decoded.paths.push(token.to_string());
            }
        }

        if !decoded.root && decoded.paths.is_empty() {
            return IncludePaths::default();
        }

        decoded
    }

    /// Returns `true` when the primary resource is requested.
    pub fn has_root(&self) -> bool {
        self.root
    }

    /// Requested relation paths, without the root marker, in request order.
    pub fn relations(&self) -> &[String] {
        &self.paths
    }

    /// Returns `true` if `path` was requested.
    pub fn contains(&self, path: &str) -> bool {
        self.paths.iter().any(|p| p == path)
    }
}

/// Include allow-list and handler.
///
/// # Examples
///
/// ```
/// use sparse_query::{Handle, Includes, QueryContext, QueryParams};
///
/// let includes = Includes::new().accept(["author", "comments"]);
/// let mut ctx = QueryContext::new("req-1");
///
/// includes
///     .handle(&mut ctx, &QueryParams::parse("include=comments"))
///     .expect("comments is accepted");
/// assert_eq!(ctx.relations(), ["comments"]);
///
/// let err = includes
///     .handle(&mut QueryContext::new("req-2"), &QueryParams::parse("include=posts"))
///     .unwrap_err();
/// assert_eq!(err.to_string(), "unsupported include relation `posts`");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Includes {
    accepted: AllowList,
}

impl Includes {
    /// Creates a handler that accepts no relations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the given relation paths.
    pub fn accept<I, S>(mut self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted.extend(relations);
        self
    }

    /// Accepts one more relation path.
    pub fn add(&mut self, relation: impl Into<String>) {
        self.accepted.add(relation);
    }

    /// The accepted relation paths.
    pub fn allow_list(&self) -> &AllowList {
        &self.accepted
    }

    /// Checks every requested relation against the allow-list.
    ///
    /// The root marker is always accepted.
    pub fn validate(&self, paths: &IncludePaths) -> Result<(), Error> {
        match paths.relations().iter().find(|p| !self.accepted.contains(p)) {
            Some(path) => Err(Error::UnsupportedInclude(path.clone())),
            None => Ok(()),
        }
    }
}

impl Handle for Includes {
    fn family(&self) -> Family {
        Family::Include
    }

    fn handle(&self, ctx: &mut QueryContext, query: &QueryParams) -> Result<(), Error> {
        let query = query.family(Family::Include);
        if query.first(Family::Include.param()).map_or(true, str::is_empty) {
            ctx.log().skipped(Family::Include);
            return Ok(());
        }

        let paths = IncludePaths::decode(&query);
        self.validate(&paths)
            .inspect_err(|err| ctx.log().rejected(err))?;

        let entries = paths.relations().len();
        ctx.publish_include(paths);
        ctx.log().published(Family::Include, entries);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(include: &str) -> QueryParams {
        [("include", include)].into_iter().collect()
    }

    #[test]
    fn decode_splits_on_commas() {
        let paths = IncludePaths::decode(&query("author,comments"));
        assert_eq!(paths.relations(), ["author", "comments"]);
        assert!(!paths.has_root());
    }

    #[test]
    fn decode_marks_explicit_root() {
        let paths = IncludePaths::decode(&query("document,author"));
        assert!(paths.has_root());
        assert_eq!(paths.relations(), ["author"]);
    }

    #[test]
    fn decode_drops_empty_tokens_and_duplicates() {
        let paths = IncludePaths::decode(&query(",author,,author,"));
        assert_eq!(paths.relations(), ["author"]);
    }

    #[test]
    fn decode_falls_back_to_root() {
        assert_eq!(IncludePaths::decode(&query("")), IncludePaths::default());
        assert_eq!(IncludePaths::decode(&query(",,")), IncludePaths::default());
        assert_eq!(IncludePaths::decode(&QueryParams::new()), IncludePaths::default());
    }

    #[test]
    fn decode_keeps_nested_paths_verbatim() {
        let paths = IncludePaths::decode(&query("comments.author.avatar"));
        assert!(paths.contains("comments.author.avatar"));
        assert!(!paths.contains("comments"));
    }

    #[test]
    fn decode_uses_first_value_only() {
        let query: QueryParams = [("include", "author"), ("include", "posts")]
            .into_iter()
            .collect();
        assert_eq!(IncludePaths::decode(&query).relations(), ["author"]);
    }

    #[test]
    fn handle_publishes_accepted_relations() {
        let includes = Includes::new().accept(["author", "comments.author"]);
        let mut ctx = QueryContext::new("req-1");

        includes
            .handle(&mut ctx, &query("author,comments.author"))
            .expect("accepted");

        assert_eq!(ctx.relations(), ["author", "comments.author"]);
    }

    #[test]
    fn handle_rejects_without_publishing() {
        let includes = Includes::new().accept(["author"]);
        let mut ctx = QueryContext::new("req-1");

        let result = includes.handle(&mut ctx, &query("author,posts"));

        assert_eq!(result, Err(Error::UnsupportedInclude("posts".to_string())));
        assert!(ctx.include().is_none());
    }

    #[test]
    fn handle_accepts_root_marker_without_allow_list_entry() {
        let includes = Includes::new();
        let mut ctx = QueryContext::new("req-1");

        includes
            .handle(&mut ctx, &query("document"))
            .expect("root is always accepted");

        assert!(ctx.include().is_some_and(IncludePaths::has_root));
    }

    #[test]
    fn handle_ignores_absent_or_empty_include() {
        let includes = Includes::new();
        let mut ctx = QueryContext::new("req-1");

        includes.handle(&mut ctx, &QueryParams::new()).unwrap();
        includes.handle(&mut ctx, &query("")).unwrap();

        assert!(ctx.include().is_none());
        assert!(ctx.relations().is_empty());
    }
}
