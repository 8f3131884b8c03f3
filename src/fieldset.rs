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

/// Name of the primary-resource bucket. Always accepted by [`Fieldset`].
pub const ROOT: &str = "root";

const DOCUMENT: &str = "document";

// fields | fields[name] | fields[name_predicate] | fields[rel.name]
static FIELDS_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^fields(?:\[([A-Za-z0-9_]+(?:\.[A-Za-z0-9_]+)*)\])?$")
        .expect("FIELDS_KEY: invalid regex pattern")
});

/// Whether a requested field is shown or hidden.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Show the field (no prefix)
    #[default]
    List,
    /// Hide the field (`-` prefix)
    Hide,
}

impl Visibility {
    /// Strips a leading `-` from `token` and reports the visibility it meant.
    fn of(token: &str) -> (&str, Visibility) {
        match token.strip_prefix('-') {
            Some(name) => (name, Visibility::Hide),
            None => (token, Visibility::List),
        }
    }
}

/// A field named in a fieldset request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedField {
    /// Field name without the `-` prefix
    pub name: String,
    /// Shown or hidden
    pub visibility: Visibility,
}

/// Fields requested for one type, e.g. everything under `fields[author]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSelection {
    predicate: Predicate,
    visibility: Visibility,
    fields: Vec<SelectedField>,
}

impl TypeSelection {
    /// Predicate suffix of the key (`fields[name_in]`), `None` for the root.
    pub fn predicate(&self) -> Predicate {
        self.predicate
    }

    /// Visibility of the whole bucket.
    ///
    /// Only the first requested token decides it: `fields[tags]=-a,b` is
    /// hidden even though `b` is not prefixed.
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Requested fields in request order, first occurrence kept.
    pub fn fields(&self) -> &[SelectedField] {
        &self.fields
    }

    /// Visibility of `field` if it was requested.
    pub fn get(&self, field: &str) -> Option<Visibility> {
        self.fields
            .iter()
            .find(|f| f.name == field)
            .map(|f| f.visibility)
    }

    /// Names of the fields requested without a `-` prefix.
    pub fn listed(&self) -> impl Iterator<Item = &str> {
        self.with_visibility(Visibility::List)
    }

    /// Names of the fields requested with a `-` prefix.
    pub fn hidden(&self) -> impl Iterator<Item = &str> {
        self.with_visibility(Visibility::Hide)
    }

    fn with_visibility(&self, visibility: Visibility) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(move |f| f.visibility == visibility)
            .map(|f| f.name.as_str())
    }

    fn push(&mut self, token: &str) {
        let (name, visibility) = Visibility::of(token);
        if name.is_empty() || self.get(name).is_some() {
            return;
        }

        self.fields.push(SelectedField {
            name: name.to_string(),
            visibility,
        });
    }
}

/// Decoded `fields` / `fields[TYPE]` parameters keyed by type.
///
/// The primary resource is stored under [`ROOT`]; `fields`,
/// `fields[document]` and `fields[root]` all address it.
///
/// # Examples
///
/// ```
/// use sparse_query::{FieldSelection, QueryParams, Visibility};
///
/// let selection =
///     FieldSelection::decode(&QueryParams::parse("fields[document]=-name,username")).unwrap();
/// let root = selection.root().unwrap();
///
/// assert_eq!(root.get("name"), Some(Visibility::Hide));
/// assert_eq!(root.get("username"), Some(Visibility::List));
/// assert!(selection.fields("comments").is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSelection {
    types: BTreeMap<String, TypeSelection>,
}

impl FieldSelection {
    /// Decodes every `fields` key of `query`.
    ///
    /// Values of repeated keys are joined before splitting on `,`. A later
    /// bracketed key for the same type replaces an earlier one; root keys
    /// merge into one bucket.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFieldKey`] for a key that is not `fields` or
    /// `fields[NAME]` with `NAME` made of `[A-Za-z0-9_]` segments.
    pub fn decode(query: &QueryParams) -> Result<FieldSelection, Error> {
        let mut selection = FieldSelection::default();

        for (key, values) in query.family(Family::Fieldset).iter() {
            let captures = FIELDS_KEY
                .captures(key)
                .ok_or_else(|| Error::InvalidFieldKey(key.to_string()))?;

            let (name, predicate) = captures
                .get(1)
                .map_or((ROOT, Predicate::None), |m| split_predicate(m.as_str()));
            let tokens = comma_values(values);

            if name == ROOT || name == DOCUMENT {
                let root = selection.types.entry(ROOT.to_string()).or_default();
                tokens.iter().for_each(|token| root.push(token));
                continue;
            }

            let mut bucket = TypeSelection {
                predicate,
                visibility: tokens
                    .first()
                    .map(|token| Visibility::of(token).1)
                    .unwrap_or_default(),
                fields: Vec::new(),
            };
            tokens.iter().for_each(|token| bucket.push(token));

            selection.types.insert(name.to_string(), bucket);
        }

        Ok(selection)
    }

    /// The primary-resource bucket, if requested.
    pub fn root(&self) -> Option<&TypeSelection> {
        self.types.get(ROOT)
    }

    /// The bucket for `ty`; `"document"` is an alias for the root.
    pub fn get(&self, ty: &str) -> Option<&TypeSelection> {
        let ty = if ty == DOCUMENT { ROOT } else { ty };
        self.types.get(ty)
    }

    /// Requested fields of `ty`, empty when `ty` was not requested.
    pub fn fields(&self, ty: &str) -> &[SelectedField] {
        self.get(ty).map(TypeSelection::fields).unwrap_or_default()
    }

    /// Requested type names in sorted order.
    pub fn types(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }

    /// Returns `true` if `ty` has a bucket.
    pub fn contains(&self, ty: &str) -> bool {
        self.get(ty).is_some()
    }

    /// Number of type buckets.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` when nothing was requested.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Fieldset allow-list and handler.
///
/// Root fields are checked one by one; every other bucket is checked once by
/// its type name. [`ROOT`] is always accepted, so a bare `fields=root` never
/// fails.
#[derive(Debug, Clone, Default)]
pub struct Fieldset {
    accepted: AllowList,
}

impl Fieldset {
    /// Creates a handler that accepts only [`ROOT`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Accepts the given field or type names.
    pub fn accept<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accepted.extend(fields);
        self
    }

    /// Accepts one more field or type name.
    pub fn add(&mut self, field: impl Into<String>) {
        self.accepted.add(field);
    }

    /// The accepted names, not counting the implicit [`ROOT`].
    pub fn allow_list(&self) -> &AllowList {
        &self.accepted
    }

    /// Returns `true` if `name` is accepted.
    pub fn accepts(&self, name: &str) -> bool {
        name == ROOT || self.accepted.contains(name)
    }

    /// Checks a decoded selection against the allow-list.
    pub fn validate(&self, selection: &FieldSelection) -> Result<(), Error> {
        for (ty, bucket) in &selection.types {
            if ty != ROOT {
                if !self.accepts(ty) {
                    return Err(Error::UnsupportedField(ty.clone()));
                }
                continue;
            }

            if let Some(field) = bucket.fields().iter().find(|f| !self.accepts(&f.name)) {
                return Err(Error::UnsupportedField(field.name.clone()));
            }
        }

        Ok(())
    }
}

impl Handle for Fieldset {
    fn family(&self) -> Family {
        Family::Fieldset
    }

    fn handle(&self, ctx: &mut QueryContext, query: &QueryParams) -> Result<(), Error> {
        let query = query.family(Family::Fieldset);
        if query.is_empty() {
            ctx.log().skipped(Family::Fieldset);
            return Ok(());
        }

        let selection = FieldSelection::decode(&query)
            .and_then(|selection| self.validate(&selection).map(|()| selection))
            .inspect_err(|err| ctx.log().rejected(err))?;

        let entries = selection.len();
        ctx.publish_fieldset(selection);
        ctx.log().published(Family::Fieldset, entries);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(pairs: &[(&str, &str)]) -> Result<FieldSelection, Error> {
        let query: QueryParams = pairs.iter().copied().collect();
        FieldSelection::decode(&query)
    }

    #[test]
    fn root_tokens_carry_their_own_visibility() {
        let selection = decode(&[("fields[document]", "-name,username")]).unwrap();
        let root = selection.root().unwrap();

        assert_eq!(root.get("name"), Some(Visibility::Hide));
        assert_eq!(root.get("username"), Some(Visibility::List));
        assert_eq!(root.listed().collect::<Vec<_>>(), vec!["username"]);
        assert_eq!(root.hidden().collect::<Vec<_>>(), vec!["name"]);
        assert_eq!(root.predicate(), Predicate::None);
    }

    #[test]
    fn root_aliases_merge_and_first_action_wins() {
        let selection = decode(&[
            ("fields", "title,-body"),
            ("fields[document]", "body,-title,summary"),
        ])
        .unwrap();
        let root = selection.root().unwrap();

        // "fields" sorts first, so its actions are seen first
        assert_eq!(root.get("title"), Some(Visibility::List));
        assert_eq!(root.get("body"), Some(Visibility::Hide));
        assert_eq!(root.fields().len(), 3);
        assert_eq!(selection.len(), 1);
        assert_eq!(selection.get("document"), selection.root());
    }

    #[test]
    fn repeated_values_are_joined() {
        let selection = decode(&[("fields[username]", "john,anne"), ("fields[username]", "paul")])
            .unwrap();
        let names: Vec<_> = selection
            .fields("username")
            .iter()
            .map(|f| f.name.as_str())
            .collect();

        assert_eq!(names, vec!["john", "anne", "paul"]);
    }

    #[test]
    fn bracketed_predicate_is_extracted() {
        let selection = decode(&[("fields[name_in]", "a,b")]).unwrap();
        let bucket = selection.get("name").unwrap();

        assert_eq!(bucket.predicate(), Predicate::In);
        assert_eq!(bucket.visibility(), Visibility::List);
    }

    #[test]
    fn bracketed_name_with_unknown_suffix_stays_whole() {
        let selection = decode(&[("fields[created_at]", "x")]).unwrap();
        assert!(selection.contains("created_at"));
        assert_eq!(selection.get("created_at").unwrap().predicate(), Predicate::None);
    }

    // Known quirk: only the first token decides a bracketed bucket's visibility.
    #[test]
    fn bucket_visibility_comes_from_first_token_only() {
        let hidden = decode(&[("fields[tags]", "-a,b")]).unwrap();
        assert_eq!(hidden.get("tags").unwrap().visibility(), Visibility::Hide);

        let listed = decode(&[("fields[tags]", "a,-b")]).unwrap();
        let bucket = listed.get("tags").unwrap();
        assert_eq!(bucket.visibility(), Visibility::List);
        assert_eq!(bucket.get("b"), Some(Visibility::Hide));
    }

    #[test]
    fn empty_value_yields_empty_bucket() {
        let selection = decode(&[("fields[tags]", "")]).unwrap();
        let bucket = selection.get("tags").unwrap();

        assert!(bucket.fields().is_empty());
        assert_eq!(bucket.visibility(), Visibility::List);
    }

    #[test]
    fn dotted_type_names_are_allowed() {
        let selection = decode(&[("fields[comments.author]", "name")]).unwrap();
        assert!(selection.contains("comments.author"));
    }

    #[test]
    fn malformed_keys_fail() {
        for key in ["fields[]", "fields[bad-chars]", "fields[a]x", "fields[a.]", "fields["] {
            assert_eq!(
                decode(&[(key, "x")]),
                Err(Error::InvalidFieldKey(key.to_string())),
                "{key}"
            );
        }
    }

    #[test]
    fn unrequested_type_reads_empty() {
        let selection = decode(&[]).unwrap();
        assert!(selection.is_empty());
        assert!(selection.fields("unknown").is_empty());
        assert!(selection.root().is_none());
    }

    #[test]
    fn validate_checks_root_fields_individually() {
        let fieldset = Fieldset::new().accept(["name", "username"]);

        let ok = decode(&[("fields[document]", "-name,username")]).unwrap();
        assert_eq!(fieldset.validate(&ok), Ok(()));

        let bad = decode(&[("fields", "name,password")]).unwrap();
        assert_eq!(
            fieldset.validate(&bad),
            Err(Error::UnsupportedField("password".to_string()))
        );
    }

    #[test]
    fn validate_checks_bracketed_type_once() {
        let fieldset = Fieldset::new().accept(["friends"]);

        let ok = decode(&[("fields[friends]", "anne,paul")]).unwrap();
        assert_eq!(fieldset.validate(&ok), Ok(()));

        let bad = decode(&[("fields[unknown]", "any")]).unwrap();
        assert_eq!(
            fieldset.validate(&bad),
            Err(Error::UnsupportedField("unknown".to_string()))
        );
    }

    #[test]
    fn root_sentinel_is_always_accepted() {
        let fieldset = Fieldset::new();
        let selection = decode(&[("fields", "root")]).unwrap();

        assert!(fieldset.accepts(ROOT));
        assert_eq!(fieldset.validate(&selection), Ok(()));
    }

    #[test]
    fn handle_publishes_only_valid_selection() {
        let fieldset = Fieldset::new().accept(["username", "friends"]);
        let mut ctx = QueryContext::new("req-1");
        let query: QueryParams = [
            ("other", ""),
            ("fields", "root"),
            ("fields[username]", "john"),
            ("fields[friends]", "anne,paul"),
        ]
        .into_iter()
        .collect();

        fieldset.handle(&mut ctx, &query).unwrap();

        assert_eq!(ctx.fields("friends").len(), 2);
        assert_eq!(ctx.fields("username")[0].name, "john");
        assert!(ctx.fields("unknown").is_empty());

        let mut rejected = QueryContext::new("req-2");
        let bad: QueryParams = [("fields[unknown]", "any")].into_iter().collect();
        assert!(fieldset.handle(&mut rejected, &bad).is_err());
        assert!(rejected.fieldset().is_none());
    }
}
