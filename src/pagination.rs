use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::{context::QueryContext, error::Error, family::Family, query::QueryParams, sparse::Handle};

/// Page size used when none is configured, or when zero is configured.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

static PAGE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^page\[([A-Za-z0-9_]+)\]$").expect("PAGE_KEY: invalid regex pattern")
});

/// One of the two recognised `page[...]` properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageParam {
    /// `page[number]`
    Number,
    /// `page[size]`
    Size,
}

impl PageParam {
    /// The lowercase property name.
    pub fn as_str(self) -> &'static str {
        match self {
            PageParam::Number => "number",
            PageParam::Size => "size",
        }
    }
}

impl fmt::Display for PageParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PageParam {
    type Err = Error;

    /// Case-insensitive: `Size` and `SIZE` both resolve to [`PageParam::Size`].
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        if raw.eq_ignore_ascii_case("number") {
            Ok(PageParam::Number)
        } else if raw.eq_ignore_ascii_case("size") {
            Ok(PageParam::Size)
        } else {
            Err(Error::InvalidPageParam(raw.to_string()))
        }
    }
}

/// Page number and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub number: i64,
    /// Items per page
    pub size: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    /// Value of one property.
    pub fn get(&self, param: PageParam) -> i64 {
        match param {
            PageParam::Number => self.number,
            PageParam::Size => self.size,
        }
    }

    fn set(&mut self, param: PageParam, value: i64) {
        match param {
            PageParam::Number => self.number = value,
            PageParam::Size => self.size = value,
        }
    }
}

/// Pagination decoder and handler.
///
/// Unlike the other families there is no allow-list: only `page[number]` and
/// `page[size]` exist.
///
/// # Examples
///
/// ```
/// use sparse_query::{Page, Pagination, QueryParams};
///
/// let pagination = Pagination::with_page_size(25);
///
/// let page = pagination.decode(&QueryParams::parse("page[number]=3")).unwrap();
/// assert_eq!(page, Page { number: 3, size: 25 });
///
/// let err = pagination.decode(&QueryParams::parse("page[number]=abc")).unwrap_err();
/// assert_eq!(err.to_string(), "pagination param `number` should be int");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Pagination {
    defaults: Page,
}

impl Pagination {
    /// Pagination with page size [`DEFAULT_PAGE_SIZE`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Pagination with a default page size. Zero means [`DEFAULT_PAGE_SIZE`].
    pub fn with_page_size(size: u32) -> Self {
        let mut pagination = Self::new();
        pagination.set_page_size(size);
        pagination
    }

    /// Changes the default page size. Zero means [`DEFAULT_PAGE_SIZE`].
    pub fn set_page_size(&mut self, size: u32) {
        self.defaults.size = match size {
            0 => DEFAULT_PAGE_SIZE,
            size => i64::from(size),
        };
    }

    /// Values used for properties the query leaves out.
    pub fn defaults(&self) -> Page {
        self.defaults
    }

    /// Decodes every `page` key of `query` on top of the defaults.
    ///
    /// # Errors
    ///
    /// - [`Error::MissingPageProp`] for `page` or any other key without a
    ///   `[prop]` suffix
    /// - [`Error::InvalidPageParam`] for a property other than `number` or
    ///   `size`
    /// - [`Error::PageParamNotInt`] when the concatenated values are not an
    ///   integer
    pub fn decode(&self, query: &QueryParams) -> Result<Page, Error> {
        let mut page = self.defaults;

        for (key, values) in query.family(Family::Pagination).iter() {
            let name = PAGE_KEY
                .captures(key)
                .and_then(|captures| captures.get(1))
                .ok_or(Error::MissingPageProp)?
                .as_str();

            let param: PageParam = name.parse()?;
            let value = values
                .concat()
                .parse::<i64>()
                .map_err(|_| Error::PageParamNotInt(param.as_str().to_string()))?;

            page.set(param, value);
        }

        Ok(page)
    }
}

impl Handle for Pagination {
    fn family(&self) -> Family {
        Family::Pagination
    }

    fn handle(&self, ctx: &mut QueryContext, query: &QueryParams) -> Result<(), Error> {
        let page = self
            .decode(query)
            .inspect_err(|err| ctx.log().rejected(err))?;

        ctx.publish_page(page);
        ctx.log().published(Family::Pagination, 2);

        Ok(())
    }
}
