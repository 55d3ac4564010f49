//! Paging windows: page-number/page-size and offset/limit, kept in sync.
//!
//! Out-of-range input is clamped, never rejected: page numbers and sizes
//! become at least 1 and offsets at least 0.

use serde::{Deserialize, Serialize};

use crate::config::PagingConfig;
use crate::field::ColumnMap;
use crate::sort::{SortCollection, SortDirection};

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: u64 = 20;

fn clamp(value: i64, min: u64) -> u64 {
    u64::try_from(value).unwrap_or(0).max(min)
}

#[derive(Deserialize)]
struct PageParts {
    number: i64,
    size: i64,
}

/// A 1-based page number and a page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "PageParts")]
pub struct Page {
    number: u64,
    size: u64,
}

impl From<PageParts> for Page {
    fn from(p: PageParts) -> Self {
        Page::new(p.number, p.size)
    }
}

impl Page {
    /// Both values clamp to a minimum of 1.
    pub fn new(number: i64, size: i64) -> Self {
        let page = Self {
            number: clamp(number, 1),
            size: clamp(size, 1),
        };
        if i64::try_from(page.number) != Ok(number) || i64::try_from(page.size) != Ok(size) {
            tracing::trace!(number, size, ?page, "clamped page");
        }
        page
    }

    /// The first page of the given size.
    pub fn first(size: i64) -> Self {
        Self::new(1, size)
    }

    pub fn number(&self) -> u64 {
        self.number
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// `offset = (number - 1) * size`, `limit = size`.
    pub fn to_limit(&self) -> Limit {
        Limit {
            offset: (self.number - 1).saturating_mul(self.size),
            limit: self.size,
        }
    }

    pub fn next(&self) -> Self {
        Self {
            number: self.number.saturating_add(1),
            size: self.size,
        }
    }

    /// The previous page; the first page is its own predecessor.
    pub fn previous(&self) -> Self {
        Self {
            number: self.number.saturating_sub(1).max(1),
            size: self.size,
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self {
            number: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

#[derive(Deserialize)]
struct LimitParts {
    offset: i64,
    limit: i64,
}

/// A row offset and a maximum row count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "LimitParts")]
pub struct Limit {
    offset: u64,
    limit: u64,
}

impl From<LimitParts> for Limit {
    fn from(l: LimitParts) -> Self {
        Limit::new(l.offset, l.limit)
    }
}

impl Limit {
    /// Offset clamps to 0, limit to 1.
    pub fn new(offset: i64, limit: i64) -> Self {
        let clamped = Self {
            offset: clamp(offset, 0),
            limit: clamp(limit, 1),
        };
        if i64::try_from(clamped.offset) != Ok(offset) || i64::try_from(clamped.limit) != Ok(limit) {
            tracing::trace!(offset, limit, ?clamped, "clamped limit");
        }
        clamped
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    /// The page containing `offset`: `number = offset / limit + 1`.
    pub fn to_page(&self) -> Page {
        Page {
            number: self.offset / self.limit + 1,
            size: self.limit,
        }
    }
}

/// Which representation a [`Pageable`] was last set from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    Page(Page),
    Limit(Limit),
}

/// A paging window plus an optional sort order.
///
/// Exactly one of page and limit is authoritative; the other is derived
/// on demand. A limit whose offset is not a multiple of its size keeps
/// its exact offset, while [`page`](Pageable::page) reports the page
/// containing it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pageable {
    window: Window,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sort: Option<SortCollection>,
}

impl Pageable {
    pub fn from_page(page: Page) -> Self {
        Self {
            window: Window::Page(page),
            sort: None,
        }
    }

    pub fn from_limit(limit: Limit) -> Self {
        Self {
            window: Window::Limit(limit),
            sort: None,
        }
    }

    /// Shorthand for `Pageable::from_page(Page::new(number, size))`.
    pub fn of(number: i64, size: i64) -> Self {
        Self::from_page(Page::new(number, size))
    }

    pub fn with_sort(mut self, sort: SortCollection) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn set_sort(&mut self, sort: Option<SortCollection>) {
        self.sort = sort;
    }

    pub fn set_page(&mut self, page: Page) {
        self.window = Window::Page(page);
    }

    pub fn set_limit(&mut self, limit: Limit) {
        self.window = Window::Limit(limit);
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn page(&self) -> Page {
        match self.window {
            Window::Page(page) => page,
            Window::Limit(limit) => limit.to_page(),
        }
    }

    pub fn to_limit(&self) -> Limit {
        match self.window {
            Window::Page(page) => page.to_limit(),
            Window::Limit(limit) => limit,
        }
    }

    pub fn page_number(&self) -> u64 {
        self.page().number()
    }

    pub fn page_size(&self) -> u64 {
        self.page().size()
    }

    pub fn offset(&self) -> u64 {
        self.to_limit().offset()
    }

    pub fn limit(&self) -> u64 {
        self.to_limit().limit()
    }

    pub fn sort(&self) -> Option<&SortCollection> {
        self.sort.as_ref()
    }

    /// The following page, same size and sort.
    pub fn next(&self) -> Self {
        Self {
            window: Window::Page(self.page().next()),
            sort: self.sort.clone(),
        }
    }

    /// The preceding page, same size and sort. Stays on page 1.
    pub fn previous(&self) -> Self {
        Self {
            window: Window::Page(self.page().previous()),
            sort: self.sort.clone(),
        }
    }
}

impl Default for Pageable {
    fn default() -> Self {
        Self::from_page(Page::default())
    }
}

impl From<Page> for Pageable {
    fn from(page: Page) -> Self {
        Self::from_page(page)
    }
}

impl From<Limit> for Pageable {
    fn from(limit: Limit) -> Self {
        Self::from_limit(limit)
    }
}

/// Paging input as received from a client, before defaults and limits.
///
/// Deserializable from query parameters or JSON:
/// `page`, `size`, `offset`, `limit`, `sort`, `dir`. A `sort` value with
/// a leading `-` sorts descending unless `dir` says otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PageRequest {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub sort: Option<String>,
    pub dir: Option<String>,
}

impl PageRequest {
    /// Parse a URL query string (`page=2&size=10&sort=-created`).
    ///
    /// Unknown keys and unparseable numbers are ignored.
    pub fn from_query(query: &str) -> Self {
        let mut request = Self::default();
        for (key, value) in form_urlencoded::parse(query.trim_start_matches('?').as_bytes()) {
            let number = || value.trim().parse::<i64>().ok();
            match key.as_ref() {
                "page" => request.page = number(),
                "size" => request.size = number(),
                "offset" => request.offset = number(),
                "limit" => request.limit = number(),
                "sort" => request.sort = Some(value.trim().to_string()).filter(|s| !s.is_empty()),
                "dir" => request.dir = Some(value.trim().to_string()).filter(|s| !s.is_empty()),
                _ => {}
            }
        }
        request
    }

    /// Resolve into a [`Pageable`].
    ///
    /// The configured default size fills a missing size and the optional
    /// maximum caps it. `offset`/`limit` are used only when `page` is
    /// absent and `limit` is present. The sort field must be a key of
    /// `allowed`, otherwise `default_sort` applies.
    pub fn into_pageable(
        &self,
        paging: &PagingConfig,
        allowed: &ColumnMap,
        default_sort: SortCollection,
    ) -> Pageable {
        let cap = |size: i64| match paging.max_size {
            Some(max) => size.min(i64::try_from(max).unwrap_or(i64::MAX)),
            None => size,
        };
        let default_size = i64::try_from(paging.size).unwrap_or(i64::MAX);

        let mut pageable = match (self.page, self.limit) {
            (None, Some(limit)) => Pageable::from_limit(Limit::new(self.offset.unwrap_or(0), cap(limit))),
            (page, _) => Pageable::of(page.unwrap_or(1), cap(self.size.unwrap_or(default_size))),
        };

        let (field, implied) = match self.sort.as_deref() {
            Some(s) => match s.strip_prefix('-') {
                Some(field) => (Some(field), SortDirection::Desc),
                None => (Some(s.trim_start_matches('+')), SortDirection::Asc),
            },
            None => (None, SortDirection::Asc),
        };
        let direction = match self.dir.as_deref().map(str::parse::<SortDirection>) {
            Some(Ok(dir)) => dir,
            Some(Err(e)) => {
                tracing::debug!(error = %e, "ignoring sort direction");
                implied
            }
            None => implied,
        };

        let sort = SortCollection::from_request(field, direction, allowed, default_sort);
        if !sort.is_empty() {
            pageable.set_sort(Some(sort));
        }
        pageable
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_limit_round_trip() {
        for n in 1..=12 {
            for s in 1..=9 {
                let page = Page::new(n, s);
                assert_eq!(page.to_limit().to_page(), page);
            }
        }
    }

    #[test]
    fn page_to_limit() {
        let limit = Page::new(3, 10).to_limit();
        assert_eq!((limit.offset(), limit.limit()), (20, 10));
    }

    #[test]
    fn limit_to_page_rounds_down() {
        let page = Limit::new(15, 10).to_page();
        assert_eq!((page.number(), page.size()), (2, 10));
    }

    #[test]
    fn clamping() {
        assert_eq!(Page::new(0, 5), Page::new(1, 5));
        assert_eq!(Page::new(-4, 0), Page::new(1, 1));
        assert_eq!(Limit::new(-3, 0), Limit::new(0, 1));
    }

    #[test]
    fn deserialization_clamps() {
        let page: Page = serde_json::from_str(r#"{"number":0,"size":-2}"#).unwrap();
        assert_eq!(page, Page::new(1, 1));
        let limit: Limit = serde_json::from_str(r#"{"offset":-1,"limit":0}"#).unwrap();
        assert_eq!(limit, Limit::new(0, 1));
    }

    #[test]
    fn previous_stays_on_first_page() {
        assert_eq!(Page::new(1, 10).previous(), Page::new(1, 10));
        assert_eq!(Page::new(4, 10).previous(), Page::new(3, 10));
        assert_eq!(Page::new(4, 10).next(), Page::new(5, 10));
    }

    #[test]
    fn pageable_keeps_authoritative_limit() {
        let pageable = Pageable::from_limit(Limit::new(15, 10));
        assert_eq!(pageable.offset(), 15);
        assert_eq!(pageable.page_number(), 2);

        let mut pageable = Pageable::of(3, 10);
        assert_eq!(pageable.to_limit(), Limit::new(20, 10));
        pageable.set_limit(Limit::new(5, 5));
        assert_eq!(pageable.page(), Page::new(2, 5));
        pageable.set_page(Page::new(1, 50));
        assert_eq!(pageable.to_limit(), Limit::new(0, 50));
    }

    #[test]
    fn pageable_navigation_keeps_sort() {
        let pageable = Pageable::of(2, 10).with_sort(SortCollection::new().desc("id"));
        let next = pageable.next();
        assert_eq!(next.page_number(), 3);
        assert_eq!(next.sort(), pageable.sort());
        assert_eq!(pageable.previous().previous().page_number(), 1);
    }

    #[test]
    fn default_pageable() {
        let pageable = Pageable::default();
        assert_eq!(pageable.page(), Page::new(1, 20));
        assert!(pageable.sort().is_none());
    }

    #[test]
    fn request_from_query() {
        let request = PageRequest::from_query("?page=3&size=15&sort=-created&dir=&junk=1&limit=x");
        assert_eq!(request.page, Some(3));
        assert_eq!(request.size, Some(15));
        assert_eq!(request.sort.as_deref(), Some("-created"));
        assert_eq!(request.dir, None);
        assert_eq!(request.limit, None);
    }

    #[test]
    fn request_into_pageable() {
        let allowed = ColumnMap::new().with("created", "created_at");
        let paging = PagingConfig::default();

        let pageable = PageRequest::from_query("page=3&size=15&sort=-created").into_pageable(
            &paging,
            &allowed,
            SortCollection::new(),
        );
        assert_eq!(pageable.page(), Page::new(3, 15));
        assert_eq!(pageable.sort().map(SortCollection::render).as_deref(), Some("created_at desc"));

        let pageable = PageRequest::default().into_pageable(&paging, &allowed, SortCollection::new());
        assert_eq!(pageable.page(), Page::new(1, paging.size as i64));
        assert!(pageable.sort().is_none());
    }

    #[test]
    fn request_respects_max_size_and_explicit_dir() {
        let allowed = ColumnMap::new().with("name", "name");
        let paging = PagingConfig {
            max_size: Some(50),
            ..PagingConfig::default()
        };
        let pageable = PageRequest::from_query("size=500&sort=name&dir=DESC").into_pageable(
            &paging,
            &allowed,
            SortCollection::new().asc("id"),
        );
        assert_eq!(pageable.page_size(), 50);
        assert_eq!(pageable.sort().map(SortCollection::render).as_deref(), Some("name desc"));
    }

    #[test]
    fn request_with_offset_limit() {
        let pageable = PageRequest::from_query("offset=30&limit=10").into_pageable(
            &PagingConfig::default(),
            &ColumnMap::new(),
            SortCollection::new().asc("id"),
        );
        assert_eq!(pageable.to_limit(), Limit::new(30, 10));
        assert_eq!(pageable.sort().map(SortCollection::render).as_deref(), Some("id asc"));
    }
}
