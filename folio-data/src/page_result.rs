//! A page of rows with the metadata presentation code needs for navigation.

use serde::{Serialize, Serializer};
use std::time::Duration;

use crate::page::Pageable;

/// Pages shown on each side of the current page.
pub const DEFAULT_MARGIN: u64 = 2;

/// One entry of the pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub page: u64,
    pub selected: bool,
}

/// The rows of one page plus pagination metadata.
///
/// When no total is given the row count stands in for it ("count by
/// result") and the window covers every page regardless of margin. When no
/// pageable is given, all rows form a single page.
#[derive(Debug, Clone, Serialize)]
pub struct PageResult<T> {
    rows: Vec<T>,
    total_results: u64,
    pageable: Pageable,
    total_pages: u64,
    current_page: u64,
    page_size: u64,
    data_offset: u64,
    window: Vec<PageLink>,
    margin: u64,
    count_by_result: bool,
    #[serde(rename = "elapsed_ms", serialize_with = "serialize_millis")]
    elapsed: Duration,
}

fn serialize_millis<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
}

impl<T> PageResult<T> {
    pub fn new(rows: Vec<T>, total: Option<u64>, pageable: Option<Pageable>) -> Self {
        let count_by_result = total.is_none();
        let row_count = rows.len() as u64;
        let total_results = total.unwrap_or(row_count);
        let pageable = pageable.unwrap_or_else(|| {
            let size = total_results.max(row_count).max(1);
            Pageable::of(1, i64::try_from(size).unwrap_or(i64::MAX))
        });

        let page = pageable.page();
        let total_pages = total_results.div_ceil(page.size());

        let mut result = Self {
            rows,
            total_results,
            total_pages,
            current_page: page.number(),
            page_size: page.size(),
            data_offset: page.to_limit().offset(),
            pageable,
            window: Vec::new(),
            margin: DEFAULT_MARGIN,
            count_by_result,
            elapsed: Duration::ZERO,
        };
        result.generate_window();
        tracing::debug!(
            total_results,
            total_pages,
            current_page = result.current_page,
            count_by_result,
            "built page result"
        );
        result
    }

    /// Set the window margin (at least 1) and regenerate the window.
    /// Nothing else changes.
    pub fn set_margin(&mut self, margin: u64) {
        self.margin = margin.max(1);
        self.generate_window();
    }

    pub fn with_margin(mut self, margin: u64) -> Self {
        self.set_margin(margin);
        self
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = elapsed;
        self
    }

    fn generate_window(&mut self) {
        let total = self.total_pages;
        let (first, last) = if self.count_by_result {
            (1, total)
        } else {
            (
                self.current_page.saturating_sub(self.margin).max(1),
                self.current_page.saturating_add(self.margin).min(total),
            )
        };
        let current = self.current_page;
        self.window = (first..=last)
            .map(|page| PageLink {
                page,
                selected: page == current,
            })
            .collect();
    }

    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<T> {
        self.rows
    }

    pub fn total_results(&self) -> u64 {
        self.total_results
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn pageable(&self) -> &Pageable {
        &self.pageable
    }

    pub fn current_page(&self) -> u64 {
        self.current_page
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// `(current_page - 1) * page_size`.
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    pub fn window(&self) -> &[PageLink] {
        &self.window
    }

    pub fn margin(&self) -> u64 {
        self.margin
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn is_count_by_result(&self) -> bool {
        self.count_by_result
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn previous_page(&self) -> Option<u64> {
        self.has_previous().then(|| self.current_page - 1)
    }

    pub fn next_page(&self) -> Option<u64> {
        self.has_next().then(|| self.current_page + 1)
    }

    pub fn first_page(&self) -> u64 {
        1
    }

    /// Last page number; 1 when there are no results.
    pub fn last_page(&self) -> u64 {
        self.total_pages.max(1)
    }

    /// Transform the rows, keeping every piece of metadata.
    pub fn map<U, F>(self, f: F) -> PageResult<U>
    where
        F: FnMut(T) -> U,
    {
        PageResult {
            rows: self.rows.into_iter().map(f).collect(),
            total_results: self.total_results,
            pageable: self.pageable,
            total_pages: self.total_pages,
            current_page: self.current_page,
            page_size: self.page_size,
            data_offset: self.data_offset,
            window: self.window,
            margin: self.margin,
            count_by_result: self.count_by_result,
            elapsed: self.elapsed,
        }
    }
}
