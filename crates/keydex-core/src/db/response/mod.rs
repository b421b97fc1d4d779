//! Materialized query results and paging descriptors.

use serde::{Deserialize, Serialize};

///
/// PageRequest
/// Zero-based page index plus page size.
///

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
pub struct PageRequest {
    pub page: usize,
    pub size: usize,
}

impl PageRequest {
    #[must_use]
    pub const fn new(page: usize, size: usize) -> Self {
        Self { page, size }
    }

    #[must_use]
    pub const fn first(size: usize) -> Self {
        Self::new(0, size)
    }

    /// Position of the first element of this page in the full ordering.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }

    #[must_use]
    pub const fn next(&self) -> Self {
        Self::new(self.page.saturating_add(1), self.size)
    }
}

///
/// IdPage
/// One page of matching ids, before fetch.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IdPage {
    pub ids: Vec<String>,
    pub total: u64,
}

///
/// Page
///
/// One page of results plus the total match count before paging.
/// `request` is `None` for unpaged queries, whose single page holds every match.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    items: Vec<T>,
    request: Option<PageRequest>,
    total: u64,
}

impl<T> Page<T> {
    #[must_use]
    pub const fn new(items: Vec<T>, request: Option<PageRequest>, total: u64) -> Self {
        Self {
            items,
            request,
            total,
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    #[must_use]
    pub fn items(&self) -> &[T] {
        &self.items
    }

    #[must_use]
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    #[must_use]
    pub const fn request(&self) -> Option<PageRequest> {
        self.request
    }

    /// Matches across all pages.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    #[must_use]
    pub const fn number_of_elements(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn total_pages(&self) -> u64 {
        match self.request {
            Some(request) if request.size > 0 => self.total.div_ceil(request.size as u64),
            _ => u64::from(self.total > 0),
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.request.is_some_and(|request| {
            let seen = request.offset().saturating_add(request.size) as u64;
            seen < self.total
        })
    }

    /// Request for the following page, if there is one.
    #[must_use]
    pub fn next_request(&self) -> Option<PageRequest> {
        if self.has_next() {
            self.request.map(|request| request.next())
        } else {
            None
        }
    }

    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            request: self.request,
            total: self.total,
        }
    }

    /// Fallible [`map`](Self::map); stops at the first error.
    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            items: self.items.into_iter().map(f).collect::<Result<_, _>>()?,
            request: self.request,
            total: self.total,
        })
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

///
/// TESTS
///
