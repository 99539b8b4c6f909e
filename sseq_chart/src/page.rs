// Copyright 2025 the Sseq Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pages and the current-page cursor.

use serde::{Deserialize, Serialize};

/// Page number standing for "every page from here on".
pub const INFINITY: i64 = 10_000;

/// One entry of a chart's page list.
///
/// Serializes as a bare number or as a `[start, end]` pair.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PageRange {
    /// A single page. `0` and `1` are shorthand for the base page with all
    /// or with no differentials.
    Page(i64),
    /// A page together with the range of differential pages shown on it.
    /// The end may be [`INFINITY`] (all higher differentials) or `-1` (none).
    Span(i64, i64),
}

/// What a [`PageRange`] shows: the page classes live on, and which
/// differential pages are drawn.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PageView {
    /// Page that class lifetimes and structlines are checked against.
    pub page: i64,
    /// Inclusive range of differential pages to draw, if any.
    pub differentials: Option<(i64, i64)>,
}

impl PageRange {
    /// The page that represents this range: the first element of a pair,
    /// otherwise the value.
    #[must_use]
    pub fn page(self) -> i64 {
        match self {
            Self::Page(p) | Self::Span(p, _) => p,
        }
    }

    /// Resolves the shorthand forms against the base page.
    #[must_use]
    pub fn view(self, base: i64) -> PageView {
        match self {
            Self::Page(0) => PageView {
                page: base,
                differentials: Some((base, INFINITY)),
            },
            Self::Page(1) if base == 2 => PageView {
                page: base,
                differentials: None,
            },
            Self::Page(p) => PageView {
                page: p,
                differentials: Some((p, p)),
            },
            Self::Span(a, -1) => PageView {
                page: a,
                differentials: None,
            },
            Self::Span(a, b) => PageView {
                page: a,
                differentials: Some((a, b)),
            },
        }
    }
}

/// The base page of a page list: 1 if it contains literal page 1, else 2.
#[must_use]
pub fn base_page(page_list: &[PageRange]) -> i64 {
    if page_list.contains(&PageRange::Page(1)) {
        1
    } else {
        2
    }
}

/// Makes sure `page_list` starts at or below the base page and reaches the
/// infinity page.
pub fn normalize_page_list(page_list: &mut Vec<PageRange>) {
    let base = base_page(page_list);
    if page_list.first().is_none_or(|r| r.page() > base) {
        page_list.insert(0, PageRange::Span(base, INFINITY));
    }
    if !page_list.iter().any(|r| r.page() == INFINITY) {
        page_list.push(PageRange::Span(INFINITY, INFINITY));
    }
}

/// Human-readable description of a page range.
#[must_use]
pub fn describe_page_range(range: PageRange, base: i64) -> String {
    match range {
        PageRange::Span(INFINITY, _) | PageRange::Page(INFINITY) => "Page ∞".to_owned(),
        PageRange::Page(0) => format!("Page {base} with all differentials"),
        PageRange::Page(1) if base == 2 => "Page 2 with no differentials".to_owned(),
        PageRange::Span(a, INFINITY) => format!("Page {a} with all differentials"),
        PageRange::Span(a, -1) => format!("Page {a} with no differentials"),
        PageRange::Span(a, b) if a == b => format!("Page {a}"),
        PageRange::Span(a, b) => format!("Pages {a} – {}", page_label(b)),
        PageRange::Page(n) => format!("Page {n}"),
    }
}

fn page_label(page: i64) -> String {
    if page == INFINITY {
        "∞".to_owned()
    } else {
        page.to_string()
    }
}

/// Cursor over a chart's page list.
#[derive(Clone, Debug, PartialEq)]
pub struct PageState {
    page_list: Vec<PageRange>,
    min_index: usize,
    current_index: usize,
}

impl PageState {
    /// Creates a cursor positioned at `min_index`.
    #[must_use]
    pub fn new(page_list: Vec<PageRange>, min_index: usize) -> Self {
        let mut state = Self {
            page_list,
            min_index,
            current_index: 0,
        };
        state.set_page(Some(min_index));
        state
    }

    /// Replaces the page list, keeping the current index when still valid.
    pub fn sync(&mut self, page_list: &[PageRange], min_index: usize) {
        self.page_list = page_list.to_vec();
        self.min_index = min_index;
        self.set_page(None);
    }

    /// Moves to `index`, or re-validates the current index when `None`.
    ///
    /// An index outside the page list logs a warning and falls back to 0.
    pub fn set_page(&mut self, index: Option<usize>) {
        let index = index.unwrap_or(self.current_index);
        if index < self.page_list.len() {
            self.current_index = index;
        } else {
            tracing::warn!(
                index,
                len = self.page_list.len(),
                "invalid page index, falling back to 0"
            );
            self.current_index = 0;
        }
    }

    /// Steps to the next page. Returns whether the page changed.
    pub fn next(&mut self) -> bool {
        if self.current_index + 1 < self.page_list.len() {
            self.set_page(Some(self.current_index + 1));
            true
        } else {
            false
        }
    }

    /// Steps to the previous page, not below the minimum index. Returns
    /// whether the page changed.
    pub fn previous(&mut self) -> bool {
        if self.current_index > self.min_index {
            self.set_page(Some(self.current_index - 1));
            true
        } else {
            false
        }
    }

    /// Index into the page list.
    #[must_use]
    pub fn index(&self) -> usize {
        self.current_index
    }

    /// The current page range, if the page list is not empty.
    #[must_use]
    pub fn current_range(&self) -> Option<PageRange> {
        self.page_list.get(self.current_index).copied()
    }

    /// The representative page of the current range.
    #[must_use]
    pub fn page(&self) -> Option<i64> {
        self.current_range().map(PageRange::page)
    }

    /// The page list.
    #[must_use]
    pub fn page_list(&self) -> &[PageRange] {
        &self.page_list
    }

    /// The base page of the page list.
    #[must_use]
    pub fn base(&self) -> i64 {
        base_page(&self.page_list)
    }

    /// Describes `range` against this page list's base page.
    #[must_use]
    pub fn describe(&self, range: PageRange) -> String {
        describe_page_range(range, self.base())
    }

    /// Describes the current page range.
    #[must_use]
    pub fn describe_current(&self) -> Option<String> {
        self.current_range().map(|r| self.describe(r))
    }
}
