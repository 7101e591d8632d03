//! Common functionality for paging data.

/// The config for pagination.
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum transactions to display per page when not specified in a request.
    pub default_page_size: u64,
    /// The maximum number of page links to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 5,
            max_pages: 5,
        }
    }
}

/// An element of the pagination widget shown under a paged table.
#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    /// A link to `page`.
    Page(u64),
    /// The page currently being displayed, rendered without a link.
    CurrPage(u64),
    /// A link to the page before the current one.
    BackButton(u64),
    /// A link to the page after the current one.
    NextButton(u64),
}

/// Calculate the number of pages needed to display `item_count` items.
///
/// Always returns at least one page so that an empty table still renders
/// a current-page indicator.
pub fn page_count(item_count: u64, page_size: u64) -> u64 {
    item_count.div_ceil(page_size).max(1)
}

/// Build the pagination widget elements for `curr_page` out of `page_count`
/// pages, showing at most `max_pages` page links.
///
/// The page links form a window around the current page, clamped to the
/// first and last page. Back/next buttons are added when there is a
/// previous/next page to go to.
pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let curr_page = curr_page.clamp(1, page_count);

    let window_start = if page_count <= max_pages {
        1
    } else {
        curr_page
            .saturating_sub(max_pages / 2)
            .clamp(1, page_count - max_pages + 1)
    };
    let window_end = (window_start + max_pages - 1).min(page_count);

    let mut indicators: Vec<PaginationIndicator> = (window_start..=window_end)
        .map(|page| {
            if page == curr_page {
                PaginationIndicator::CurrPage(page)
            } else {
                PaginationIndicator::Page(page)
            }
        })
        .collect();

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}
