use serde::Serialize;

/// One slot in a rendered pagination strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "page")]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// How many pages a strip can show before it collapses to a window.
const FULL_STRIP_MAX: u32 = 7;

/// Build the 1-indexed page strip for `current` of `total` pages.
///
/// Small sets render every page. Larger sets always keep page 1 and page
/// `total` visible, plus a four-wide interior span near `current`, with an
/// ellipsis standing in for each run of hidden pages. `current` must
/// already be clamped into `[1, total]`.
pub fn page_window(current: u32, total: u32) -> Vec<PageItem> {
    if total == 0 {
        return Vec::new();
    }
    if total <= FULL_STRIP_MAX {
        return (1..=total).map(PageItem::Page).collect();
    }

    let (span_start, span_end) = if current <= 4 {
        (2, 5)
    } else if current >= total - 3 {
        (total - 4, total - 1)
    } else {
        (current - 2, current + 2)
    };

    let mut window = Vec::with_capacity(9);
    window.push(PageItem::Page(1));
    if span_start > 2 {
        window.push(PageItem::Ellipsis);
    }
    window.extend((span_start..=span_end).map(PageItem::Page));
    if span_end < total - 1 {
        window.push(PageItem::Ellipsis);
    }
    window.push(PageItem::Page(total));
    window
}

/// Clamp a requested page into the valid range once the page count is known.
pub fn clamp_page(requested: u32, total_pages: u32) -> u32 {
    requested.clamp(1, total_pages.max(1))
}

/// A page slice of a listing, with enough context to render the strip.
#[derive(Debug, Clone, Serialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub total_pages: u32,
    pub total_items: usize,
}

impl<T> Paged<T> {
    pub fn window(&self) -> Vec<PageItem> {
        page_window(self.page, self.total_pages)
    }
}

/// Slice `items` into the requested page. The page number is clamped, so a
/// stale page request after a filter shrinks the set lands on the last page
/// rather than an empty one.
pub fn paginate<T: Clone>(items: &[T], requested: u32, per_page: usize) -> Paged<T> {
    let per_page = per_page.max(1);
    let total_items = items.len();
    let total_pages = (total_items.div_ceil(per_page) as u32).max(1);
    let page = clamp_page(requested, total_pages);

    let start = (page as usize - 1) * per_page;
    let page_items = items
        .iter()
        .skip(start)
        .take(per_page)
        .cloned()
        .collect();

    Paged {
        items: page_items,
        page,
        total_pages,
        total_items,
    }
}
