//! Pagination control model.

use crate::client::state::Pagination;

/// One slot in the page selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    /// A page button.
    Page(u32),
    /// A gap between page buttons.
    Ellipsis,
}

/// Page buttons to show for `current` out of `last` pages.
///
/// Up to seven pages are listed in full. Beyond that the first and last
/// pages are always shown, with the current page's neighbourhood between
/// them and gaps marked by [`PageItem::Ellipsis`].
#[must_use]
pub fn visible_pages(current: u32, last: u32) -> Vec<PageItem> {
    let last = last.max(1);
    let current = current.clamp(1, last);
    if last <= 7 {
        return (1..=last).map(PageItem::Page).collect();
    }

    let mut items = Vec::with_capacity(7);
    if current <= 4 {
        items.extend((1..=5).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(last));
    } else if current >= last - 3 {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((last - 4..=last).map(PageItem::Page));
    } else {
        items.push(PageItem::Page(1));
        items.push(PageItem::Ellipsis);
        items.extend((current - 1..=current + 1).map(PageItem::Page));
        items.push(PageItem::Ellipsis);
        items.push(PageItem::Page(last));
    }
    items
}

/// Everything a pagination control renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    /// Nothing to paginate: at most one page.
    pub hidden: bool,
    /// Current page.
    pub current_page: u32,
    /// Last page.
    pub last_page: u32,
    /// 1-based index of the first item shown, `None` on an empty page.
    pub from: Option<u64>,
    /// 1-based index of the last item shown, `None` on an empty page.
    pub to: Option<u64>,
    /// Matching items across all pages.
    pub total: u64,
    /// The "previous" button is inactive.
    pub prev_disabled: bool,
    /// The "next" button is inactive.
    pub next_disabled: bool,
    /// Page buttons.
    pub pages: Vec<PageItem>,
}

impl PaginationView {
    /// Build the view. Navigation is disabled while `loading`.
    #[must_use]
    pub fn new(pagination: &Pagination, loading: bool) -> Self {
        let Pagination { current_page, last_page, total, from, to, .. } = *pagination;
        Self {
            hidden: last_page <= 1,
            current_page,
            last_page,
            from,
            to,
            total,
            prev_disabled: current_page <= 1 || loading,
            next_disabled: current_page >= last_page || loading,
            pages: visible_pages(current_page, last_page),
        }
    }

    /// Item range caption.
    #[must_use]
    pub fn summary(&self) -> String {
        match (self.from, self.to) {
            (Some(from), Some(to)) => {
                format!("Showing {from} to {to} of {} items", self.total)
            }
            _ => format!("No items on this page of {} items", self.total),
        }
    }
}
