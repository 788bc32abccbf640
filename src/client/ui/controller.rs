//! List screen behaviour: search box, filters, and page cursor.

use crate::client::actions::{RemoteEntity, SliceHandle};
use crate::client::service::ServiceResult;
use crate::client::state::{Action, Entity};
use crate::tracker::query::DEFAULT_PER_PAGE;
use crate::tracker::ListParams;

/// Drives one list screen.
///
/// The search box text is local until [`apply_search`](Self::apply_search)
/// commits it to the slice filters, normally when the debounce timer fires.
/// Any filter change returns the cursor to page 1.
pub struct ListController<E: Entity> {
    slice: SliceHandle<E>,
    search_input: String,
    page: u32,
    per_page: u32,
}

impl<E: RemoteEntity> ListController<E> {
    /// Create a controller on page 1.
    #[must_use]
    pub fn new(slice: SliceHandle<E>) -> Self {
        let search_input = E::search(&slice.snapshot().filters).to_string();
        Self { slice, search_input, page: 1, per_page: DEFAULT_PER_PAGE }
    }

    /// Use a different page size.
    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.max(1);
        self
    }

    /// The slice this controller drives.
    #[must_use]
    pub fn slice(&self) -> &SliceHandle<E> {
        &self.slice
    }

    /// Text currently in the search box.
    #[must_use]
    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    /// Current page cursor.
    #[must_use]
    pub fn page(&self) -> u32 {
        self.page
    }

    /// Record a keystroke. Returns the text to hand to the debouncer.
    pub fn on_search_input(&mut self, text: impl Into<String>) -> String {
        self.search_input = text.into();
        self.search_input.clone()
    }

    /// Commit debounced search text. Returns whether the filters changed,
    /// in which case the list should be fetched again.
    pub fn apply_search(&mut self, search: String) -> bool {
        if E::search(&self.slice.snapshot().filters) == search {
            return false;
        }
        self.slice.dispatch(Action::UpdateFilters(E::search_change(search)));
        self.page = 1;
        true
    }

    /// Change a filter and go back to page 1.
    pub fn on_filter_change(&mut self, change: E::FilterChange) {
        self.slice.dispatch(Action::UpdateFilters(change));
        self.page = 1;
    }

    /// Move to `page`.
    pub fn on_page_change(&mut self, page: u32) {
        self.page = page.max(1);
    }

    /// Empty the search box, drop every filter, and go back to page 1.
    pub fn clear_filters(&mut self) {
        self.search_input.clear();
        self.slice.dispatch(Action::ClearFilters);
        self.page = 1;
    }

    /// Parameters for the next list fetch.
    #[must_use]
    pub fn list_params(&self) -> ListParams {
        E::list_params(&self.slice.snapshot().filters, self.page, self.per_page)
    }

    /// Parameters to reload with after a delete: the same page and filters.
    #[must_use]
    pub fn after_delete_params(&self) -> ListParams {
        self.list_params()
    }

    /// Fetch the current page.
    pub async fn refresh(&self) {
        self.slice.fetch_list(self.list_params()).await;
    }

    /// Delete `id`, then reload the current page.
    ///
    /// # Errors
    ///
    /// Returns the delete failure; the list is not reloaded in that case.
    pub async fn delete_and_refresh(&self, id: i64) -> ServiceResult<()> {
        self.slice.delete(id).await?;
        self.slice.fetch_list(self.after_delete_params()).await;
        Ok(())
    }
}
