//! Presentation logic for list screens, independent of any toolkit.

pub mod controller;
pub mod debounce;
pub mod pagination;

pub use controller::ListController;
pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use pagination::{visible_pages, PageItem, PaginationView};
