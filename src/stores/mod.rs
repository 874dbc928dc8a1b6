//! Client-side UI state: which dialog is open, list filters and paging,
//! and the trip selected for settlement or reporting.
//!
//! These are plain owned structs; the UI layer decides how to share them.

pub mod dialog;
pub mod pagination;
pub mod trip_selection;

pub use dialog::{Dialog, DialogKind, DialogStore};
pub use pagination::{paginate, PageState};
pub use trip_selection::TripSelection;
