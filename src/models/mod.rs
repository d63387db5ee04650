//! Model selection core: catalog, search projection and the picker synchronizer

pub mod catalog;
pub mod filter;
pub mod picker;

pub use catalog::{dedupe, ModelCatalog};
pub use filter::{project, visible, ModelFilter, SearchTerm, SelectionPolicy};
pub use picker::{Origin, PickerId, PickerView, SelectionChanged, SelectionSync, SyncState};
