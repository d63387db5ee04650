pub mod focus;

pub use focus::{FocusArea, FocusManager};
