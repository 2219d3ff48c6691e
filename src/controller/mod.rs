//! Per-resource controllers that hold list state and drive the REST calls.

mod debounce;
mod list;
mod options;

pub use debounce::{Debouncer, SEARCH_DEBOUNCE};
pub use list::{ControllerContext, ListController};
pub use options::{OptionLoader, OPTION_PAGE_SIZE};
