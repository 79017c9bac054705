//! Paginated and simple lists bound to server tasks.
//!
//! [`PaginationState`] is the load state machine, [`DataSource`] the
//! capability a list needs from the outside world, and [`ApiBoundAdapter`]
//! ties both to the [`crate::task::TaskManager`]. [`SimpleApiAdapter`] covers
//! lists that are loaded in one request.

pub mod adapter;
pub mod events;
pub mod http_source;
pub mod simple;
pub mod source;
pub mod state;

pub use adapter::{ApiBoundAdapter, ApiTaskBinding};
pub use events::{ListEvent, LoadOutcome};
pub use http_source::{json_list, HttpPageSource};
pub use simple::SimpleApiAdapter;
pub use source::{DataSource, PageRequest};
pub use state::{
    EndOfDataRule, LoadAction, LoadPhase, LoadPlan, PageConfig, PaginationState, SharedItems,
    DEFAULT_FETCH_MORE_ROWS, DEFAULT_REFRESH_ROWS,
};
