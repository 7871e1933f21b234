pub mod filter;
pub mod models;
pub mod store;
pub mod visibility;

pub use filter::BugFilter;
pub use models::{Bug, BugChanges, BugStatus, NewBug, Priority};
pub use store::BugStore;
