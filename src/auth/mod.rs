pub mod session;
pub mod storage;
pub mod store;

pub use session::{Role, Session, UserRef};
pub use store::{RegisterOutcome, SessionStore};
