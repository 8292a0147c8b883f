pub mod session;

pub use session::{local_date_of, NewSession, Session, SessionUpdate};
