pub mod session;

pub use session::{session_middleware, SessionId, SESSION_ID_HEADER};
