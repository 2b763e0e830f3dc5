/// Middleware module
///
/// Session gate for protected routes and request logging.

mod request_logger;
mod session_gate;

pub use request_logger::RequestLogger;
pub use session_gate::{bearer_token, SessionGate};
