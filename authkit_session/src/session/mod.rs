mod config;
mod cookie;
mod errors;
mod evaluator;
mod lifecycle;

pub use config::SESSION_COOKIE_NAME;
pub use cookie::{CookieDirective, session_cookie_from_headers};
pub use errors::SessionError;
pub use evaluator::{evaluate, evaluate_checked};
pub use lifecycle::{GateAction, GateDecision, GateState, gate_request, retry_location};
