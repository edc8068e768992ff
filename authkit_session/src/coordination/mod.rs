//! Login, callback and logout flows
//!
//! Framework-agnostic: each flow returns the response headers to emit and
//! where to send the browser, and leaves building the response to the caller.

mod errors;
mod flows;

pub use errors::CoordinationError;
pub use flows::{CallbackParams, callback_core, login_core, logout_core};
