pub mod fixtures;
pub mod mock_workos;

pub use fixtures::*;
pub use mock_workos::{MockWorkos, RefreshMode};
