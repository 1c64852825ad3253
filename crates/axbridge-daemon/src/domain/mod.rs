pub mod session_types;
pub mod types;

pub use session_types::*;
pub use types::*;
