pub mod cookies;
pub mod money;
pub mod session;

pub use session::*;
