pub mod locale;
pub mod logging;
pub mod request_id;
pub mod session;

pub use locale::*;
pub use logging::*;
pub use request_id::*;
pub use session::*;
