pub mod auth;
pub mod cart;
pub mod courses;
pub mod dashboard;
pub mod discounts;
pub mod meta;
pub mod stripe;

pub use auth::*;
pub use cart::*;
pub use courses::*;
pub use dashboard::*;
pub use discounts::*;
pub use meta::*;
pub use stripe::*;
