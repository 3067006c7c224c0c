//! Data models shared between the upstream clients and the API handlers.

pub mod cart;
pub mod checkout;
pub mod course;
pub mod discount;
pub mod user;
