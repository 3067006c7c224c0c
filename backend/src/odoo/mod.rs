//! Client for the Odoo ERP, which owns users and courses.

pub mod api;
pub mod rpc;

pub use api::OdooApi;
#[cfg(test)]
pub use api::MockOdooApi;
pub use rpc::{OdooClient, OdooError};
