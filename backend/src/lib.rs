pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod odoo;
pub mod routes;
pub mod services;
pub mod state;
pub mod stripe;
pub mod utils;
