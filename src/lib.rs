pub mod api;
pub mod error;
pub mod export;
pub mod gateway;
pub mod models;
pub mod services;
pub mod session;
pub mod state;
pub mod store;
