pub mod access;
pub mod app;
pub mod config;
pub mod error;
pub mod health;
pub mod images;
pub mod notify;
pub mod products;
pub mod state;
pub mod storage;
pub mod store;
pub mod users;
pub mod verification;
