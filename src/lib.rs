// Library root for the go-eats ordering service

pub mod api;
pub mod auth;
pub mod config;
pub mod core;
pub mod store;
