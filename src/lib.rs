pub mod auth;
pub mod blob;
pub mod commands;
pub mod db;
pub mod error;
pub mod filter;
pub mod lifecycle;
pub mod models;
pub mod stats;
