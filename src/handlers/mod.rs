// src/handlers/mod.rs
pub mod cron;
pub mod dashboard;
pub mod error;
pub mod subscribe;
