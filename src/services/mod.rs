// src/services/mod.rs
pub mod cache;
pub mod http;
pub mod trading_economics;
pub mod macro_indicators;
pub mod bonds;
pub mod stocks;
pub mod translate;
pub mod news;
pub mod sources;
pub mod refresh;
pub mod subscribers;
pub mod digest;
pub mod email;
pub mod notifier;
pub mod pipeline;
pub mod scheduler;

pub type Result<T> = std::result::Result<T, crate::BoxError>;
