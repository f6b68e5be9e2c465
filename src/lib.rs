#![allow(clippy::uninlined_format_args)]

pub mod action;
pub mod app;
pub mod config;
pub mod item;
pub mod mastodon;
pub mod table;
pub mod text;
pub mod ui;
pub mod viewport;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use app::run;
