pub mod app;
pub mod client;
pub mod config;
pub mod domain;
pub mod environment;
pub mod error;
pub mod model;
pub mod output;
pub mod render;
pub mod resolver;
pub mod schema;
pub mod search;
pub mod tui;
