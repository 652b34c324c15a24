// Crate root for the dart machine admin server modules.

pub mod app;
pub mod config;
pub mod connector;
pub mod constants;
pub mod coordinator;
pub mod http;
pub mod net;
pub mod store;
pub mod utils;
