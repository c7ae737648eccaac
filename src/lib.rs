pub mod app;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod remote;
pub mod repository;
pub mod session;
pub mod stats;
pub mod store;
pub mod tracker;
pub mod ui;
pub mod validate;
pub mod state;

pub use app::router;
pub use config::Config;
pub use state::AppState;
