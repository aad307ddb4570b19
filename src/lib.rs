pub mod app;
pub mod errors;
pub mod fetcher;
pub mod handlers;
pub mod layout;
pub mod models;
pub mod orchestrate;
pub mod state;
pub mod themes;
pub mod ui;

pub use app::router;
pub use state::AppState;
