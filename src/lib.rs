//! HTTP relay in front of a workflow provider: contract review and text
//! translation, normalized into `{success, data, message}` envelopes.

pub mod error;
pub mod models;
pub mod provider;
pub mod relay;
pub mod retry;
pub mod routes;
pub mod server;
pub mod settings;
pub mod state;

pub use error::RelayError;
pub use server::build_app;
pub use settings::Settings;
pub use state::AppState;
