//! Docket server — tools, resources and prompt templates over the topic stores.

pub mod prompts;
pub mod render;
pub mod routes;
pub mod state;
pub mod tools;

pub use routes::build_router;
pub use state::AppState;
