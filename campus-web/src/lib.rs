pub mod app_state;
pub mod extractors;
pub mod handlers;
pub mod openapi;
pub mod response;

pub use app_state::AppState;
pub use handlers::*;
pub use openapi::ApiDoc;
