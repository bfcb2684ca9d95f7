pub mod app_state;
pub mod http;
pub mod startup;

pub use app_state::AppState;
