pub mod preflight;
pub mod relay;

pub use relay::AppState;
