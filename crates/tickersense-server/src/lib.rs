//! HTTP surface, analysis cycle, and periodic driver.
//!
//! The binary wires these together; everything lives in the library so the
//! workspace behavior tests can drive the router and the cycle directly.

pub mod config;
pub mod cycle;
pub mod error;
pub mod routes;
pub mod scheduler;
pub mod state;

pub use config::ServerConfig;
pub use cycle::AnalysisCycle;
pub use error::{ApiError, ApiResult};
pub use routes::build_router;
pub use state::AppState;
