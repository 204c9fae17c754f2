mod ack_service;
mod auth_service;
mod command_service;
mod feed_service;
mod gateway_service;
mod rate_limiter;
mod registry_service;
mod retention_service;
mod router_service;
mod telemetry_service;

pub use ack_service::*;
pub use auth_service::*;
pub use command_service::*;
pub use feed_service::*;
pub use gateway_service::*;
pub use rate_limiter::*;
pub use registry_service::*;
pub use retention_service::*;
pub use router_service::*;
pub use telemetry_service::*;
