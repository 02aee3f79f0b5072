pub mod errors;
pub mod geometry;
pub mod id;

pub use errors::{ConfigError, GatewayError};
pub use geometry::{Geometry, DEFAULT_TERM};
pub use id::{new_id, SessionId};

pub type Result<T> = std::result::Result<T, GatewayError>;
