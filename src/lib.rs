pub mod math;
pub mod scene;
pub mod physics;

/// Re-export common types for easier usage
pub use crate::scene::{SceneGraph, Node, NodeHandle, BehaviorUnit, UnitRegistry};
pub use crate::physics::{PhysicsUnit, WorldContext, PhysicsConfig, Material, Shape};
pub use crate::math::Vector2;

/// Error types for the engine core
pub mod error {
    use thiserror::Error;

    #[derive(Error, Debug)]
    pub enum EngineError {
        #[error("Invalid parameter: {0}")]
        InvalidParameter(String),

        #[error("Node not found: {0}")]
        NodeNotFound(String),

        #[error("Unit not found: {0}")]
        UnitNotFound(String),

        #[error("Unknown unit type: {0}")]
        UnknownUnitType(String),

        #[error("Serialization error: {0}")]
        Serialization(#[from] serde_json::Error),
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, error::EngineError>;

/// Engine version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
