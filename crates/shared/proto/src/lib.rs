//! gRPC protocol buffer definitions.
//!
//! This crate contains the generated gRPC service definitions for:
//! - UserService (`user.v1`): user management (CRUD, search, credentials)
//! - HealthService (`health.v1`): liveness and dependency health
//!
//! Request messages derive `validator::Validate` (see `build.rs`), so the
//! server can check required fields before a handler runs.

/// User service definitions.
pub mod user {
    pub mod v1 {
        tonic::include_proto!("user.v1");
    }
}

/// Health service definitions.
pub mod health {
    pub mod v1 {
        tonic::include_proto!("health.v1");
    }
}

// Re-export commonly used items
pub use health::v1::health_service_client::HealthServiceClient;
pub use health::v1::health_service_server::{HealthService, HealthServiceServer};
pub use user::v1::user_service_client::UserServiceClient;
pub use user::v1::user_service_server::{UserService, UserServiceServer};
