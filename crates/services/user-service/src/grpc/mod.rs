//! gRPC transport adapters.

mod health_grpc;
pub mod interceptor;
pub mod mapper;
mod user_grpc;

pub use health_grpc::{
    DatabaseProbe, HealthGrpcService, HealthStream, HEALTH_SERVICE, USER_SERVICE, WATCH_INTERVAL,
};
pub use interceptor::{InterceptorChain, PUBLIC_METHODS};
pub use user_grpc::UserGrpcService;

#[cfg(any(test, feature = "test-utils"))]
pub use health_grpc::MockDatabaseProbe;
