//! gRPC implementation for HealthService.

use std::collections::HashMap;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use futures::Stream;
use tonic::{Request, Response, Status};
use tracing::warn;

use common::AppResult;
use proto::health::v1::{
    self as pb, health_service_server::HealthService as HealthServiceProto, ServingStatus,
};

use super::interceptor::InterceptorChain;
use super::mapper::timestamp;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

const CHECK: &str = "/health.v1.HealthService/Check";
const WATCH: &str = "/health.v1.HealthService/Watch";

pub const USER_SERVICE: &str = "user_service";
pub const HEALTH_SERVICE: &str = "health_service";

/// Interval between two `Watch` updates.
pub const WATCH_INTERVAL: Duration = Duration::from_secs(5);

/// Liveness probe for the storage backend.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DatabaseProbe: Send + Sync {
    async fn ping(&self) -> AppResult<()>;
}

struct HealthState {
    probe: Arc<dyn DatabaseProbe>,
    version: String,
    started_at: Instant,
}

impl HealthState {
    fn ensure_known(service: &str) -> Result<(), Status> {
        match service {
            "" | USER_SERVICE | HEALTH_SERVICE => Ok(()),
            other => Err(Status::not_found(format!("service {} not found", other))),
        }
    }

    async fn check_database(&self) -> pb::DependencyHealth {
        let start = Instant::now();
        let result = self.probe.ping().await;
        let response_time_ms = start.elapsed().as_millis() as i64;

        let (status, message) = match result {
            Ok(()) => (ServingStatus::Serving, "Database is healthy".to_string()),
            Err(err) => {
                warn!(error = %err, "Database health check failed");
                (ServingStatus::NotServing, "Database is unreachable".to_string())
            }
        };

        pb::DependencyHealth {
            name: "postgresql".to_string(),
            r#type: "database".to_string(),
            status: status as i32,
            response_time_ms,
            message,
        }
    }

    async fn check(&self, service: &str) -> Result<pb::HealthCheckResponse, Status> {
        Self::ensure_known(service)?;

        let database = self.check_database().await;
        let overall = if database.status == ServingStatus::Serving as i32 {
            ServingStatus::Serving
        } else {
            ServingStatus::NotServing
        };
        let now = timestamp(Utc::now());

        let mut services = HashMap::new();
        services.insert(
            USER_SERVICE.to_string(),
            pb::ServiceHealth {
                name: USER_SERVICE.to_string(),
                status: overall as i32,
                message: match overall {
                    ServingStatus::Serving => "User service is healthy".to_string(),
                    _ => "User service is degraded".to_string(),
                },
                last_checked: Some(now.clone()),
                dependencies: HashMap::from([("database".to_string(), database)]),
            },
        );
        services.insert(
            HEALTH_SERVICE.to_string(),
            pb::ServiceHealth {
                name: HEALTH_SERVICE.to_string(),
                status: ServingStatus::Serving as i32,
                message: "Health service is healthy".to_string(),
                last_checked: Some(now.clone()),
                dependencies: HashMap::new(),
            },
        );

        if !service.is_empty() {
            services.retain(|name, _| name == service);
        }

        Ok(pb::HealthCheckResponse {
            status: overall as i32,
            checked_at: Some(now),
            version: self.version.clone(),
            uptime_seconds: self.started_at.elapsed().as_secs() as i64,
            services,
        })
    }
}

/// gRPC service reporting process and dependency health.
pub struct HealthGrpcService {
    state: Arc<HealthState>,
    chain: InterceptorChain,
}

impl HealthGrpcService {
    /// Uptime is measured from construction.
    pub fn new(probe: Arc<dyn DatabaseProbe>, chain: InterceptorChain) -> Self {
        Self {
            state: Arc::new(HealthState {
                probe,
                version: env!("CARGO_PKG_VERSION").to_string(),
                started_at: Instant::now(),
            }),
            chain,
        }
    }
}

pub type HealthStream =
    Pin<Box<dyn Stream<Item = Result<pb::HealthCheckResponse, Status>> + Send + 'static>>;

#[tonic::async_trait]
impl HealthServiceProto for HealthGrpcService {
    async fn check(
        &self,
        request: Request<pb::HealthCheckRequest>,
    ) -> Result<Response<pb::HealthCheckResponse>, Status> {
        self.chain
            .unary(CHECK, request, |request| async move {
                let response = self.state.check(&request.get_ref().service).await?;
                Ok(Response::new(response))
            })
            .await
    }

    type WatchStream = HealthStream;

    /// Emits a report right away, then every `WATCH_INTERVAL` until the
    /// client disconnects or a check fails.
    async fn watch(
        &self,
        request: Request<pb::HealthCheckRequest>,
    ) -> Result<Response<Self::WatchStream>, Status> {
        self.chain
            .unary(WATCH, request, |request| async move {
                let service = request.into_inner().service;
                HealthState::ensure_known(&service)?;

                let state = self.state.clone();
                let ticker = tokio::time::interval(WATCH_INTERVAL);
                let stream = futures::stream::unfold(
                    (state, ticker, service, false),
                    |(state, mut ticker, service, failed)| async move {
                        if failed {
                            return None;
                        }
                        ticker.tick().await;
                        let report = state.check(&service).await;
                        let failed = report.is_err();
                        Some((report, (state, ticker, service, failed)))
                    },
                );

                Ok(Response::new(Box::pin(stream) as HealthStream))
            })
            .await
    }
}
