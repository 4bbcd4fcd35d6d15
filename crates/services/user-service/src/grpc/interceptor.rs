//! Per-call interceptor chain.
//!
//! Every RPC runs through, outermost first:
//! recovery -> logging -> validation -> auth (when enabled) -> handler.
//!
//! The chain runs inside the service implementation rather than as a tower
//! layer so the validation stage sees the decoded request message.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Instant;

use common::AppError;
use futures::FutureExt;
use tonic::metadata::{KeyAndValueRef, MetadataMap};
use tonic::{Request, Response, Status};
use tracing::{error, info, warn};
use validator::{Validate, ValidationErrors};

/// Methods reachable without an `authorization` entry.
pub const PUBLIC_METHODS: &[&str] = &[
    "/user.v1.UserService/AuthenticateUser",
    "/user.v1.UserService/CreateUser",
    "/health.v1.HealthService/Check",
];

const AUTHORIZATION: &str = "authorization";
const REDACTED: &str = "[REDACTED]";

/// Ordered set of cross-cutting stages wrapped around each handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct InterceptorChain {
    auth_enabled: bool,
}

impl InterceptorChain {
    pub fn new(auth_enabled: bool) -> Self {
        Self { auth_enabled }
    }

    pub fn auth_enabled(&self) -> bool {
        self.auth_enabled
    }

    /// Run `handler` for `method` through every stage of the chain.
    pub async fn unary<R, T, F, Fut>(
        &self,
        method: &'static str,
        request: Request<R>,
        handler: F,
    ) -> Result<Response<T>, Status>
    where
        R: Validate,
        F: FnOnce(Request<R>) -> Fut,
        Fut: Future<Output = Result<Response<T>, Status>>,
    {
        let metadata = sanitize_metadata(request.metadata());
        let auth_enabled = self.auth_enabled;

        let call = async move {
            validate(request.get_ref())?;
            if auth_enabled {
                authorize(method, request.metadata())?;
            }
            handler(request).await
        };

        recover(method, log_call(method, &metadata, call)).await
    }
}

/// Turn a panic anywhere below into an opaque internal error.
async fn recover<T, Fut>(method: &'static str, call: Fut) -> Result<T, Status>
where
    Fut: Future<Output = Result<T, Status>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => {
            error!(method, panic = %panic_message(payload.as_ref()), "Recovered from panic");
            Err(Status::internal("internal server error"))
        }
    }
}

async fn log_call<T, Fut>(method: &'static str, metadata: &str, call: Fut) -> Result<T, Status>
where
    Fut: Future<Output = Result<T, Status>>,
{
    let start = Instant::now();
    info!(method, metadata, "gRPC request");

    let result = call.await;

    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => info!(method, duration_ms, "gRPC response"),
        Err(status) => warn!(
            method,
            duration_ms,
            code = ?status.code(),
            error = status.message(),
            "gRPC error"
        ),
    }
    result
}

fn validate<R: Validate>(request: &R) -> Result<(), Status> {
    request.validate().map_err(|errors| {
        Status::invalid_argument(format!("validation failed: {}", describe(&errors)))
    })
}

/// Flatten field errors into a stable `field: message; ...` string.
fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |e| match &e.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: {}", field, e.code),
            })
        })
        .collect();
    messages.sort();
    messages.join("; ")
}

/// Presence-only gate; the credential itself is not verified.
fn authorize(method: &str, metadata: &MetadataMap) -> Result<(), Status> {
    if PUBLIC_METHODS.contains(&method) {
        return Ok(());
    }

    let present = metadata
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| !value.trim().is_empty());

    if present {
        Ok(())
    } else {
        Err(AppError::unauthenticated("authorization header not found").into())
    }
}

/// Render metadata for logs with the credential masked.
fn sanitize_metadata(metadata: &MetadataMap) -> String {
    let mut entries: Vec<String> = metadata
        .iter()
        .map(|entry| match entry {
            KeyAndValueRef::Ascii(key, _) if key.as_str() == AUTHORIZATION => {
                format!("{}={}", key.as_str(), REDACTED)
            }
            KeyAndValueRef::Ascii(key, value) => {
                format!("{}={}", key.as_str(), value.to_str().unwrap_or("<non-ascii>"))
            }
            KeyAndValueRef::Binary(key, _) => format!("{}=<binary>", key.as_str()),
        })
        .collect();
    entries.sort();
    entries.join(", ")
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
