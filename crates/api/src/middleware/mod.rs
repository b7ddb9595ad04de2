//! HTTP middleware components.

pub mod csrf;
pub mod flash;
pub mod logging;
pub mod metrics;
pub mod rate_limit;
pub mod security_headers;
pub mod trace_id;

pub use csrf::{csrf_middleware, CsrfNonce};
pub use flash::flash_middleware;
pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
pub use rate_limit::RateLimiterState;
pub use security_headers::security_headers_middleware;
pub use trace_id::{trace_id, RequestId, REQUEST_ID_HEADER};
