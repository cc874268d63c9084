//! Remote resource gateway: the call contract and its HTTP implementation.

mod call;
mod http;
mod limiter;
mod session;

pub use call::{Gateway, GatewayCall, Operation};
pub use http::{
    classify, HttpGateway, BACKEND_ERROR_MESSAGE, NO_LIVE_VERSION_MESSAGE, QUOTA_EXCEEDED_MESSAGE,
};
pub use limiter::RateLimiter;
