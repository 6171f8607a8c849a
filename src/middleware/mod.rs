//! Request lifecycle wrappers.

pub mod interceptor;

pub use interceptor::{track_metrics, Interceptor, ResponseStatus, CLIENT_CLOSED_REQUEST};
