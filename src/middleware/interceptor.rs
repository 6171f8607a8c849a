use std::convert::Infallible;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::{HeaderValue, Method, StatusCode},
    middleware::Next,
    response::Response,
};
use futures_util::FutureExt;

use crate::metrics::{Observation, ObservationSink, PathGeneralizer};

/// Status recorded when the request future is dropped before finishing
/// (client went away, outer timeout).
pub const CLIENT_CLOSED_REQUEST: u16 = 499;

/// Anything a handler can finish with that carries an HTTP status.
pub trait ResponseStatus {
    fn status(&self) -> StatusCode;
}

impl ResponseStatus for Response {
    fn status(&self) -> StatusCode {
        Response::status(self)
    }
}

impl ResponseStatus for StatusCode {
    fn status(&self) -> StatusCode {
        *self
    }
}

impl ResponseStatus for Infallible {
    fn status(&self) -> StatusCode {
        match *self {}
    }
}

/// Times requests and hands exactly one [`Observation`] per request to
/// the sink, whatever the outcome.
#[derive(Clone)]
pub struct Interceptor {
    generalizer: Arc<PathGeneralizer>,
    sink: Arc<dyn ObservationSink>,
}

impl Interceptor {
    pub fn new(generalizer: Arc<PathGeneralizer>, sink: Arc<dyn ObservationSink>) -> Self {
        Self { generalizer, sink }
    }

    /// Run `work` and record its outcome. The result is returned untouched;
    /// a panic is recorded as 500 and then resumed.
    pub async fn instrument<F, T, E>(&self, method: &Method, path: &str, work: F) -> Result<T, E>
    where
        F: Future<Output = Result<T, E>>,
        T: ResponseStatus,
        E: ResponseStatus,
    {
        let guard = ObservationGuard::start(self, method, path);
        match AssertUnwindSafe(work).catch_unwind().await {
            Ok(outcome) => {
                let status = match &outcome {
                    Ok(value) => value.status(),
                    Err(err) => err.status(),
                };
                guard.finish(status.as_u16());
                outcome
            }
            Err(panic) => {
                guard.finish(StatusCode::INTERNAL_SERVER_ERROR.as_u16());
                std::panic::resume_unwind(panic)
            }
        }
    }

    fn emit(&self, method: &Method, path: &str, status: u16, start: Instant) {
        let elapsed = start.elapsed();
        let label = self.generalizer.generalize(path);

        tracing::trace!(
            %method,
            path,
            label,
            status,
            seconds = elapsed.as_secs_f64(),
            "request observed"
        );

        self.sink.observe(Observation {
            method: method.as_str().to_owned(),
            path: label.to_owned(),
            status,
            elapsed,
        });
    }
}

/// Holds the "must observe" obligation for one request. If the future
/// owning it is dropped before [`finish`] runs, `Drop` records the request
/// as [`CLIENT_CLOSED_REQUEST`].
///
/// [`finish`]: ObservationGuard::finish
struct ObservationGuard<'a> {
    interceptor: &'a Interceptor,
    method: Method,
    path: String,
    start: Instant,
    finished: bool,
}

impl<'a> ObservationGuard<'a> {
    fn start(interceptor: &'a Interceptor, method: &Method, path: &str) -> Self {
        Self {
            interceptor,
            method: method.clone(),
            path: path.to_owned(),
            start: Instant::now(),
            finished: false,
        }
    }

    fn finish(mut self, status: u16) {
        self.finished = true;
        self.interceptor
            .emit(&self.method, &self.path, status, self.start);
    }
}

impl Drop for ObservationGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.interceptor
                .emit(&self.method, &self.path, CLIENT_CLOSED_REQUEST, self.start);
        }
    }
}

// ─── Axum middleware ─────────────────────────────────────────────

/// Wraps every route. Besides recording the observation it adds
///
///   Server-Timing: handler wall time in milliseconds
pub async fn track_metrics(
    State(interceptor): State<Interceptor>,
    req: Request,
    next: Next,
) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let start = Instant::now();

    let outcome = interceptor
        .instrument(&method, &path, async { Ok::<_, Infallible>(next.run(req).await) })
        .await;
    let mut response = match outcome {
        Ok(response) => response,
        Err(never) => match never {},
    };

    let server_timing = format!("total;dur={:.3}", start.elapsed().as_secs_f64() * 1000.0);
    if let Ok(val) = HeaderValue::from_str(&server_timing) {
        response.headers_mut().insert("server-timing", val);
    }

    response
}
