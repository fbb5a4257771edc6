//! HTTP front-end for the prediction service.
//!
//! ## Endpoints
//!
//! - `GET /`: service banner
//! - `GET /health`: liveness plus artifact state (`loaded` / `unloaded`)
//! - `GET /options`: categorical option sets and advisory numeric ranges
//! - `POST /predict`: one record in, one `PredictResponse` out
//!
//! Failure classes map to distinct status codes so clients can branch without
//! parsing messages: input defects 422 (malformed JSON 400), artifact load 503,
//! inference 500.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::body::{Bytes, HttpBody};
use hyper::header::{self, HeaderValue};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Method, Request, Response, Server, StatusCode};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::app::pipeline::PredictPipeline;
use crate::domain::RawRecord;
use crate::error::{AppError, ErrorKind};
use crate::service::{self, CategoryOptions, PredictResponse};

/// Largest accepted request body.
const MAX_BODY_BYTES: u64 = 64 * 1024;

pub struct PredictServer {
    pipeline: Arc<PredictPipeline>,
    bind_addr: SocketAddr,
}

impl PredictServer {
    pub fn new(pipeline: Arc<PredictPipeline>, bind_addr: SocketAddr) -> Self {
        Self { pipeline, bind_addr }
    }

    /// Serve until `shutdown` resolves, then drain in-flight requests.
    pub async fn run(self, shutdown: impl Future<Output = ()>) -> Result<(), AppError> {
        let pipeline = Arc::clone(&self.pipeline);
        let make_svc = make_service_fn(move |_conn| {
            let pipeline = Arc::clone(&pipeline);
            async move {
                Ok::<_, Infallible>(service_fn(move |req| handle_request(req, Arc::clone(&pipeline))))
            }
        });

        let server = match Server::try_bind(&self.bind_addr) {
            Ok(builder) => builder.serve(make_svc).with_graceful_shutdown(shutdown),
            Err(e) => {
                error!(error = %e, bind_addr = %self.bind_addr, "failed to bind");
                return Err(AppError::new(5, format!("Failed to bind {}: {e}", self.bind_addr)));
            }
        };

        info!(bind_addr = %self.bind_addr, "prediction API listening");

        if let Err(e) = server.await {
            error!(error = %e, "HTTP server error");
            return Err(AppError::new(5, format!("HTTP server error: {e}")));
        }

        info!("prediction API shut down");
        Ok(())
    }
}

/// Route one request.
pub async fn handle_request(
    req: Request<Body>,
    pipeline: Arc<PredictPipeline>,
) -> Result<Response<Body>, Infallible> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    let response = match (&method, path.as_str()) {
        (&Method::GET, "/") => json_response(
            StatusCode::OK,
            &serde_json::json!({ "message": "Gemstone Price Prediction API is running" }),
        ),
        (&Method::GET, "/health") => json_response(StatusCode::OK, &service::health(&pipeline)),
        (&Method::GET, "/options") => json_response(StatusCode::OK, &CategoryOptions::current()),
        (&Method::POST, "/predict") => handle_predict(req, pipeline).await,
        (&Method::OPTIONS, _) => with_cors(
            Response::builder()
                .status(StatusCode::NO_CONTENT)
                .header(header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS")
                .header(header::ACCESS_CONTROL_ALLOW_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap_or_else(|_| Response::new(Body::empty())),
        ),
        _ => {
            warn!(method = %method, path = %path, "request to unknown endpoint");
            json_response(
                StatusCode::NOT_FOUND,
                &serde_json::json!({ "message": format!("no route for {method} {path}") }),
            )
        }
    };

    debug!(method = %method, path = %path, status = response.status().as_u16(), "request completed");
    Ok(response)
}

async fn handle_predict(req: Request<Body>, pipeline: Arc<PredictPipeline>) -> Response<Body> {
    let declared = req
        .headers()
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > MAX_BODY_BYTES) {
        return payload_too_large();
    }

    let bytes = match read_limited(req.into_body(), MAX_BODY_BYTES).await {
        Ok(Some(bytes)) => bytes,
        Ok(None) => return payload_too_large(),
        Err(e) => {
            warn!(error = %e, "failed to read request body");
            return malformed(format!("failed to read request body: {e}"));
        }
    };

    let record: RawRecord = match serde_json::from_slice(&bytes) {
        Ok(record) => record,
        Err(e) => return malformed(format!("malformed request body: {e}")),
    };

    // The first request may read artifacts from disk; keep that off the reactor.
    let outcome = tokio::task::spawn_blocking(move || service::respond(&pipeline, record)).await;
    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            error!(error = %e, "prediction task failed");
            PredictResponse::Error {
                error_kind: ErrorKind::Inference,
                message: format!("prediction task failed: {e}"),
            }
        }
    };

    if let PredictResponse::Error { error_kind, message } = &response {
        match error_kind {
            ErrorKind::InvalidInput | ErrorKind::UnknownCategory => {
                debug!(kind = error_kind.as_str(), %message, "rejected record")
            }
            ErrorKind::ArtifactLoad | ErrorKind::Inference => {
                error!(kind = error_kind.as_str(), %message, "prediction failed")
            }
        }
    }

    json_response(status_for(&response), &response)
}

/// Collect `body`, giving up with `Ok(None)` as soon as it exceeds `limit`.
///
/// Chunked uploads carry no Content-Length, so the cap is enforced while
/// reading rather than after.
async fn read_limited(mut body: Body, limit: u64) -> Result<Option<Bytes>, hyper::Error> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.data().await {
        let chunk = chunk?;
        if (buf.len() + chunk.len()) as u64 > limit {
            return Ok(None);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(Some(Bytes::from(buf)))
}

/// HTTP status for a prediction outcome.
pub fn status_for(response: &PredictResponse) -> StatusCode {
    match response {
        PredictResponse::Success { .. } => StatusCode::OK,
        PredictResponse::Error { error_kind, .. } => match error_kind {
            ErrorKind::InvalidInput | ErrorKind::UnknownCategory => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::ArtifactLoad => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Inference => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

fn malformed(message: String) -> Response<Body> {
    json_response(
        StatusCode::BAD_REQUEST,
        &PredictResponse::Error {
            error_kind: ErrorKind::InvalidInput,
            message,
        },
    )
}

fn payload_too_large() -> Response<Body> {
    json_response(
        StatusCode::PAYLOAD_TOO_LARGE,
        &PredictResponse::Error {
            error_kind: ErrorKind::InvalidInput,
            message: format!("request body exceeds {MAX_BODY_BYTES} bytes"),
        },
    )
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Body> {
    match serde_json::to_vec(body) {
        Ok(bytes) => with_cors(
            Response::builder()
                .status(status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(bytes))
                .unwrap_or_else(|_| Response::new(Body::empty())),
        ),
        Err(e) => {
            error!(error = %e, "failed to serialize response");
            let mut response = Response::new(Body::from("internal serialization error"));
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        }
    }
}

fn with_cors(mut response: Response<Body>) -> Response<Body> {
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_pipeline() -> Arc<PredictPipeline> {
        let dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures");
        Arc::new(PredictPipeline::from_paths(
            format!("{dir}/model.json"),
            format!("{dir}/preprocessor.json"),
        ))
    }

    async fn call(pipeline: Arc<PredictPipeline>, method: Method, path: &str, body: &str) -> (StatusCode, serde_json::Value) {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let resp = handle_request(req, pipeline).await.unwrap();
        let status = resp.status();
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "*"
        );
        let bytes = hyper::body::to_bytes(resp.into_body()).await.unwrap();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    #[tokio::test]
    async fn predict_returns_rounded_price() {
        let body = serde_json::to_string(&RawRecord::example()).unwrap();
        let (status, json) = call(fixture_pipeline(), Method::POST, "/predict", &body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "success");
        assert_eq!(json["predicted_price"], 11037.32);
        assert_eq!(json["input_data"]["cut"], "Ideal");
    }

    #[tokio::test]
    async fn unknown_category_is_unprocessable() {
        let mut record = RawRecord::example();
        record.cut = "Excellent".to_string();
        let body = serde_json::to_string(&record).unwrap();
        let (status, json) = call(fixture_pipeline(), Method::POST, "/predict", &body).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error_kind"], "unknown_category");
        assert!(json.get("predicted_price").is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (status, json) = call(fixture_pipeline(), Method::POST, "/predict", r#"{"carat": 1.0}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error_kind"], "invalid_input");
    }

    #[tokio::test]
    async fn missing_artifacts_are_unavailable() {
        let pipeline = Arc::new(PredictPipeline::from_paths("/nonexistent/model.json", "/nonexistent/pre.json"));
        let body = serde_json::to_string(&RawRecord::example()).unwrap();
        for _ in 0..2 {
            let (status, json) = call(Arc::clone(&pipeline), Method::POST, "/predict", &body).await;
            assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
            assert_eq!(json["error_kind"], "artifact_load");
        }
        let (_, health) = call(pipeline, Method::GET, "/health", "").await;
        assert_eq!(health["artifacts"], "unloaded");
    }

    #[tokio::test]
    async fn options_and_health_and_unknown_route() {
        let pipeline = fixture_pipeline();
        let (status, options) = call(Arc::clone(&pipeline), Method::GET, "/options", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(options["cut"][2], "Very Good");
        assert_eq!(options["ranges"]["carat"]["max"], 5.0);

        let (status, health) = call(Arc::clone(&pipeline), Method::GET, "/health", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["status"], "healthy");

        let (status, _) = call(Arc::clone(&pipeline), Method::GET, "/nope", "").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(pipeline, Method::OPTIONS, "/predict", "").await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn unbounded_chunked_body_is_cut_off() {
        let (mut sender, body) = Body::channel();
        tokio::spawn(async move {
            let chunk = Bytes::from(vec![b' '; 16 * 1024]);
            // Stops once the handler drops the body.
            while sender.send_data(chunk.clone()).await.is_ok() {}
        });

        let req = Request::builder()
            .method(Method::POST)
            .uri("/predict")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body)
            .unwrap();
        assert!(req.headers().get(header::CONTENT_LENGTH).is_none());

        let resp = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            handle_request(req, fixture_pipeline()),
        )
        .await
        .expect("handler should stop reading past the cap")
        .unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn small_body_under_the_cap_is_read_whole() {
        let body = Body::from(serde_json::to_vec(&RawRecord::example()).unwrap());
        let bytes = read_limited(body, MAX_BODY_BYTES).await.unwrap().unwrap();
        let record: RawRecord = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(record, RawRecord::example());

        let over = Body::from(vec![b' '; 10]);
        assert!(read_limited(over, 9).await.unwrap().is_none());
    }

    #[test]
    fn status_mapping_covers_every_kind() {
        let err = |kind| PredictResponse::Error {
            error_kind: kind,
            message: String::new(),
        };
        assert_eq!(status_for(&err(ErrorKind::UnknownCategory)), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(status_for(&err(ErrorKind::ArtifactLoad)), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status_for(&err(ErrorKind::Inference)), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
