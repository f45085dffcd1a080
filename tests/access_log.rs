//! End-to-end request logging through a router.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use tracing::Level;
use tsu_slog::middleware::{Attributes, Field, LoggerConfig, RequestLogger, Sink, Value};
use tsu_slog::{HttpError, Method, Request, Response, Router, StatusCode};

#[derive(Clone, Default)]
struct Recorder(Arc<Mutex<Vec<(Level, String, Attributes)>>>);

impl Sink for Recorder {
    fn emit(&self, level: Level, message: &str, attrs: &Attributes) {
        self.0.lock().unwrap().push((level, message.to_owned(), attrs.clone()));
    }
}

impl Recorder {
    fn take(&self) -> Vec<(Level, String, Attributes)> {
        std::mem::take(&mut *self.0.lock().unwrap())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("storage offline")]
struct StorageOffline;

async fn list_items(_: Request) -> Response {
    tokio::time::sleep(Duration::from_millis(25)).await;
    Response::builder().header("x-request-id", "resp-7").json(b"[]".to_vec())
}

async fn get_item(req: Request) -> Result<Response, HttpError> {
    match req.param("id") {
        Some("1") => Ok(Response::json(br#"{"id":1}"#.to_vec())),
        _ => Err(HttpError::new(StatusCode::NOT_FOUND, "no such item")),
    }
}

async fn upload(_: Request) -> Result<Response, StorageOffline> {
    Err(StorageOffline)
}

async fn healthz(_: Request) -> &'static str {
    "ok"
}

fn app(recorder: &Recorder, config: LoggerConfig) -> Router {
    Router::new()
        .on(Method::GET, "/items", list_items)
        .on(Method::GET, "/items/{id}", get_item)
        .on(Method::POST, "/upload", upload)
        .on(Method::GET, "/healthz", healthz)
        .layer(RequestLogger::new(config.sink(recorder.clone())))
}

fn request(method: Method, path: &str) -> Request {
    let req = http::Request::builder()
        .method(method)
        .uri(path)
        .header("user-agent", "integration/1.0")
        .header("x-forwarded-for", "198.51.100.4, 10.0.0.2")
        .body(Bytes::new())
        .unwrap();
    Request::from(req).with_remote_addr("10.0.0.2:41000".parse().unwrap())
}

#[tokio::test(start_paused = true)]
async fn one_record_per_request_with_configured_fields() {
    let recorder = Recorder::default();
    let app = app(
        &recorder,
        LoggerConfig::new().fields([Field::Id, Field::Ip, Field::UserAgent, Field::Status, Field::Latency]),
    );

    let res = app.handle(request(Method::GET, "/items")).await.unwrap();
    assert_eq!(res.body(), b"[]");

    let records = recorder.take();
    assert_eq!(records.len(), 1);
    let (level, message, attrs) = &records[0];
    assert_eq!(*level, Level::INFO);
    assert_eq!(message, "GET /items");
    assert_eq!(attrs.iter().collect::<Vec<_>>(), [
        ("id", &Value::from("resp-7")),
        ("ip", &Value::from("198.51.100.4")),
        ("user_agent", &Value::from("integration/1.0")),
        ("status", &Value::Int(200)),
        ("latency", &Value::from("25ms")),
    ]);
}

#[tokio::test]
async fn errors_are_logged_and_passed_through() {
    let recorder = Recorder::default();
    let app = app(&recorder, LoggerConfig::new().fields([Field::Status]));

    let err = app.handle(request(Method::GET, "/items/9")).await.unwrap_err();
    assert_eq!(err.to_response().status_code(), StatusCode::NOT_FOUND);

    let err = app.handle(request(Method::POST, "/upload")).await.unwrap_err();
    assert!(err.downcast_ref::<StorageOffline>().is_some());

    let records = recorder.take();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].0, Level::WARN);
    assert_eq!(records[0].1, "GET /items/9");
    assert_eq!(records[0].2.get("error"), None);

    assert_eq!(records[1].0, Level::ERROR);
    assert_eq!(records[1].1, "POST /upload");
    assert_eq!(records[1].2.get("status"), Some(&Value::Int(500)));
    assert_eq!(records[1].2.get("error"), Some(&Value::from("storage offline")));
}

#[tokio::test]
async fn unmatched_routes_are_logged_as_not_found() {
    let recorder = Recorder::default();
    let app = app(&recorder, LoggerConfig::new());

    let err = app.handle(request(Method::DELETE, "/nowhere")).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::NOT_FOUND);

    let records = recorder.take();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, Level::WARN);
    assert_eq!(records[0].1, "DELETE /nowhere");
}

#[tokio::test]
async fn skipper_and_threshold_filter_records() {
    let recorder = Recorder::default();
    let app = app(
        &recorder,
        LoggerConfig::new()
            .min_status(400)
            .skipper(|req| req.path() == "/healthz"),
    );

    assert_eq!(app.handle(request(Method::GET, "/healthz")).await.unwrap().body(), b"ok");
    app.handle(request(Method::GET, "/items/1")).await.unwrap();
    assert!(recorder.take().is_empty());

    app.handle(request(Method::GET, "/items/2")).await.unwrap_err();
    assert_eq!(recorder.take().len(), 1);
}

#[tokio::test]
async fn http2_host_comes_from_the_authority() {
    let recorder = Recorder::default();
    let app = app(&recorder, LoggerConfig::new().fields([Field::Host]));

    let req = http::Request::get("https://api.example.com/items/1")
        .version(http::Version::HTTP_2)
        .body(Bytes::new())
        .unwrap();
    app.handle(Request::from(req)).await.unwrap();

    let records = recorder.take();
    assert_eq!(records[0].1, "GET /items/1");
    assert_eq!(records[0].2.get("host"), Some(&Value::from("api.example.com")));
}
