//! Request logging demo.
//!
//! Run with:
//!   RUST_LOG=info cargo run --example access_log
//!
//! Optional `access_log.toml` in the working directory, overridable with
//! `TSU_ACCESS_LOG_*` variables:
//!   fields = ["id", "ip", "status", "latency"]
//!   skip_paths = ["/healthz"]
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -X POST http://localhost:3000/users
//!   curl http://localhost:3000/reports
//!   curl http://localhost:3000/healthz

use tsu_slog::middleware::{AccessLogSettings, RequestLogger};
use tsu_slog::{HttpError, Method, Request, Response, Router, Server, StatusCode};

#[tokio::main]
async fn main() -> Result<(), tsu_slog::Error> {
    tracing_subscriber::fmt::init();

    let logging = AccessLogSettings::load("access_log.toml")?.into_config();

    let app = Router::new()
        .on(Method::GET,  "/users/{id}", get_user)
        .on(Method::POST, "/users",      create_user)
        .on(Method::GET,  "/reports",    reports)
        .on(Method::GET,  "/healthz",    healthz)
        .layer(RequestLogger::new(logging));

    Server::bind("0.0.0.0:3000").serve(app).await
}

// GET /users/{id}: logged at INFO
async fn get_user(req: Request) -> Response {
    let id = req.param("id").unwrap_or("unknown");
    Response::json(format!(r#"{{"id":"{id}","name":"alice"}}"#).into_bytes())
}

// POST /users: an empty body is a 400, logged at WARN without an error attribute
async fn create_user(req: Request) -> Result<Response, HttpError> {
    if req.body().is_empty() {
        return Err(HttpError::new(StatusCode::BAD_REQUEST, "body required"));
    }

    Ok(Response::builder()
        .status(StatusCode::CREATED)
        .header("location", "/users/99")
        .json(br#"{"id":"99","name":"new_user"}"#.to_vec()))
}

// GET /reports: an unexpected failure, logged at ERROR with the error text
async fn reports(_req: Request) -> Result<Response, std::io::Error> {
    Err(std::io::Error::other("report store unreachable"))
}

async fn healthz(_req: Request) -> &'static str {
    "ok"
}
