use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use models::Car;
use serde_json::{json, Value};
use service::car::repository::mock::{Failure, FailingCarRepository, MemoryCarRepository};
use service::car::{CarRepository, CarService};
use tower::ServiceExt;

use server::{build_router, ServerState};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

fn app_with(repo: Arc<dyn CarRepository>) -> Router {
    build_router(ServerState::new(CarService::new(repo)), cors())
}

fn memory_app() -> (Router, Arc<MemoryCarRepository>) {
    let repo = Arc::new(MemoryCarRepository::default());
    (app_with(repo.clone()), repo)
}

fn json_request(method: &str, uri: &str, body: &Value) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

fn empty_request(method: &str, uri: &str) -> anyhow::Result<Request<Body>> {
    Ok(Request::builder().method(method).uri(uri).body(Body::empty())?)
}

async fn send(app: &Router, req: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, body))
}

#[tokio::test]
async fn health_reports_ok() -> anyhow::Result<()> {
    let (app, _) = memory_app();
    let (status, body) = send(&app, empty_request("GET", "/health")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn create_then_get_round_trips() -> anyhow::Result<()> {
    let (app, _) = memory_app();
    let car = json!({"name": "corolla", "model": "2018"});

    let (status, body) = send(&app, json_request("POST", "/cars", &car)?).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, car);

    let (status, body) = send(&app, empty_request("GET", "/cars/corolla")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, car);
    Ok(())
}

#[tokio::test]
async fn empty_string_fields_are_accepted() -> anyhow::Result<()> {
    let (app, repo) = memory_app();
    let car = json!({"name": "", "model": ""});
    let (status, _) = send(&app, json_request("POST", "/cars", &car)?).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(repo.snapshot().await, vec![Car::new("", "")]);
    Ok(())
}

#[tokio::test]
async fn list_on_empty_collection_is_empty_array() -> anyhow::Result<()> {
    let (app, _) = memory_app();
    let (status, body) = send(&app, empty_request("GET", "/cars")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    Ok(())
}

#[tokio::test]
async fn list_returns_store_order() -> anyhow::Result<()> {
    let repo = Arc::new(MemoryCarRepository::with_cars(vec![
        Car::new("a", "1"),
        Car::new("b", "2"),
    ]));
    let app = app_with(repo);
    let (status, body) = send(&app, empty_request("GET", "/cars")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{"name": "a", "model": "1"}, {"name": "b", "model": "2"}]));
    Ok(())
}

#[tokio::test]
async fn get_unknown_is_not_found() -> anyhow::Result<()> {
    let (app, _) = memory_app();
    let (status, body) = send(&app, empty_request("GET", "/cars/unknown")?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"message": "car not found"}));
    Ok(())
}

#[tokio::test]
async fn get_with_duplicate_names_returns_first() -> anyhow::Result<()> {
    let repo = Arc::new(MemoryCarRepository::with_cars(vec![
        Car::new("civic", "2019"),
        Car::new("civic", "2020"),
    ]));
    let app = app_with(repo);
    let (status, body) = send(&app, empty_request("GET", "/cars/civic")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "2019");
    Ok(())
}

#[tokio::test]
async fn path_names_are_percent_decoded() -> anyhow::Result<()> {
    let repo = Arc::new(MemoryCarRepository::with_cars(vec![Car::new("model t", "1908")]));
    let app = app_with(repo);
    let (status, body) = send(&app, empty_request("GET", "/cars/model%20t")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "1908");
    Ok(())
}

#[tokio::test]
async fn update_unknown_returns_ok_without_insert() -> anyhow::Result<()> {
    let (app, repo) = memory_app();
    let car = json!({"name": "ghost", "model": "1999"});
    let (status, body) = send(&app, json_request("PUT", "/cars/ghost", &car)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, car);
    assert!(repo.snapshot().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn delete_unknown_returns_confirmation() -> anyhow::Result<()> {
    let (app, _) = memory_app();
    let (status, body) = send(&app, empty_request("DELETE", "/cars/ghost")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "car deleted"}));
    Ok(())
}

#[tokio::test]
async fn create_with_non_json_body_is_bad_request() -> anyhow::Result<()> {
    let (app, repo) = memory_app();
    let req = Request::builder()
        .method("POST")
        .uri("/cars")
        .header("content-type", "application/json")
        .body(Body::from("not json"))?;
    let (status, body) = send(&app, req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(repo.snapshot().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_with_missing_field_defaults_to_empty() -> anyhow::Result<()> {
    let (app, repo) = memory_app();
    let (status, body) = send(&app, json_request("POST", "/cars", &json!({"name": "civic"}))?).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"name": "civic", "model": ""}));
    assert_eq!(repo.snapshot().await, vec![Car::new("civic", "")]);
    Ok(())
}

#[tokio::test]
async fn create_with_null_body_inserts_empty_car() -> anyhow::Result<()> {
    let (app, repo) = memory_app();
    let (status, body) = send(&app, json_request("POST", "/cars", &Value::Null)?).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"name": "", "model": ""}));
    assert_eq!(repo.snapshot().await, vec![Car::default()]);
    Ok(())
}

#[tokio::test]
async fn create_with_wrong_field_type_is_bad_request() -> anyhow::Result<()> {
    let (app, repo) = memory_app();
    let (status, body) = send(&app, json_request("POST", "/cars", &json!({"name": 1, "model": "x"}))?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(repo.snapshot().await.is_empty());
    Ok(())
}

#[tokio::test]
async fn create_ignores_content_type() -> anyhow::Result<()> {
    let (app, repo) = memory_app();
    let raw = r#"{"name":"civic","model":"2020"}"#;

    let req = Request::builder().method("POST").uri("/cars").body(Body::from(raw))?;
    let (status, body) = send(&app, req).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, json!({"name": "civic", "model": "2020"}));

    let req = Request::builder()
        .method("POST")
        .uri("/cars")
        .header("content-type", "text/plain")
        .body(Body::from(raw))?;
    let (status, _) = send(&app, req).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(repo.snapshot().await.len(), 2);
    Ok(())
}

#[tokio::test]
async fn invalid_percent_encoding_in_name_is_json_bad_request() -> anyhow::Result<()> {
    let (app, _) = memory_app();
    for method in ["GET", "DELETE"] {
        let resp = app.clone().oneshot(empty_request(method, "/cars/%FF")?).await?;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("application/json"), "content-type was {content_type}");
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
        let body: Value = serde_json::from_slice(&bytes)?;
        assert!(body["error"].is_string());
    }

    let car = json!({"name": "civic", "model": "2020"});
    let (status, body) = send(&app, json_request("PUT", "/cars/%FF", &car)?).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    Ok(())
}

#[tokio::test]
async fn update_with_malformed_body_is_bad_request() -> anyhow::Result<()> {
    let repo = Arc::new(MemoryCarRepository::with_cars(vec![Car::new("civic", "2020")]));
    let app = app_with(repo.clone());
    let req = Request::builder()
        .method("PUT")
        .uri("/cars/civic")
        .header("content-type", "application/json")
        .body(Body::from("{"))?;
    let (status, _) = send(&app, req).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(repo.snapshot().await, vec![Car::new("civic", "2020")]);
    Ok(())
}

#[tokio::test]
async fn civic_lifecycle() -> anyhow::Result<()> {
    let (app, _) = memory_app();

    let v2020 = json!({"name": "civic", "model": "2020"});
    let (status, body) = send(&app, json_request("POST", "/cars", &v2020)?).await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, v2020);

    let v2021 = json!({"name": "civic", "model": "2021"});
    let (status, body) = send(&app, json_request("PUT", "/cars/civic", &v2021)?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, v2021);

    let (status, body) = send(&app, empty_request("GET", "/cars/civic")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["model"], "2021");

    let (status, body) = send(&app, empty_request("DELETE", "/cars/civic")?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "car deleted"}));

    let (status, _) = send(&app, empty_request("GET", "/cars/civic")?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn store_failures_map_to_fixed_messages() -> anyhow::Result<()> {
    let app = app_with(Arc::new(FailingCarRepository { failure: Failure::Db }));
    let car = json!({"name": "civic", "model": "2020"});

    let cases = [
        (json_request("POST", "/cars", &car)?, "Failed to insert car"),
        (empty_request("GET", "/cars")?, "Failed to retrieve cars"),
        (empty_request("GET", "/cars/civic")?, "Failed to retrieve car"),
        (json_request("PUT", "/cars/civic", &car)?, "Failed to update car"),
        (empty_request("DELETE", "/cars/civic")?, "Failed to delete car"),
    ];
    for (req, expected) in cases {
        let (status, body) = send(&app, req).await?;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": expected}));
    }
    Ok(())
}

#[tokio::test]
async fn undecodable_document_fails_whole_list() -> anyhow::Result<()> {
    let app = app_with(Arc::new(FailingCarRepository { failure: Failure::Decode }));
    let (status, body) = send(&app, empty_request("GET", "/cars")?).await?;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to decode car"}));
    Ok(())
}
