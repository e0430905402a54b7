//! HTTP route tests against an in-memory sensor manager.
//!
//! Run with: cargo test --test routes_test

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use sensor_service::common::AppState;
use sensor_service::config::{Config, Deployment, LogFormat};
use sensor_service::error::StorageError;
use sensor_service::routes;
use sensor_service::sensors::{NewSensor, RequestContext, Sensor, SensorManager};
use sensor_service::transport::TlsPaths;

#[derive(Default)]
struct InMemorySensors {
    rows: Mutex<HashMap<String, Sensor>>,
    next_id: Mutex<u32>,
    fail: bool,
}

impl InMemorySensors {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.fail {
            Err(StorageError::Database(sea_orm::DbErr::Custom(
                "connection refused".to_string(),
            )))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SensorManager for InMemorySensors {
    async fn create(&self, _cx: &RequestContext, new: NewSensor) -> Result<Sensor, StorageError> {
        self.check()?;
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let sensor = Sensor {
            id: format!("sensor-{next}"),
            site_id: new.site_id,
            name: new.name,
            unit: new.unit,
            min_safe: new.min_safe,
            max_safe: new.max_safe,
        };
        self.rows
            .lock()
            .unwrap()
            .insert(sensor.id.clone(), sensor.clone());
        Ok(sensor)
    }

    async fn all(&self, _cx: &RequestContext, site_id: &str) -> Result<Vec<Sensor>, StorageError> {
        self.check()?;
        let mut sensors: Vec<Sensor> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.site_id == site_id)
            .cloned()
            .collect();
        sensors.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(sensors)
    }

    async fn get(&self, _cx: &RequestContext, id: &str) -> Result<Option<Sensor>, StorageError> {
        self.check()?;
        Ok(self.rows.lock().unwrap().get(id).cloned())
    }

    async fn update(&self, _cx: &RequestContext, sensor: &Sensor) -> Result<u64, StorageError> {
        self.check()?;
        let mut rows = self.rows.lock().unwrap();
        match rows.get_mut(&sensor.id) {
            Some(existing) => {
                *existing = sensor.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, _cx: &RequestContext, id: &str) -> Result<(), StorageError> {
        self.check()?;
        self.rows.lock().unwrap().remove(id);
        Ok(())
    }
}

fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        db_timeout_seconds: 5,
        api_host: "127.0.0.1".to_string(),
        api_port: 0,
        grpc_port: None,
        grpc_tls: TlsPaths::insecure(),
        log_format: LogFormat::Text,
        deployment: Deployment::Local,
    }
}

fn app_with(sensors: InMemorySensors) -> Router {
    routes::build_router(AppState::new(Arc::new(sensors), test_config()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn intake() -> Value {
    json!({
        "siteId": "site-1",
        "name": "intake",
        "unit": "celsius",
        "minSafe": -10.0,
        "maxSafe": 45.5
    })
}

#[tokio::test]
async fn healthz_is_ok() {
    let app = app_with(InMemorySensors::default());

    let (status, _) = send(&app, "GET", "/healthz", None).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn create_then_get_round_trips_camel_case_json() {
    let app = app_with(InMemorySensors::default());

    let (status, created) = send(&app, "POST", "/api/sensors", Some(intake())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["siteId"], "site-1");
    assert_eq!(created["minSafe"], -10.0);
    let id = created["id"].as_str().unwrap().to_string();

    let (status, fetched) = send(&app, "GET", &format!("/api/sensors/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);
}

#[tokio::test]
async fn get_unknown_sensor_is_404() {
    let app = app_with(InMemorySensors::default());

    let (status, body) = send(&app, "GET", "/api/sensors/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn list_filters_by_site() {
    let app = app_with(InMemorySensors::default());
    send(&app, "POST", "/api/sensors", Some(intake())).await;
    let mut other = intake();
    other["siteId"] = json!("site-2");
    send(&app, "POST", "/api/sensors", Some(other)).await;

    let (status, body) = send(&app, "GET", "/api/sensors?siteId=site-1", None).await;
    assert_eq!(status, StatusCode::OK);
    let sensors = body.as_array().unwrap();
    assert_eq!(sensors.len(), 1);
    assert_eq!(sensors[0]["siteId"], "site-1");

    let (status, body) = send(&app, "GET", "/api/sensors?siteId=site-9", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn list_without_site_is_bad_request() {
    let app = app_with(InMemorySensors::default());

    let (status, _) = send(&app, "GET", "/api/sensors", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_replaces_fields_and_404s_when_missing() {
    let app = app_with(InMemorySensors::default());
    let (_, created) = send(&app, "POST", "/api/sensors", Some(intake())).await;
    let id = created["id"].as_str().unwrap().to_string();

    let mut changed = intake();
    changed["name"] = json!("outlet");
    changed["maxSafe"] = json!(60.0);
    let (status, _) = send(&app, "PUT", &format!("/api/sensors/{id}"), Some(changed)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, fetched) = send(&app, "GET", &format!("/api/sensors/{id}"), None).await;
    assert_eq!(fetched["id"], id.as_str());
    assert_eq!(fetched["name"], "outlet");
    assert_eq!(fetched["maxSafe"], 60.0);

    let (status, _) = send(&app, "PUT", "/api/sensors/nope", Some(intake())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_twice_is_no_content_both_times() {
    let app = app_with(InMemorySensors::default());
    let (_, created) = send(&app, "POST", "/api/sensors", Some(intake())).await;
    let uri = format!("/api/sensors/{}", created["id"].as_str().unwrap());

    let (first, _) = send(&app, "DELETE", &uri, None).await;
    let (second, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(first, StatusCode::NO_CONTENT);
    assert_eq!(second, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn storage_failure_is_500_without_details() {
    let app = app_with(InMemorySensors::failing());

    let (status, body) = send(&app, "POST", "/api/sensors", Some(intake())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Storage error" }));
}
