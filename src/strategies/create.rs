//! Simulated resource creation for unmatched requests.

use axum::body::{self, Body};
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::intent::wants_json;
use crate::strategies::StrategyError;

/// Answer with 201 and the created resource.
///
/// The body is read once. A JSON object body is echoed back with an `id`
/// added when it has none; anything else yields just `{"id": ...}`.
pub async fn simulate_create(
    request: Request<Body>,
    max_body_size: usize,
) -> Result<Response, StrategyError> {
    let json = wants_json(&request);
    let body = body::to_bytes(request.into_body(), max_body_size)
        .await
        .map_err(|e| StrategyError::RequestBody(e.to_string()))?;

    let resource = created_resource(json.then_some(&body[..]));
    Ok((StatusCode::CREATED, Json(resource)).into_response())
}

fn created_resource(body: Option<&[u8]>) -> Value {
    let mut object = match body.map(serde_json::from_slice::<Value>) {
        Some(Ok(Value::Object(map))) => map,
        _ => Map::new(),
    };
    object
        .entry("id")
        .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
    Value::Object(object)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::CONTENT_TYPE;

    #[test]
    fn test_created_resource_echoes_object() {
        let resource = created_resource(Some(br#"{"name": "test"}"#));
        assert_eq!(resource["name"], "test");
        assert!(Uuid::parse_str(resource["id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_created_resource_keeps_existing_id() {
        let resource = created_resource(Some(br#"{"id": 7}"#));
        assert_eq!(resource["id"], 7);
    }

    #[test]
    fn test_created_resource_non_object() {
        for body in [Some(&b"[1, 2]"[..]), Some(&b"not json"[..]), None] {
            let resource = created_resource(body);
            let object = resource.as_object().unwrap();
            assert_eq!(object.len(), 1);
            assert!(object.contains_key("id"));
        }
    }

    #[tokio::test]
    async fn test_simulate_create() {
        let request = Request::builder()
            .method("POST")
            .uri("/nonexistent/path")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"name": "test"}"#))
            .unwrap();

        let response = simulate_create(request, 1024).await.unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[CONTENT_TYPE], "application/json");

        let body = body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["name"], "test");
    }
}
