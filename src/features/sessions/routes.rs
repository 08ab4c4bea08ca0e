use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::features::sessions::handlers;
use crate::features::sessions::services::SessionService;

/// Create routes for the sessions feature
pub fn routes(service: Arc<SessionService>) -> Router {
    Router::new()
        .route("/api/sessions", post(handlers::create_session))
        .route(
            "/api/sessions/{id}",
            get(handlers::get_session).delete(handlers::delete_session),
        )
        .route("/api/sessions/{id}/intents", post(handlers::apply_command))
        .route(
            "/api/sessions/{id}/token/reload",
            post(handlers::reload_token),
        )
        .route(
            "/api/sessions/{id}/polygon-map.svg",
            get(handlers::get_polygon_svg),
        )
        .with_state(service)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{MapConfig, SessionConfig};
    use crate::shared::test_helpers::{embedded_projector, embedded_repository, StubTokenSource};
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn server_with(source: Arc<StubTokenSource>) -> TestServer {
        let repo = embedded_repository();
        let projector = embedded_projector(&repo);
        let service = Arc::new(SessionService::new(
            repo,
            projector,
            source,
            MapConfig {
                access_token: None,
                token_url: "http://127.0.0.1:3000/api/map/token".to_string(),
                tile_url_template: "https://tiles.example.test/{z}/{x}/{y}.png?access_token={token}"
                    .to_string(),
                token_timeout: Duration::from_secs(5),
                default_zoom: 6,
            },
            SessionConfig::default(),
        ));
        TestServer::new(routes(service)).unwrap()
    }

    async fn open(server: &TestServer, body: Value) -> Value {
        let response = server.post("/api/sessions").json(&body).await;
        response.assert_status(StatusCode::CREATED);
        response.json::<Value>()
    }

    /// Polls the snapshot until the token has settled
    async fn settled(server: &TestServer, id: &str) -> Value {
        for _ in 0..50 {
            let body: Value = server.get(&format!("/api/sessions/{}", id)).await.json();
            if body["data"]["token"]["status"] != "loading" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("token never settled");
    }

    #[tokio::test]
    async fn test_drill_down_scenario() {
        let server = server_with(StubTokenSource::ready("abc123"));
        let body = open(&server, json!({})).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();
        assert_eq!(body["data"]["phase"], "idle");

        let response = server
            .post(&format!("/api/sessions/{}/intents", id))
            .json(&json!({ "type": "selectProvince", "id": "estuaire" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        let list = &body["data"]["views"][2];
        assert_eq!(list["view"], "list");
        assert_eq!(list["total"], 4);

        let body: Value = server
            .post(&format!("/api/sessions/{}/intents", id))
            .json(&json!({ "type": "selectDepartment", "id": "komo-ocean" }))
            .await
            .json();
        assert_eq!(body["data"]["phase"], "departmentSelected");
        assert_eq!(body["data"]["navigationTarget"], "komo-ocean");
        assert_eq!(body["data"]["state"]["selectedProvinceId"], "estuaire");
    }

    #[tokio::test]
    async fn test_unknown_identifier_is_a_warning() {
        let server = server_with(StubTokenSource::ready("abc123"));
        let body = open(&server, json!({ "provinceId": "estuaire" })).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let response = server
            .post(&format!("/api/sessions/{}/intents", id))
            .json(&json!({ "type": "selectDepartment", "id": "atlantide" }))
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Unknown department 'atlantide'");
        assert_eq!(body["data"]["revision"], 1);
        assert_eq!(body["data"]["state"]["selectedProvinceId"], "estuaire");
    }

    #[tokio::test]
    async fn test_malformed_command_is_rejected() {
        let server = server_with(StubTokenSource::ready("abc123"));
        let body = open(&server, json!({})).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let response = server
            .post(&format!("/api/sessions/{}/intents", id))
            .json(&json!({ "type": "selectProvince", "id": "Not A Slug" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let response = server
            .post(&format!("/api/sessions/{}/intents", id))
            .json(&json!({ "type": "teleport" }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_token_failure_and_reload() {
        let source = StubTokenSource::scripted(vec![
            Err(crate::features::map_token::TokenError::Rejected {
                status: 503,
                message: "Map token is not configured".to_string(),
            }),
            Ok("abc123".to_string()),
        ]);
        let server = server_with(source.clone());
        let body = open(&server, json!({})).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let body = settled(&server, &id).await;
        assert_eq!(body["data"]["token"]["status"], "error");
        assert_eq!(body["data"]["views"][1]["status"], "unavailable");

        let response = server
            .post(&format!("/api/sessions/{}/token/reload", id))
            .await;
        response.assert_status_ok();

        let body = settled(&server, &id).await;
        assert_eq!(body["data"]["token"]["status"], "ready");
        assert_eq!(body["data"]["views"][1]["status"], "ready");
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_gestures_over_http() {
        let server = server_with(StubTokenSource::ready("abc123"));
        let body = open(&server, json!({})).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let body: Value = server
            .post(&format!("/api/sessions/{}/intents", id))
            .json(&json!({ "type": "canvasHover", "x": 152.0, "y": 226.5 }))
            .await
            .json();
        assert_eq!(body["data"]["state"]["hovered"]["id"], "estuaire");
        assert_eq!(body["data"]["phase"], "idle");

        let body: Value = server
            .post(&format!("/api/sessions/{}/intents", id))
            .json(&json!({ "type": "canvasClick", "x": 498.0, "y": 409.3 }))
            .await
            .json();
        assert_eq!(body["data"]["state"]["selectedProvinceId"], "haut-ogooue");

        let body: Value = server
            .post(&format!("/api/sessions/{}/intents", id))
            .json(&json!({ "type": "search", "term": "lek" }))
            .await
            .json();
        let cards: Vec<&str> = body["data"]["views"][2]["cards"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["id"].as_str().unwrap())
            .collect();
        assert_eq!(cards, vec!["lekoko", "lekabi-lewolo", "lekoni-lekori"]);
    }

    #[tokio::test]
    async fn test_svg_and_delete() {
        let server = server_with(StubTokenSource::ready("abc123"));
        let body = open(&server, json!({ "departmentId": "mongo" })).await;
        let id = body["data"]["id"].as_str().unwrap().to_string();

        let response = server
            .get(&format!("/api/sessions/{}/polygon-map.svg", id))
            .await;
        response.assert_status_ok();
        assert_eq!(response.header("content-type"), "image/svg+xml");
        assert!(response.text().contains(r#"data-id="nyanga""#));

        server
            .delete(&format!("/api/sessions/{}", id))
            .await
            .assert_status_ok();
        server
            .get(&format!("/api/sessions/{}", id))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
