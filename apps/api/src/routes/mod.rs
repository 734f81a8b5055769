pub mod health;
pub mod templates;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Template API (read-only)
        .route("/api/v1/templates", get(templates::handle_list_templates))
        .route(
            "/api/v1/templates/:name",
            get(templates::handle_get_template),
        )
        // Document API
        .route("/api/v1/documents", post(handlers::handle_generate))
        .route(
            "/api/v1/documents/preview",
            post(handlers::handle_preview),
        )
        .route(
            "/api/v1/documents/statement",
            post(handlers::handle_generate_statement),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use crate::template::tests::STATEMENT_TEMPLATE;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> (tempfile::TempDir, Router) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("statement.json"), STATEMENT_TEMPLATE).unwrap();
        let router = build_router(test_state(dir.path()));
        (dir, router)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (_dir, app) = router();
        let response = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_and_get_templates() {
        let (_dir, app) = router();
        let response = app
            .clone()
            .oneshot(Request::get("/api/v1/templates").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await, json!(["statement"]));

        let response = app
            .oneshot(
                Request::get("/api/v1/templates/statement")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["fields"]["Tr1Date"].is_object());
    }

    #[tokio::test]
    async fn test_preview_returns_pages_and_report() {
        let (_dir, app) = router();
        let mut data = serde_json::Map::new();
        data.insert("Cname".to_string(), json!("Jane Doe"));
        for i in 1..=7 {
            data.insert(format!("Tr{i}Date"), json!(format!("d{i}")));
        }
        data.insert("Tr1Currency".to_string(), json!("USD"));

        let response = app
            .oneshot(post_json(
                "/api/v1/documents/preview",
                json!({
                    "template_name": "statement",
                    "data": data,
                    "pagination": { "itemPrefix": "Tr", "itemsPerPage": 3 }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["page_count"], 3);
        assert_eq!(body["pages"][1]["Tr1Date"], "d4");
        assert_eq!(body["pages"][1]["Cpage"], "2");
        assert_eq!(body["report"]["total_items"], 7);
        assert_eq!(body["report"]["dropped"][0]["key"], "Tr1Currency");
        assert_eq!(body["report"]["dropped"][0]["reason"], "no_matching_slot");
    }

    #[tokio::test]
    async fn test_zero_items_per_page_is_bad_request() {
        let (_dir, app) = router();
        let response = app
            .oneshot(post_json(
                "/api/v1/documents/preview",
                json!({
                    "template_name": "statement",
                    "data": { "Tr1Date": "x" },
                    "pagination": { "item_prefix": "Tr", "items_per_page": 0 }
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"]["code"], "CONFIG_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_template_is_not_found() {
        let (_dir, app) = router();
        let response = app
            .oneshot(post_json(
                "/api/v1/documents",
                json!({ "template_name": "missing", "data": {} }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["error"]["code"],
            "TEMPLATE_NOT_FOUND"
        );
    }

    #[tokio::test]
    async fn test_generate_returns_attachment() {
        let (_dir, app) = router();
        let response = app
            .oneshot(post_json(
                "/api/v1/documents",
                json!({
                    "template_name": "statement",
                    "data": [{ "Cname": "a" }, { "Cname": "b" }]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["x-page-count"], "2");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment; filename=\"statement_"));
        assert_eq!(body_json(response).await["page_count"], 2);
    }

    #[tokio::test]
    async fn test_statement_endpoint_paginates_transactions() {
        let (_dir, app) = router();
        let transactions: Vec<Value> = (1..=4)
            .map(|i| {
                json!({
                    "date": format!("0{i}/03"),
                    "description": format!("Purchase {i}"),
                    "amountInBHD": 2.5,
                    "cr": false
                })
            })
            .collect();

        let response = app
            .oneshot(post_json(
                "/api/v1/documents/statement",
                json!({
                    "orgId": "266",
                    "name": "Jane Doe",
                    "cardNumber": "4111",
                    "transactions": transactions
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        // Three slots per page in the fixture template, four transactions.
        assert_eq!(response.headers()["x-page-count"], "2");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("statement_266_"));
    }

    #[tokio::test]
    async fn test_statement_with_unknown_org_is_bad_request() {
        let (_dir, app) = router();
        let response = app
            .oneshot(post_json(
                "/api/v1/documents/statement",
                json!({ "orgId": "999", "transactions": [] }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
