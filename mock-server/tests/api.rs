use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

// --- app ---

#[tokio::test]
async fn health_is_wrapped_in_envelope() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/health"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await, json!({"data": true}));
}

#[tokio::test]
async fn unknown_language_fails_with_message() {
    let resp = app()
        .oneshot(empty_request("GET", "/api/lang/xx"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await,
        json!({"message": "unknown language: xx"})
    );
}

#[tokio::test]
async fn unknown_route_is_empty_404() {
    let resp = app()
        .oneshot(empty_request("GET", "/v1/api/media"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_bytes(resp).await.is_empty());
}

// --- lists ---

#[tokio::test]
async fn lists_start_empty_and_echo_per_page() {
    let resp = app()
        .oneshot(empty_request("GET", "/v1/api/lists?per_page=all"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["results"], json!([]));
    assert_eq!(body["data"]["per_page"], "all");
}

#[tokio::test]
async fn create_list_requires_name() {
    let resp = app()
        .oneshot(json_request("POST", "/v1/api/lists", r#"{"name":"  "}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "invalid list name");
}

#[tokio::test]
async fn delete_missing_list_is_404_with_message() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/v1/api/lists/42"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await, json!({"message": "list not found"}));
}

// --- subscribers ---

#[tokio::test]
async fn bulk_delete_without_ids_is_rejected() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/v1/api/subscribers"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "no IDs given");
}

#[tokio::test]
async fn subscriber_query_rejects_bad_list_id() {
    let resp = app()
        .oneshot(empty_request("GET", "/v1/api/subscribers?list_id=abc"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["message"], "invalid list_id: abc");
}

// --- templates ---

#[tokio::test]
async fn default_template_cannot_be_deleted() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/v1/api/templates/1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(resp).await["message"],
        "cannot delete the default template"
    );
}

// --- full lifecycle ---

#[tokio::test]
async fn list_subscriber_campaign_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create two lists
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/v1/api/lists", r#"{"name":"Weekly"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let weekly = body_json(resp).await["data"].clone();
    assert_eq!(weekly["type"], "private");
    let weekly_id = weekly["id"].as_u64().unwrap();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/v1/api/lists",
            r#"{"name":"Daily","type":"public"}"#,
        ))
        .await
        .unwrap();
    let daily_id = body_json(resp).await["data"]["id"].as_u64().unwrap();

    // subscribe one address to each list
    for (email, list) in [("a@x.io", weekly_id), ("b@x.io", daily_id)] {
        let body = json!({"email": email, "name": "n", "lists": [list]}).to_string();
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(json_request("POST", "/v1/api/subscribers", &body))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    // duplicate email conflicts
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/v1/api/subscribers",
            r#"{"email":"a@x.io"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // repeated list_id matches either list
    let uri = format!("/v1/api/subscribers?list_id={weekly_id}&list_id={daily_id}");
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &uri))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"]["total"], 2);
    let ids: Vec<u64> = body["data"]["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_u64().unwrap())
        .collect();

    // lists report subscriber counts
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/v1/api/lists"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"]["results"][0]["subscriber_count"], 1);

    // campaign on the weekly list starts as a draft
    let body = json!({"name": "Issue 1", "subject": "Hello", "lists": [weekly_id]}).to_string();
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/v1/api/campaigns", &body))
        .await
        .unwrap();
    let campaign = body_json(resp).await["data"].clone();
    assert_eq!(campaign["status"], "draft");
    assert_eq!(campaign["to_send"], 1);
    let campaign_id = campaign["id"].as_u64().unwrap();

    // start it; it shows up in running stats
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/v1/api/campaigns/{campaign_id}/status"),
            r#"{"status":"running"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/v1/api/campaigns/running/stats"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"][0]["id"], campaign_id);

    // running campaigns cannot be deleted
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request(
            "DELETE",
            &format!("/v1/api/campaigns/{campaign_id}"),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // bulk delete both subscribers with repeated id params
    let uri = format!("/v1/api/subscribers?id={}&id={}", ids[0], ids[1]);
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["data"]["deleted_ids"], json!(ids));

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/v1/api/subscribers"))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["data"]["total"], 0);
}

#[tokio::test]
async fn settings_update_merges_keys() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            "/v1/api/settings",
            r#"{"app.concurrency":4}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", "/v1/api/settings"))
        .await
        .unwrap();
    let body = body_json(resp).await;
    assert_eq!(body["data"]["app.concurrency"], 4);
    assert_eq!(body["data"]["app.root_url"], "http://localhost:9000");
}
