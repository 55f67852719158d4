// tests/api_http.rs
//
// HTTP-level tests for the public Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health, /cards, /cards/{id}, /spreads/{id}
// - POST /score, /score/explain (defaults, 400/404 errors)
// - POST /readings, /readings/detect; GET /readings, /readings/{id}; PUT notes
// - POST /readings/photo with and without a card detector

use serde_json::json;
use serde_json::Value as Json;
use shuttle_axum::axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use std::sync::Arc;

use tower::ServiceExt as _; // for `oneshot`

use tarot_eigenvalue::config::AppConfig;
use tarot_eigenvalue::detection::{Detection, DetectionBatch, FixedDetector};
use tarot_eigenvalue::{build_state, build_state_with_detector, create_router};

const BODY_LIMIT: usize = 1024 * 1024;

/// Fresh router per test: template interpreter, no metrics, own journal.
fn test_router() -> Router {
    let state = build_state(&AppConfig::default()).expect("default state");
    create_router(state, None)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    payload: Option<Json>,
) -> (StatusCode, Json) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match payload {
        Some(p) => builder
            .header("content-type", "application/json")
            .body(Body::from(p.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };
    read(app, req).await
}

async fn send_image(app: &Router, uri: &str, image: &'static [u8]) -> (StatusCode, Json) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "image/jpeg")
        .body(Body::from(image))
        .expect("build request");
    read(app, req).await
}

async fn read(app: &Router, req: Request<Body>) -> (StatusCode, Json) {
    let resp = app.clone().oneshot(req).await.expect("oneshot");
    let status = resp.status();
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body");
    let value = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Json::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, value)
}

fn three_card_payload() -> Json {
    json!({
        "spreadId": "three_card",
        "placements": [
            { "cardId": "major_19_the_sun", "positionId": "three_card_0", "isReversed": false },
            { "cardId": "swords_03", "positionId": "three_card_1", "isReversed": true },
            { "cardId": "pentacles_king", "positionId": "three_card_2", "isReversed": false }
        ],
        "question": "Should I take the offer?"
    })
}

#[tokio::test]
async fn health_and_catalog() {
    let app = test_router();

    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Json::String("ok".into()));

    let (status, body) = send(&app, "GET", "/cards", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(78));

    let (status, body) = send(&app, "GET", "/cards/major_13_death", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Death");
    assert_eq!(body["arcana"], "Major");

    let (status, body) = send(&app, "GET", "/cards/joker", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "unknown card: joker");

    let (status, body) = send(&app, "GET", "/spreads/celtic_cross", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["positions"].as_array().map(Vec::len), Some(10));
}

#[tokio::test]
async fn score_uses_catalog_defaults_and_reports_skips() {
    let app = test_router();
    let mut payload = three_card_payload();
    payload["placements"]
        .as_array_mut()
        .unwrap()
        .push(json!({ "cardId": "nope", "positionId": "three_card_0", "isReversed": false }));

    let (status, body) = send(&app, "POST", "/score", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    let v = body["eigenvalue"].as_f64().expect("eigenvalue");
    assert!((0.0..=1.0).contains(&v));
    assert_eq!(body["strategy"]["kind"], "manual");
    assert_eq!(body["resolved"], 3);
    assert_eq!(body["skipped"], 1);
}

#[tokio::test]
async fn score_strategies_and_errors() {
    let app = test_router();

    let mut payload = three_card_payload();
    payload["strategy"] = json!({ "kind": "use_case" });
    let (status, body) = send(&app, "POST", "/score", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["strategy"]["kind"], "use_case");

    let mut payload = three_card_payload();
    payload["strategy"] = json!({ "kind": "ai_assisted", "confidence": 1.7 });
    let (status, body) = send(&app, "POST", "/score", Some(payload)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("confidence"));

    let mut payload = three_card_payload();
    payload["spreadId"] = json!("pyramid");
    let (status, _) = send(&app, "POST", "/score", Some(payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "POST", "/score", Some(json!({ "placements": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn custom_cards_and_positions_are_honored() {
    let app = test_router();
    let payload = json!({
        "cards": [{ "id": "x", "name": "Custom", "arcana": "Major", "uprightKeywords": ["joy"] }],
        "positions": [{ "id": "p", "spreadId": "mine", "positionIndex": 0, "name": "Only" }],
        "placements": [{ "cardId": "x", "positionId": "p", "isReversed": false }]
    });
    let (status, body) = send(&app, "POST", "/score/explain", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["placements"][0]["cardId"], "x");
    assert_eq!(body["placements"][0]["positionWeight"], 2.0);
    assert_eq!(body["skipped"], 0);
}

#[tokio::test]
async fn reading_lifecycle() {
    let app = test_router();

    let (status, _) = send(&app, "POST", "/score", Some(three_card_payload())).await;
    assert_eq!(status, StatusCode::OK);
    let (_, scored) = send(&app, "POST", "/score", Some(three_card_payload())).await;

    let (status, created) = send(&app, "POST", "/readings", Some(three_card_payload())).await;
    assert_eq!(status, StatusCode::CREATED);
    let reading = &created["reading"];
    assert_eq!(reading["id"], 1);
    assert_eq!(reading["eigenvalue"], scored["eigenvalue"]);
    assert_eq!(reading["method"]["kind"], "manual");
    assert_eq!(reading["deckId"], "rider_waite");
    assert_eq!(created["interpretationSource"], "template");
    assert!(reading["interpretation"]
        .as_str()
        .unwrap()
        .contains("Past: The Sun (Upright)."));

    let (status, notes) = send(
        &app,
        "PUT",
        "/readings/1/notes",
        Some(json!({ "notes": "took it" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(notes["notes"], "took it");
    assert_eq!(notes["eigenvalue"], scored["eigenvalue"]);

    let (status, fetched) = send(&app, "GET", "/readings/1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["notes"], "took it");

    let (status, _) = send(&app, "GET", "/readings/42", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "PUT", "/readings/42/notes", Some(json!({ "notes": null }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_is_newest_first_and_limited() {
    let app = test_router();
    for _ in 0..3 {
        let (status, _) = send(&app, "POST", "/readings", Some(three_card_payload())).await;
        assert_eq!(status, StatusCode::CREATED);
    }
    let (status, list) = send(&app, "GET", "/readings?limit=2", None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, vec![3, 2]);
}

#[tokio::test]
async fn detected_reading_is_ai_assisted() {
    let app = test_router();
    let payload = json!({
        "batch": {
            "spreadId": "three_card",
            "detections": [
                { "label": "The Lovers", "confidence": 0.92 },
                { "label": "two_of_cups", "confidence": 0.88, "isReversed": true },
                { "label": "smudge", "confidence": 0.30 },
                { "label": "Ace of Cups", "confidence": 0.90 }
            ]
        }
    });
    let (status, created) = send(&app, "POST", "/readings/detect", Some(payload)).await;
    assert_eq!(status, StatusCode::CREATED);
    let reading = &created["reading"];
    assert_eq!(reading["method"]["kind"], "ai_assisted");
    assert_eq!(reading["placements"].as_array().map(Vec::len), Some(3));
    assert_eq!(reading["placements"][1]["cardId"], "cups_02");
    assert_eq!(reading["placements"][1]["isReversed"], true);
    assert_eq!(created["dropped"], json!(["smudge"]));

    let payload = json!({ "batch": { "spreadId": "pyramid", "detections": [] } });
    let (status, _) = send(&app, "POST", "/readings/detect", Some(payload)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn photo_router() -> Router {
    let detector = FixedDetector {
        batch: DetectionBatch {
            spread_id: "three_card".into(),
            detections: vec![
                Detection {
                    label: "The Hermit".into(),
                    confidence: 0.9,
                    is_reversed: false,
                },
                Detection {
                    label: "page_of_wands".into(),
                    confidence: 0.7,
                    is_reversed: true,
                },
            ],
        },
    };
    let state = build_state_with_detector(&AppConfig::default(), Arc::new(detector))
        .expect("state with detector");
    create_router(state, None)
}

#[tokio::test]
async fn photo_reading_runs_the_detector() {
    let app = photo_router();
    let (status, created) =
        send_image(&app, "/readings/photo?question=career&deckId=thoth", b"\xff\xd8jpeg").await;
    assert_eq!(status, StatusCode::CREATED);
    let reading = &created["reading"];
    assert_eq!(reading["method"]["kind"], "ai_assisted");
    assert_eq!(reading["spreadId"], "three_card");
    assert_eq!(reading["deckId"], "thoth");
    assert_eq!(reading["question"], "career");
    assert_eq!(reading["placements"][0]["cardId"], "major_09_the_hermit");
    assert_eq!(reading["placements"][1]["isReversed"], true);

    let id = reading["id"].as_u64().unwrap();
    let (status, _) = send(&app, "GET", &format!("/readings/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_image(&app, "/readings/photo", b"").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("empty"));
}

#[tokio::test]
async fn photo_reading_without_detector_is_unavailable() {
    let app = test_router();
    let (status, body) = send_image(&app, "/readings/photo", b"jpeg").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("no card detector"));

    let (_, list) = send(&app, "GET", "/readings", None).await;
    assert_eq!(list.as_array().map(Vec::len), Some(0));
}
