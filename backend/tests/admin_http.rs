mod common;

use std::fs;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use common::{harness, initial_settings, temp_dir, Call, Harness};
use dart_machine_server::app::AppState;
use dart_machine_server::http;
use tower::ServiceExt;

fn app(h: &Harness, device_dir: std::path::PathBuf) -> Router {
    http::router(AppState::new(h.coordinator.clone(), device_dir))
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = hyper::body::to_bytes(response.into_body())
        .await
        .expect("read body");
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

#[tokio::test]
async fn machine_update_redirects_to_admin() {
    let h = harness();
    let dir = temp_dir("http-machine");
    let response = app(&h, dir.clone())
        .oneshot(form_post(
            "/updateMachine",
            "delay=6&thresh=1800&serial=%2Fdev%2FttyACM0",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/admin");
    assert_eq!(h.store.current().await.machine.waiting_time, 6);
    assert_eq!(h.connector.calls().len(), 1);

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn malformed_integers_leave_state_untouched() {
    let h = harness();
    let dir = temp_dir("http-malformed");
    for body in [
        "delay=abc&thresh=1800&serial=%2Fdev%2FttyUSB0",
        "delay=4&thresh=high&serial=%2Fdev%2FttyUSB0",
        "delay=-1&thresh=1800&serial=%2Fdev%2FttyUSB0",
        "thresh=1800&serial=%2Fdev%2FttyUSB0",
    ] {
        let response = app(&h, dir.clone())
            .oneshot(form_post("/updateMachine", body))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
    }

    assert_eq!(h.store.current().await, initial_settings());
    assert_eq!(h.backend.saved(), Some(initial_settings()));
    assert!(h.connector.calls().is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn machine_persist_failure_is_a_client_error() {
    let h = harness();
    h.backend.fail_saves();
    let dir = temp_dir("http-persist");
    let response = app(&h, dir.clone())
        .oneshot(form_post(
            "/updateMachine",
            "delay=5&thresh=1700&serial=%2Fdev%2FttyACM0",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Error when updating machine settings");
    assert_eq!(h.store.current().await.machine.piezo_threshold, 1700);

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn not_found_marker_keeps_serial_device() {
    let h = harness();
    let dir = temp_dir("http-marker");
    let response = app(&h, dir.clone())
        .oneshot(form_post(
            "/updateMachine",
            "delay=5&thresh=1800&serial=Arduino+not+found",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(h.store.current().await.machine.serial_device, "/dev/ttyACM0");
    assert!(h.connector.calls().is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn failed_connection_check_still_redirects() {
    let h = harness();
    h.connector.fail_check_with("unreachable");
    let dir = temp_dir("http-scoreboard");
    let response = app(&h, dir.clone())
        .oneshot(form_post(
            "/updateScoreboard",
            "sbprot=on&sbhost=board.example&sbport=443&sbgame=dascr&sbuser=admin&sbpass=admin",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let scoreboard = h.store.current().await.scoreboard;
    assert_eq!(scoreboard.last_error, "unreachable");
    assert!(scoreboard.endpoint.https);
    assert_eq!(scoreboard.endpoint.host, "board.example");
    assert_eq!(
        h.connector.calls()[1..],
        [Call::CheckConnection, Call::ReloadWebsocket]
    );

    let page = app(&h, dir.clone())
        .oneshot(
            Request::builder()
                .uri("/admin")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("response");
    assert_eq!(page.status(), StatusCode::OK);
    assert!(body_text(page).await.contains("Connection check failed: unreachable"));

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn missing_protocol_checkbox_means_http() {
    let h = harness();
    let dir = temp_dir("http-protocol");
    let response = app(&h, dir.clone())
        .oneshot(form_post(
            "/updateScoreboard",
            "sbhost=scoreboard.local&sbport=8000&sbgame=dascr&sbuser=admin&sbpass=admin",
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert!(!h.store.current().await.scoreboard.endpoint.https);
    assert_eq!(
        h.connector.calls(),
        vec![Call::CheckConnection, Call::ReloadWebsocket]
    );

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn admin_page_lists_discovered_devices() {
    let h = harness();
    let dir = temp_dir("http-devices");
    let page = app(&h, dir.clone())
        .oneshot(Request::builder().uri("/admin").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let html = body_text(page).await;
    assert!(html.contains(">Arduino not found</option>"));

    fs::write(dir.join("ttyUSB0"), b"").expect("fake device");
    let page = app(&h, dir.clone())
        .oneshot(Request::builder().uri("/admin").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let html = body_text(page).await;
    let device = dir.join("ttyUSB0").to_string_lossy().to_string();
    assert!(html.contains(&format!("<option value=\"{device}\">")));
    assert!(!html.contains("Arduino not found"));

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn serves_bundled_assets() {
    let h = harness();
    let dir = temp_dir("http-assets");
    let index = app(&h, dir.clone())
        .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(index.status(), StatusCode::OK);
    assert!(body_text(index).await.contains("href=\"/admin\""));

    let css = app(&h, dir.clone())
        .oneshot(
            Request::builder()
                .uri("/static/admin.css")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(css.status(), StatusCode::OK);
    assert_eq!(css.headers()[header::CONTENT_TYPE], "text/css; charset=utf-8");

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn unreadable_forms_are_client_errors() {
    let h = harness();
    let dir = temp_dir("http-rejection");
    let json = Request::builder()
        .method("POST")
        .uri("/updateMachine")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"delay":"5"}"#))
        .expect("build request");
    let response = app(&h, dir.clone()).oneshot(json).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Error when updating machine settings");

    let response = app(&h, dir.clone())
        .oneshot(form_post(
            "/updateMachine",
            "delay=5&delay=6&thresh=1800&serial=%2Fdev%2FttyACM0",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let plain = Request::builder()
        .method("POST")
        .uri("/updateScoreboard")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("sbhost=board.example"))
        .expect("build request");
    let response = app(&h, dir.clone()).oneshot(plain).await.expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Error when updating scoreboard settings");

    assert_eq!(h.store.current().await, initial_settings());
    assert!(h.connector.calls().is_empty());

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn websocket_warning_is_shown_on_admin_page() {
    let h = harness();
    h.connector.fail_websocket();
    let dir = temp_dir("http-websocket");
    let response = app(&h, dir.clone())
        .oneshot(form_post(
            "/updateScoreboard",
            "sbhost=scoreboard.local&sbport=8000&sbgame=dascr&sbuser=admin&sbpass=admin",
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let page = app(&h, dir.clone())
        .oneshot(Request::builder().uri("/admin").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    let html = body_text(page).await;
    assert!(html.contains("<li>websocket: connection refused</li>"));
    assert!(!html.contains("Connection check failed"));

    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn marker_submission_keeps_device_chosen_by_concurrent_update() {
    let h = harness();
    let dir = temp_dir("http-marker-race");
    let gate = h.connector.hold_next_piezo();
    let switch_device = tokio::spawn(app(&h, dir.clone()).oneshot(form_post(
        "/updateMachine",
        "delay=5&thresh=1700&serial=%2Fdev%2FttyUSB0",
    )));
    h.connector.piezo_parked().await;

    let keep_device = tokio::spawn(app(&h, dir.clone()).oneshot(form_post(
        "/updateMachine",
        "delay=5&thresh=1700&serial=Arduino+not+found",
    )));
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    gate.notify_one();

    let first = switch_device.await.expect("join").expect("response");
    let second = keep_device.await.expect("join").expect("response");
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    assert_eq!(second.status(), StatusCode::SEE_OTHER);

    let reloads: Vec<Call> = h
        .connector
        .calls()
        .into_iter()
        .filter(|call| matches!(call, Call::ReloadSerial(_)))
        .collect();
    assert_eq!(reloads, vec![Call::ReloadSerial("/dev/ttyUSB0".to_string())]);
    assert_eq!(h.store.current().await.machine.serial_device, "/dev/ttyUSB0");

    let _ = fs::remove_dir_all(&dir);
}
