//! Booking-process endpoints.
//!
//! `POST /start-booking-process` launches a browser, runs the whole flow,
//! and only then responds, so a success response means the booking reached
//! the final confirmation. `POST /stop-booking-process` closes a session's
//! browser, which also cancels any in-flight run. `GET
//! /get-active-processes` lists live session ids.

use {
    axum::{Json, extract::State, http::StatusCode, response::IntoResponse},
    chrono::{DateTime, Utc},
    secrecy::Secret,
    serde::Deserialize,
    serde_json::json,
    tracing::{error, info, warn},
};

use {
    crate::server::AppState,
    slotgrab_browser::{BrowserSession, Engine},
    slotgrab_flow::{BookingConfig, LineCredentials, wizard},
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub process_id: String,
    pub browser_type: String,
    pub config: BookingConfigBody,
}

/// Wire shape of the per-run booking parameters.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingConfigBody {
    pub branch: String,
    pub date: String,
    pub time: String,
    pub line_email: Option<String>,
    pub line_password: Option<Secret<String>>,
    #[serde(default)]
    pub is_test_mode: bool,
    pub test_site_url: Option<String>,
    pub target_booking_time: Option<DateTime<Utc>>,
}

impl BookingConfigBody {
    /// Credentials count only when both halves are present.
    fn into_flow(self) -> BookingConfig {
        let credentials = self
            .line_email
            .zip(self.line_password)
            .map(|(email, password)| LineCredentials { email, password });
        BookingConfig {
            branch: self.branch,
            date: self.date,
            time: self.time,
            credentials,
            test_mode: self.is_test_mode,
            test_site_url: self.test_site_url,
            target_booking_time: self.target_booking_time,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StopRequest {
    pub process_id: String,
}

pub async fn start_booking(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> impl IntoResponse {
    let session_id = req.process_id;

    let Some(engine) = Engine::parse(&req.browser_type) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": "error",
                "message": format!("Invalid browser type '{}'", req.browser_type),
            })),
        );
    };

    if state.registry.contains(&session_id).await {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "status": "error",
                "message": format!("Process ID '{session_id}' is already running"),
            })),
        );
    }

    info!(session_id, %engine, "starting booking process");
    let session = match BrowserSession::launch(&session_id, engine, &state.launch).await {
        Ok(session) => session,
        Err(err) => {
            error!(session_id, %engine, %err, "failed to launch browser");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": format!("Failed to launch browser: {err}"),
                })),
            );
        },
    };

    let page = session.page();
    let entry = match state.registry.insert(&session_id, session).await {
        Ok(entry) => entry,
        Err(err) => {
            // Lost a start race for the same id; the extra session was
            // dropped, which kills its spawned browser process.
            warn!(session_id, %err, "concurrent start for the same session id");
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "status": "error",
                    "message": format!("Process ID '{session_id}' is already running"),
                })),
            );
        },
    };

    let cfg = req.config.into_flow();
    let result = wizard::run(&page, &session_id, &cfg, &state.wizard).await;

    // The session is released on both outcomes; a run never outlives its
    // response.
    state.registry.remove(&session_id).await;
    if let Err(err) = entry.lock().await.close().await {
        warn!(session_id, %err, "failed to close browser after run");
    }

    match result {
        Ok(()) => {
            info!(session_id, "booking process finished");
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "message": format!("Booking process '{session_id}' completed successfully"),
                })),
            )
        },
        Err(err) => {
            error!(session_id, %err, "booking process failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": format!("Booking process '{session_id}' failed: {err}"),
                })),
            )
        },
    }
}

pub async fn stop_booking(
    State(state): State<AppState>,
    Json(req): Json<StopRequest>,
) -> impl IntoResponse {
    let session_id = req.process_id;

    let Some(entry) = state.registry.get(&session_id).await else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({
                "status": "error",
                "message": format!("Process ID '{session_id}' not found or not running"),
            })),
        );
    };

    info!(session_id, "stopping booking process");
    match entry.lock().await.close().await {
        Ok(()) => {
            state.registry.remove(&session_id).await;
            (
                StatusCode::OK,
                Json(json!({
                    "status": "success",
                    "message": format!("Process '{session_id}' stopped successfully"),
                })),
            )
        },
        // The entry stays registered so the operator can retry the stop.
        Err(err) => {
            error!(session_id, %err, "failed to stop booking process");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "error",
                    "message": format!("Failed to stop process '{session_id}': {err}"),
                })),
            )
        },
    }
}

pub async fn active_processes(State(state): State<AppState>) -> impl IntoResponse {
    let ids = state.registry.ids().await;
    (
        StatusCode::OK,
        Json(json!({
            "status": "success",
            "activeProcesses": ids,
        })),
    )
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        axum::{
            body::Body,
            http::{Request, header},
        },
        http_body_util::BodyExt,
        tower::ServiceExt,
    };

    use {
        super::*,
        crate::server::build_router,
        slotgrab_config::SlotgrabConfig,
    };

    fn test_state() -> AppState {
        AppState::from_config(&SlotgrabConfig::default())
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn active_processes_starts_empty() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/get-active-processes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["activeProcesses"], json!([]));
    }

    #[tokio::test]
    async fn stop_unknown_session_is_not_found() {
        let app = build_router(test_state());
        let response = app
            .oneshot(post("/stop-booking-process", json!({"processId": "nope"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn start_rejects_unknown_browser_type() {
        let app = build_router(test_state());
        let response = app
            .oneshot(post(
                "/start-booking-process",
                json!({
                    "processId": "run-1",
                    "browserType": "netscape",
                    "config": {"branch": "Terminal 21", "date": "12", "time": "10:00"},
                }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert!(
            body["message"]
                .as_str()
                .unwrap()
                .contains("Invalid browser type")
        );
    }

    #[tokio::test]
    async fn malformed_body_is_a_client_error() {
        let app = build_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/start-booking-process")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[test]
    fn credentials_need_both_email_and_password() {
        let body = BookingConfigBody {
            branch: "Terminal 21".into(),
            date: "12".into(),
            time: "10:00".into(),
            line_email: Some("user@example.com".into()),
            line_password: None,
            is_test_mode: true,
            test_site_url: Some("http://localhost:3000".into()),
            target_booking_time: None,
        };
        let cfg = body.into_flow();
        assert!(cfg.credentials.is_none());
        assert!(cfg.test_mode);
    }

    #[test]
    fn wire_field_names_are_camel_case() {
        let req: StartRequest = serde_json::from_value(json!({
            "processId": "run-1",
            "browserType": "chrome",
            "config": {
                "branch": "Central World",
                "date": "12",
                "time": "10:00",
                "lineEmail": "user@example.com",
                "linePassword": "hunter2",
                "isTestMode": false,
                "targetBookingTime": "2026-08-23T10:00:00Z",
            },
        }))
        .unwrap();

        assert_eq!(req.process_id, "run-1");
        assert_eq!(req.browser_type, "chrome");
        let cfg = req.config.into_flow();
        assert!(cfg.credentials.is_some());
        assert!(cfg.target_booking_time.is_some());
        assert!(!cfg.test_mode);
    }
}
