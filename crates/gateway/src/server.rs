//! Router assembly and server startup.

use {
    std::sync::Arc,

    axum::{
        Router,
        routing::{get, post},
    },
    tower_http::cors::{Any, CorsLayer},
    tracing::info,
};

use {
    crate::routes,
    slotgrab_browser::{BrowserSession, LaunchOptions, SessionRegistry},
    slotgrab_config::SlotgrabConfig,
    slotgrab_flow::WizardOptions,
};

/// Shared state behind every route.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<SessionRegistry<BrowserSession>>,
    pub launch: Arc<LaunchOptions>,
    pub wizard: Arc<WizardOptions>,
}

impl AppState {
    pub fn from_config(cfg: &SlotgrabConfig) -> Self {
        Self {
            registry: Arc::new(SessionRegistry::default()),
            launch: Arc::new(LaunchOptions::from(&cfg.browser)),
            wizard: Arc::new(WizardOptions {
                production_url: cfg.booking.production_url.clone(),
                slow_mo_ms: cfg.browser.slow_mo_ms,
            }),
        }
    }
}

/// Build the gateway router. Wide-open CORS, same as the control surface
/// has always exposed to its local frontends.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/start-booking-process", post(routes::start_booking))
        .route("/stop-booking-process", post(routes::stop_booking))
        .route("/get-active-processes", get(routes::active_processes))
        .layer(cors)
        .with_state(state)
}

/// Bind and serve until the process is stopped.
pub async fn run(bind: &str, port: u16, cfg: &SlotgrabConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(cfg);
    let app = build_router(state);

    let addr = format!("{bind}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "gateway listening");
    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}
