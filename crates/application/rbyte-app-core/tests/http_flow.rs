use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use rbyte_app_core::{HttpLeadsBackend, LeadPage, LeadsDashboard, OtpFlow, ToastStore};
use rbyte_core::{FlowSpec, FormFields, LeadKind, Step};
use rbyte_infra::BackendClient;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

type Seen = Arc<Mutex<Vec<(String, Value)>>>;

fn record(seen: &Seen, path: &str, body: Value) {
    seen.lock().unwrap().push((path.to_string(), body));
}

async fn send_otp(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    record(&seen, "send-otp", body);
    Json(json!({"message": "OTP sent successfully"}))
}

async fn verify_otp(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    let ok = body["otp"] == "123456";
    record(&seen, "verify-otp", body);
    if ok {
        (StatusCode::OK, Json(json!({"verified": true})))
    } else {
        (StatusCode::BAD_REQUEST, Json(json!({"detail": "Invalid OTP"})))
    }
}

async fn masterclass_register(
    State(seen): State<Seen>,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    record(&seen, "masterclass-register", body);
    Json(json!({"id": 1}))
}

async fn register_misrouted() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/html")],
        "<html><body>proxy error</body></html>",
    )
}

async fn registrations(Query(q): Query<HashMap<String, String>>) -> impl IntoResponse {
    let page: u32 = q.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let page_size: u32 = q.get("page_size").and_then(|p| p.parse().ok()).unwrap_or(10);
    let items: Vec<Value> = (0..page_size.min(2))
        .map(|i| {
            json!({
                "id": page * 100 + i, "name": format!("Lead {i}"), "email": null,
                "phone": "9000000000", "country_code": "+91", "heard_from": null,
                "created_at": "2025-05-01T10:00:00"
            })
        })
        .collect();
    Json(json!({
        "items": items, "total": 25, "page": page, "page_size": page_size, "total_pages": 3
    }))
}

async fn enrollments_down() -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({"error": "database unavailable"})),
    )
}

async fn start_server() -> (SocketAddr, Seen, tokio::task::JoinHandle<()>) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/send-otp", post(send_otp))
        .route("/api/verify-otp", post(verify_otp))
        .route("/api/masterclass-register", post(masterclass_register))
        .route("/api/register", post(register_misrouted))
        .route("/api/registrations", get(registrations))
        .route("/api/enrollments", get(enrollments_down))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen, handle)
}

fn backend_for(addr: SocketAddr) -> HttpLeadsBackend {
    let client = BackendClient::new(reqwest::Client::new(), &format!("http://{addr}/api")).unwrap();
    HttpLeadsBackend::new(client)
}

fn asha() -> FormFields {
    FormFields {
        name: " Asha ".into(),
        email: "asha@example.com".into(),
        phone: "9000000000".into(),
        ..Default::default()
    }
}

#[tokio::test]
async fn masterclass_registration_end_to_end() {
    let (addr, seen, handle) = start_server().await;
    let flow = OtpFlow::new(
        FlowSpec::masterclass(Some("genai-101".into())),
        backend_for(addr),
        ToastStore::new(),
    );
    flow.prefill(asha()).unwrap();

    flow.submit_form().await.unwrap();
    assert_eq!(flow.state().step, Step::Otp);

    flow.paste_otp(0, "000000").unwrap();
    flow.verify_and_submit().await.unwrap_err();
    assert_eq!(flow.state().otp_error.as_deref(), Some("Invalid OTP"));

    flow.resend_otp().await.unwrap();
    flow.paste_otp(0, "123456").unwrap();
    flow.verify_and_submit().await.unwrap();
    assert_eq!(flow.state().step, Step::Success);

    let seen = seen.lock().unwrap().clone();
    let paths: Vec<&str> = seen.iter().map(|(p, _)| p.as_str()).collect();
    assert_eq!(
        paths,
        [
            "send-otp",
            "verify-otp",
            "send-otp",
            "verify-otp",
            "masterclass-register"
        ]
    );
    assert_eq!(
        seen[0].1,
        json!({"phone": "9000000000", "country_code": "+91"})
    );
    assert_eq!(
        seen[4].1,
        json!({
            "name": "Asha", "phone": "9000000000", "country_code": "+91",
            "email": "asha@example.com", "masterclass_id": "genai-101"
        })
    );

    handle.abort();
}

#[tokio::test]
async fn misrouted_endpoint_surfaces_the_non_json_message() {
    let (addr, _seen, handle) = start_server().await;
    let flow = OtpFlow::new(FlowSpec::interest(), backend_for(addr), ToastStore::new());
    flow.prefill(asha()).unwrap();

    flow.submit_form().await.unwrap();
    flow.paste_otp(0, "123456").unwrap();
    flow.verify_and_submit().await.unwrap_err();

    let state = flow.state();
    assert_eq!(state.step, Step::Otp);
    assert_eq!(
        state.otp_error.as_deref(),
        Some("Server returned non-JSON response. The API endpoint might be incorrect.")
    );

    handle.abort();
}

#[tokio::test]
async fn dashboard_pages_forward_and_back() {
    let (addr, _seen, handle) = start_server().await;
    let mut dashboard = LeadsDashboard::new(backend_for(addr), 10);

    dashboard.load_page(LeadKind::Registrations, 1).await;
    let tab = dashboard.state().tab(LeadKind::Registrations);
    assert_eq!(tab.page, 1);
    assert!(tab.has_next());
    assert!(!tab.has_prev());
    match tab.data.as_ref().unwrap() {
        LeadPage::Registrations(p) => {
            assert_eq!(p.items.len(), 2);
            assert_eq!(p.items[0].id, 100);
        }
        other => panic!("unexpected page {other:?}"),
    }

    dashboard.next_page(LeadKind::Registrations).await;
    dashboard.next_page(LeadKind::Registrations).await;
    assert_eq!(dashboard.state().tab(LeadKind::Registrations).page, 3);
    // already on the last page
    dashboard.next_page(LeadKind::Registrations).await;
    assert_eq!(dashboard.state().tab(LeadKind::Registrations).page, 3);

    dashboard.prev_page(LeadKind::Registrations).await;
    let tab = dashboard.state().tab(LeadKind::Registrations);
    assert_eq!(tab.page, 2);
    assert_eq!(tab.data.as_ref().unwrap().total(), 25);

    handle.abort();
}

#[tokio::test]
async fn dashboard_failures_are_recorded_per_tab() {
    let (addr, _seen, handle) = start_server().await;
    let mut dashboard = LeadsDashboard::new(backend_for(addr), 10);

    dashboard.load_page(LeadKind::Enrollments, 1).await;
    let tab = dashboard.state().tab(LeadKind::Enrollments);
    assert!(!tab.loading);
    assert_eq!(tab.error.as_deref(), Some("database unavailable"));
    assert!(tab.data.is_none());

    // no /all-leads route: axum answers 404 with an empty non-JSON body
    dashboard.refresh_overview().await;
    assert!(dashboard.state().overview.is_none());
    assert!(dashboard.state().overview_error.is_some());

    assert!(dashboard
        .state()
        .tab(LeadKind::Registrations)
        .error
        .is_none());

    handle.abort();
}
