use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use camino::Utf8PathBuf;
use rbyte_app_core::{ClientSettings, FilePersistence, LeadPage};
use rbyte_cli::commands::{self, FlowOutcome};
use rbyte_cli::prompt::ScriptedPrompter;
use rbyte_core::{FlowSpec, FormFields, LeadKind};
use rbyte_infra::BackendClient;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

const CURRICULUM: &[u8] = b"%PDF-1.4 fake curriculum";

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

async fn register(State(seen): State<Seen>, Json(body): Json<Value>) -> impl IntoResponse {
    record(&seen, "register", body);
    Json(json!({"id": 7}))
}

async fn curriculum() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/pdf")], CURRICULUM)
}

async fn all_leads() -> impl IntoResponse {
    Json(json!({
        "counts": {
            "registrations": 2, "enrollments": 1,
            "masterclass_registrations": 0, "total_leads": 3
        },
        "recent_leads": {
            "registrations": [{
                "id": 1, "name": "Asha", "email": null, "phone": "9000000000",
                "country_code": "+91", "heard_from": "friend",
                "created_at": "2025-05-01T10:00:00"
            }]
        },
        "timestamp": "2025-05-02T08:00:00"
    }))
}

async fn registrations(Query(q): Query<HashMap<String, String>>) -> impl IntoResponse {
    let page: u32 = q.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    let page_size: u32 = q.get("page_size").and_then(|p| p.parse().ok()).unwrap_or(10);
    Json(json!({
        "items": [{
            "id": 40 + page, "name": "Ravi", "email": "ravi@example.com",
            "phone": "9111111111", "country_code": "+91", "heard_from": null,
            "created_at": "2025-05-01T10:00:00Z"
        }],
        "total": 11, "page": page, "page_size": page_size, "total_pages": 11
    }))
}

async fn start_mock_server() -> (SocketAddr, Seen, tokio::task::JoinHandle<()>) {
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route("/api/send-otp", post(send_otp))
        .route("/api/verify-otp", post(verify_otp))
        .route("/api/register", post(register))
        .route("/api/curriculum", get(curriculum))
        .route("/api/all-leads", get(all_leads))
        .route("/api/registrations", get(registrations))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen, handle)
}

fn client_for(addr: SocketAddr) -> BackendClient {
    let settings = ClientSettings {
        api_base_url: format!("http://{addr}/api"),
        ..Default::default()
    };
    commands::build_client(&settings).unwrap()
}

fn paths(seen: &Seen) -> Vec<String> {
    seen.lock().unwrap().iter().map(|(p, _)| p.clone()).collect()
}

#[tokio::test]
async fn register_flow_recovers_from_a_wrong_code() {
    let (addr, seen, handle) = start_mock_server().await;
    let fields = FormFields {
        name: "Asha".into(),
        ..Default::default()
    };
    let mut prompter = ScriptedPrompter::new(["9000000000", "000000", "r", "12", "123456"]);

    let outcome = commands::cmd_flow(
        client_for(addr),
        FlowSpec::interest(),
        fields,
        &mut prompter,
        None,
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        FlowOutcome::Completed {
            heading: "Thank you, Asha!".into(),
            downloaded: None,
        }
    );
    assert_eq!(prompter.asked[0], "Phone Number");
    assert_eq!(
        paths(&seen),
        ["send-otp", "verify-otp", "send-otp", "verify-otp", "register"]
    );
    let seen = seen.lock().unwrap();
    assert_eq!(
        seen[4].1,
        json!({"name": "Asha", "phone": "9000000000", "country_code": "+91"})
    );

    handle.abort();
}

#[tokio::test]
async fn editing_the_phone_sends_a_new_code_to_the_new_number() {
    let (addr, seen, handle) = start_mock_server().await;
    let fields = FormFields {
        name: "Asha".into(),
        phone: "9000000000".into(),
        ..Default::default()
    };
    let mut prompter = ScriptedPrompter::new(["e", "9222222222", "123456"]);

    let outcome = commands::cmd_flow(
        client_for(addr),
        FlowSpec::interest(),
        fields,
        &mut prompter,
        None,
    )
    .await
    .unwrap();
    assert!(matches!(outcome, FlowOutcome::Completed { .. }));

    let seen = seen.lock().unwrap();
    let sends: Vec<&Value> = seen
        .iter()
        .filter(|(p, _)| p == "send-otp")
        .map(|(_, b)| &b["phone"])
        .collect();
    assert_eq!(sends, [&json!("9000000000"), &json!("9222222222")]);
    assert_eq!(seen.last().unwrap().1["phone"], "9222222222");

    handle.abort();
}

#[tokio::test]
async fn closing_at_the_code_prompt_submits_nothing() {
    let (addr, seen, handle) = start_mock_server().await;
    let fields = FormFields {
        name: "Asha".into(),
        phone: "9000000000".into(),
        ..Default::default()
    };
    let mut prompter = ScriptedPrompter::new([""]);

    let outcome = commands::cmd_flow(
        client_for(addr),
        FlowSpec::interest(),
        fields,
        &mut prompter,
        None,
    )
    .await
    .unwrap();

    assert_eq!(outcome, FlowOutcome::Closed);
    assert_eq!(paths(&seen), ["send-otp"]);

    handle.abort();
}

#[tokio::test]
async fn syllabus_flow_downloads_the_curriculum() {
    let (addr, _seen, handle) = start_mock_server().await;
    let dir = tempdir().unwrap();
    let target = Utf8PathBuf::from_path_buf(dir.path().join("syllabus.pdf")).unwrap();
    let fields = FormFields {
        name: "Asha".into(),
        phone: "9000000000".into(),
        ..Default::default()
    };
    let mut prompter = ScriptedPrompter::new(["123456"]);

    let outcome = commands::cmd_flow(
        client_for(addr),
        FlowSpec::syllabus_download(),
        fields,
        &mut prompter,
        Some(target.clone()),
    )
    .await
    .unwrap();

    assert_eq!(
        outcome,
        FlowOutcome::Completed {
            heading: "Thank you, Asha!".into(),
            downloaded: Some(CURRICULUM.len() as u64),
        }
    );
    assert_eq!(std::fs::read(&target).unwrap(), CURRICULUM);

    handle.abort();
}

#[tokio::test]
async fn curriculum_without_output_only_prints_the_link() {
    let (addr, _seen, handle) = start_mock_server().await;
    let written = commands::cmd_curriculum(&client_for(addr), None)
        .await
        .unwrap();
    assert_eq!(written, None);
    handle.abort();
}

#[tokio::test]
async fn leads_listing_and_overview() {
    let (addr, _seen, handle) = start_mock_server().await;

    let page = commands::cmd_leads_list(client_for(addr), LeadKind::Registrations, 2, 5)
        .await
        .unwrap();
    match page {
        LeadPage::Registrations(p) => {
            assert_eq!(p.page, 2);
            assert_eq!(p.page_size, 5);
            assert_eq!(p.items[0].id, 42);
        }
        other => panic!("unexpected page {other:?}"),
    }

    let overview = commands::cmd_leads_overview(client_for(addr)).await.unwrap();
    assert_eq!(overview.counts.total_leads, 3);
    assert_eq!(overview.recent_leads.registrations[0].name, "Asha");

    // no route for enrollments
    let err = commands::cmd_leads_list(client_for(addr), LeadKind::Enrollments, 1, 10)
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Failed to load enrollments"));

    handle.abort();
}

#[test]
fn settings_round_trip_through_the_settings_file() {
    let dir = tempdir().unwrap();
    let repo = FilePersistence::in_dir(dir.path());

    let shown = commands::cmd_settings_show(&repo).unwrap();
    assert_eq!(shown, ClientSettings::default());

    commands::cmd_settings_set(&repo, "default_country_code", "+44").unwrap();
    commands::cmd_settings_set(&repo, "page_size", "20").unwrap();
    assert!(commands::cmd_settings_set(&repo, "page_size", "0").is_err());
    assert!(commands::cmd_settings_set(&repo, "colour", "blue").is_err());

    let shown = commands::cmd_settings_show(&repo).unwrap();
    assert_eq!(shown.default_country_code, "+44");
    assert_eq!(shown.page_size, 20);
}

#[test]
fn catalog_search_and_categories() {
    let dir = tempdir().unwrap();
    let file = Utf8PathBuf::from_path_buf(dir.path().join("masterclasses.json")).unwrap();
    let catalog = json!({
        "masterclasses": [
            {
                "id": "genai-101", "title": "GenAI Foundations",
                "shortDescription": "Prompting and retrieval basics",
                "date": "2025-06-01", "time": "18:00", "duration": "2h",
                "instructor": {"name": "Meera Rao", "title": "ML Engineer"},
                "category": "AI", "tags": ["llm", "rag"], "isFeatured": true
            },
            {
                "id": "web-201", "title": "Modern Frontends",
                "shortDescription": "Shipping fast web apps",
                "date": "2025-06-08", "time": "18:00", "duration": "90m",
                "instructor": {"name": "Kiran Das", "title": "Staff Engineer"},
                "category": "Web"
            }
        ]
    });
    std::fs::write(&file, catalog.to_string()).unwrap();

    assert_eq!(
        commands::cmd_catalog_categories(&file).unwrap(),
        ["AI", "Web"]
    );

    let hits = commands::cmd_catalog_search(&file, "RAG", None).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "genai-101");

    assert!(commands::cmd_catalog_search(&file, "", Some("Web"))
        .unwrap()
        .iter()
        .all(|m| m.category == "Web"));
    assert!(commands::cmd_catalog_search(&file, "llm", Some("Web"))
        .unwrap()
        .is_empty());

    let missing = file.with_file_name("nope.json");
    assert!(commands::cmd_catalog_search(&missing, "", None).is_err());
}
