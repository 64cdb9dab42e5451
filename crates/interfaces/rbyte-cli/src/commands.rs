use crate::prompt::Prompter;
use anyhow::{bail, Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use chrono::{DateTime, Utc};
use humansize::{format_size, DECIMAL};
use indicatif::{ProgressBar, ProgressStyle};
use rbyte_app_core::{
    ClientSettings, FlowError, HttpLeadsBackend, LeadPage, LeadsDashboard, OtpFlow,
    SettingsRepo, ToastStore, ToastViewModel,
};
use rbyte_config::OTP_LENGTH;
use rbyte_core::{
    AllLeads, Catalog, FlowSpec, FormField, FormFields, LeadKind, Masterclass, Step, ToastId,
    ValidationError,
};
use rbyte_infra::BackendClient;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::debug;

const OTP_PROMPT: &str = "Code (r = resend, e = edit phone, empty = close)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    Completed {
        heading: String,
        /// Bytes written when the curriculum was downloaded.
        downloaded: Option<u64>,
    },
    Closed,
}

pub fn build_client(settings: &ClientSettings) -> Result<BackendClient> {
    let timeout = Duration::from_secs(settings.request_timeout_secs);
    let http = rbyte_infra::default_http_client(timeout).context("Failed to build HTTP client")?;
    BackendClient::new(http, &settings.api_base_url).context("Invalid API base URL")
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Fields to ask for again after the form was rejected.
fn fields_to_fix(err: &ValidationError) -> Vec<FormField> {
    match err {
        ValidationError::MissingFields(fields) => fields.clone(),
        ValidationError::UnsupportedCountryCode(_) => vec![FormField::CountryCode],
        ValidationError::InvalidPhone => vec![FormField::Phone],
    }
}

/// Ask for each field in turn. Returns false if the prompter ran dry.
fn ask_fields(
    flow: &OtpFlow<HttpLeadsBackend>,
    fields: &[FormField],
    prompter: &mut impl Prompter,
) -> Result<bool> {
    for field in fields {
        let Some(value) = prompter.ask(field.label())? else {
            return Ok(false);
        };
        flow.set_field(*field, value.trim())?;
    }
    Ok(true)
}

/// Drive one form → OTP → success flow against the backend.
pub async fn cmd_flow(
    client: BackendClient,
    spec: FlowSpec,
    fields: FormFields,
    prompter: &mut impl Prompter,
    download: Option<Utf8PathBuf>,
) -> Result<FlowOutcome> {
    println!(":: {}", spec.title);

    let toasts = ToastStore::new();
    let printed: Arc<Mutex<HashSet<ToastId>>> = Arc::default();
    let _toast_printer = toasts
        .subscribe(move |current| {
            let mut printed = printed.lock().unwrap();
            for toast in current {
                if printed.insert(toast.id) {
                    let vm = ToastViewModel::from(toast);
                    let marker = if vm.is_error { "!!" } else { "::" };
                    if vm.description.is_empty() {
                        println!("{marker} {}", vm.title);
                    } else {
                        println!("{marker} {}: {}", vm.title, vm.description);
                    }
                }
            }
        })
        .unsubscribe_on_drop();

    let flow = OtpFlow::new(spec, HttpLeadsBackend::new(client.clone()), toasts);
    flow.prefill(fields)?;

    let missing: Vec<FormField> = flow
        .spec()
        .required
        .iter()
        .copied()
        .filter(|f| flow.state().fields.is_blank(*f))
        .collect();
    if !ask_fields(&flow, &missing, prompter)? {
        flow.close();
        return Ok(FlowOutcome::Closed);
    }

    loop {
        match flow.state().step {
            Step::Form => {
                let pb = spinner("Sending OTP...");
                let res = flow.submit_form().await;
                pb.finish_and_clear();
                match res {
                    Ok(()) => {
                        if let Some(hint) = flow.view_model().otp_hint {
                            println!("   {hint}");
                        }
                    }
                    Err(FlowError::Validation(e)) => {
                        if !ask_fields(&flow, &fields_to_fix(&e), prompter)? {
                            flow.close();
                            return Ok(FlowOutcome::Closed);
                        }
                    }
                    Err(FlowError::Backend(msg)) => {
                        bail!("Could not send the verification code: {msg}")
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Step::Otp => {
                let answer = prompter.ask(OTP_PROMPT)?;
                match answer.as_deref().map(str::trim) {
                    None | Some("") => {
                        flow.close();
                        println!(":: Closed.");
                        return Ok(FlowOutcome::Closed);
                    }
                    Some("r") => {
                        let pb = spinner("Resending OTP...");
                        let res = flow.resend_otp().await;
                        pb.finish_and_clear();
                        match res {
                            // the toast already said what went wrong
                            Ok(()) | Err(FlowError::Backend(_)) => {}
                            Err(e) => return Err(e.into()),
                        }
                    }
                    Some("e") => {
                        flow.edit_phone_number()?;
                        if !ask_fields(&flow, &[FormField::Phone], prompter)? {
                            flow.close();
                            return Ok(FlowOutcome::Closed);
                        }
                    }
                    Some(code) => {
                        if code.len() != OTP_LENGTH || !code.chars().all(|c| c.is_ascii_digit())
                        {
                            println!("   Enter all {OTP_LENGTH} digits of the code.");
                            continue;
                        }
                        flow.paste_otp(0, code)?;
                        let pb = spinner("Verifying...");
                        let res = flow.verify_and_submit().await;
                        pb.finish_and_clear();
                        match res {
                            Ok(()) => {}
                            Err(FlowError::Backend(_)) => {
                                debug!("verification rejected, asking again");
                            }
                            Err(e) => return Err(e.into()),
                        }
                    }
                }
            }
            Step::Success => break,
        }
    }

    let vm = flow.view_model();
    let heading = vm.success_heading.clone().unwrap_or_default();
    println!(":: {heading}");
    if let Some(message) = &vm.success_message {
        println!("   {message}");
    }

    let mut downloaded = None;
    if vm.offers_curriculum {
        match download {
            Some(target) => downloaded = Some(cmd_curriculum_download(&client, &target).await?),
            None => println!("   Curriculum: {}", client.curriculum_url()?),
        }
    }

    Ok(FlowOutcome::Completed {
        heading,
        downloaded,
    })
}

async fn cmd_curriculum_download(client: &BackendClient, target: &Utf8Path) -> Result<u64> {
    let pb = spinner("Downloading curriculum...");
    let res = client.download_curriculum(target).await;
    pb.finish_and_clear();
    let bytes = res.with_context(|| format!("Failed to download curriculum to {target}"))?;
    println!(
        ":: Saved curriculum to {} ({})",
        target,
        format_size(bytes, DECIMAL)
    );
    Ok(bytes)
}

/// Print the curriculum link, or fetch the file when `output` is given.
pub async fn cmd_curriculum(
    client: &BackendClient,
    output: Option<Utf8PathBuf>,
) -> Result<Option<u64>> {
    match output {
        Some(target) => Ok(Some(cmd_curriculum_download(client, &target).await?)),
        None => {
            println!(":: Curriculum: {}", client.curriculum_url()?);
            Ok(None)
        }
    }
}

pub async fn cmd_leads_overview(client: BackendClient) -> Result<AllLeads> {
    let mut dashboard = LeadsDashboard::new(HttpLeadsBackend::new(client), 1);
    dashboard.refresh_overview().await;

    let state = dashboard.state();
    if let Some(err) = &state.overview_error {
        bail!("Failed to load leads overview: {err}");
    }
    let Some(leads) = state.overview.clone() else {
        bail!("Failed to load leads overview");
    };

    println!(":: Leads as of {}", leads.timestamp);
    println!("   Registrations:             {}", leads.counts.registrations);
    println!("   Enrollments:               {}", leads.counts.enrollments);
    println!(
        "   Masterclass registrations: {}",
        leads.counts.masterclass_registrations
    );
    println!("   Total:                     {}", leads.counts.total_leads);

    let recent = &leads.recent_leads;
    if !recent.registrations.is_empty() {
        println!(":: Recent registrations");
        for r in &recent.registrations {
            println!("   {} {} {}", r.name, r.country_code, r.phone);
        }
    }
    if !recent.enrollments.is_empty() {
        println!(":: Recent enrollments");
        for e in &recent.enrollments {
            println!("   {} <{}> {}", e.name, e.email, e.preferred_batch);
        }
    }
    if !recent.masterclass_registrations.is_empty() {
        println!(":: Recent masterclass registrations");
        for m in &recent.masterclass_registrations {
            println!("   {} {} {}", m.name, m.country_code, m.phone);
        }
    }

    Ok(leads)
}

fn when(ts: Option<DateTime<Utc>>, raw: &str) -> String {
    ts.map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}

pub async fn cmd_leads_list(
    client: BackendClient,
    kind: LeadKind,
    page: u32,
    page_size: u32,
) -> Result<LeadPage> {
    let mut dashboard = LeadsDashboard::new(HttpLeadsBackend::new(client), page_size);
    dashboard.load_page(kind, page).await;

    let tab = dashboard.state().tab(kind);
    if let Some(err) = &tab.error {
        bail!("Failed to load {}: {err}", kind.label().to_lowercase());
    }
    let Some(data) = tab.data.clone() else {
        bail!("Failed to load {}", kind.label().to_lowercase());
    };

    println!(
        ":: {} (page {} of {}, {} total)",
        kind.label(),
        data.page(),
        data.total_pages().max(1),
        data.total()
    );
    match &data {
        LeadPage::Registrations(p) => {
            for r in &p.items {
                println!(
                    "   #{:<5} {:<24} {} {:<14} {:<20} {}",
                    r.id,
                    r.name,
                    r.country_code,
                    r.phone,
                    r.heard_from.as_deref().unwrap_or("-"),
                    when(r.created_at_utc(), &r.created_at)
                );
            }
        }
        LeadPage::Enrollments(p) => {
            for e in &p.items {
                println!(
                    "   #{:<5} {:<24} {:<28} {:<8} {:<7} {}",
                    e.id,
                    e.name,
                    e.email,
                    e.preferred_batch,
                    if e.payment_status { "paid" } else { "unpaid" },
                    when(e.created_at_utc(), &e.created_at)
                );
            }
        }
        LeadPage::MasterclassRegistrations(p) => {
            for m in &p.items {
                println!(
                    "   #{:<5} {:<24} {} {:<14} {:<9} {}",
                    m.id,
                    m.name,
                    m.country_code,
                    m.phone,
                    if m.attended { "attended" } else { "-" },
                    when(m.created_at_utc(), &m.created_at)
                );
            }
        }
    }
    if data.is_empty() {
        println!("   (no entries)");
    }

    Ok(data)
}

fn load_catalog(file: &Utf8Path) -> Result<Catalog> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read catalog {file}"))?;
    Catalog::from_json(&raw).with_context(|| format!("Malformed catalog {file}"))
}

pub fn cmd_catalog_search(
    file: &Utf8Path,
    query: &str,
    category: Option<&str>,
) -> Result<Vec<Masterclass>> {
    let catalog = load_catalog(file)?;
    let hits: Vec<Masterclass> = catalog
        .filter(query, category)
        .into_iter()
        .cloned()
        .collect();

    println!(":: {} masterclass(es)", hits.len());
    for mc in &hits {
        let star = if mc.is_featured { "*" } else { " " };
        println!("  {star}[{}] {} ({})", mc.id, mc.title, mc.category);
        println!(
            "     {} {} · {} · {}",
            mc.date, mc.time, mc.duration, mc.instructor.name
        );
    }
    Ok(hits)
}

pub fn cmd_catalog_categories(file: &Utf8Path) -> Result<Vec<String>> {
    let catalog = load_catalog(file)?;
    let categories: Vec<String> = catalog.categories().into_iter().map(String::from).collect();
    println!(":: Categories");
    for c in &categories {
        println!("   {c}");
    }
    Ok(categories)
}

pub fn cmd_settings_show(repo: &impl SettingsRepo) -> Result<ClientSettings> {
    let settings = repo.load()?;
    println!(":: Settings");
    for key in ClientSettings::KEYS {
        println!("   {key} = {}", settings.get(key)?);
    }
    Ok(settings)
}

pub fn cmd_settings_set(
    repo: &impl SettingsRepo,
    key: &str,
    value: &str,
) -> Result<ClientSettings> {
    let mut settings = repo.load()?;
    settings.set(key, value)?;
    repo.save(&settings)?;
    println!(":: {key} = {}", settings.get(key)?);
    Ok(settings)
}
