//! Typed client for the training-program backend.
//!
//! Every JSON endpoint funnels through [`BackendClient::classify`], which turns
//! a raw response into either a decoded body or an [`ApiError`] the UI can
//! show verbatim.

pub mod error;

use camino::Utf8Path;
use rbyte_core::{
    AllLeads, EnrollRequest, Enrollment, LeadKind, MasterclassRegisterRequest,
    MasterclassRegistration, Paginated, RegisterInterestRequest, Registration, SendOtpRequest,
    VerifyOtpRequest,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

pub use error::{ApiError, ApiErrorKind, NON_JSON_MESSAGE};

const SNIPPET_CHARS: usize = 200;

/// Normalize a base URL so endpoint paths join *beneath* it.
///
/// `Url::join("send-otp")` against `https://host/api` would replace `api`;
/// with a trailing slash it appends instead.
pub(crate) fn normalize_base(base_url: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(base_url.trim())
        .map_err(|e| ApiError::InvalidUrl(format!("{base_url}: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ApiError::InvalidUrl(base_url.to_string()));
    }
    if !url.path().ends_with('/') {
        url.set_path(&format!("{}/", url.path()));
    }
    Ok(url)
}

#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base: Url,
}

impl BackendClient {
    pub fn new(client: Client, base_url: &str) -> Result<Self, ApiError> {
        Ok(Self {
            client,
            base: normalize_base(base_url)?,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| ApiError::InvalidUrl(format!("{}{path}: {e}", self.base)))
    }

    async fn classify(resp: Response) -> Result<Value, ApiError> {
        let status = resp.status();
        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let text = resp.text().await.map_err(ApiError::Transport)?;

        if !is_json {
            let snippet: String = text.chars().take(SNIPPET_CHARS).collect();
            error!(status = status.as_u16(), "Non-JSON response: {snippet}...");
            return Err(ApiError::NonJson {
                status: status.as_u16(),
                snippet,
            });
        }

        let body: Value = serde_json::from_str(&text)?;

        if !status.is_success() {
            return Err(ApiError::Api {
                status: status.as_u16(),
                message: error::extract_message(&body, status.as_u16()),
            });
        }

        Ok(body)
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let url = self.endpoint(path)?;
        debug!("POST {url}");
        let resp = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::Transport)?;
        let res = Self::classify(resp).await;
        if let Err(e) = &res {
            warn!(path, "POST failed: {e}");
        }
        res
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!("GET {url}");
        let resp = self
            .client
            .get(url)
            .query(query)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(ApiError::Transport)?;
        match Self::classify(resp).await {
            Ok(body) => Ok(serde_json::from_value(body)?),
            Err(e) => {
                warn!(path, "GET failed: {e}");
                Err(e)
            }
        }
    }

    pub async fn send_otp(&self, req: &SendOtpRequest) -> Result<Value, ApiError> {
        debug!(
            phone = %rbyte_core::mask_phone(&req.phone),
            country_code = %req.country_code,
            "sending OTP"
        );
        self.post_json("send-otp", req).await
    }

    pub async fn verify_otp(&self, req: &VerifyOtpRequest) -> Result<Value, ApiError> {
        self.post_json("verify-otp", req).await
    }

    pub async fn register_interest(
        &self,
        req: &RegisterInterestRequest,
    ) -> Result<Value, ApiError> {
        self.post_json("register", req).await
    }

    pub async fn enroll(&self, req: &EnrollRequest) -> Result<Value, ApiError> {
        self.post_json("enroll", req).await
    }

    pub async fn register_masterclass(
        &self,
        req: &MasterclassRegisterRequest,
    ) -> Result<Value, ApiError> {
        self.post_json("masterclass-register", req).await
    }

    pub async fn all_leads(&self) -> Result<AllLeads, ApiError> {
        self.get_json("all-leads", &[]).await
    }

    pub async fn list_leads<T: DeserializeOwned>(
        &self,
        kind: LeadKind,
        page: u32,
        page_size: u32,
    ) -> Result<Paginated<T>, ApiError> {
        let query = [
            ("page", page.max(1).to_string()),
            (
                "page_size",
                rbyte_config::clamp_page_size(page_size).to_string(),
            ),
        ];
        self.get_json(kind.path(), &query).await
    }

    pub async fn registrations(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Paginated<Registration>, ApiError> {
        self.list_leads(LeadKind::Registrations, page, page_size)
            .await
    }

    pub async fn enrollments(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Paginated<Enrollment>, ApiError> {
        self.list_leads(LeadKind::Enrollments, page, page_size).await
    }

    pub async fn masterclass_registrations(
        &self,
        page: u32,
        page_size: u32,
    ) -> Result<Paginated<MasterclassRegistration>, ApiError> {
        self.list_leads(LeadKind::MasterclassRegistrations, page, page_size)
            .await
    }

    pub fn curriculum_url(&self) -> Result<Url, ApiError> {
        self.endpoint("curriculum")
    }

    pub async fn download_curriculum(&self, target: &Utf8Path) -> Result<u64, ApiError> {
        let url = self.curriculum_url()?;
        crate::net::download_to_file(&self.client, url, target).await
    }
}
