use async_trait::async_trait;
use rbyte_core::{
    AllLeads, EnrollRequest, FormFields, GatedAction, LeadKind, MasterclassRegisterRequest,
    RegisterInterestRequest, SendOtpRequest, VerifyOtpRequest,
};
use rbyte_infra::{ApiError, BackendClient};
use tracing::{info, warn};

use crate::ports::{BackendError, LeadPage, LeadsAdmin, LeadsBackend};

impl From<ApiError> for BackendError {
    fn from(e: ApiError) -> Self {
        BackendError::new(e.user_message())
    }
}

/// [`LeadsBackend`] and [`LeadsAdmin`] over the HTTP API.
#[derive(Debug, Clone)]
pub struct HttpLeadsBackend {
    client: BackendClient,
}

impl HttpLeadsBackend {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }
}

#[async_trait]
impl LeadsBackend for HttpLeadsBackend {
    async fn send_otp(&self, phone: &str, country_code: &str) -> Result<(), BackendError> {
        let req = SendOtpRequest {
            phone: phone.trim().to_string(),
            country_code: country_code.trim().to_string(),
        };
        self.client.send_otp(&req).await?;
        Ok(())
    }

    async fn verify_otp(
        &self,
        phone: &str,
        otp: &str,
        country_code: &str,
    ) -> Result<(), BackendError> {
        let req = VerifyOtpRequest {
            phone: phone.trim().to_string(),
            otp: otp.to_string(),
            country_code: country_code.trim().to_string(),
        };
        self.client.verify_otp(&req).await?;
        Ok(())
    }

    async fn perform(&self, action: &GatedAction, fields: &FormFields) -> Result<(), BackendError> {
        let res = match action {
            GatedAction::RegisterInterest => {
                self.client
                    .register_interest(&RegisterInterestRequest::from_fields(fields))
                    .await
            }
            GatedAction::Enroll => self.client.enroll(&EnrollRequest::from_fields(fields)).await,
            GatedAction::MasterclassRegistration { masterclass_id } => {
                let mut req = MasterclassRegisterRequest::from_fields(fields);
                req.masterclass_id = masterclass_id.clone();
                self.client.register_masterclass(&req).await
            }
        };

        match res {
            Ok(_) => {
                info!(action = action.name(), "submission accepted");
                Ok(())
            }
            Err(e) => {
                warn!(action = action.name(), kind = ?e.kind(), "submission rejected: {e}");
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl LeadsAdmin for HttpLeadsBackend {
    async fn all_leads(&self) -> Result<AllLeads, BackendError> {
        Ok(self.client.all_leads().await?)
    }

    async fn list(
        &self,
        kind: LeadKind,
        page: u32,
        page_size: u32,
    ) -> Result<LeadPage, BackendError> {
        Ok(match kind {
            LeadKind::Registrations => {
                LeadPage::Registrations(self.client.registrations(page, page_size).await?)
            }
            LeadKind::Enrollments => {
                LeadPage::Enrollments(self.client.enrollments(page, page_size).await?)
            }
            LeadKind::MasterclassRegistrations => LeadPage::MasterclassRegistrations(
                self.client
                    .masterclass_registrations(page, page_size)
                    .await?,
            ),
        })
    }
}
