pub mod app_core;
mod async_runtime;
pub mod backend;
pub mod dashboard;
pub mod domain;
pub mod flow;
pub mod persistence;
pub mod ports;
pub mod toast;
pub mod viewmodel;

pub use app_core::*;
pub use backend::HttpLeadsBackend;
pub use dashboard::{DashboardState, LeadsDashboard, TabState};
pub use domain::{ClientSettings, FlowState, SessionId, SettingsError};
pub use flow::{FlowError, OtpFlow};
pub use persistence::FilePersistence;
pub use ports::*;
pub use toast::{Subscription, SubscriptionGuard, ToastStore};
pub use viewmodel::*;
