use std::collections::HashMap;
use std::sync::Arc;

use rbyte_core::{AllLeads, LeadKind};
use tracing::{debug, warn};

use crate::ports::{LeadPage, LeadsAdmin};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabState {
    pub page: u32,
    pub data: Option<LeadPage>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Default for TabState {
    fn default() -> Self {
        Self {
            page: 1,
            data: None,
            loading: false,
            error: None,
        }
    }
}

impl TabState {
    pub fn has_next(&self) -> bool {
        self.data
            .as_ref()
            .is_some_and(|d| self.page < d.total_pages())
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardState {
    pub overview: Option<AllLeads>,
    pub overview_error: Option<String>,
    tabs: HashMap<LeadKind, TabState>,
    pub page_size: u32,
}

impl DashboardState {
    pub fn new(page_size: u32) -> Self {
        Self {
            overview: None,
            overview_error: None,
            tabs: LeadKind::ALL
                .iter()
                .map(|k| (*k, TabState::default()))
                .collect(),
            page_size: rbyte_config::clamp_page_size(page_size),
        }
    }

    pub fn tab(&self, kind: LeadKind) -> &TabState {
        // every kind is inserted by `new`
        &self.tabs[&kind]
    }

    fn tab_mut(&mut self, kind: LeadKind) -> &mut TabState {
        self.tabs.entry(kind).or_default()
    }
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(rbyte_config::DEFAULT_PAGE_SIZE)
    }
}

/// Admin view over the collected leads.
pub struct LeadsDashboard<A> {
    admin: Arc<A>,
    state: DashboardState,
}

impl<A: LeadsAdmin> LeadsDashboard<A> {
    pub fn new(admin: A, page_size: u32) -> Self {
        Self {
            admin: Arc::new(admin),
            state: DashboardState::new(page_size),
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub async fn refresh_overview(&mut self) {
        debug!("refreshing leads overview");
        match self.admin.all_leads().await {
            Ok(leads) => {
                self.state.overview = Some(leads);
                self.state.overview_error = None;
            }
            Err(e) => {
                warn!("failed to load leads overview: {e}");
                self.state.overview_error = Some(e.message);
            }
        }
    }

    pub async fn load_page(&mut self, kind: LeadKind, page: u32) {
        let page = page.max(1);
        let page_size = self.state.page_size;
        {
            let tab = self.state.tab_mut(kind);
            tab.loading = true;
            tab.error = None;
        }

        let res = self.admin.list(kind, page, page_size).await;

        let tab = self.state.tab_mut(kind);
        tab.loading = false;
        match res {
            Ok(data) => {
                debug!(kind = kind.label(), page, rows = data.len(), "leads page loaded");
                tab.page = data.page().max(1);
                tab.data = Some(data);
            }
            Err(e) => {
                warn!(kind = kind.label(), page, "failed to load leads: {e}");
                tab.error = Some(e.message);
            }
        }
    }

    /// Reload the tab's current page.
    pub async fn refresh(&mut self, kind: LeadKind) {
        let page = self.state.tab(kind).page;
        self.load_page(kind, page).await;
    }

    pub async fn next_page(&mut self, kind: LeadKind) {
        let tab = self.state.tab(kind);
        if tab.has_next() {
            let page = tab.page + 1;
            self.load_page(kind, page).await;
        }
    }

    pub async fn prev_page(&mut self, kind: LeadKind) {
        let tab = self.state.tab(kind);
        if tab.has_prev() {
            let page = tab.page - 1;
            self.load_page(kind, page).await;
        }
    }
}
