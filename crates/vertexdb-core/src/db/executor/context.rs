use crate::{
    config::ExecutorConfig,
    db::executor::{
        progress::{ProgressMonitorProxy, ProgressReporter},
        remote::RemoteAttributeFetcher,
    },
};
use derive_more::{Display, From};
use std::rc::Rc;

///
/// SiteId
///

#[derive(Clone, Copy, Debug, Display, Eq, From, Hash, PartialEq)]
pub struct SiteId(pub u64);

///
/// ExecutionContext
///
/// Capabilities an executor may use during one query step. Passed
/// explicitly into every execution; there is no ambient engine state.
///

pub struct ExecutionContext {
    site_id: SiteId,
    config: ExecutorConfig,
    remote_fetcher: Option<Rc<dyn RemoteAttributeFetcher>>,
    progress_reporter: Option<Rc<dyn ProgressReporter>>,
}

impl ExecutionContext {
    #[must_use]
    pub const fn new(site_id: SiteId, config: ExecutorConfig) -> Self {
        Self {
            site_id,
            config,
            remote_fetcher: None,
            progress_reporter: None,
        }
    }

    #[must_use]
    pub fn with_remote_fetcher(mut self, fetcher: Rc<dyn RemoteAttributeFetcher>) -> Self {
        self.remote_fetcher = Some(fetcher);
        self
    }

    #[must_use]
    pub fn with_progress_reporter(mut self, reporter: Rc<dyn ProgressReporter>) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    #[must_use]
    pub const fn site_id(&self) -> SiteId {
        self.site_id
    }

    #[must_use]
    pub const fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    #[must_use]
    pub fn remote_fetcher(&self) -> Option<&dyn RemoteAttributeFetcher> {
        self.remote_fetcher.as_deref()
    }

    /// Build a progress proxy for one operator execution.
    #[must_use]
    pub fn progress_proxy(&self, plan_node_id: u32) -> ProgressMonitorProxy {
        ProgressMonitorProxy::new(
            self.progress_reporter.clone(),
            plan_node_id,
            self.config.progress.report_interval,
        )
    }
}
