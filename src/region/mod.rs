//! Async regions: one named unit of remote work per screen area.
//!
//! A region owns its status, last result and last error. Every request is
//! tagged with a [`RequestToken`]; completions carrying an older token are
//! rejected as stale, so only the most recently started request is ever
//! observable.

mod cascade;
mod registry;

pub use cascade::{CascadePolicy, SelectionCascade, SelectionState, Ticket};
pub use registry::{RegionRegistry, RegistryBuilder};

use crate::error::{ErrorInfo, RegionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionStatus {
    Idle,
    Loading,
    Success,
    Error,
}

/// Whether the last good value survives a new request or a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPolicy {
    /// 新しいリクエスト開始時にデータを破棄
    Replace,
    /// 新しいデータが届くまで前回のデータを表示し続ける
    Overlay,
}

/// What `start()` does while a request is already in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusyPolicy {
    /// Second start is an `InvalidTransition`
    Reject,
    /// Second start bumps the token; the earlier result becomes stale
    Supersede,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionPolicy {
    pub data: DataPolicy,
    pub busy: BusyPolicy,
}

impl RegionPolicy {
    pub const REPLACE_REJECT: Self = Self {
        data: DataPolicy::Replace,
        busy: BusyPolicy::Reject,
    };
    pub const REPLACE_SUPERSEDE: Self = Self {
        data: DataPolicy::Replace,
        busy: BusyPolicy::Supersede,
    };
    pub const OVERLAY_SUPERSEDE: Self = Self {
        data: DataPolicy::Overlay,
        busy: BusyPolicy::Supersede,
    };
}

/// Opaque request sequence number, unique per region
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(u64);

impl RequestToken {
    fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

#[derive(Debug, Clone)]
pub struct AsyncRegion<T> {
    name: &'static str,
    policy: RegionPolicy,
    status: RegionStatus,
    data: Option<T>,
    error: Option<ErrorInfo>,
    token: RequestToken,
}

impl<T> AsyncRegion<T> {
    pub fn new(name: &'static str, policy: RegionPolicy) -> Self {
        Self {
            name,
            policy,
            status: RegionStatus::Idle,
            data: None,
            error: None,
            token: RequestToken::default(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn policy(&self) -> RegionPolicy {
        self.policy
    }

    pub fn status(&self) -> RegionStatus {
        self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == RegionStatus::Loading
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    pub fn token(&self) -> RequestToken {
        self.token
    }

    /// Issue a new request for this region.
    pub fn start(&mut self) -> Result<RequestToken, RegionError> {
        if self.is_loading() && self.policy.busy == BusyPolicy::Reject {
            return Err(RegionError::InvalidTransition {
                region: self.name.to_string(),
                reason: "request already in flight",
            });
        }
        Ok(self.begin())
    }

    /// `reset()` followed by `start()`, keeping last-good data for overlay
    /// regions. Used by selection cascades; never fails.
    pub fn restart(&mut self) -> RequestToken {
        let kept = match self.policy.data {
            DataPolicy::Overlay => self.data.take(),
            DataPolicy::Replace => None,
        };
        self.reset();
        let token = self.begin();
        if kept.is_some() {
            self.data = kept;
        }
        token
    }

    pub fn succeed(&mut self, token: RequestToken, data: T) -> Result<(), RegionError> {
        self.check_current(token)?;
        self.status = RegionStatus::Success;
        self.data = Some(data);
        self.error = None;
        Ok(())
    }

    pub fn fail(&mut self, token: RequestToken, error: ErrorInfo) -> Result<(), RegionError> {
        self.check_current(token)?;
        self.status = RegionStatus::Error;
        if self.policy.data == DataPolicy::Replace {
            self.data = None;
        }
        self.error = Some(error);
        Ok(())
    }

    /// Back to Idle. Bumps the token so any in-flight response is discarded.
    pub fn reset(&mut self) {
        self.status = RegionStatus::Idle;
        self.data = None;
        self.error = None;
        self.token = self.token.next();
    }

    fn begin(&mut self) -> RequestToken {
        self.token = self.token.next();
        self.status = RegionStatus::Loading;
        self.error = None;
        if self.policy.data == DataPolicy::Replace {
            self.data = None;
        }
        self.token
    }

    fn check_current(&self, token: RequestToken) -> Result<(), RegionError> {
        if token != self.token || !self.is_loading() {
            return Err(RegionError::StaleResponse {
                region: self.name.to_string(),
            });
        }
        Ok(())
    }
}
