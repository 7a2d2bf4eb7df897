use super::{AsyncRegion, RequestToken};
use crate::error::{ErrorInfo, RegionError};

/// Selection lifecycle of one cascade. The resolved data itself lives in
/// the dependent region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionState<K> {
    NoSelection,
    Pending(K),
    Resolved(K),
    Failed(K, ErrorInfo),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CascadePolicy {
    /// Re-selecting the already resolved key does nothing
    pub skip_redundant: bool,
}

/// A dependent fetch tagged with the key active when it was issued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket<K> {
    pub key: K,
    pub token: RequestToken,
}

#[derive(Debug, Clone)]
pub struct SelectionCascade<K> {
    name: &'static str,
    dependent: &'static str,
    policy: CascadePolicy,
    state: SelectionState<K>,
    /// Key of the data last delivered to the dependent region
    delivered: Option<K>,
}

impl<K: Clone + PartialEq> SelectionCascade<K> {
    pub fn new(name: &'static str, dependent: &'static str, policy: CascadePolicy) -> Self {
        Self {
            name,
            dependent,
            policy,
            state: SelectionState::NoSelection,
            delivered: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn dependent(&self) -> &'static str {
        self.dependent
    }

    pub fn state(&self) -> &SelectionState<K> {
        &self.state
    }

    /// Key the dependent region's data belongs to.
    ///
    /// Differs from [`current_key`](Self::current_key) while a new selection
    /// is pending or after it failed, when an overlay region still holds the
    /// previous file.
    pub fn delivered_key(&self) -> Option<&K> {
        self.delivered.as_ref()
    }

    /// Key of the most recent selection, whatever its outcome
    pub fn current_key(&self) -> Option<&K> {
        match &self.state {
            SelectionState::NoSelection => None,
            SelectionState::Pending(k)
            | SelectionState::Resolved(k)
            | SelectionState::Failed(k, _) => Some(k),
        }
    }

    /// Select `key` and restart the dependent region.
    ///
    /// Returns the ticket the fetch must carry, or `None` when the
    /// selection was redundant and the policy skips it.
    pub fn select<T>(
        &mut self,
        key: K,
        region: &mut AsyncRegion<T>,
    ) -> Result<Option<Ticket<K>>, RegionError> {
        self.check_dependent(region)?;
        if self.policy.skip_redundant {
            if let SelectionState::Resolved(current) = &self.state {
                if *current == key {
                    return Ok(None);
                }
            }
        }
        let token = region.restart();
        self.state = SelectionState::Pending(key.clone());
        Ok(Some(Ticket { key, token }))
    }

    pub fn resolve<T>(
        &mut self,
        ticket: &Ticket<K>,
        data: T,
        region: &mut AsyncRegion<T>,
    ) -> Result<(), RegionError> {
        self.check_dependent(region)?;
        self.check_pending(&ticket.key)?;
        region.succeed(ticket.token, data)?;
        self.state = SelectionState::Resolved(ticket.key.clone());
        self.delivered = Some(ticket.key.clone());
        Ok(())
    }

    pub fn fail<T>(
        &mut self,
        ticket: &Ticket<K>,
        error: ErrorInfo,
        region: &mut AsyncRegion<T>,
    ) -> Result<(), RegionError> {
        self.check_dependent(region)?;
        self.check_pending(&ticket.key)?;
        region.fail(ticket.token, error.clone())?;
        self.state = SelectionState::Failed(ticket.key.clone(), error);
        Ok(())
    }

    /// Drop the selection and reset the dependent region
    pub fn clear<T>(&mut self, region: &mut AsyncRegion<T>) -> Result<(), RegionError> {
        self.check_dependent(region)?;
        region.reset();
        self.state = SelectionState::NoSelection;
        self.delivered = None;
        Ok(())
    }

    fn check_pending(&self, key: &K) -> Result<(), RegionError> {
        match &self.state {
            SelectionState::Pending(pending) if pending == key => Ok(()),
            _ => Err(RegionError::StaleResponse {
                region: self.dependent.to_string(),
            }),
        }
    }

    fn check_dependent<T>(&self, region: &AsyncRegion<T>) -> Result<(), RegionError> {
        if region.name() != self.dependent {
            return Err(RegionError::InvalidTransition {
                region: region.name().to_string(),
                reason: "region is not the dependent of this cascade",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::{RegionPolicy, RegionStatus};

    fn file_region() -> AsyncRegion<String> {
        AsyncRegion::new("file_content", RegionPolicy::OVERLAY_SUPERSEDE)
    }

    fn file_cascade(skip_redundant: bool) -> SelectionCascade<String> {
        SelectionCascade::new("file", "file_content", CascadePolicy { skip_redundant })
    }

    #[test]
    fn test_select_restarts_dependent() {
        let mut region = file_region();
        let mut cascade = file_cascade(false);

        let ticket = cascade
            .select("src/lib.rs".to_string(), &mut region)
            .unwrap()
            .unwrap();
        assert_eq!(region.status(), RegionStatus::Loading);
        assert_eq!(
            cascade.state(),
            &SelectionState::Pending("src/lib.rs".to_string())
        );

        cascade
            .resolve(&ticket, "pub mod app;".to_string(), &mut region)
            .unwrap();
        assert_eq!(
            cascade.state(),
            &SelectionState::Resolved("src/lib.rs".to_string())
        );
        assert_eq!(region.data().map(String::as_str), Some("pub mod app;"));
    }

    #[test]
    fn test_late_result_for_previous_key_is_discarded() {
        let mut region = file_region();
        let mut cascade = file_cascade(false);

        let a = cascade.select("a.rs".to_string(), &mut region).unwrap().unwrap();
        let b = cascade.select("b.rs".to_string(), &mut region).unwrap().unwrap();

        cascade.resolve(&b, "B".to_string(), &mut region).unwrap();
        let err = cascade.resolve(&a, "A".to_string(), &mut region).unwrap_err();
        assert!(err.is_stale());

        assert_eq!(region.data().map(String::as_str), Some("B"));
        assert_eq!(cascade.current_key().map(String::as_str), Some("b.rs"));
    }

    #[test]
    fn test_failure_for_previous_key_is_discarded() {
        let mut region = file_region();
        let mut cascade = file_cascade(false);

        let a = cascade.select("a.rs".to_string(), &mut region).unwrap().unwrap();
        let _b = cascade.select("b.rs".to_string(), &mut region).unwrap().unwrap();

        let err = cascade
            .fail(&a, ErrorInfo::backend("boom"), &mut region)
            .unwrap_err();
        assert!(err.is_stale());
        assert_eq!(region.status(), RegionStatus::Loading);
    }

    #[test]
    fn test_fail_records_key_and_error() {
        let mut region = file_region();
        let mut cascade = file_cascade(false);
        let t = cascade.select("a.rs".to_string(), &mut region).unwrap().unwrap();
        let error = ErrorInfo::backend("File not found");
        cascade.fail(&t, error.clone(), &mut region).unwrap();
        assert_eq!(
            cascade.state(),
            &SelectionState::Failed("a.rs".to_string(), error)
        );
        assert_eq!(region.status(), RegionStatus::Error);
    }

    #[test]
    fn test_delivered_key_follows_region_data() {
        let mut region = file_region();
        let mut cascade = file_cascade(false);
        let a = cascade.select("a.rs".to_string(), &mut region).unwrap().unwrap();
        cascade.resolve(&a, "A".to_string(), &mut region).unwrap();

        let b = cascade.select("b.rs".to_string(), &mut region).unwrap().unwrap();
        assert_eq!(cascade.current_key().map(String::as_str), Some("b.rs"));
        assert_eq!(cascade.delivered_key().map(String::as_str), Some("a.rs"));

        cascade
            .fail(&b, ErrorInfo::backend("File not found"), &mut region)
            .unwrap();
        assert_eq!(cascade.delivered_key().map(String::as_str), Some("a.rs"));
        assert_eq!(region.data().map(String::as_str), Some("A"));

        cascade.clear(&mut region).unwrap();
        assert!(cascade.delivered_key().is_none());
    }

    #[test]
    fn test_reselect_same_key_refetches_by_default() {
        let mut region = file_region();
        let mut cascade = file_cascade(false);
        let t = cascade.select("a.rs".to_string(), &mut region).unwrap().unwrap();
        cascade.resolve(&t, "v1".to_string(), &mut region).unwrap();

        let again = cascade.select("a.rs".to_string(), &mut region).unwrap();
        assert!(again.is_some());
        assert_eq!(region.status(), RegionStatus::Loading);
    }

    #[test]
    fn test_skip_redundant_policy() {
        let mut region = file_region();
        let mut cascade = file_cascade(true);
        let t = cascade.select("a.rs".to_string(), &mut region).unwrap().unwrap();
        cascade.resolve(&t, "v1".to_string(), &mut region).unwrap();

        assert!(cascade
            .select("a.rs".to_string(), &mut region)
            .unwrap()
            .is_none());
        assert_eq!(region.status(), RegionStatus::Success);

        // a different key still fetches
        assert!(cascade
            .select("b.rs".to_string(), &mut region)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_clear_resets_dependent() {
        let mut region = file_region();
        let mut cascade = file_cascade(false);
        let t = cascade.select("a.rs".to_string(), &mut region).unwrap().unwrap();
        cascade.resolve(&t, "v1".to_string(), &mut region).unwrap();

        cascade.clear(&mut region).unwrap();
        assert_eq!(cascade.state(), &SelectionState::NoSelection);
        assert_eq!(region.status(), RegionStatus::Idle);
        assert!(region.data().is_none());
    }

    #[test]
    fn test_wrong_dependent_region_is_rejected() {
        let mut other: AsyncRegion<String> =
            AsyncRegion::new("chat", RegionPolicy::REPLACE_REJECT);
        let mut cascade = file_cascade(false);
        let err = cascade.select("a.rs".to_string(), &mut other).unwrap_err();
        assert!(matches!(err, RegionError::InvalidTransition { .. }));
        assert_eq!(other.status(), RegionStatus::Idle);
    }
}
