//! A mapping `requester -> Group` for one target package name.

use crate::group::Group;
use vellum_core::Version;

/// All the range contributions demanded of a single package name, one
/// [`Group`] per requester. The effective range is the intersection of every
/// currently-enabled group.
#[derive(Debug, Clone, Default)]
pub struct Constraint {
    groups: Vec<Group>,
}

impl Constraint {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge `specifier_text` into the Group belonging to `requester`
    /// (creating it if this is the requester's first contribution), then
    /// recompute every group's candidates against `available`. Returns
    /// `false` iff the requester's own group becomes empty.
    ///
    /// # Errors
    /// Returns [`vellum_core::version::ParseError`] if `specifier_text`
    /// doesn't parse.
    pub fn attach(
        &mut self,
        requester: &str,
        specifier_text: &str,
        available: &[Version],
    ) -> Result<bool, vellum_core::version::ParseError> {
        if let Some(group) = self.groups.iter_mut().find(|g| g.requester() == requester) {
            group.merge(specifier_text, available)?;
            Ok(!group.is_empty())
        } else {
            let mut group = Group::new(requester, specifier_text)?;
            group.recompute_candidates(available);
            let ok = !group.is_empty();
            self.groups.push(group);
            Ok(ok)
        }
    }

    /// Disable the requester's group without removing it (backtracking must
    /// be reversible).
    pub fn unapply(&mut self, requester: &str) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.requester() == requester) {
            group.disable();
        }
    }

    /// Re-enable a previously disabled group.
    pub fn apply(&mut self, requester: &str) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.requester() == requester) {
            group.enable();
        }
    }

    /// Remove a requester's group entirely (used when the requester itself
    /// is pruned from the graph, not merely unapplied).
    pub fn remove(&mut self, requester: &str) {
        self.groups.retain(|g| g.requester() != requester);
    }

    /// `true` if no requester currently contributes a group.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Names of every requester currently contributing, enabled or not.
    #[must_use]
    pub fn sources(&self) -> Vec<&str> {
        self.groups.iter().map(Group::requester).collect()
    }

    /// Every currently enabled group, for the conflict analyzer.
    #[must_use]
    pub fn enabled_groups(&self) -> Vec<&Group> {
        self.groups.iter().filter(|g| g.is_enabled()).collect()
    }

    /// Filter `available` down to the intersection of every enabled group's
    /// candidates. An empty result signals a conflict for this name.
    ///
    /// Invariant: monotone in the enabled set — disabling a group can only
    /// grow the result, enabling can only shrink it, since each additional
    /// enabled group only removes candidates via set intersection.
    #[must_use]
    pub fn filter(&self, available: &[Version]) -> Vec<Version> {
        let enabled: Vec<&Group> = self.groups.iter().filter(|g| g.is_enabled()).collect();
        if enabled.is_empty() {
            return available.to_vec();
        }
        available
            .iter()
            .filter(|v| enabled.iter().all(|g| g.candidates().contains(v)))
            .cloned()
            .collect()
    }

    /// `true` if the effective (enabled-group) intersection over `available`
    /// is empty — this name is in conflict.
    #[must_use]
    pub fn is_conflicted(&self, available: &[Version]) -> bool {
        !self.groups.is_empty() && self.filter(available).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn versions(strs: &[&str]) -> Vec<Version> {
        strs.iter().map(|s| Version::parse(s).unwrap()).collect()
    }

    #[test]
    fn two_requesters_intersect() {
        let available = versions(&["1.0", "1.5", "1.9", "2.0"]);
        let mut c = Constraint::new();
        c.attach("A", ">=1,<2", &available).unwrap();
        c.attach("B", ">=1.5", &available).unwrap();
        let filtered = c.filter(&available);
        assert_eq!(filtered, versions(&["1.5", "1.9"]));
    }

    #[test]
    fn conflicting_requesters_detected() {
        let available = versions(&["1.0", "2.0"]);
        let mut c = Constraint::new();
        c.attach("A", "<1.5", &available).unwrap();
        c.attach("B", ">=1.5", &available).unwrap();
        assert!(c.is_conflicted(&available));
    }

    #[test]
    fn disabling_a_group_grows_the_result_monotonically() {
        let available = versions(&["1.0", "2.0"]);
        let mut c = Constraint::new();
        c.attach("A", "<1.5", &available).unwrap();
        c.attach("B", ">=1.5", &available).unwrap();
        assert!(c.filter(&available).is_empty());
        c.unapply("B");
        assert_eq!(c.filter(&available), versions(&["1.0"]));
        c.apply("B");
        assert!(c.filter(&available).is_empty());
    }

    #[test]
    fn attach_reports_failure_when_requesters_own_group_is_empty() {
        let available = versions(&["1.0", "2.0"]);
        let mut c = Constraint::new();
        let ok = c.attach("A", ">=5.0", &available).unwrap();
        assert!(!ok);
    }
}
