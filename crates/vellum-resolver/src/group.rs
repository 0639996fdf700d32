//! A bundle of specifiers attributed to a single requester, plus the
//! candidate versions that currently satisfy it.

use vellum_core::{RangeSpecifier, Version};

/// One requester's contribution to a [`crate::Constraint`]: the range it
/// demanded, and the subset of the repository's versions for this package
/// that the range currently admits.
///
/// Invariant: `candidates == versions.filter(|v| range.contains(v))`,
/// recomputed by [`Group::recompute_candidates`] any time `range` changes or
/// the repository's version list changes.
#[derive(Debug, Clone)]
pub struct Group {
    requester: String,
    range: RangeSpecifier,
    enabled: bool,
    candidates: Vec<Version>,
}

impl Group {
    /// Build a group for `requester` from its first specifier text.
    ///
    /// # Errors
    /// Returns [`vellum_core::version::ParseError`] if `specifier_text`
    /// doesn't parse.
    pub fn new(
        requester: impl Into<String>,
        specifier_text: &str,
    ) -> Result<Self, vellum_core::version::ParseError> {
        Ok(Self {
            requester: requester.into(),
            range: RangeSpecifier::parse(specifier_text)?,
            enabled: true,
            candidates: Vec::new(),
        })
    }

    #[must_use]
    pub fn requester(&self) -> &str {
        &self.requester
    }

    #[must_use]
    pub const fn range(&self) -> &RangeSpecifier {
        &self.range
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Merge another specifier text into this group's range (conjunctive
    /// AND), then recompute candidates against `available`.
    ///
    /// # Errors
    /// Returns [`vellum_core::version::ParseError`] if `specifier_text`
    /// doesn't parse.
    pub fn merge(
        &mut self,
        specifier_text: &str,
        available: &[Version],
    ) -> Result<(), vellum_core::version::ParseError> {
        let extra = RangeSpecifier::parse(specifier_text)?;
        self.range = self.range.intersect(&extra);
        self.recompute_candidates(available);
        Ok(())
    }

    /// Recompute `candidates` from `available`, honoring the
    /// default-excludes-prereleases rule unless this group's own range
    /// mentions a prerelease, or unless a stable-only match admits nothing
    /// (spec.md §4.1: "set true if any explicit specifier mentions a
    /// pre-release or if the range has no stable match").
    pub fn recompute_candidates(&mut self, available: &[Version]) {
        let stable_only: Vec<Version> = available
            .iter()
            .filter(|v| self.range.contains(v, false))
            .cloned()
            .collect();
        self.candidates = if stable_only.is_empty() {
            available
                .iter()
                .filter(|v| self.range.contains(v, true))
                .cloned()
                .collect()
        } else {
            stable_only
        };
    }

    #[must_use]
    pub fn candidates(&self) -> &[Version] {
        &self.candidates
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
