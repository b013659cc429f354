//! Queue sections and section filters

use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Named region of a saved queue holding job envelopes
///
/// Variant order is traversal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    /// `queue_running`
    Running,
    /// `queue_pending`
    Pending,
    /// `queue_failed`
    Failed,
}

impl Section {
    /// All known sections in traversal order
    pub const ALL: [Section; 3] = [Section::Running, Section::Pending, Section::Failed];

    /// Document key of this section
    #[inline]
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Running => "queue_running",
            Self::Pending => "queue_pending",
            Self::Failed => "queue_failed",
        }
    }

    /// Look up a section by its document key
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_key(s).ok_or_else(|| UnknownSection(s.to_string()))
    }
}

impl Serialize for Section {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.key())
    }
}

/// Section name that is not one of [`Section::ALL`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown queue section: {0} (expected one of queue_running, queue_pending, queue_failed)")]
pub struct UnknownSection(pub String);

/// Which sections a traversal may visit
///
/// A subset is always visited in [`Section::ALL`] order, whatever order the
/// names were given in. The implicit job scope of a section-less document is
/// visited under [`SectionFilter::All`] and [`SectionFilter::Active`] only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SectionFilter {
    /// Every section, and the implicit scope
    #[default]
    All,
    /// Jobs not yet finished: `queue_running`, `queue_pending`, and the implicit scope
    Active,
    /// Only the named sections
    Only(BTreeSet<Section>),
}

impl SectionFilter {
    /// Restrict to the given sections
    #[must_use]
    pub fn only(sections: impl IntoIterator<Item = Section>) -> Self {
        Self::Only(sections.into_iter().collect())
    }

    /// Build from section names; an empty list means [`SectionFilter::All`]
    ///
    /// # Errors
    /// Returns error on the first name that is not a known section
    pub fn from_names<I, S>(names: I) -> Result<Self, UnknownSection>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sections = names
            .into_iter()
            .map(|name| name.as_ref().parse::<Section>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        if sections.is_empty() {
            Ok(Self::All)
        } else {
            Ok(Self::Only(sections))
        }
    }

    /// Check whether a section may be visited
    #[inline]
    #[must_use]
    pub fn includes(&self, section: Section) -> bool {
        match self {
            Self::All => true,
            Self::Active => matches!(section, Section::Running | Section::Pending),
            Self::Only(set) => set.contains(&section),
        }
    }

    /// Check whether the implicit (section-less) scope may be visited
    #[inline]
    #[must_use]
    pub fn includes_implicit(&self) -> bool {
        matches!(self, Self::All | Self::Active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip() {
        for section in Section::ALL {
            assert_eq!(Section::from_key(section.key()), Some(section));
        }
        assert_eq!(Section::from_key("queue_done"), None);
    }

    #[test]
    fn traversal_order_is_running_pending_failed() {
        let mut sections = vec![Section::Failed, Section::Pending, Section::Running];
        sections.sort();
        assert_eq!(sections, Section::ALL.to_vec());
    }

    #[test]
    fn filter_from_names() {
        let filter = SectionFilter::from_names(["queue_pending"]).unwrap();
        assert!(filter.includes(Section::Pending));
        assert!(!filter.includes(Section::Running));
        assert!(!filter.includes_implicit());
    }

    #[test]
    fn empty_names_mean_all() {
        let filter = SectionFilter::from_names(Vec::<String>::new()).unwrap();
        assert_eq!(filter, SectionFilter::All);
        assert!(filter.includes_implicit());
    }

    #[test]
    fn active_skips_failed_jobs() {
        let filter = SectionFilter::Active;
        assert!(filter.includes(Section::Running));
        assert!(filter.includes(Section::Pending));
        assert!(!filter.includes(Section::Failed));
        assert!(filter.includes_implicit());
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = SectionFilter::from_names(["queue_pending", "queue_later"]).unwrap_err();
        assert_eq!(err, UnknownSection("queue_later".to_string()));
    }
}
