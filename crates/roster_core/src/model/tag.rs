//! Tag catalogue entries and tag matching rules.
//!
//! Tag reference rows are informational only: nothing ties them to the
//! labels stored on contacts.

use crate::model::contact::TagSet;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One row of the tag catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagReference {
    pub category: String,
    pub tag: String,
    pub description: String,
    pub example_usage: String,
}

impl TagReference {
    pub fn new(
        category: impl Into<String>,
        tag: impl Into<String>,
        description: impl Into<String>,
        example_usage: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            tag: tag.into(),
            description: description.into(),
            example_usage: example_usage.into(),
        }
    }
}

/// How a target tag is compared against a contact's tags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMatchMode {
    /// The joined tag string contains the target anywhere, so `maine` also
    /// matches a contact tagged `domaine`.
    #[default]
    Substring,
    /// Some tag equals the target exactly.
    Exact,
}

impl TagMatchMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Substring => "substring",
            Self::Exact => "exact",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "substring" => Some(Self::Substring),
            "exact" => Some(Self::Exact),
            _ => None,
        }
    }

    /// Returns whether `tags` matches `target` under this mode.
    ///
    /// Blank targets never match.
    pub fn matches(self, tags: &TagSet, target: &str) -> bool {
        if target.is_empty() || tags.is_empty() {
            return false;
        }
        match self {
            Self::Substring => tags.joined().contains(target),
            Self::Exact => tags.contains(target),
        }
    }
}

impl Display for TagMatchMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits user-entered recipient tags (`"a, b,,c"`) into trimmed labels.
pub fn split_tag_list(value: &str) -> Vec<String> {
    TagSet::parse(value).iter().map(str::to_string).collect()
}

/// Default tag catalogue seeded into a new directory.
pub fn default_tag_catalogue() -> Vec<TagReference> {
    const ROWS: &[(&str, &str, &str, &str)] = &[
        (
            "Leadership Level",
            "regional-director",
            "Regional leadership positions",
            "Monthly board meetings",
        ),
        (
            "Leadership Level",
            "state-leader",
            "State-level leadership",
            "State coordination calls",
        ),
        (
            "Leadership Level",
            "local-leader",
            "Local center leadership",
            "Local event notifications",
        ),
        (
            "Leadership Level",
            "assistant-leader",
            "Assistant/deputy positions",
            "Training updates",
        ),
        (
            "Ministry Type",
            "pastor",
            "All pastoral staff",
            "Pastoral care updates",
        ),
        (
            "Ministry Type",
            "youth-leader",
            "Youth ministry leaders",
            "Youth program updates",
        ),
        (
            "Ministry Type",
            "womens-ministry",
            "Women's ministry leaders",
            "Women's event coordination",
        ),
        (
            "Ministry Type",
            "education-director",
            "Education leadership",
            "Educational program updates",
        ),
        (
            "Ministry Type",
            "family-ministry",
            "Family ministry focus",
            "Family program notifications",
        ),
        (
            "Ministry Type",
            "community-outreach",
            "Community outreach leaders",
            "Outreach opportunities",
        ),
        (
            "Geographic",
            "massachusetts",
            "Massachusetts-based leaders",
            "MA-specific updates",
        ),
        (
            "Geographic",
            "connecticut",
            "Connecticut-based leaders",
            "CT-specific updates",
        ),
        (
            "Geographic",
            "new-york",
            "New York-based leaders",
            "NY-specific updates",
        ),
        (
            "Geographic",
            "new-hampshire",
            "New Hampshire-based leaders",
            "NH-specific updates",
        ),
        (
            "Geographic",
            "vermont",
            "Vermont-based leaders",
            "VT-specific updates",
        ),
        (
            "Geographic",
            "rhode-island",
            "Rhode Island-based leaders",
            "RI-specific updates",
        ),
        (
            "Geographic",
            "maine",
            "Maine-based leaders",
            "ME-specific updates",
        ),
        (
            "Communication",
            "board-member",
            "Board members",
            "Board meeting notices",
        ),
        (
            "Communication",
            "monthly-reports",
            "Receives monthly reports",
            "Monthly statistical updates",
        ),
        (
            "Communication",
            "emergency-contact",
            "Emergency notifications",
            "Urgent communications",
        ),
        (
            "Communication",
            "training-updates",
            "Training notifications",
            "Leadership development",
        ),
        (
            "Communication",
            "event-coordination",
            "Event coordinators",
            "Event planning updates",
        ),
    ];

    ROWS.iter()
        .map(|(category, tag, description, example)| {
            TagReference::new(*category, *tag, *description, *example)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{default_tag_catalogue, split_tag_list, TagMatchMode};
    use crate::model::contact::TagSet;

    #[test]
    fn substring_mode_over_matches_longer_tags() {
        let tags = TagSet::parse("domaine,pastor");
        assert!(TagMatchMode::Substring.matches(&tags, "maine"));
        assert!(!TagMatchMode::Exact.matches(&tags, "maine"));
        assert!(TagMatchMode::Exact.matches(&tags, "pastor"));
    }

    #[test]
    fn blank_target_never_matches() {
        let tags = TagSet::parse("pastor");
        assert!(!TagMatchMode::Substring.matches(&tags, ""));
    }

    #[test]
    fn split_tag_list_trims_entries() {
        assert_eq!(
            split_tag_list(" board-member , ,pastor"),
            vec!["board-member".to_string(), "pastor".to_string()]
        );
    }

    #[test]
    fn default_catalogue_has_unique_tags() {
        let catalogue = default_tag_catalogue();
        assert_eq!(catalogue.len(), 22);
        let mut tags: Vec<_> = catalogue.iter().map(|row| row.tag.as_str()).collect();
        tags.sort_unstable();
        tags.dedup();
        assert_eq!(tags.len(), 22);
    }
}
