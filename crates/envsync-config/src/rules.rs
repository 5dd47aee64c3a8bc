//! Normalization rules for visibility, owner ids and cluster types

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::FieldIssue;

static OWNER_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[0-9a-fA-F]{24}$").expect("Invalid owner id regex"));

/// Who can see and use an environment on the remote platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Visibility {
    Global,
    Organization,
    #[default]
    Private,
}

impl Visibility {
    fn from_title(value: &str) -> Option<Self> {
        match value {
            "Global" => Some(Self::Global),
            "Organization" => Some(Self::Organization),
            "Private" => Some(Self::Private),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Organization => "Organization",
            Self::Private => "Private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compute cluster frameworks an environment can back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClusterType {
    Spark,
    Ray,
    Dask,
    Mpi,
}

impl ClusterType {
    fn from_title(value: &str) -> Option<Self> {
        match value {
            "Spark" => Some(Self::Spark),
            "Ray" => Some(Self::Ray),
            "Dask" => Some(Self::Dask),
            "Mpi" => Some(Self::Mpi),
            _ => None,
        }
    }
}

/// Title-case a string word by word.
///
/// A letter is upper-cased when it follows a non-letter (or starts the
/// string) and lower-cased otherwise, so `"ORGANISATION"` becomes
/// `"Organisation"` and `"mpi"` becomes `"Mpi"`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_letter = false;

    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }

    out
}

/// Whether `value` is a well-formed organization owner id
pub fn is_owner_id(value: &str) -> bool {
    OWNER_ID.is_match(value)
}

/// Result of resolving `visibility` together with `organizationOwnerId`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityResolution {
    pub visibility: Visibility,
    pub organization_owner_id: Option<String>,
}

/// Resolve the declared visibility and owner id.
///
/// Problems that reject the declaration are pushed onto `issues`. A valid
/// owner id always forces [`Visibility::Private`], even when Organization was
/// declared.
pub fn resolve_visibility(
    declared: Option<&str>,
    owner_id: Option<&str>,
    issues: &mut Vec<FieldIssue>,
) -> VisibilityResolution {
    let mut title = declared
        .filter(|v| !v.is_empty())
        .map(title_case)
        .unwrap_or_else(|| Visibility::Private.as_str().to_string());
    if title == "Organisation" {
        title = Visibility::Organization.as_str().to_string();
    }

    let owner_id = owner_id.filter(|id| !id.is_empty());

    if title == Visibility::Organization.as_str() && owner_id.is_none() {
        issues.push(FieldIssue::new(
            "organizationOwnerId",
            "is required when visibility is Organization",
        ));
        return VisibilityResolution {
            visibility: Visibility::Private,
            organization_owner_id: None,
        };
    }

    if let Some(id) = owner_id {
        if !is_owner_id(id) {
            issues.push(FieldIssue::new(
                "organizationOwnerId",
                format!("'{id}' is not a 24-character hex id"),
            ));
            return VisibilityResolution {
                visibility: Visibility::Private,
                organization_owner_id: None,
            };
        }

        tracing::debug!(
            declared = %title,
            owner_id = id,
            "Organization owner id present, visibility set to Private"
        );
        return VisibilityResolution {
            visibility: Visibility::Private,
            organization_owner_id: Some(id.to_string()),
        };
    }

    let visibility = Visibility::from_title(&title).unwrap_or_else(|| {
        tracing::warn!(visibility = %title, "Invalid visibility setting, using Private");
        Visibility::Private
    });

    VisibilityResolution {
        visibility,
        organization_owner_id: None,
    }
}

/// Result of filtering `supportedClusters`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterResolution {
    /// Recognized cluster types in declared order, duplicates kept
    pub clusters: Vec<ClusterType>,
    /// Title-cased entries that were not recognized
    pub dropped: Vec<String>,
}

/// Title-case each entry and keep only the recognized cluster types.
pub fn resolve_clusters<S: AsRef<str>>(entries: &[S]) -> ClusterResolution {
    let mut resolution = ClusterResolution::default();

    for entry in entries {
        let title = title_case(entry.as_ref());
        match ClusterType::from_title(&title) {
            Some(cluster) => resolution.clusters.push(cluster),
            None => resolution.dropped.push(title),
        }
    }

    if !resolution.dropped.is_empty() {
        tracing::warn!(
            dropped = ?resolution.dropped,
            "Invalid cluster type setting, choose 'Spark', 'Ray', 'Dask', or 'Mpi'"
        );
    }

    resolution
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    const OWNER: &str = "5f1a2b3c4d5e6f7a8b9c0d1e";

    #[rstest]
    #[case("private", "Private")]
    #[case("GLOBAL", "Global")]
    #[case("organisation", "Organisation")]
    #[case("mpi", "Mpi")]
    #[case("two words", "Two Words")]
    #[case("abc1def", "Abc1Def")]
    #[case("", "")]
    fn title_case_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(title_case(input), expected);
    }

    #[rstest]
    #[case(None, Visibility::Private)]
    #[case(Some("global"), Visibility::Global)]
    #[case(Some("Private"), Visibility::Private)]
    #[case(Some("everyone"), Visibility::Private)]
    fn visibility_without_owner(#[case] declared: Option<&str>, #[case] expected: Visibility) {
        let mut issues = Vec::new();
        let resolved = resolve_visibility(declared, None, &mut issues);
        assert!(issues.is_empty());
        assert_eq!(resolved.visibility, expected);
        assert_eq!(resolved.organization_owner_id, None);
    }

    #[rstest]
    #[case("organization")]
    #[case("Organisation")]
    fn organization_without_owner_is_rejected(#[case] declared: &str) {
        let mut issues = Vec::new();
        resolve_visibility(Some(declared), None, &mut issues);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].field, "organizationOwnerId");
    }

    #[rstest]
    #[case(Some("organization"))]
    #[case(Some("global"))]
    #[case(None)]
    fn valid_owner_forces_private(#[case] declared: Option<&str>) {
        let mut issues = Vec::new();
        let resolved = resolve_visibility(declared, Some(OWNER), &mut issues);
        assert!(issues.is_empty());
        assert_eq!(resolved.visibility, Visibility::Private);
        assert_eq!(resolved.organization_owner_id.as_deref(), Some(OWNER));
    }

    #[test]
    fn malformed_owner_is_rejected() {
        let mut issues = Vec::new();
        resolve_visibility(Some("global"), Some("not-hex"), &mut issues);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.contains("not-hex"));
    }

    #[test]
    fn clusters_are_normalized_and_filtered() {
        let resolution = resolve_clusters(&["spark", "bogus", "RAY"]);
        assert_eq!(resolution.clusters, vec![ClusterType::Spark, ClusterType::Ray]);
        assert_eq!(resolution.dropped, vec!["Bogus".to_string()]);
    }

    #[test]
    fn cluster_duplicates_are_kept() {
        let resolution = resolve_clusters(&["dask", "Dask", "mpi"]);
        assert_eq!(
            resolution.clusters,
            vec![ClusterType::Dask, ClusterType::Dask, ClusterType::Mpi]
        );
        assert!(resolution.dropped.is_empty());
    }

    #[test]
    fn owner_id_pattern() {
        assert!(is_owner_id(OWNER));
        assert!(is_owner_id("ABCDEF0123456789abcdef01"));
        assert!(!is_owner_id("5f1a2b3c4d5e6f7a8b9c0d1"));
        assert!(!is_owner_id("5f1a2b3c4d5e6f7a8b9c0d1ez"));
    }
}
