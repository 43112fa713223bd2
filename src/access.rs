//! Access gate.
//!
//! Decides *what* to compose for a request, never *who* may see it:
//! authorization happens upstream (edge or gateway) before a request reaches
//! this crate.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::StoryRequest;

/// How the exclusive rendering is granted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessPolicy {
    /// The marker on the request alone selects the full narrative, whatever
    /// the catalogue flag says.
    #[default]
    RequestOnly,
    /// The marker selects the full narrative only for stories the catalogue
    /// flags as exclusive. Marker requests for other stories get the gated
    /// composition.
    RequireCatalogueFlag,
}

impl AccessPolicy {
    /// Short name used in configuration and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RequestOnly => "request_only",
            Self::RequireCatalogueFlag => "require_catalogue_flag",
        }
    }
}

impl fmt::Display for AccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unknown policy name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown access policy: {0}")]
pub struct UnknownAccessPolicy(pub String);

impl FromStr for AccessPolicy {
    type Err = UnknownAccessPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "request_only" => Ok(Self::RequestOnly),
            "require_catalogue_flag" => Ok(Self::RequireCatalogueFlag),
            _ => Err(UnknownAccessPolicy(s.to_string())),
        }
    }
}

/// Access gate bound to a policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessGate {
    policy: AccessPolicy,
}

impl AccessGate {
    /// Create a gate with `policy`.
    pub fn new(policy: AccessPolicy) -> Self {
        Self { policy }
    }

    /// Active policy.
    pub fn policy(&self) -> AccessPolicy {
        self.policy
    }

    /// Whether to compose the exclusive version for `request`.
    pub fn decide(&self, request: &StoryRequest, catalogue_is_exclusive: bool) -> bool {
        match self.policy {
            AccessPolicy::RequestOnly => request.exclusive_requested,
            AccessPolicy::RequireCatalogueFlag => {
                request.exclusive_requested && catalogue_is_exclusive
            }
        }
    }
}

/// Whether the raw path parameter asks for the exclusive version.
///
/// True iff the parameter carries the exclusive marker; the catalogue flag is
/// not consulted.
pub fn decide_access(path_param: &str, catalogue_is_exclusive: bool) -> bool {
    AccessGate::default().decide(&StoryRequest::parse(path_param), catalogue_is_exclusive)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_wins_regardless_of_flag() {
        assert!(decide_access("/stories/foo-_-_-exclusive", false));
        assert!(decide_access("/stories/foo-_-_-exclusive", true));
    }

    #[test]
    fn test_no_marker_is_never_exclusive() {
        assert!(!decide_access("/stories/foo", true));
        assert!(!decide_access("foo", false));
    }

    #[test]
    fn test_require_catalogue_flag_policy() {
        let gate = AccessGate::new(AccessPolicy::RequireCatalogueFlag);
        let request = StoryRequest::parse("foo-_-_-exclusive");
        assert!(gate.decide(&request, true));
        assert!(!gate.decide(&request, false));
        assert!(!gate.decide(&StoryRequest::parse("foo"), true));
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("request_only".parse(), Ok(AccessPolicy::RequestOnly));
        assert_eq!(
            "Require-Catalogue-Flag".parse(),
            Ok(AccessPolicy::RequireCatalogueFlag)
        );
        assert!("open".parse::<AccessPolicy>().is_err());
        assert_eq!(AccessPolicy::default().to_string(), "request_only");
    }
}
