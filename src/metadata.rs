//! Upstream metadata sources.

use serde_derive::Deserialize;
use serde_json::Value;

/// Templated URL for the lifecycle dataset of a single distribution.
pub static LIFECYCLE_JSON: &str = "https://endoflife.date/api/${id}.json";

/// Tarball of the os-release descriptor collection.
pub static DESCRIPTORS_TARBALL: &str =
    "https://github.com/which-distro/os-release/archive/HEAD.tar.gz";

/// Path segment marking end-of-life variants in the descriptor collection.
pub static DISCONTINUED_SEGMENT: &str = "discontinued";

/// A single release cycle, as served by the lifecycle provider.
///
/// Milestone fields are kept as raw JSON, as the provider mixes booleans
/// and dates for them.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseCycle {
    pub cycle: Option<String>,
    pub codename: Option<String>,
    pub release_date: Option<String>,
    pub latest: Option<String>,
    pub latest_release_date: Option<String>,
    pub link: Option<String>,
    #[serde(default)]
    pub lts: Value,
    #[serde(default)]
    pub eol: Value,
    #[serde(default)]
    pub support: Value,
    #[serde(default)]
    pub extended_support: Value,
    #[serde(default)]
    pub discontinued: Value,
}
