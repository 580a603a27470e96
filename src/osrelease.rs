//! os-release descriptors.
//!
//! A descriptor is a `KEY=VALUE` file in the format of `/etc/os-release`,
//! one per OS variant and version.

use failure::{format_err, Fallible};
use serde_derive::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::{fmt, fs};

/// Key holding the whitespace-separated list of related distributions.
static ID_LIKE: &str = "ID_LIKE";

/// Typed record for a single os-release descriptor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OsRelease {
    // identification
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretty_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpe_name: Option<String>,

    // variant identification
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub id_like: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ostree_version: Option<String>,

    // links
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bug_report_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_policy_url: Option<String>,

    // lifecycle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub support_end: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub discontinued: bool,

    // version
    #[serde(default)]
    pub version_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minor_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_id: Option<String>,

    // codenames
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version_codename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debian_codename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ubuntu_codename: Option<String>,
}

impl OsRelease {
    /// Parse descriptor content into a record.
    ///
    /// Lines without an `=` and unknown keys are ignored. Returns `None`
    /// when no non-empty `ID` is present.
    pub fn parse(content: &str, discontinued: bool) -> Option<Self> {
        let fields = assignments(content);
        let scalar = |key: &str| {
            fields
                .get(key)
                .filter(|value| !value.is_empty())
                .map(|value| value.to_string())
        };

        let id = scalar("ID")?;
        let version_id = scalar("VERSION_ID").unwrap_or_default();
        let (major_version, minor_version) = split_version(&version_id);
        let id_like: Vec<String> = fields
            .get(ID_LIKE)
            .map(|value| value.split_whitespace().map(String::from).collect())
            .unwrap_or_default();

        let release = Self {
            id,
            name: scalar("NAME"),
            pretty_name: scalar("PRETTY_NAME"),
            cpe_name: scalar("CPE_NAME"),
            id_like,
            variant_id: scalar("VARIANT_ID"),
            ostree_version: scalar("OSTREE_VERSION"),
            home_url: scalar("HOME_URL"),
            support_url: scalar("SUPPORT_URL"),
            bug_report_url: scalar("BUG_REPORT_URL"),
            documentation_url: scalar("DOCUMENTATION_URL"),
            privacy_policy_url: scalar("PRIVACY_POLICY_URL"),
            support_end: scalar("SUPPORT_END"),
            discontinued,
            version_id,
            version: scalar("VERSION"),
            major_version,
            minor_version,
            build_id: scalar("BUILD_ID"),
            version_codename: scalar("VERSION_CODENAME"),
            debian_codename: scalar("DEBIAN_CODENAME"),
            ubuntu_codename: scalar("UBUNTU_CODENAME"),
        };
        Some(release)
    }

    /// Read and parse a descriptor file.
    ///
    /// Only failing to read the file is an error; its content is parsed
    /// leniently (non-UTF-8 bytes are replaced).
    pub fn from_path<P>(path: P, discontinued: bool) -> Fallible<Option<Self>>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let raw = fs::read(path)
            .map_err(|e| format_err!("failed to read {}: {}", path.display(), e))?;
        let content = String::from_utf8_lossy(&raw);
        Ok(Self::parse(&content, discontinued))
    }
}

impl fmt::Display for OsRelease {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut label = match &self.pretty_name {
            Some(pretty) => format!("{:?}", pretty),
            None => format!(
                "{:?} @ {}",
                self.name.as_ref().map(String::as_str).unwrap_or_default(),
                self.version_id
            ),
        };
        if !label.contains(&self.version_id) {
            label = format!("{} @ {}", label, self.version_id);
        }

        write!(f, "{}", label)?;
        if let Some(variant) = &self.variant_id {
            write!(f, " [variant={}]", variant)?;
        }
        if !self.id_like.is_empty() {
            write!(f, " [like={}]", self.id_like.join(","))?;
        }
        write!(f, " [id={}]", self.id)
    }
}

/// Collect raw `KEY=VALUE` assignments; later keys override earlier ones.
fn assignments(content: &str) -> HashMap<&str, &str> {
    content
        .lines()
        .filter_map(|line| {
            let mut parts = line.splitn(2, '=');
            let key = parts.next()?;
            let value = parts.next()?;
            Some((key, unquote(value)))
        })
        .collect()
}

/// Strip one layer of double quotes, without any escape processing.
fn unquote(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

/// Derive `(major, minor)` from the first two dot-separated segments.
fn split_version(version_id: &str) -> (Option<String>, Option<String>) {
    let mut segments = version_id
        .split('.')
        .map(|s| Some(s).filter(|s| !s.is_empty()).map(String::from));
    let major = segments.next().and_then(|s| s);
    let minor = segments.next().and_then(|s| s);
    (major, minor)
}

fn is_false(flag: &bool) -> bool {
    !*flag
}

#[cfg(test)]
mod tests {
    use super::*;

    static UBUNTU: &str = r#"PRETTY_NAME="Ubuntu 22.04.3 LTS"
NAME="Ubuntu"
VERSION_ID="22.04"
VERSION="22.04.3 LTS (Jammy Jellyfish)"
VERSION_CODENAME=jammy
ID=ubuntu
ID_LIKE=debian
HOME_URL="https://www.ubuntu.com/"
SUPPORT_URL="https://help.ubuntu.com/"
BUG_REPORT_URL="https://bugs.launchpad.net/ubuntu/"
PRIVACY_POLICY_URL="https://www.ubuntu.com/legal/terms-and-policies/privacy-policy"
UBUNTU_CODENAME=jammy
"#;

    #[test]
    fn parse_ubuntu() {
        let release = OsRelease::parse(UBUNTU, false).unwrap();
        assert_eq!(release.id, "ubuntu");
        assert_eq!(release.version_id, "22.04");
        assert_eq!(release.major_version.as_deref(), Some("22"));
        assert_eq!(release.minor_version.as_deref(), Some("04"));
        assert_eq!(release.pretty_name.as_deref(), Some("Ubuntu 22.04.3 LTS"));
        assert_eq!(release.version_codename.as_deref(), Some("jammy"));
        assert_eq!(release.ubuntu_codename.as_deref(), Some("jammy"));
        assert_eq!(release.id_like, vec!["debian".to_string()]);
        assert_eq!(release.documentation_url, None);
        assert!(!release.discontinued);
    }

    #[test]
    fn parse_without_assignments() {
        assert_eq!(OsRelease::parse("", false), None);
        assert_eq!(OsRelease::parse("just some text\nID ubuntu\n", true), None);
    }

    #[test]
    fn parse_empty_id() {
        assert_eq!(OsRelease::parse("ID=\nVERSION_ID=1\n", false), None);
        assert_eq!(OsRelease::parse("ID=\"\"\nNAME=foo\n", false), None);
    }

    #[test]
    fn parse_version_without_minor() {
        let release = OsRelease::parse("ID=fedora\nVERSION_ID=39\n", false).unwrap();
        assert_eq!(release.major_version.as_deref(), Some("39"));
        assert_eq!(release.minor_version, None);

        let release = OsRelease::parse("ID=arch\n", false).unwrap();
        assert_eq!(release.version_id, "");
        assert_eq!(release.major_version, None);
        assert_eq!(release.minor_version, None);
    }

    #[test]
    fn parse_version_with_patch() {
        let release = OsRelease::parse("ID=bar\nVERSION_ID=2.5.1\n", false).unwrap();
        assert_eq!(release.major_version.as_deref(), Some("2"));
        assert_eq!(release.minor_version.as_deref(), Some("5"));
    }

    #[test]
    fn parse_discontinued_flag() {
        let release = OsRelease::parse("ID=foo\nVERSION_ID=1.0\n", true).unwrap();
        assert!(release.discontinued);
    }

    #[test]
    fn parse_id_like_list() {
        let content = "ID=rocky\nID_LIKE=\"rhel  centos fedora\"\n";
        let release = OsRelease::parse(content, false).unwrap();
        assert_eq!(release.id_like, vec!["rhel", "centos", "fedora"]);
    }

    #[test]
    fn parse_value_with_equals() {
        let content = "ID=foo\nHOME_URL=\"https://example.com/?a=b\"\n";
        let release = OsRelease::parse(content, false).unwrap();
        assert_eq!(
            release.home_url.as_deref(),
            Some("https://example.com/?a=b")
        );
    }

    #[test]
    fn parse_ignores_unknown_and_malformed() {
        let content = "# comment\nFOO=bar\n\nID=\"alpine\"\nbogus line\nVERSION_ID=3.19.0\n";
        let release = OsRelease::parse(content, false).unwrap();
        assert_eq!(release.id, "alpine");
        assert_eq!(release.name, None);
        assert_eq!(release.major_version.as_deref(), Some("3"));
        assert_eq!(release.minor_version.as_deref(), Some("19"));
    }

    #[test]
    fn unquote_single_layer() {
        assert_eq!(unquote("\"debian\""), "debian");
        assert_eq!(unquote("debian"), "debian");
        assert_eq!(unquote("\"\"nested\"\""), "\"nested\"");
        assert_eq!(unquote("'single'"), "'single'");
    }

    #[test]
    fn serialize_omits_absent() {
        let release = OsRelease::parse("ID=foo\nVERSION_ID=1\n", false).unwrap();
        let json = serde_json::to_value(&release).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "foo", "versionId": "1", "majorVersion": "1"})
        );

        let release = OsRelease::parse("ID=foo\n", true).unwrap();
        let json = serde_json::to_value(&release).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": "foo", "versionId": "", "discontinued": true})
        );
    }

    #[test]
    fn display_summary() {
        let release = OsRelease::parse(UBUNTU, false).unwrap();
        assert_eq!(
            release.to_string(),
            r#""Ubuntu 22.04.3 LTS" [like=debian] [id=ubuntu]"#
        );

        let content = "ID=fedora\nNAME=Fedora\nVERSION_ID=39\nVARIANT_ID=coreos\n";
        let release = OsRelease::parse(content, false).unwrap();
        assert_eq!(
            release.to_string(),
            r#""Fedora" @ 39 [variant=coreos] [id=fedora]"#
        );

        let content = "ID=foo\nPRETTY_NAME=\"Foo Linux\"\nVERSION_ID=7\n";
        let release = OsRelease::parse(content, false).unwrap();
        assert_eq!(release.to_string(), r#""Foo Linux" @ 7 [id=foo]"#);
    }
}
