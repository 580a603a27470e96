//! Descriptor tree supplier.

use failure::{format_err, Fallible};
use flate2::read::GzDecoder;
use std::io::Read;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A tree of os-release descriptors on the local filesystem.
///
/// Downloaded trees live in a temporary directory, removed on drop.
#[derive(Debug)]
pub enum DescriptorTree {
    Local(PathBuf),
    Downloaded(TempDir),
}

impl DescriptorTree {
    /// Download and unpack a gzip'd tarball of descriptors.
    pub fn download(hclient: &reqwest::Client, url: &str) -> Fallible<Self> {
        let tmpdir = tempfile::Builder::new()
            .prefix("os-release-repo")
            .tempdir()
            .map_err(|e| format_err!("failed to create temp dir: {}", e))?;

        info!("downloading descriptors from {}", url);
        let resp = hclient
            .get(url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| format_err!("failed to fetch {}: {}", url, e))?;
        unpack(resp, tmpdir.path())
            .map_err(|e| format_err!("failed to unpack {}: {}", url, e))?;

        Ok(DescriptorTree::Downloaded(tmpdir))
    }

    pub fn path(&self) -> &Path {
        match self {
            DescriptorTree::Local(path) => path,
            DescriptorTree::Downloaded(tmpdir) => tmpdir.path(),
        }
    }
}

fn unpack<R: Read>(reader: R, dest: &Path) -> Fallible<()> {
    let mut archive = tar::Archive::new(GzDecoder::new(reader));
    archive.unpack(dest)?;
    Ok(())
}
