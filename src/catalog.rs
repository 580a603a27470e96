//! Catalog of os-release descriptors.

use crate::metadata::DISCONTINUED_SEGMENT;
use crate::osrelease::OsRelease;
use failure::{format_err, Fallible};
use itertools::Itertools;
use std::fs;
use std::path::{Component, Path};
use walkdir::{DirEntry, WalkDir};

/// Descriptors collected from a tree, in traversal order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    pub releases: Vec<OsRelease>,
}

impl Catalog {
    /// Walk `root` and parse every non-empty, non-hidden file in it.
    ///
    /// Files without an identifier are skipped; any I/O error aborts the walk.
    pub fn build<P>(root: P) -> Fallible<Self>
    where
        P: AsRef<Path>,
    {
        let root = root.as_ref();
        let mut releases = vec![];

        let walker = WalkDir::new(root)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));
        for entry in walker {
            let entry = entry.map_err(|e| format_err!("failed to walk {}: {}", root.display(), e))?;
            let path = entry.path();
            let meta = fs::metadata(path)
                .map_err(|e| format_err!("failed to stat {}: {}", path.display(), e))?;
            if !meta.is_file() || meta.len() == 0 {
                continue;
            }

            let rel = path.strip_prefix(root).unwrap_or(path);
            let discontinued = is_discontinued(rel);
            if let Some(release) = OsRelease::from_path(path, discontinued)? {
                debug!("cataloged {} --> {}", rel.display(), release);
                releases.push(release);
            }
        }

        info!("cataloged {} os-release entries", releases.len());
        Ok(Self { releases })
    }

    /// Distinct identifiers in the catalog, sorted lexicographically.
    pub fn ids(&self) -> Vec<String> {
        self.releases
            .iter()
            .map(|release| release.id.clone())
            .sorted()
            .dedup()
            .collect()
    }
}

/// Hidden entries (including `.git`) are pruned with their whole subtree.
fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

/// Whether any component of `path` is the discontinued marker.
fn is_discontinued(path: &Path) -> bool {
    path.components().any(|component| match component {
        Component::Normal(segment) => segment == DISCONTINUED_SEGMENT,
        _ => false,
    })
}
