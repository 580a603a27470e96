//! JSON artifacts on disk.

use crate::osrelease::OsRelease;
use failure::{format_err, Fallible};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Write `value` as pretty-printed JSON, truncating any existing file.
pub fn write_json<T, P>(path: P, value: &T) -> Fallible<()>
where
    T: Serialize + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::create(path)
        .map_err(|e| format_err!("failed to open {}: {}", path.display(), e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)
        .map_err(|e| format_err!("failed to write {}: {}", path.display(), e))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

/// Read a JSON artifact back into `T`.
pub fn read_json<T, P>(path: P) -> Fallible<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file =
        File::open(path).map_err(|e| format_err!("failed to open {}: {}", path.display(), e))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| format_err!("failed to read {}: {}", path.display(), e))
}

pub fn read_catalog<P: AsRef<Path>>(path: P) -> Fallible<Vec<OsRelease>> {
    read_json(path)
}
