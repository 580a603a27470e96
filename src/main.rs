extern crate env_logger;
extern crate failure;
#[macro_use]
extern crate log;
#[macro_use]
extern crate maplit;
extern crate serde;
extern crate serde_derive;
extern crate serde_json;
extern crate structopt;

mod catalog;
mod config;
mod lifecycle;
mod metadata;
mod osrelease;
mod repo;
mod scraper;
mod storage;
mod translate;

use failure::{format_err, Fallible};
use std::fs;
use std::path::PathBuf;
use structopt::StructOpt;

fn main() -> Fallible<()> {
    let opts = CliOptions::from_args();
    let log_filter = format!("{}={}", module_path!(), opts.log_level());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_filter))
        .try_init()?;
    trace!("starting with options: {:#?}", opts);

    let (cfg, cmd) = opts.into_config()?;
    trace!("effective config: {:#?}", cfg);

    fs::create_dir_all(&cfg.data_dir)
        .map_err(|e| format_err!("failed to create {}: {}", cfg.data_dir.display(), e))?;
    let hclient = scraper::new_client(cfg.http_timeout())?;

    match cmd {
        Command::Gather { descriptors } => {
            let ids = write_catalog(&cfg, &hclient, descriptors)?;
            write_lifecycle(&cfg, hclient, &ids)
        }
        Command::Catalog { descriptors } => write_catalog(&cfg, &hclient, descriptors).map(|_| ()),
        Command::Lifecycle {} => {
            let releases = storage::read_catalog(cfg.catalog_path())?;
            let ids = catalog::Catalog { releases }.ids();
            write_lifecycle(&cfg, hclient, &ids)
        }
    }
}

/// Build the os-release catalog and write it out, returning its identifiers.
fn write_catalog(
    cfg: &config::FileConfig,
    hclient: &reqwest::Client,
    descriptors: Option<PathBuf>,
) -> Fallible<Vec<String>> {
    let tree = match descriptors {
        Some(path) => repo::DescriptorTree::Local(path),
        None => repo::DescriptorTree::download(hclient, &cfg.descriptors_url)?,
    };
    let catalog = catalog::Catalog::build(tree.path())?;

    let dest = cfg.catalog_path();
    storage::write_json(&dest, &catalog.releases)?;
    info!("wrote os-release catalog to {}", dest.display());
    Ok(catalog.ids())
}

/// Gather lifecycle data for `ids` and write it out.
fn write_lifecycle(
    cfg: &config::FileConfig,
    hclient: reqwest::Client,
    ids: &[String],
) -> Fallible<()> {
    info!("fetching lifecycle data for {} operating systems", ids.len());
    let translator = translate::IdTranslator::with_overrides(cfg.translations.clone());
    let source = scraper::HttpSource::new(hclient, cfg.lifecycle_url.as_str());
    let releases = scraper::Scraper::new(source, translator).scrape(ids)?;

    let dest = cfg.lifecycle_path();
    storage::write_json(&dest, &releases)?;
    info!("wrote lifecycle data to {}", dest.display());
    Ok(())
}

#[derive(Debug, StructOpt)]
#[structopt(name = "osrel-gather")]
pub(crate) struct CliOptions {
    /// Verbosity level (higher is more verbose).
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbosity: u64,

    /// Path to configuration file.
    #[structopt(short = "c", long = "config", parse(from_os_str))]
    config: Option<PathBuf>,

    /// Directory for output artifacts.
    #[structopt(long = "data-dir", parse(from_os_str))]
    data_dir: Option<PathBuf>,

    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(Debug, StructOpt)]
pub(crate) enum Command {
    /// Build the os-release catalog, then gather lifecycle data for it.
    #[structopt(name = "gather")]
    Gather {
        /// Local descriptor tree to use instead of downloading one.
        #[structopt(long = "descriptors", parse(from_os_str))]
        descriptors: Option<PathBuf>,
    },

    /// Build the os-release catalog only.
    #[structopt(name = "catalog")]
    Catalog {
        /// Local descriptor tree to use instead of downloading one.
        #[structopt(long = "descriptors", parse(from_os_str))]
        descriptors: Option<PathBuf>,
    },

    /// Gather lifecycle data for an existing os-release catalog.
    #[structopt(name = "lifecycle")]
    Lifecycle {},
}

impl CliOptions {
    pub(crate) fn log_level(&self) -> &'static str {
        match self.verbosity {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Merge CLI overrides into the file configuration.
    pub(crate) fn into_config(self) -> Fallible<(config::FileConfig, Command)> {
        let mut cfg = config::FileConfig::read(self.config.as_ref().map(PathBuf::as_path))?;
        if let Some(dir) = self.data_dir {
            cfg.data_dir = dir;
        }
        Ok((cfg, self.cmd))
    }
}
