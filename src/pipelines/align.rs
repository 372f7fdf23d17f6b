//! Sentence alignment of an already tagged output tree.
use std::path::PathBuf;

use log::{info, warn};

use crate::alignment::{PairDriver, PairReport};
use crate::config::Config;
use crate::error::Error;
use crate::lang::create_output_dirs;
use crate::pipelines::{write_report, Pipeline};

/// Aligns every language pair of `dst` (using indices from `src`) and merges the alignments.
pub struct Align<'a> {
    src: PathBuf,
    dst: PathBuf,
    config: &'a Config,
}

impl<'a> Align<'a> {
    pub fn new(src: PathBuf, dst: PathBuf, config: &'a Config) -> Self {
        Self { src, dst, config }
    }
}

impl<'a> Pipeline<Vec<PairReport>> for Align<'a> {
    fn run(&self) -> Result<Vec<PairReport>, Error> {
        create_output_dirs(&self.dst, &self.config.languages)?;

        info!("Aligning on sentence-level...");
        let driver = PairDriver::new(
            &self.src,
            &self.dst,
            self.config.aligner.as_ref(),
            self.config.merge,
        );
        let reports = driver.run(&self.config.languages)?;

        for report in reports.iter().filter(|r| !r.is_ok()) {
            warn!("[{}] no alignment file produced", report.pair);
        }
        if let Some(path) = &self.config.report {
            write_report(path, &reports)?;
        }
        Ok(reports)
    }
}
