//! DCEP to OPUS conversion
//!
//! The complete pipeline:
//! 1. create one folder per language in the output tree,
//! 1. copy the raw `.txt` files of each language,
//! 1. strip headers and footers (`.prep`),
//! 1. tokenize into XML,
//! 1. tag the XML files,
//! 1. align each language pair and merge the alignments (see [crate::pipelines::Align]).
//!
//! The DCEP tree is only read from.
use std::path::PathBuf;

use log::{info, warn};

use crate::alignment::PairReport;
use crate::config::Config;
use crate::error::Error;
use crate::lang::create_output_dirs;
use crate::pipelines::{Align, Pipeline};
use crate::processing::{self, fetch::FetchOptions, StageCount};

pub struct Dcep<'a> {
    src: PathBuf,
    dst: PathBuf,
    fetch: FetchOptions,
    config: &'a Config,
}

impl<'a> Dcep<'a> {
    pub fn new(src: PathBuf, dst: PathBuf, fetch: FetchOptions, config: &'a Config) -> Self {
        Self {
            src,
            dst,
            fetch,
            config,
        }
    }
}

fn log_stage(stage: &str, count: StageCount) {
    info!("{}: {} file(s) done", stage, count.done);
    if count.failed > 0 {
        warn!("{}: {} file(s) failed", stage, count.failed);
    }
}

impl<'a> Pipeline<Vec<PairReport>> for Dcep<'a> {
    fn run(&self) -> Result<Vec<PairReport>, Error> {
        info!("Creating language directories...");
        let lang_dirs = create_output_dirs(&self.dst, &self.config.languages)?;

        info!("Fetching raw .txt-files...");
        let fetched = processing::fetch_raw(&self.src, &lang_dirs, &self.fetch)?;
        info!("{} raw file(s) fetched", fetched);

        info!("Preprocessing .txt-files...");
        let mut count = StageCount::default();
        for (lang, dir) in &lang_dirs {
            count += processing::preprocess(lang, dir)?;
        }
        log_stage("preprocessing", count);

        info!("Tokenizing .txt-files into .xml-files...");
        let mut count = StageCount::default();
        for (lang, dir) in &lang_dirs {
            count += processing::tokenize(self.config.tokenizer.as_ref(), lang, dir)?;
        }
        log_stage("tokenization", count);

        info!("Applying the tagger...");
        let mut count = StageCount::default();
        for (lang, dir) in &lang_dirs {
            count += processing::tag(self.config.tagger.as_ref(), lang, dir)?;
        }
        log_stage("tagging", count);

        Align::new(self.src.clone(), self.dst.clone(), self.config).run()
    }
}
