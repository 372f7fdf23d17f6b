/*! Pair iteration

For each language pair (in sorted order), the driver reads the translation index,
locates document pairs, runs the aligner on each of them (in parallel, one fragment
file per document) and finally merges the pair's fragments into `{sl}-{tl}.xml`.

Pairs are isolated: a bad index or a bad fragment is reported in the pair's [PairReport]
and the next pair is processed. Only filesystem errors stop the run.
!*/
use std::path::{Path, PathBuf};

use log::{error, info};
use rayon::prelude::*;
use serde::Serialize;

use crate::alignment::aligner::{write_fragment, Aligner};
use crate::alignment::index::TranslationIndex;
use crate::alignment::locate::{Locator, Lookup};
use crate::alignment::merge::{merge, pair_fragments, MergeOptions, MergeSummary};
use crate::error::Error;
use crate::lang::{pairs, Lang, LangPair};

/// What happened to a language pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairReport {
    pub pair: String,
    /// documents for which the aligner succeeded
    pub aligned: usize,
    /// documents for which the aligner failed (their fragment is empty)
    pub failed: usize,
    pub not_in_index: usize,
    pub missing_target: usize,
    pub merged: Option<PathBuf>,
    pub merge: Option<MergeSummary>,
    pub error: Option<String>,
}

impl PairReport {
    fn new(pair: &LangPair) -> Self {
        Self {
            pair: pair.to_string(),
            ..Default::default()
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub struct PairDriver<'a> {
    input_root: PathBuf,
    output_root: PathBuf,
    aligner: &'a dyn Aligner,
    options: MergeOptions,
}

impl<'a> PairDriver<'a> {
    /// `input_root` holds the `indices` folder, `output_root` the language folders.
    pub fn new(
        input_root: &Path,
        output_root: &Path,
        aligner: &'a dyn Aligner,
        options: MergeOptions,
    ) -> Self {
        Self {
            input_root: input_root.to_path_buf(),
            output_root: output_root.to_path_buf(),
            aligner,
            options,
        }
    }

    /// Run every pair of `langs`.
    ///
    /// Returns one report per pair, in processing order.
    pub fn run(&self, langs: &[Lang]) -> Result<Vec<PairReport>, Error> {
        let pairs = pairs(langs);
        info!("{} language pair(s) to align", pairs.len());
        pairs.iter().map(|pair| self.run_pair(pair)).collect()
    }

    /// Align then merge `pair`.
    ///
    /// Errors that only concern this pair end up in the report.
    pub fn run_pair(&self, pair: &LangPair) -> Result<PairReport, Error> {
        let mut report = PairReport::new(pair);

        let outcome = self
            .align_pair(pair, &mut report)
            .and_then(|_| self.merge_pair(pair));

        match outcome {
            Ok(summary) => {
                report.merged = Some(self.output_root.join(pair.merged_name()));
                report.merge = Some(summary);
            }
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                error!("[{}] {}", pair, e);
                report.error = Some(e.to_string());
            }
        }
        Ok(report)
    }

    /// Write a fragment for each translated document of `pair`.
    pub fn align_pair(&self, pair: &LangPair, report: &mut PairReport) -> Result<(), Error> {
        info!("[{}] aligning on sentence-level", pair);
        let index = TranslationIndex::from_input_root(&self.input_root, pair)?;
        let lookups = Locator::new(&index, &self.output_root).locate_all()?;

        let mut jobs = Vec::with_capacity(lookups.len());
        for lookup in lookups {
            match lookup {
                Lookup::Found(job) => jobs.push(job),
                Lookup::NotInIndex { .. } => report.not_in_index += 1,
                Lookup::MissingTarget { .. } => report.missing_target += 1,
            }
        }

        // every fragment has its own file, and collecting waits for all of them
        let fragments = jobs
            .par_iter()
            .map(|job| write_fragment(self.aligner, job, &self.output_root))
            .collect::<Result<Vec<_>, Error>>()?;

        report.aligned = fragments.iter().filter(|f| f.aligned).count();
        report.failed = fragments.len() - report.aligned;
        info!(
            "[{}] {} aligned, {} failed, {} not in index, {} missing translation",
            pair, report.aligned, report.failed, report.not_in_index, report.missing_target
        );
        Ok(())
    }

    /// Merge every fragment of `pair` found in the output folder.
    pub fn merge_pair(&self, pair: &LangPair) -> Result<MergeSummary, Error> {
        info!("[{}] merging the alignments", pair);
        let fragments = pair_fragments(&self.output_root, pair)?;
        let dst = self.output_root.join(pair.merged_name());
        merge(&fragments, &dst, self.options)
    }
}
