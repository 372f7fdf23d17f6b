/*! Sentence aligner boundary

Alignment itself is delegated to an external tool (uplug's hunalign wrapper by default).
The [Aligner] trait is the seam: the driver only needs raw fragment bytes for an [AlignJob].
Whatever the aligner writes is kept as the fragment, even when it exits with an error.
!*/
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use log::{debug, warn};

use crate::alignment::locate::AlignJob;
use crate::error::Error;
use crate::external::{CommandTemplate, ProcessOutput};

/// Produces a cesAlign fragment for a document pair.
pub trait Aligner: Sync {
    /// `workdir` is the output root; job paths are relative to it.
    ///
    /// `Err` means the aligner could not be run at all.
    fn align(&self, job: &AlignJob, workdir: &Path) -> Result<ProcessOutput, Error>;
}

/// Aligner backed by an external command.
///
/// Placeholders: `{src}`, `{trg}`, `{sl}`, `{tl}`.
#[derive(Debug, Clone)]
pub struct ExternalAligner {
    template: CommandTemplate,
    timeout: Option<Duration>,
}

impl ExternalAligner {
    pub fn new(template: CommandTemplate, timeout: Option<Duration>) -> Self {
        Self { template, timeout }
    }
}

impl Default for ExternalAligner {
    /// `uplug align/hun -src {src} -trg {trg} -s {sl} -t {tl}`, no timeout.
    fn default() -> Self {
        Self {
            template: default_template(),
            timeout: None,
        }
    }
}

pub fn default_template() -> CommandTemplate {
    CommandTemplate::new(
        "uplug",
        &["align/hun", "-src", "{src}", "-trg", "{trg}", "-s", "{sl}", "-t", "{tl}"],
    )
}

impl Aligner for ExternalAligner {
    fn align(&self, job: &AlignJob, workdir: &Path) -> Result<ProcessOutput, Error> {
        let src = job.src.to_string_lossy();
        let trg = job.trg.to_string_lossy();
        self.template.capture(
            &[
                ("src", &*src),
                ("trg", &*trg),
                ("sl", job.pair.sl.as_str()),
                ("tl", job.pair.tl.as_str()),
            ],
            Some(workdir),
            self.timeout,
        )
    }
}

/// A fragment file written for a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub path: PathBuf,
    /// false if the aligner failed. The file then holds whatever it wrote, possibly nothing.
    pub aligned: bool,
}

/// Run `aligner` on `job` and store its output in `output_root/{sl}-{tl}-{ordinal}.xml`.
///
/// Aligner failures are not errors: its output is written as is, and an incomplete fragment
/// will fail the merge later. Only failing to write the fragment is.
pub fn write_fragment(
    aligner: &dyn Aligner,
    job: &AlignJob,
    output_root: &Path,
) -> Result<Fragment, Error> {
    let path = output_root.join(job.pair.fragment_name(job.ordinal));
    let (content, aligned) = match aligner.align(job, output_root) {
        Ok(ProcessOutput {
            stdout,
            failure: None,
        }) => (stdout, true),
        Ok(ProcessOutput {
            stdout,
            failure: Some(e),
        }) => {
            warn!(
                "[{}] aligner failed on {}: {} ({} bytes kept)",
                job.pair,
                job.id,
                e,
                stdout.len()
            );
            (stdout, false)
        }
        Err(e) => {
            warn!("[{}] could not align {}: {}", job.pair, job.id, e);
            (Vec::new(), false)
        }
    };

    debug!("[{}] writing fragment {:?}", job.pair, path);
    std::fs::write(&path, content)?;
    Ok(Fragment { path, aligned })
}
