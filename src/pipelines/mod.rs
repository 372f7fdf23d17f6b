//! Pipelines.
//!
//! - [Align] aligns and merges already tagged documents,
//! - [Dcep] runs the whole conversion, from the DCEP tree to cesAlign files.
//!
//! Both implement the light [pipeline::Pipeline] trait.
use std::{fs::File, io::BufWriter, path::Path};

use log::info;

use crate::alignment::PairReport;
use crate::error::Error;

pub mod align;
pub mod dcep;
#[allow(clippy::module_inception)]
pub mod pipeline;

pub use align::Align;
pub use dcep::Dcep;
pub use pipeline::Pipeline;

/// Write pair reports as pretty JSON.
pub fn write_report(path: &Path, reports: &[PairReport]) -> Result<(), Error> {
    info!("writing report to {:?}", path);
    let w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(w, reports)?;
    Ok(())
}
