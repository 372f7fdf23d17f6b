//! # dcep2opus
//!
//! Converts the DCEP corpus into an aligned, tagged parallel corpus in the OPUS format:
//! one folder of tagged XML documents per language, and one cesAlign file per language pair.
//!
//! ## Getting started
//!
//! ```sh
//! dcep2opus 0.1.0
//! DCEP to OPUS (cesAlign) conversion tool.
//!
//! USAGE:
//!     dcep2opus <SUBCOMMAND>
//!
//! SUBCOMMANDS:
//!     align         Align and merge the documents of an already tagged output tree
//!     help          Prints this message or the help of the given subcommand(s)
//!     merge         Merge cesAlign fragments into a single alignment file
//!     preprocess    Strip headers and footers of raw text files
//!     process       Run the whole conversion, from raw DCEP texts to alignment files
//! ```
//!
//! Verbosity is controlled through `RUST_LOG` (e.g. `RUST_LOG=info`).
use dcep2opus::alignment::{merge, MergeOptions, PairReport};
use dcep2opus::error::Error;
use dcep2opus::pipelines::{Align, Dcep, Pipeline};
use dcep2opus::processing::{fetch::FetchOptions, preprocess_file};
use structopt::StructOpt;

#[macro_use]
extern crate log;

mod cli;

/// Fail the run if any pair failed. Details have already been logged.
fn check_reports(reports: &[PairReport]) -> Result<(), Error> {
    let failed = reports.iter().filter(|r| !r.is_ok()).count();
    if failed > 0 {
        Err(Error::Custom(format!(
            "Errors occurred for {} language pair(s): see previous messages.",
            failed
        )))
    } else {
        Ok(())
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let opt = cli::Dcep2Opus::from_args();
    debug!("cli args\n{:#?}", opt);

    match opt {
        cli::Dcep2Opus::Process(p) => {
            let config = p.tooling.config(p.languages);
            let fetch = FetchOptions {
                limit: (p.limit > 0).then_some(p.limit),
                filter: p.filter,
            };
            let reports = Dcep::new(p.src, p.dst, fetch, &config).run()?;
            check_reports(&reports)?;
        }

        cli::Dcep2Opus::Align(a) => {
            let config = a.tooling.config(a.languages);
            let reports = Align::new(a.src, a.dst, &config).run()?;
            check_reports(&reports)?;
        }

        cli::Dcep2Opus::Merge(m) => {
            let options = MergeOptions {
                delete_fragments: m.delete,
                strict_identity: m.strict_identity,
            };
            let summary = merge(&m.fragments, &m.dst, options)?;
            info!(
                "{} link group(s) from {} fragment(s) written to {:?}",
                summary.link_groups, summary.fragments, m.dst
            );
        }

        cli::Dcep2Opus::Preprocess(p) => {
            for file in &p.files {
                let dst = preprocess_file(&p.lang, file)?;
                info!("[{}] {:?} -> {:?}", p.lang, file, dst);
            }
        }
    };
    Ok(())
}
