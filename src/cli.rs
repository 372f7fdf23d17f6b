//! Command line arguments and parameters management/parsing.
use std::{path::PathBuf, time::Duration};

use dcep2opus::alignment::MergeOptions;
use dcep2opus::config::Config;
use dcep2opus::external::CommandTemplate;
use dcep2opus::lang::Lang;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "dcep2opus", about = "DCEP to OPUS (cesAlign) conversion tool.")]
/// Holds every command that is callable by the `dcep2opus` command.
pub enum Dcep2Opus {
    #[structopt(about = "Run the whole conversion, from raw DCEP texts to alignment files")]
    Process(Process),
    #[structopt(about = "Align and merge the documents of an already tagged output tree")]
    Align(Align),
    #[structopt(about = "Merge cesAlign fragments into a single alignment file")]
    Merge(Merge),
    #[structopt(about = "Strip headers and footers of raw text files")]
    Preprocess(Preprocess),
}

#[derive(Debug, StructOpt)]
/// External tools and merge behaviour.
pub struct Tooling {
    #[structopt(
        long = "aligner",
        help = "aligner command line. Placeholders: {src} {trg} {sl} {tl}. Default: uplug align/hun"
    )]
    pub aligner: Option<CommandTemplate>,
    #[structopt(
        long = "tokenizer",
        help = "tokenizer command line. Placeholders: {lang} {input}. Default: uplug pre/basic"
    )]
    pub tokenizer: Option<CommandTemplate>,
    #[structopt(
        long = "tagger",
        help = "tagger command line. Placeholders: {lang} {input}. Default: uplug pre/{lang}/tagTree"
    )]
    pub tagger: Option<CommandTemplate>,
    #[structopt(long = "timeout", help = "timeout of each external command, in seconds")]
    pub timeout: Option<u64>,
    #[structopt(long = "keep-fragments", help = "do not delete alignment fragments once merged")]
    pub keep_fragments: bool,
    #[structopt(
        long = "strict-identity",
        help = "fail a merge if link groups disagree on fromDoc/toDoc"
    )]
    pub strict_identity: bool,
    #[structopt(long = "report", parse(from_os_str), help = "write a JSON report there")]
    pub report: Option<PathBuf>,
}

impl Tooling {
    pub fn config(&self, languages: Vec<Lang>) -> Config {
        let mut config = Config::new(languages).with_commands(
            self.aligner.clone(),
            self.tokenizer.clone(),
            self.tagger.clone(),
            self.timeout.map(Duration::from_secs),
        );
        config.merge = MergeOptions {
            delete_fragments: !self.keep_fragments,
            strict_identity: self.strict_identity,
        };
        config.report = self.report.clone();
        config
    }
}

#[derive(Debug, StructOpt)]
/// Process command and parameters.
///
/// ```sh
/// dcep2opus process [FLAGS] [OPTIONS] <src> <dst> --languages <languages>...
/// ```
pub struct Process {
    #[structopt(parse(from_os_str), help = "DCEP location")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "output location")]
    pub dst: PathBuf,
    #[structopt(
        short = "l",
        long = "languages",
        required = true,
        min_values = 2,
        help = "languages to select"
    )]
    pub languages: Vec<Lang>,
    #[structopt(
        long = "limit",
        default_value = "0",
        help = "number of documents to select per document type (0 = all)"
    )]
    pub limit: usize,
    #[structopt(long = "filter", help = "document types to convert")]
    pub filter: Vec<String>,
    #[structopt(flatten)]
    pub tooling: Tooling,
}

#[derive(Debug, StructOpt)]
/// Align command and parameters.
pub struct Align {
    #[structopt(parse(from_os_str), help = "input location (contains indices/)")]
    pub src: PathBuf,
    #[structopt(parse(from_os_str), help = "output location (contains one folder per language)")]
    pub dst: PathBuf,
    #[structopt(required = true, min_values = 2, help = "languages")]
    pub languages: Vec<Lang>,
    #[structopt(flatten)]
    pub tooling: Tooling,
}

#[derive(Debug, StructOpt)]
/// Merge command and parameters.
pub struct Merge {
    #[structopt(parse(from_os_str), required = true, help = "fragment files, in merge order")]
    pub fragments: Vec<PathBuf>,
    #[structopt(short = "o", long = "output", parse(from_os_str), help = "merged file")]
    pub dst: PathBuf,
    #[structopt(long = "delete", help = "delete fragments once merged")]
    pub delete: bool,
    #[structopt(
        long = "strict-identity",
        help = "fail if link groups disagree on fromDoc/toDoc"
    )]
    pub strict_identity: bool,
}

#[derive(Debug, StructOpt)]
/// Preprocess command and parameters.
pub struct Preprocess {
    #[structopt(help = "language of the files")]
    pub lang: Lang,
    #[structopt(parse(from_os_str), required = true, help = "raw .txt files")]
    pub files: Vec<PathBuf>,
}
