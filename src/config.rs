//! Run configuration, shared by the pipelines.
use std::{path::PathBuf, time::Duration};

use crate::alignment::{Aligner, ExternalAligner, MergeOptions};
use crate::external::CommandTemplate;
use crate::lang::Lang;
use crate::processing::{ExternalTagger, ExternalTokenizer, Tagger, Tokenizer};

pub struct Config {
    /// languages to process, sorted and deduplicated
    pub languages: Vec<Lang>,
    pub aligner: Box<dyn Aligner>,
    pub tokenizer: Box<dyn Tokenizer>,
    pub tagger: Box<dyn Tagger>,
    pub merge: MergeOptions,
    /// where to write the JSON run report, if anywhere
    pub report: Option<PathBuf>,
}

impl Config {
    /// Default tools (uplug) and merge options for `languages`.
    pub fn new(mut languages: Vec<Lang>) -> Self {
        languages.sort();
        languages.dedup();
        Self {
            languages,
            aligner: Box::<ExternalAligner>::default(),
            tokenizer: Box::<ExternalTokenizer>::default(),
            tagger: Box::<ExternalTagger>::default(),
            merge: MergeOptions::default(),
            report: None,
        }
    }

    /// Replace the external commands. `None` keeps the default command line.
    pub fn with_commands(
        mut self,
        aligner: Option<CommandTemplate>,
        tokenizer: Option<CommandTemplate>,
        tagger: Option<CommandTemplate>,
        timeout: Option<Duration>,
    ) -> Self {
        self.aligner = Box::new(ExternalAligner::new(
            aligner.unwrap_or_else(crate::alignment::aligner::default_template),
            timeout,
        ));
        self.tokenizer = Box::new(ExternalTokenizer::new(
            tokenizer.unwrap_or_else(crate::processing::tokenize::default_template),
            timeout,
        ));
        self.tagger = Box::new(ExternalTagger::new(
            tagger.unwrap_or_else(crate::processing::tag::default_template),
            timeout,
        ));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn languages_normalized() {
        let langs = ["fr", "en", "fr", "de"]
            .iter()
            .map(|l| l.parse().unwrap())
            .collect();
        let config = Config::new(langs);
        let codes: Vec<_> = config.languages.iter().map(Lang::as_str).collect();
        assert_eq!(codes, vec!["de", "en", "fr"]);
        assert!(config.merge.delete_fragments);
        assert!(!config.merge.strict_identity);
    }
}
