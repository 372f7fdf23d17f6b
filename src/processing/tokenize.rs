//! Tokenization of preprocessed texts into XML (`.prep` → `.xml`).
use std::{path::Path, time::Duration};

use log::{info, warn};
use rayon::prelude::*;

use crate::error::Error;
use crate::external::CommandTemplate;
use crate::lang::Lang;
use crate::processing::{files, StageCount};

/// Turns a preprocessed text into a sentence-split, tokenized XML document.
pub trait Tokenizer: Sync {
    fn tokenize(&self, lang: &Lang, prep: &Path) -> Result<Vec<u8>, Error>;
}

/// Tokenizer backed by an external command. Placeholders: `{lang}`, `{input}`.
#[derive(Debug, Clone)]
pub struct ExternalTokenizer {
    template: CommandTemplate,
    timeout: Option<Duration>,
}

impl ExternalTokenizer {
    pub fn new(template: CommandTemplate, timeout: Option<Duration>) -> Self {
        Self { template, timeout }
    }
}

impl Default for ExternalTokenizer {
    /// uplug's basic preprocessing chain: `uplug -f pre/basic pre/{lang}/basic -in {input}`
    fn default() -> Self {
        Self::new(default_template(), None)
    }
}

pub fn default_template() -> CommandTemplate {
    CommandTemplate::new(
        "uplug",
        &["-f", "pre/basic", "pre/{lang}/basic", "-in", "{input}"],
    )
}

impl Tokenizer for ExternalTokenizer {
    fn tokenize(&self, lang: &Lang, prep: &Path) -> Result<Vec<u8>, Error> {
        let input = prep.to_string_lossy();
        self.template.run(
            &[("lang", lang.as_str()), ("input", &*input)],
            None,
            self.timeout,
        )
    }
}

/// Tokenize every `.prep` file of `lang_dir` into a sibling `.xml` file.
///
/// A failing document gets no `.xml` file and is counted as failed.
pub fn tokenize(tokenizer: &dyn Tokenizer, lang: &Lang, lang_dir: &Path) -> Result<StageCount, Error> {
    let preps = files(lang_dir, "prep")?;
    info!("[{}] tokenizing {} file(s)", lang, preps.len());

    let outcomes = preps
        .par_iter()
        .map(|prep| -> Result<bool, Error> {
            match tokenizer.tokenize(lang, prep) {
                Ok(xml) => {
                    std::fs::write(prep.with_extension("xml"), xml)?;
                    Ok(true)
                }
                Err(e) => {
                    warn!("[{}] could not tokenize {:?}: {}", lang, prep, e);
                    Ok(false)
                }
            }
        })
        .collect::<Result<Vec<bool>, Error>>()?;

    let done = outcomes.iter().filter(|ok| **ok).count();
    Ok(StageCount {
        done,
        failed: outcomes.len() - done,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Wrap;

    impl Tokenizer for Wrap {
        fn tokenize(&self, lang: &Lang, prep: &Path) -> Result<Vec<u8>, Error> {
            let text = std::fs::read_to_string(prep)?;
            if text.is_empty() {
                return Err(Error::Custom("nothing to tokenize".to_string()));
            }
            Ok(format!("<text lang=\"{}\"><s id=\"s1\">{}</s></text>", lang, text).into_bytes())
        }
    }

    #[test]
    fn tokenize_folder() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.prep"), "Hello.").unwrap();
        std::fs::write(dir.path().join("b.prep"), "").unwrap();
        std::fs::write(dir.path().join("c.txt"), "raw").unwrap();

        let en: Lang = "en".parse().unwrap();
        let count = tokenize(&Wrap, &en, dir.path()).unwrap();
        assert_eq!(count, StageCount { done: 1, failed: 1 });
        assert_eq!(
            std::fs::read_to_string(dir.path().join("a.xml")).unwrap(),
            "<text lang=\"en\"><s id=\"s1\">Hello.</s></text>"
        );
        assert!(!dir.path().join("b.xml").exists());
        assert!(!dir.path().join("c.xml").exists());
    }

    #[cfg(unix)]
    #[test]
    fn external_tokenizer() {
        let dir = tempfile::tempdir().unwrap();
        let prep = dir.path().join("a.prep");
        std::fs::write(&prep, "<s>x</s>").unwrap();

        let tokenizer = ExternalTokenizer::new("cat {input}".parse().unwrap(), None);
        let out = tokenizer.tokenize(&"en".parse().unwrap(), &prep).unwrap();
        assert_eq!(out, b"<s>x</s>");
    }

    #[test]
    fn default_command() {
        assert_eq!(
            default_template().render(&[("lang", "de"), ("input", "de/a.prep")]),
            vec!["-f", "pre/basic", "pre/de/basic", "-in", "de/a.prep"]
        );
    }
}
