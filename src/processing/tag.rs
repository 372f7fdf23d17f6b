/*! Part-of-speech tagging

Tokenized XML documents are annotated in place with part-of-speech tags and lemmas
by an external tagger (TreeTagger, through uplug, by default).

A document is only replaced when the tagger succeeds with a non-empty output,
so a failing tagger leaves the untagged (but alignable) document behind.
!*/
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    time::Duration,
};

use log::{info, warn};
use rayon::prelude::*;

use crate::error::Error;
use crate::external::CommandTemplate;
use crate::lang::Lang;
use crate::processing::{files, StageCount};

/// Returns the tagged version of an XML document.
pub trait Tagger: Sync {
    fn tag(&self, lang: &Lang, xml: &Path) -> Result<Vec<u8>, Error>;
}

/// Tagger backed by an external command. Placeholders: `{lang}`, `{input}`.
#[derive(Debug, Clone)]
pub struct ExternalTagger {
    template: CommandTemplate,
    timeout: Option<Duration>,
}

impl ExternalTagger {
    pub fn new(template: CommandTemplate, timeout: Option<Duration>) -> Self {
        Self { template, timeout }
    }
}

impl Default for ExternalTagger {
    fn default() -> Self {
        Self::new(default_template(), None)
    }
}

/// `uplug pre/{lang}/tagTree -in {input}`
pub fn default_template() -> CommandTemplate {
    CommandTemplate::new("uplug", &["pre/{lang}/tagTree", "-in", "{input}"])
}

impl Tagger for ExternalTagger {
    fn tag(&self, lang: &Lang, xml: &Path) -> Result<Vec<u8>, Error> {
        let input = xml.to_string_lossy();
        self.template.run(
            &[("lang", lang.as_str()), ("input", &*input)],
            None,
            self.timeout,
        )
    }
}

/// Tag `xml` in place. Returns false (keeping the file untouched) if tagging failed.
pub fn tag_file(tagger: &dyn Tagger, lang: &Lang, xml: &Path) -> Result<bool, Error> {
    let tagged = match tagger.tag(lang, xml) {
        Ok(tagged) if !tagged.is_empty() => tagged,
        Ok(_) => {
            warn!("[{}] tagger gave no output for {:?}", lang, xml);
            return Ok(false);
        }
        Err(e) => {
            warn!("[{}] could not tag {:?}: {}", lang, xml, e);
            return Ok(false);
        }
    };

    let mut tmp = OsString::from(xml.as_os_str());
    tmp.push(".tagged");
    let tmp = PathBuf::from(tmp);
    std::fs::write(&tmp, tagged)?;
    std::fs::rename(&tmp, xml)?;
    Ok(true)
}

/// Tag every `.xml` file of `lang_dir`.
pub fn tag(tagger: &dyn Tagger, lang: &Lang, lang_dir: &Path) -> Result<StageCount, Error> {
    let docs = files(lang_dir, "xml")?;
    info!("[{}] tagging {} file(s)", lang, docs.len());

    let outcomes = docs
        .par_iter()
        .map(|doc| tag_file(tagger, lang, doc))
        .collect::<Result<Vec<bool>, Error>>()?;

    let done = outcomes.iter().filter(|ok| **ok).count();
    Ok(StageCount {
        done,
        failed: outcomes.len() - done,
    })
}
