/*! Document locator

Pairs each source document of a language folder with its translation,
using the pair's [TranslationIndex].

Paths are produced relative to the output root (`en/doc.xml`), which is also
the working directory of the aligner.
!*/
use std::path::{Path, PathBuf};

use log::warn;

use crate::alignment::index::{identifier, TranslationIndex};
use crate::error::Error;
use crate::lang::LangPair;
use crate::processing;

/// A source document and its translation, ready to be aligned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignJob {
    pub pair: LangPair,
    /// position of the source document in [source_documents]. Only used for naming fragments.
    pub ordinal: usize,
    pub id: String,
    pub src: PathBuf,
    pub trg: PathBuf,
}

/// Outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(AlignJob),
    NotInIndex { id: String },
    MissingTarget { id: String, trg: PathBuf },
}

/// `*.xml` files of `lang_dir` (non recursive), sorted by file name.
///
/// Sorting makes ordinals (and thus fragment names and merge order)
/// independent of the filesystem enumeration order.
pub fn source_documents(lang_dir: &Path) -> Result<Vec<PathBuf>, Error> {
    processing::files(lang_dir, "xml")
}

pub struct Locator<'a> {
    index: &'a TranslationIndex,
    output_root: &'a Path,
}

impl<'a> Locator<'a> {
    pub fn new(index: &'a TranslationIndex, output_root: &'a Path) -> Self {
        Self { index, output_root }
    }

    /// Resolve the translation of `src`, a file of the source language folder.
    pub fn locate(&self, ordinal: usize, src: &Path) -> Lookup {
        let pair = self.index.pair();
        let id = match identifier(src) {
            Some(id) => id,
            None => {
                return Lookup::NotInIndex {
                    id: src.to_string_lossy().into_owned(),
                }
            }
        };

        let trg_id = match self.index.get(&id) {
            Some(t) => t,
            None => return Lookup::NotInIndex { id },
        };

        let trg = PathBuf::from(pair.tl.as_str()).join(format!("{}.xml", trg_id));
        if !self.output_root.join(&trg).is_file() {
            return Lookup::MissingTarget { id, trg };
        }

        // src lives in output_root/sl, the aligner wants it relative to output_root
        let mut src_rel = PathBuf::from(pair.sl.as_str());
        if let Some(name) = src.file_name() {
            src_rel.push(name);
        }

        Lookup::Found(AlignJob {
            pair: pair.clone(),
            ordinal,
            id,
            src: src_rel,
            trg,
        })
    }

    /// Locate every document of the source language folder.
    /// Misses are logged and returned alongside the jobs.
    pub fn locate_all(&self) -> Result<Vec<Lookup>, Error> {
        let pair = self.index.pair();
        let src_dir = self.output_root.join(pair.sl.as_str());
        let lookups = source_documents(&src_dir)?
            .iter()
            .enumerate()
            .map(|(ordinal, src)| self.locate(ordinal, src))
            .inspect(|lookup| match lookup {
                Lookup::NotInIndex { id } => {
                    warn!("[{}] file {} not found in the index file", pair, id)
                }
                Lookup::MissingTarget { id, trg } => {
                    warn!("[{}] translation for {} ({:?}) not found", pair, id, trg)
                }
                Lookup::Found(_) => (),
            })
            .collect();
        Ok(lookups)
    }
}
