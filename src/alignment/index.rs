/*! Translation indices

DCEP ships, for each language pair, an index file at `indices/{SL}-{TL}` listing which
document translates which. Each line holds three tab-separated fields:
an unused one, the source document path and the target document path.

Documents are identified by their file name without extension.
!*/
use std::{
    collections::HashMap,
    fs::File,
    io::Read,
    path::{Path, PathBuf},
};

use log::debug;

use crate::error::Error;
use crate::lang::LangPair;

/// Source document identifier → target document identifier, for one language pair.
#[derive(Debug)]
pub struct TranslationIndex {
    pair: LangPair,
    translations: HashMap<String, String>,
}

impl TranslationIndex {
    /// Location of the index file of `pair` under `input_root`.
    pub fn path(input_root: &Path, pair: &LangPair) -> PathBuf {
        [input_root, Path::new("indices"), Path::new(&pair.index_name())]
            .iter()
            .collect()
    }

    /// Read the index of `pair` from `input_root/indices`.
    pub fn from_input_root(input_root: &Path, pair: &LangPair) -> Result<Self, Error> {
        let path = Self::path(input_root, pair);
        debug!("[{}] reading index {:?}", pair, path);
        let f = File::open(&path).map_err(|e| Error::Index {
            pair: pair.to_string(),
            line: None,
            reason: format!("could not open {:?}: {}", path, e),
        })?;
        Self::from_reader(f, pair.clone())
    }

    /// Parse index records from `reader`.
    ///
    /// Later records win over earlier ones with the same source identifier.
    /// Any record without exactly three fields fails the whole index.
    pub fn from_reader<R: Read>(reader: R, pair: LangPair) -> Result<Self, Error> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(reader);

        let mut translations = HashMap::new();
        for record in rdr.records() {
            let record = record.map_err(|e| Error::Index {
                pair: pair.to_string(),
                line: e.position().map(|p| p.line()),
                reason: e.to_string(),
            })?;
            let line = record.position().map(|p| p.line());
            let malformed = |reason: String| Error::Index {
                pair: pair.to_string(),
                line,
                reason,
            };

            if record.len() != 3 {
                return Err(malformed(format!(
                    "expected 3 tab-separated fields, got {}",
                    record.len()
                )));
            }

            let src = identifier(&record[1])
                .ok_or_else(|| malformed(format!("invalid source path {:?}", &record[1])))?;
            let trg = identifier(&record[2])
                .ok_or_else(|| malformed(format!("invalid target path {:?}", &record[2])))?;

            translations.insert(src, trg);
        }

        debug!("[{}] {} translations indexed", pair, translations.len());
        Ok(Self { pair, translations })
    }

    /// Target identifier of the `src` document.
    pub fn get(&self, src: &str) -> Option<&str> {
        self.translations.get(src).map(String::as_str)
    }

    pub fn pair(&self) -> &LangPair {
        &self.pair
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }
}

/// File name without its extension.
pub fn identifier<P: AsRef<Path>>(path: P) -> Option<String> {
    let path = path.as_ref();
    let stem = Path::new(path.to_str()?.trim()).file_stem()?;
    Some(stem.to_string_lossy().into_owned())
}
