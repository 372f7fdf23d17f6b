/*! Raw text fetching

DCEP raw texts are the `.txt` files of `{dcep}/sentence/xml/{LANG}/{document type}/`.
They are copied into the language folders of the output tree; the DCEP tree is never modified.
!*/
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use rayon::prelude::*;

use crate::error::Error;
use crate::lang::Lang;
use crate::processing::files;

/// Which documents to copy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchOptions {
    /// maximum number of files per document type. None copies everything.
    pub limit: Option<usize>,
    /// document types (folder names) to copy. Empty copies every type.
    pub filter: Vec<String>,
}

/// Source folder of `lang` in the DCEP tree.
pub fn lang_source(dcep: &Path, lang: &Lang) -> PathBuf {
    [dcep, Path::new("sentence"), Path::new("xml"), Path::new(&lang.upper())]
        .iter()
        .collect()
}

/// Document type folders to copy from, sorted.
fn document_types(src: &Path, options: &FetchOptions) -> Result<Vec<String>, Error> {
    if !options.filter.is_empty() {
        return Ok(options.filter.clone());
    }

    let mut types = Vec::new();
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            types.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    types.sort();
    Ok(types)
}

/// Copy the raw texts of `lang` into `dst`, returning the number of copied files.
pub fn fetch_lang(dcep: &Path, lang: &Lang, dst: &Path, options: &FetchOptions) -> Result<usize, Error> {
    let src = lang_source(dcep, lang);
    let mut copied = 0;

    for doc_type in document_types(&src, options)? {
        let type_dir = src.join(&doc_type);
        if !type_dir.is_dir() {
            warn!("[{}] no {:?} folder", lang, type_dir);
            continue;
        }

        let texts = files(&type_dir, "txt")?;
        let limit = options.limit.unwrap_or(texts.len());
        for text in texts.iter().take(limit) {
            if let Some(name) = text.file_name() {
                std::fs::copy(text, dst.join(name))?;
                copied += 1;
            }
        }
        debug!("[{}] {}: {} file(s)", lang, doc_type, limit.min(texts.len()));
    }

    info!("[{}] fetched {} raw file(s)", lang, copied);
    Ok(copied)
}

/// Fetch every language concurrently. `lang_dirs` maps each language to its output folder.
pub fn fetch_raw(
    dcep: &Path,
    lang_dirs: &BTreeMap<Lang, PathBuf>,
    options: &FetchOptions,
) -> Result<usize, Error> {
    lang_dirs
        .par_iter()
        .map(|(lang, dst)| fetch_lang(dcep, lang, dst, options))
        .sum()
}
