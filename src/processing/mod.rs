/*! Document processing

Stages that run on each language folder before alignment:

1. [fetch]: copy raw `.txt` files out of the DCEP tree,
1. [preprocess]: strip headers/footers and mark probable titles (`.txt` → `.prep`),
1. [tokenize]: sentence split and tokenize into XML (`.prep` → `.xml`),
1. [tag]: add part-of-speech and lemma annotations to the XML files, in place.

Tokenization and tagging are done by external tools.
!*/
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Error;

pub mod fetch;
pub mod preprocess;
pub mod tag;
pub mod tokenize;

pub use fetch::fetch_raw;
pub use preprocess::{preprocess, preprocess_file};
pub use tag::{tag, ExternalTagger, Tagger};
pub use tokenize::{tokenize, ExternalTokenizer, Tokenizer};

/// Per-folder outcome of a stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StageCount {
    pub done: usize,
    pub failed: usize,
}

impl std::ops::AddAssign for StageCount {
    fn add_assign(&mut self, rhs: Self) {
        self.done += rhs.done;
        self.failed += rhs.failed;
    }
}

/// Files of `dir` (non recursive) with extension `ext`, sorted by name.
pub fn files(dir: &Path, ext: &str) -> Result<Vec<PathBuf>, Error> {
    let dir_str = dir
        .to_str()
        .ok_or_else(|| Error::Custom(format!("invalid folder: {:?}", dir)))?;
    let pattern = format!("{}/*.{}", glob::Pattern::escape(dir_str), ext);

    let mut paths = glob::glob(&pattern)?.collect::<Result<Vec<_>, _>>()?;
    paths.retain(|p| p.is_file());
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.txt", "a.txt", "c.prep", "d.txt.gz"] {
            std::fs::write(dir.path().join(name), "").unwrap();
        }
        std::fs::create_dir(dir.path().join("e.txt")).unwrap();

        let names: Vec<_> = files(dir.path(), "txt")
            .unwrap()
            .into_iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn stage_count_sum() {
        let mut c = StageCount::default();
        c += StageCount { done: 2, failed: 1 };
        c += StageCount { done: 1, failed: 0 };
        assert_eq!(c, StageCount { done: 3, failed: 1 });
    }
}
