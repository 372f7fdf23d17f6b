//! Languages and language pairs.
//!
//! Languages are opaque codes (`en`, `fr`, `ga`...). Pairs are always built from the
//! sorted language set so that each unordered pair gets one fixed direction.
use std::{
    collections::BTreeMap,
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
use log::debug;
use serde::Serialize;

use crate::error::Error;

/// A language code, stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Lang(String);

impl Lang {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Uppercase form, as used in DCEP directory and index names.
    pub fn upper(&self) -> String {
        self.0.to_uppercase()
    }
}

impl FromStr for Lang {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let valid = (2..=3).contains(&s.len()) && s.chars().all(|c| c.is_ascii_alphabetic());
        if valid {
            Ok(Lang(s.to_ascii_lowercase()))
        } else {
            Err(Error::UnknownLang(s.to_string()))
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An ordered language pair, `sl < tl`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LangPair {
    pub sl: Lang,
    pub tl: Lang,
}

impl LangPair {
    /// Builds the canonical pair, whatever the argument order.
    pub fn new(a: Lang, b: Lang) -> Self {
        if a <= b {
            Self { sl: a, tl: b }
        } else {
            Self { sl: b, tl: a }
        }
    }

    /// Index file name (`DE-EN`).
    pub fn index_name(&self) -> String {
        format!("{}-{}", self.sl.upper(), self.tl.upper())
    }

    /// Name of the fragment produced for the `i`th source document.
    pub fn fragment_name(&self, i: usize) -> String {
        format!("{}-{}-{}.xml", self.sl, self.tl, i)
    }

    /// Glob pattern matching every fragment of this pair.
    pub fn fragment_pattern(&self) -> String {
        format!("{}-{}-*.xml", self.sl, self.tl)
    }

    /// Extracts the ordinal out of a fragment file name, if it is one of ours.
    pub fn fragment_ordinal(&self, file_name: &str) -> Option<usize> {
        file_name
            .strip_prefix(&format!("{}-{}-", self.sl, self.tl))
            .and_then(|rest| rest.strip_suffix(".xml"))
            .and_then(|n| n.parse().ok())
    }

    pub fn merged_name(&self) -> String {
        format!("{}-{}.xml", self.sl, self.tl)
    }
}

impl fmt::Display for LangPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.sl, self.tl)
    }
}

/// Every 2-combination of `langs`, in sorted order. Duplicates are ignored.
pub fn pairs(langs: &[Lang]) -> Vec<LangPair> {
    langs
        .iter()
        .sorted()
        .dedup()
        .tuple_combinations()
        .map(|(sl, tl)| LangPair {
            sl: sl.clone(),
            tl: tl.clone(),
        })
        .collect()
}

/// Create `dst` and one folder per language in it, reusing existing ones.
pub fn create_output_dirs(dst: &Path, langs: &[Lang]) -> Result<BTreeMap<Lang, PathBuf>, Error> {
    std::fs::create_dir_all(dst)?;

    let mut dirs = BTreeMap::new();
    for lang in langs {
        let mut lang_dir = PathBuf::from(dst);
        lang_dir.push(lang.as_str());

        //return error only if it's not an AlreadyExists error
        if let Err(e) = std::fs::create_dir(&lang_dir) {
            if e.kind() != std::io::ErrorKind::AlreadyExists {
                return Err(Error::Io(e));
            }
        }
        debug!("[{}] using folder {:?}", lang, lang_dir);
        dirs.insert(lang.clone(), lang_dir);
    }

    Ok(dirs)
}
