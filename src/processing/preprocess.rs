/*! Header/footer stripping

DCEP raw texts carry boilerplate around the actual document. Preprocessing keeps
what lies between the publication timestamp and the attachments, and inserts a
blank line before probable titles so the tokenizer starts new paragraphs there.

For each line:
- everything up to (and including) the first `2011-07-05 - 13:39` timestamp is dropped,
- a line starting with 8 digits ends the document if they form a `%Y%m%d` date, and is dropped otherwise,
- a line being the uppercase language code, or starting with `-//`, ends the document,
- the first kept line loses its leading contact details (e-mail addresses, phone numbers),
- a line not ending with punctuation is considered a title.
!*/
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use rayon::prelude::*;
use regex::Regex;

use crate::error::Error;
use crate::lang::Lang;
use crate::processing::{files, StageCount};

lazy_static! {
    static ref EMAIL: Regex =
        Regex::new(r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9.-]+").expect("invalid e-mail regex");
    /// phone numbers look like (+32) 2 28 41009 or ( +32 ) 2 28 44264
    static ref PHONE: Regex =
        Regex::new(r"\(\s*\+[0-9]{2}\s*\)[\s0-9]+").expect("invalid phone regex");
}

/// Publication timestamp, `2011-07-05 - 13:39`.
fn is_timestamp(line: &str) -> bool {
    NaiveDateTime::parse_from_str(line, "%Y-%m-%d - %H:%M").is_ok()
}

/// `20110705`-like dates, which start attachment listings.
fn is_compact_date(digits: &str) -> bool {
    if digits.len() != 8 {
        return false;
    }
    let (y, md) = digits.split_at(4);
    let (m, d) = md.split_at(2);
    match (y.parse(), m.parse(), d.parse()) {
        (Ok(y), Ok(m), Ok(d)) => NaiveDate::from_ymd_opt(y, m, d).is_some(),
        _ => false,
    }
}

/// Drop everything up to the end of the last match of `re`.
fn trim_from_last<'a>(re: &Regex, line: &'a str) -> &'a str {
    match re.find_iter(line).last() {
        Some(m) => line[m.end()..].trim(),
        None => line,
    }
}

/// Preprocess the lines of a document written in `lang`.
pub fn preprocess_lines<'a, I>(lang: &Lang, lines: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let lang_marker = lang.upper();
    let mut out = Vec::new();
    let mut look_for_date = true;
    let mut kept = 0;

    for line in lines {
        let line = line.trim();

        if look_for_date {
            if is_timestamp(line) {
                look_for_date = false;
            }
            continue;
        }

        let head: String = line.chars().take(8).collect();
        if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) {
            if is_compact_date(&head) {
                break;
            }
            continue;
        }
        if line == lang_marker || line.starts_with("-//") {
            break;
        }

        let line = if kept == 0 {
            trim_from_last(&PHONE, trim_from_last(&EMAIL, line))
        } else {
            line
        };

        // titles
        if !line.ends_with(|c: char| c.is_ascii_punctuation()) {
            out.push(String::new());
        }
        out.push(line.to_string());
        kept += 1;
    }

    out
}

/// Preprocess `path` into a sibling `.prep` file, returning its path.
pub fn preprocess_file(lang: &Lang, path: &Path) -> Result<PathBuf, Error> {
    let raw = std::fs::read(path)?;
    let content = String::from_utf8_lossy(&raw);
    let lines = preprocess_lines(lang, content.lines());

    let dst = path.with_extension("prep");
    debug!("[{}] {:?}: {} lines kept", lang, dst, lines.len());
    std::fs::write(&dst, lines.join("\n"))?;
    Ok(dst)
}

/// Preprocess every `.txt` file of `lang_dir`.
///
/// Unreadable files are logged and counted as failed.
pub fn preprocess(lang: &Lang, lang_dir: &Path) -> Result<StageCount, Error> {
    let paths = files(lang_dir, "txt")?;
    info!("[{}] preprocessing {} file(s)", lang, paths.len());

    let failed = paths
        .par_iter()
        .filter_map(|path| preprocess_file(lang, path).err().map(|e| (path, e)))
        .inspect(|(path, e)| warn!("[{}] could not preprocess {:?}: {}", lang, path, e))
        .count();

    Ok(StageCount {
        done: paths.len() - failed,
        failed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en() -> Lang {
        "en".parse().unwrap()
    }

    #[test]
    fn compact_dates() {
        assert!(is_compact_date("20110705"));
        assert!(!is_compact_date("20111305"));
        assert!(!is_compact_date("2011"));
        assert!(!is_compact_date("12345678"));
    }

    #[test]
    fn timestamps() {
        assert!(is_timestamp("2011-07-05 - 13:39"));
        assert!(!is_timestamp("2011-07-05"));
        assert!(!is_timestamp("Press release"));
    }

    #[test]
    fn header_and_footer() {
        let doc = "European Parliament\n\
                   Press service\n\
                   2011-07-05 - 13:39\n\
                   Budget talks resume\n\
                   The committee met today.\n\
                   It will meet again.\n\
                   20110705IPR23456\n\
                   Attachments";
        assert_eq!(
            preprocess_lines(&en(), doc.lines()),
            vec![
                "",
                "Budget talks resume",
                "The committee met today.",
                "It will meet again."
            ]
        );
    }

    #[test]
    fn stop_markers() {
        let doc = "2011-07-05 - 13:39\nFirst.\nEN\nafter";
        assert_eq!(preprocess_lines(&en(), doc.lines()), vec!["First."]);

        let doc = "2011-07-05 - 13:39\nFirst.\n-//EP//TEXT\nafter";
        assert_eq!(preprocess_lines(&en(), doc.lines()), vec!["First."]);
    }

    #[test]
    fn digit_lines_dropped() {
        let doc = "2011-07-05 - 13:39\nFirst.\n2011\n99999999 x\nLast.";
        assert_eq!(preprocess_lines(&en(), doc.lines()), vec!["First.", "Last."]);
    }

    #[test]
    fn no_timestamp() {
        assert!(preprocess_lines(&en(), "a.\nb.\n".lines()).is_empty());
    }

    #[test]
    fn contact_details() {
        let doc = "2011-07-05 - 13:39\n\
                   John Doe press@europarl.europa.eu (+32) 2 28 41009 MEPs vote today.\n\
                   Contact press@europarl.europa.eu.";
        assert_eq!(
            preprocess_lines(&en(), doc.lines()),
            vec!["MEPs vote today.", "Contact press@europarl.europa.eu."]
        );
    }

    #[test]
    fn blank_lines_become_titles() {
        let doc = "2011-07-05 - 13:39\nFirst.\n\nSecond.";
        assert_eq!(
            preprocess_lines(&en(), doc.lines()),
            vec!["First.", "", "", "Second."]
        );
    }

    #[test]
    fn prep_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        std::fs::write(&path, "header\r\n2011-07-05 - 13:39\r\nTitle\r\nBody.\r\n").unwrap();

        let count = preprocess(&en(), dir.path()).unwrap();
        assert_eq!(count, StageCount { done: 1, failed: 0 });
        assert_eq!(
            std::fs::read_to_string(dir.path().join("doc.prep")).unwrap(),
            "\nTitle\nBody."
        );
    }
}
