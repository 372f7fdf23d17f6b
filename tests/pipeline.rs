use std::fs;
use std::path::{Path, PathBuf};

use dcep2opus::alignment::{merge, Aligner, MergeOptions};
use dcep2opus::alignment::locate::AlignJob;
use dcep2opus::config::Config;
use dcep2opus::error::Error;
use dcep2opus::external::ProcessOutput;
use dcep2opus::lang::Lang;
use dcep2opus::pipelines::{Align, Dcep, Pipeline};
use dcep2opus::processing::fetch::FetchOptions;
use dcep2opus::processing::{Tagger, Tokenizer};

/// One `<s>` per non empty line. Fails on documents mentioning "garbled".
struct LineTokenizer;

impl Tokenizer for LineTokenizer {
    fn tokenize(&self, _lang: &Lang, prep: &Path) -> Result<Vec<u8>, Error> {
        let text = fs::read_to_string(prep)?;
        if text.contains("garbled") {
            return Err(Error::Custom("cannot tokenize".to_string()));
        }
        let sentences: String = text
            .lines()
            .filter(|l| !l.trim().is_empty())
            .enumerate()
            .map(|(i, l)| format!("<s id=\"s{}\">{}</s>", i + 1, l))
            .collect();
        Ok(format!("<text>{}</text>", sentences).into_bytes())
    }
}

struct LangTagger;

impl Tagger for LangTagger {
    fn tag(&self, lang: &Lang, xml: &Path) -> Result<Vec<u8>, Error> {
        let doc = fs::read_to_string(xml)?;
        Ok(doc
            .replace("<s ", &format!("<s lang=\"{}\" ", lang))
            .into_bytes())
    }
}

/// Links the first sentences of both documents.
struct FirstSentence;

impl Aligner for FirstSentence {
    fn align(&self, job: &AlignJob, workdir: &Path) -> Result<ProcessOutput, Error> {
        // paths are relative to the output root
        let src = fs::read_to_string(workdir.join(&job.src))?;
        if !src.contains(&format!("lang=\"{}\"", job.pair.sl)) {
            return Err(Error::Custom("untagged source".to_string()));
        }
        Ok(format!(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <cesAlign version=\"1.0\">\n\
             <linkGrp targType=\"s\" fromDoc=\"{}\" toDoc=\"{}\">\n\
             <link xtargets=\"s1;s1\" />\n\
             </linkGrp>\n\
             </cesAlign>\n",
            job.src.display(),
            job.trg.display()
        )
        .into_bytes()
        .into())
    }
}

fn raw_text(marker: &str, body: &[&str]) -> String {
    let mut lines = vec!["European Parliament", "Press service", "2011-07-05 - 13:39"];
    lines.extend_from_slice(body);
    lines.push(marker);
    lines.push("-//EP//TEXT IM-PRESS 20110705IPR23456 0 NOT XML V0//EN");
    lines.join("\n")
}

/// DCEP tree with three English and two French press releases, and an EN-FR index.
fn dcep() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("dcep");

    let en = root.join("sentence/xml/EN/IM-PRESS");
    let fr = root.join("sentence/xml/FR/IM-PRESS");
    fs::create_dir_all(&en).unwrap();
    fs::create_dir_all(&fr).unwrap();

    fs::write(
        en.join("EN-1.txt"),
        raw_text("EN", &["Fisheries reform", "The committee adopted the report."]),
    )
    .unwrap();
    fs::write(
        en.join("EN-2.txt"),
        raw_text("EN", &["Budget vote", "Members approved the budget."]),
    )
    .unwrap();
    fs::write(
        en.join("EN-3.txt"),
        raw_text("EN", &["No translation of this one."]),
    )
    .unwrap();
    fs::write(
        fr.join("FR-1.txt"),
        raw_text("FR", &["Réforme de la pêche", "La commission a adopté le rapport."]),
    )
    .unwrap();
    fs::write(
        fr.join("FR-2.txt"),
        raw_text("FR", &["Vote du budget", "Les députés ont approuvé le budget."]),
    )
    .unwrap();

    fs::create_dir_all(root.join("indices")).unwrap();
    fs::write(
        root.join("indices/EN-FR"),
        "1\tEN/IM-PRESS/EN-1.txt\tFR/IM-PRESS/FR-1.txt\n\
         2\tEN/IM-PRESS/EN-2.txt\tFR/IM-PRESS/FR-2.txt\n",
    )
    .unwrap();

    (dir, root)
}

fn config(report: Option<PathBuf>) -> Config {
    let mut config = Config::new(vec!["fr".parse().unwrap(), "en".parse().unwrap()]);
    config.aligner = Box::new(FirstSentence);
    config.tokenizer = Box::new(LineTokenizer);
    config.tagger = Box::new(LangTagger);
    config.report = report;
    config
}

#[test_log::test]
fn dcep_to_cesalign() {
    let (dir, src) = dcep();
    let dst = dir.path().join("opus");
    let config = config(Some(dir.path().join("report.json")));

    let reports = Dcep::new(src.clone(), dst.clone(), FetchOptions::default(), &config)
        .run()
        .unwrap();

    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert!(report.is_ok(), "{:?}", report);
    assert_eq!(report.aligned, 2);
    assert_eq!(report.not_in_index, 1);
    assert_eq!(report.missing_target, 0);

    // raw, preprocessed and tagged documents
    let en = dst.join("en");
    assert!(en.join("EN-1.txt").is_file());
    let prep = fs::read_to_string(en.join("EN-1.prep")).unwrap();
    assert!(prep.contains("The committee adopted the report."));
    assert!(!prep.contains("Press service"));
    assert!(!prep.contains("-//EP"));
    let tagged = fs::read_to_string(en.join("EN-1.xml")).unwrap();
    assert!(tagged.contains("<s lang=\"en\" id=\"s1\">"));

    // merged alignment, fragments gone
    let merged = fs::read_to_string(dst.join("en-fr.xml")).unwrap();
    assert!(merged.starts_with("<?xml version='1.0' encoding='UTF-8'?>\n<!DOCTYPE cesAlign"));
    assert!(merged.contains("<cesAlign version=\"1.0\" fromDoc=\"en\" toDoc=\"fr\">"));
    assert_eq!(merged.matches("<linkGrp ").count(), 2);
    let first = merged.find("fromDoc=\"en/EN-1.xml\" toDoc=\"fr/FR-1.xml\"").unwrap();
    let second = merged.find("fromDoc=\"en/EN-2.xml\" toDoc=\"fr/FR-2.xml\"").unwrap();
    assert!(first < second);
    assert!(!dst.join("en-fr-0.xml").exists());
    assert!(!dst.join("en-fr-1.xml").exists());

    // the DCEP tree is left as is
    assert!(!src.join("sentence/xml/EN/IM-PRESS/EN-1.prep").exists());

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join("report.json")).unwrap()).unwrap();
    assert_eq!(report[0]["pair"], "en-fr");
    assert_eq!(report[0]["aligned"], 2);
}

#[test_log::test]
fn untokenizable_document_is_not_aligned() {
    let (dir, src) = dcep();
    fs::write(
        src.join("sentence/xml/FR/IM-PRESS/FR-2.txt"),
        raw_text("FR", &["garbled content."]),
    )
    .unwrap();
    let dst = dir.path().join("opus");
    let config = config(None);

    let reports = Dcep::new(src, dst.clone(), FetchOptions::default(), &config)
        .run()
        .unwrap();

    assert!(!dst.join("fr/FR-2.xml").exists());
    assert!(reports[0].is_ok());
    assert_eq!(reports[0].aligned, 1);
    assert_eq!(reports[0].missing_target, 1);
    let merged = fs::read_to_string(dst.join("en-fr.xml")).unwrap();
    assert_eq!(merged.matches("<linkGrp ").count(), 1);
}

#[test_log::test]
fn limit_and_filter() {
    let (dir, src) = dcep();
    fs::create_dir_all(src.join("sentence/xml/EN/PRESS")).unwrap();
    fs::write(
        src.join("sentence/xml/EN/PRESS/EN-9.txt"),
        raw_text("EN", &["Filtered out."]),
    )
    .unwrap();
    let dst = dir.path().join("opus");
    let config = config(None);
    let fetch = FetchOptions {
        limit: Some(1),
        filter: vec!["IM-PRESS".to_string()],
    };

    let reports = Dcep::new(src, dst.clone(), fetch, &config).run().unwrap();

    assert!(dst.join("en/EN-1.txt").is_file());
    assert!(!dst.join("en/EN-2.txt").exists());
    assert!(!dst.join("en/EN-9.txt").exists());
    assert_eq!(reports[0].aligned, 1);
}

#[test_log::test]
fn realign_keeping_fragments() {
    let (dir, src) = dcep();
    let dst = dir.path().join("opus");
    let mut config = config(None);
    Dcep::new(src.clone(), dst.clone(), FetchOptions::default(), &config)
        .run()
        .unwrap();

    fs::remove_file(dst.join("en-fr.xml")).unwrap();
    config.merge = MergeOptions {
        delete_fragments: false,
        strict_identity: true,
    };
    let reports = Align::new(src, dst.clone(), &config).run().unwrap();
    assert!(reports[0].is_ok());
    assert!(dst.join("en-fr.xml").is_file());
    assert!(dst.join("en-fr-0.xml").is_file());
    assert!(dst.join("en-fr-1.xml").is_file());

    // merging the kept fragments by hand gives the same file
    let by_hand = dir.path().join("by-hand.xml");
    let summary = merge(
        &[dst.join("en-fr-0.xml"), dst.join("en-fr-1.xml")],
        &by_hand,
        MergeOptions {
            delete_fragments: true,
            strict_identity: false,
        },
    )
    .unwrap();
    assert_eq!(summary.link_groups, 2);
    assert_eq!(
        fs::read_to_string(&by_hand).unwrap(),
        fs::read_to_string(dst.join("en-fr.xml")).unwrap()
    );
    assert!(!dst.join("en-fr-0.xml").exists());
}

#[test_log::test]
fn missing_index_fails_the_pair_only() {
    let (dir, src) = dcep();
    fs::remove_file(src.join("indices/EN-FR")).unwrap();
    let dst = dir.path().join("opus");
    let config = config(None);

    let reports = Dcep::new(src, dst.clone(), FetchOptions::default(), &config)
        .run()
        .unwrap();

    assert!(!reports[0].is_ok());
    assert!(reports[0].error.as_ref().unwrap().contains("en-fr"));
    assert!(!dst.join("en-fr.xml").exists());
    // earlier stages still ran
    assert!(dst.join("fr/FR-1.xml").is_file());
}
