/*! cesAlign merging

The aligner produces one fragment per document pair. Merging gathers every `linkGrp`
of every fragment, in order, under a single `cesAlign` root:

```xml
<?xml version='1.0' encoding='UTF-8'?>
<!DOCTYPE cesAlign PUBLIC "-//CES//DTD XML cesAlign//EN" "dtd/xcesAlign.dtd">
<cesAlign version="1.0" fromDoc="en" toDoc="fr">
  <linkGrp targType="s" fromDoc="en/a.xml" toDoc="fr/b.xml">
    <link xtargets="s1;s1"/>
  </linkGrp>
</cesAlign>
```

The root `fromDoc`/`toDoc` attributes are the first path segment (the language folder)
of the *last* merged group. In strict identity mode, all groups must agree instead.

Link groups are copied event by event: attributes and content are kept as is,
only whitespace between elements is reindented.
!*/
use std::{
    ffi::OsString,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use log::{debug, info, warn};
use quick_xml::{
    events::{BytesEnd, BytesStart, Event},
    Reader, Writer,
};
use serde::Serialize;

use crate::error::Error;
use crate::lang::LangPair;

pub const DTD_PUBLIC_ID: &str = "-//CES//DTD XML cesAlign//EN";
pub const DTD_SYSTEM_ID: &str = "dtd/xcesAlign.dtd";

const ROOT: &str = "cesAlign";
const LINK_GROUP: &[u8] = b"linkGrp";

/// Merge behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// remove fragments once the merged file is written
    pub delete_fragments: bool,
    /// fail on link groups with differing document identities
    pub strict_identity: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            delete_fragments: true,
            strict_identity: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeSummary {
    pub fragments: usize,
    pub link_groups: usize,
    pub from_doc: Option<String>,
    pub to_doc: Option<String>,
}

/// A `linkGrp` subtree lifted from a fragment.
#[derive(Debug, Clone)]
struct LinkGroup {
    from_doc: String,
    to_doc: String,
    events: Vec<Event<'static>>,
}

/// An alignment document being built from fragments.
#[derive(Debug, Default)]
pub struct MergedAlignment {
    from_doc: Option<String>,
    to_doc: Option<String>,
    groups: Vec<LinkGroup>,
    strict_identity: bool,
}

impl MergedAlignment {
    pub fn new(strict_identity: bool) -> Self {
        Self {
            strict_identity,
            ..Default::default()
        }
    }

    /// Number of link groups merged so far.
    pub fn link_groups(&self) -> usize {
        self.groups.len()
    }

    /// Root `fromDoc`/`toDoc`, if any group has been merged.
    pub fn identity(&self) -> Option<(&str, &str)> {
        self.from_doc.as_deref().zip(self.to_doc.as_deref())
    }

    /// Parse the fragment at `path` and append its link groups.
    pub fn add_fragment(&mut self, path: &Path) -> Result<usize, Error> {
        let f = File::open(path)?;
        self.add_reader(BufReader::new(f), path)
    }

    /// Parse a fragment and append its link groups, returning how many were added.
    ///
    /// `origin` is only used in error messages.
    /// Nothing is added if the fragment turns out to be malformed.
    pub fn add_reader<R: BufRead>(&mut self, reader: R, origin: &Path) -> Result<usize, Error> {
        let groups = read_link_groups(reader, origin)?;

        if self.strict_identity {
            let mut expected = self
                .identity()
                .map(|(from, to)| (from.to_string(), to.to_string()));
            for group in &groups {
                let found = (
                    first_segment(&group.from_doc).to_string(),
                    first_segment(&group.to_doc).to_string(),
                );
                if let Some(expected) = &expected {
                    if *expected != found {
                        return Err(Error::IdentityMismatch {
                            path: origin.to_path_buf(),
                            expected: expected.clone(),
                            found,
                        });
                    }
                }
                expected = Some(found);
            }
        }

        if let Some(last) = groups.last() {
            self.from_doc = Some(first_segment(&last.from_doc).to_string());
            self.to_doc = Some(first_segment(&last.to_doc).to_string());
        }

        let added = groups.len();
        self.groups.extend(groups);
        Ok(added)
    }

    /// Serialize the document (declaration, DOCTYPE, indented body).
    pub fn write<W: Write>(&self, mut w: W) -> Result<(), Error> {
        w.write_all(b"<?xml version='1.0' encoding='UTF-8'?>\n")?;
        writeln!(
            w,
            "<!DOCTYPE {} PUBLIC \"{}\" \"{}\">",
            ROOT, DTD_PUBLIC_ID, DTD_SYSTEM_ID
        )?;

        let mut root = BytesStart::new(ROOT);
        root.push_attribute(("version", "1.0"));
        if let Some(from_doc) = &self.from_doc {
            root.push_attribute(("fromDoc", from_doc.as_str()));
        }
        if let Some(to_doc) = &self.to_doc {
            root.push_attribute(("toDoc", to_doc.as_str()));
        }

        let mut writer = Writer::new_with_indent(w, b' ', 2);
        if self.groups.is_empty() {
            writer.write_event(Event::Empty(root))?;
        } else {
            writer.write_event(Event::Start(root))?;
            for event in self.groups.iter().flat_map(|g| g.events.iter()) {
                writer.write_event(event)?;
            }
            writer.write_event(Event::End(BytesEnd::new(ROOT)))?;
        }

        let mut w = writer.into_inner();
        w.write_all(b"\n")?;
        w.flush()?;
        Ok(())
    }

    /// Write to `dst`, going through a sibling `.part` file so that `dst`
    /// only ever exists fully written.
    pub fn write_to_path(&self, dst: &Path) -> Result<(), Error> {
        let mut tmp = OsString::from(dst.as_os_str());
        tmp.push(".part");
        let tmp = PathBuf::from(tmp);

        let written = File::create(&tmp)
            .map_err(Error::from)
            .and_then(|f| self.write(BufWriter::new(f)))
            .and_then(|_| std::fs::rename(&tmp, dst).map_err(Error::from));

        if written.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        written
    }
}

/// Root attributes only keep the first path segment (`en/doc.xml` → `en`).
fn first_segment(doc: &str) -> &str {
    doc.split('/').next().unwrap_or(doc)
}

/// Extract every outermost `linkGrp` of a fragment, in document order.
///
/// Fails if the fragment is not well-formed, has no root element,
/// or has a group without `fromDoc`/`toDoc`. Text and attribute values must unescape,
/// and nothing but whitespace may lie outside the root element.
fn read_link_groups<R: BufRead>(reader: R, origin: &Path) -> Result<Vec<LinkGroup>, Error> {
    let malformed = |reason: String| Error::MalformedFragment {
        path: origin.to_path_buf(),
        reason,
    };

    let mut reader = Reader::from_reader(reader);
    let mut buf = Vec::new();
    let mut groups = Vec::new();
    let mut current: Option<LinkGroup> = None;
    let mut depth = 0usize;
    let mut group_depth = 0usize;
    let mut seen_root = false;

    loop {
        let event = reader.read_event_into(&mut buf).map_err(|e| {
            malformed(format!("at byte {}: {}", reader.buffer_position(), e))
        })?
        .into_owned();

        match event {
            Event::Eof => break,
            Event::Start(ref e) | Event::Empty(ref e) => {
                check_attributes(e, &malformed)?;
                let is_start = matches!(event, Event::Start(_));
                if depth == 0 {
                    if seen_root {
                        return Err(malformed("more than one root element".to_string()));
                    }
                    seen_root = true;
                }

                if current.is_none() && e.name().as_ref() == LINK_GROUP {
                    current = Some(LinkGroup {
                        from_doc: required_attribute(e, "fromDoc", &malformed)?,
                        to_doc: required_attribute(e, "toDoc", &malformed)?,
                        events: Vec::new(),
                    });
                    group_depth = depth;
                }
                if let Some(group) = current.as_mut() {
                    group.events.push(event.clone());
                }

                if is_start {
                    depth += 1;
                } else if depth == group_depth {
                    groups.extend(current.take());
                }
            }
            Event::End(_) => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| malformed("unexpected closing tag".to_string()))?;
                if let Some(group) = current.as_mut() {
                    group.events.push(event);
                    if depth == group_depth {
                        groups.extend(current.take());
                    }
                }
            }
            Event::Text(ref t) if t.iter().all(u8::is_ascii_whitespace) => (),
            Event::Text(_) | Event::CData(_) if depth == 0 => {
                return Err(malformed(format!(
                    "text outside the root element at byte {}",
                    reader.buffer_position()
                )));
            }
            Event::Text(ref t) => {
                t.unescape().map_err(|err| {
                    malformed(format!("at byte {}: {}", reader.buffer_position(), err))
                })?;
                if let Some(group) = current.as_mut() {
                    group.events.push(event.clone());
                }
            }
            _ => {
                if let Some(group) = current.as_mut() {
                    group.events.push(event);
                }
            }
        }
        buf.clear();
    }

    if !seen_root {
        return Err(malformed("no root element".to_string()));
    }
    if depth != 0 {
        return Err(malformed(format!("{} unclosed element(s)", depth)));
    }

    Ok(groups)
}

/// Attributes must be quoted, unique and unescape.
fn check_attributes<F>(e: &BytesStart, malformed: &F) -> Result<(), Error>
where
    F: Fn(String) -> Error,
{
    let mut attributes = e.attributes();
    attributes.with_checks(true);
    for attr in attributes {
        let attr = attr.map_err(|err| malformed(err.to_string()))?;
        attr.unescape_value()
            .map_err(|err| malformed(err.to_string()))?;
    }
    Ok(())
}

fn required_attribute<F>(e: &BytesStart, name: &str, malformed: &F) -> Result<String, Error>
where
    F: Fn(String) -> Error,
{
    let attr = e
        .try_get_attribute(name)
        .map_err(|err| malformed(err.to_string()))?
        .ok_or_else(|| malformed(format!("linkGrp without {}", name)))?;
    let value = attr
        .unescape_value()
        .map_err(|err| malformed(err.to_string()))?;
    Ok(value.into_owned())
}

/// Fragments of `pair` present in `output_root`, sorted by ordinal.
pub fn pair_fragments(output_root: &Path, pair: &LangPair) -> Result<Vec<PathBuf>, Error> {
    let root = output_root
        .to_str()
        .ok_or_else(|| Error::Custom(format!("invalid output folder: {:?}", output_root)))?;
    let pattern = format!(
        "{}/{}",
        glob::Pattern::escape(root),
        pair.fragment_pattern()
    );

    let mut fragments = Vec::new();
    for path in glob::glob(&pattern)? {
        let path = path?;
        let ordinal = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| pair.fragment_ordinal(n));
        match ordinal {
            Some(ordinal) => fragments.push((ordinal, path)),
            None => debug!("[{}] ignoring {:?}", pair, path),
        }
    }

    fragments.sort();
    Ok(fragments.into_iter().map(|(_, path)| path).collect())
}

/// Merge `fragments` (in order) into `dst`.
///
/// The merge fails as a whole on the first bad fragment, leaving `dst` and the fragments untouched.
pub fn merge<P: AsRef<Path>>(
    fragments: &[P],
    dst: &Path,
    options: MergeOptions,
) -> Result<MergeSummary, Error> {
    let mut merged = MergedAlignment::new(options.strict_identity);
    for fragment in fragments {
        let added = merged.add_fragment(fragment.as_ref())?;
        debug!("{} link group(s) from {:?}", added, fragment.as_ref());
    }

    merged.write_to_path(dst)?;
    info!(
        "merged {} fragment(s), {} link group(s) into {:?}",
        fragments.len(),
        merged.link_groups(),
        dst
    );

    if options.delete_fragments {
        for fragment in fragments {
            if let Err(e) = std::fs::remove_file(fragment.as_ref()) {
                warn!("could not remove fragment {:?}: {}", fragment.as_ref(), e);
            }
        }
    }

    Ok(MergeSummary {
        fragments: fragments.len(),
        link_groups: merged.link_groups(),
        from_doc: merged.from_doc.clone(),
        to_doc: merged.to_doc.clone(),
    })
}
