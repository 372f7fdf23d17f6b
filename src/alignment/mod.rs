/*! Sentence alignment

Everything between tagged documents and the final `{sl}-{tl}.xml` cesAlign files:

- [index]: translation indices (which document translates which),
- [locate]: pairing source documents with their translation,
- [aligner]: running the external aligner, one fragment per document pair,
- [merge]: merging fragments into one alignment file per language pair,
- [driver]: running all of the above for every language pair.
!*/
pub mod aligner;
pub mod driver;
pub mod index;
pub mod locate;
pub mod merge;

pub use aligner::{Aligner, ExternalAligner};
pub use driver::{PairDriver, PairReport};
pub use index::TranslationIndex;
pub use merge::{merge, MergeOptions, MergedAlignment};
