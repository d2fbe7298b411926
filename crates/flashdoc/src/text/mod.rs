//! Text post-processing: normalization, statistics, and coarse structure.

pub mod normalize;
pub mod structure;

pub use normalize::{TextStats, normalize, strip_page_markers};
pub use structure::{BlockKind, TextBlock, parse_structure, preview};
