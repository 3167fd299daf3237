// Document structure: outline indexing and snippet-to-section matching
// - indexer.rs: numbered heading strategies and content boundaries
// - matcher.rs: relevance matching of snippets against the outline
// - path.rs: dotted section number ordering

pub mod indexer;
pub mod matcher;
pub mod path;

pub use indexer::{index, IndexStats, StructureIndexer};
pub use matcher::{find_section, RelevanceMatcher};
pub use path::compare_dotted_path;
