pub mod index;
pub mod indexer;
pub mod persist;

pub use index::{IndexEntry, VectorIndex};
pub use indexer::Indexer;
pub use persist::{Manifest, INDEX_FILE};

pub mod prelude {
    pub use super::{Indexer, VectorIndex};
    pub use nr_core::DocumentStore;
}
