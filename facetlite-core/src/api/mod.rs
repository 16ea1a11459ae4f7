pub mod errors;
pub mod reader;
pub mod types;

pub use crate::index::MemoryIndex;
pub use errors::FacetError;
pub use reader::{Hit, SearchResult};
pub use types::{DateRangeRequest, Document, FacetRequest, SearchRequest};
