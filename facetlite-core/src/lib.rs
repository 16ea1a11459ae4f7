//! facetlite-core: date-range facet aggregation over an embedded index.
//!
//! Matching documents are streamed one at a time through facet builders that
//! decode each document's full-precision date terms and count them per named
//! range.

pub mod api;
pub mod facet;
pub mod index;
pub mod numeric;
pub mod query;

/// Document identifier within an index.
pub type DocId = u32;

pub use facet::{DateTimeFacetBuilder, FacetBuilder, FacetResult};
pub use index::{FieldTerms, MemoryIndex};
