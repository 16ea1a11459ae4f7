pub mod collector;
pub mod docid;

use serde::{Deserialize, Serialize};

use crate::index::MemoryIndex;
use crate::DocId;

pub use collector::{DocCollector, FacetsCollector};
pub use docid::{DocIdQuery, DocIdSearcher};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Explanation {
  pub value: f64,
  pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMatch {
  pub id: String,
  pub doc: DocId,
  pub score: f64,
  pub expl: Option<Explanation>,
}

/// Yields every document in the index with a unit score.
pub struct MatchAllSearcher<'a> {
  index: &'a MemoryIndex,
  next: usize,
}

impl<'a> MatchAllSearcher<'a> {
  pub fn new(index: &'a MemoryIndex) -> Self {
    Self { index, next: 0 }
  }
}

impl<'a> Iterator for MatchAllSearcher<'a> {
  type Item = DocumentMatch;

  fn next(&mut self) -> Option<DocumentMatch> {
    let doc = self.next as DocId;
    let id = self.index.external_id(doc)?;
    self.next += 1;
    Some(DocumentMatch {
      id: id.to_string(),
      doc,
      score: 1.0,
      expl: None,
    })
  }
}
