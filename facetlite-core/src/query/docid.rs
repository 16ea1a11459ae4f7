use serde::{Deserialize, Serialize};

use crate::index::MemoryIndex;
use crate::query::{DocumentMatch, Explanation};
use crate::DocId;

/// Matches only the listed documents. Combine with other queries to restrict
/// their output to a known set of identifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocIdQuery {
  pub ids: Vec<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub boost: Option<f64>,
}

impl DocIdQuery {
  pub fn new(ids: Vec<String>) -> Self {
    Self { ids, boost: None }
  }

  pub fn set_boost(&mut self, boost: f64) {
    self.boost = Some(boost);
  }

  pub fn boost(&self) -> f64 {
    self.boost.unwrap_or(1.0)
  }

  pub fn searcher<'a>(&self, index: &'a MemoryIndex, explain: bool) -> DocIdSearcher<'a> {
    let mut docs: Vec<DocId> = Vec::with_capacity(self.ids.len());
    for id in self.ids.iter() {
      match index.doc_id(id) {
        Some(doc) => docs.push(doc),
        None => log::debug!("id `{id}` is not in the index"),
      }
    }
    docs.sort_unstable();
    docs.dedup();
    DocIdSearcher {
      index,
      docs: docs.into_iter(),
      boost: self.boost(),
      explain,
    }
  }
}

pub struct DocIdSearcher<'a> {
  index: &'a MemoryIndex,
  docs: std::vec::IntoIter<DocId>,
  boost: f64,
  explain: bool,
}

impl<'a> DocIdSearcher<'a> {
  /// Number of matches left.
  pub fn remaining(&self) -> usize {
    self.docs.len()
  }
}

impl<'a> Iterator for DocIdSearcher<'a> {
  type Item = DocumentMatch;

  fn next(&mut self) -> Option<DocumentMatch> {
    let doc = self.docs.next()?;
    let id = self.index.external_id(doc)?.to_string();
    let expl = self.explain.then(|| Explanation {
      value: self.boost,
      message: format!("document id `{id}` with boost {}", self.boost),
    });
    Some(DocumentMatch {
      id,
      doc,
      score: self.boost,
      expl,
    })
  }
}
