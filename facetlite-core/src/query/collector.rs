use crate::facet::{FacetResults, FacetsBuilder};
use crate::index::MemoryIndex;
use crate::DocId;

/// A lightweight callback-style collector for matched documents.
///
/// Facets stream every accepted document through this trait so builders can
/// update their state without materializing the match set.
pub trait DocCollector {
  fn collect(&mut self, doc_id: DocId, score: f64);
}

/// A collector that produces a final output once the document stream ends.
pub trait AggregationCollector: DocCollector {
  type Output;

  fn finish(self) -> Self::Output;
}

/// Loads the required fields of each matched document and feeds them to the
/// facet builders.
pub struct FacetsCollector<'a> {
  index: &'a MemoryIndex,
  facets: FacetsBuilder,
  matches: u64,
}

impl<'a> FacetsCollector<'a> {
  pub fn new(index: &'a MemoryIndex, facets: FacetsBuilder) -> Self {
    Self {
      index,
      facets,
      matches: 0,
    }
  }

  pub fn matches(&self) -> u64 {
    self.matches
  }
}

impl<'a> DocCollector for FacetsCollector<'a> {
  fn collect(&mut self, doc_id: DocId, _score: f64) {
    self.matches += 1;
    if self.facets.is_empty() {
      return;
    }
    let terms = self
      .index
      .document_field_terms(doc_id, self.facets.required_fields());
    self.facets.update(&terms);
  }
}

impl<'a> AggregationCollector for FacetsCollector<'a> {
  type Output = FacetResults;

  fn finish(self) -> Self::Output {
    self.facets.results()
  }
}

#[cfg(test)]
#[derive(Default)]
pub struct RecordingCollector {
  pub docs: Vec<(DocId, f64)>,
}

#[cfg(test)]
impl DocCollector for RecordingCollector {
  fn collect(&mut self, doc_id: DocId, score: f64) {
    self.docs.push((doc_id, score));
  }
}
