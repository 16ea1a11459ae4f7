use std::collections::BTreeMap;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::api::types::SearchRequest;
use crate::facet::{FacetResult, FacetsBuilder};
use crate::index::MemoryIndex;
use crate::query::collector::{AggregationCollector, DocCollector, FacetsCollector};
use crate::query::{DocumentMatch, Explanation, MatchAllSearcher};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
  pub id: String,
  pub score: f64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub explanation: Option<Explanation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
  pub total_hits: u64,
  pub hits: Vec<Hit>,
  pub facets: BTreeMap<String, FacetResult>,
}

impl MemoryIndex {
  /// Runs the request's query and computes its facets over every match.
  pub fn search(&self, req: &SearchRequest) -> Result<SearchResult> {
    let mut facets = FacetsBuilder::new();
    for (name, facet) in req.facets.iter() {
      facets.add(name.clone(), Box::new(facet.to_builder(name)?));
    }
    let matches: Box<dyn Iterator<Item = DocumentMatch> + '_> = match &req.query {
      Some(query) => Box::new(query.searcher(self, req.explain)),
      None => Box::new(MatchAllSearcher::new(self)),
    };

    let mut collector = FacetsCollector::new(self, facets);
    let mut hits = Vec::new();
    for m in matches {
      collector.collect(m.doc, m.score);
      hits.push(Hit {
        id: m.id,
        score: m.score,
        explanation: m.expl,
      });
    }
    let total_hits = collector.matches();
    log::debug!(
      "search matched {total_hits} of {} documents, {} facets",
      self.len(),
      req.facets.len()
    );
    Ok(SearchResult {
      total_hits,
      hits,
      facets: collector.finish(),
    })
  }
}
