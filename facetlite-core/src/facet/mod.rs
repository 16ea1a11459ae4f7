//! Facet builders consume the field terms of every matching document and
//! produce one [`FacetResult`] per request once the document stream ends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::index::FieldTerms;

pub mod datetime;

pub use datetime::{Classification, DateRange, DateTimeFacetBuilder};

/// A request-scoped aggregation over one field.
pub trait FacetBuilder {
  /// Field whose terms this builder needs.
  fn field(&self) -> &str;

  /// Consumes the terms of one matching document.
  fn update(&mut self, terms: &FieldTerms);

  /// Produces the ranked result. Does not consume accumulated state.
  fn result(&self) -> FacetResult;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRangeFacet {
  pub name: String,
  pub count: u64,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub start: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub end: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetResult {
  pub field: String,
  pub total: u64,
  pub missing: u64,
  pub other: u64,
  #[serde(default)]
  pub date_ranges: Vec<DateRangeFacet>,
}

pub type FacetResults = BTreeMap<String, FacetResult>;

/// Fans each document's field terms out to a set of named builders.
#[derive(Default)]
pub struct FacetsBuilder {
  facets: Vec<(String, Box<dyn FacetBuilder>)>,
  fields: Vec<String>,
}

impl FacetsBuilder {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add(&mut self, name: impl Into<String>, builder: Box<dyn FacetBuilder>) {
    let field = builder.field();
    if !self.fields.iter().any(|f| f == field) {
      self.fields.push(field.to_string());
    }
    self.facets.push((name.into(), builder));
  }

  /// Fields the index must load for each document, deduplicated in insertion order.
  pub fn required_fields(&self) -> &[String] {
    &self.fields
  }

  pub fn len(&self) -> usize {
    self.facets.len()
  }

  pub fn is_empty(&self) -> bool {
    self.facets.is_empty()
  }

  pub fn update(&mut self, terms: &FieldTerms) {
    for (_, builder) in self.facets.iter_mut() {
      builder.update(terms);
    }
  }

  pub fn results(&self) -> FacetResults {
    log::debug!("finalizing {} facets", self.facets.len());
    self
      .facets
      .iter()
      .map(|(name, builder)| (name.clone(), builder.result()))
      .collect()
  }
}
