use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::api::errors::FacetError;
use crate::facet::DateTimeFacetBuilder;
use crate::query::DocIdQuery;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Document {
  pub fields: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchRequest {
  /// Restricts matching to these documents; every document matches when absent.
  #[serde(default)]
  pub query: Option<DocIdQuery>,
  #[serde(default)]
  pub facets: BTreeMap<String, FacetRequest>,
  #[serde(default)]
  pub explain: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacetRequest {
  pub field: String,
  pub size: usize,
  #[serde(default)]
  pub date_ranges: Vec<DateRangeRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRangeRequest {
  pub name: String,
  #[serde(default)]
  pub start: Option<String>,
  #[serde(default)]
  pub end: Option<String>,
}

impl DateRangeRequest {
  fn parse_bound(
    &self,
    bound: &'static str,
    value: Option<&str>,
  ) -> Result<Option<DateTime<FixedOffset>>, FacetError> {
    value
      .map(|v| {
        DateTime::parse_from_rfc3339(v).map_err(|source| FacetError::InvalidDate {
          range: self.name.clone(),
          bound,
          value: v.to_string(),
          source,
        })
      })
      .transpose()
  }

  fn bounds(
    &self,
  ) -> Result<(Option<DateTime<FixedOffset>>, Option<DateTime<FixedOffset>>), FacetError> {
    Ok((
      self.parse_bound("start", self.start.as_deref())?,
      self.parse_bound("end", self.end.as_deref())?,
    ))
  }
}

impl FacetRequest {
  pub fn validate(&self, facet: &str) -> Result<(), FacetError> {
    if self.field.is_empty() {
      return Err(FacetError::MissingField {
        facet: facet.to_string(),
      });
    }
    for range in self.date_ranges.iter() {
      if range.name.is_empty() {
        return Err(FacetError::MissingRangeName {
          field: self.field.clone(),
        });
      }
      range.bounds()?;
    }
    Ok(())
  }

  /// Builds a date-range facet; ranges are registered in request order, so a
  /// repeated name keeps its last definition.
  pub fn to_builder(&self, facet: &str) -> Result<DateTimeFacetBuilder, FacetError> {
    self.validate(facet)?;
    let mut builder = DateTimeFacetBuilder::new(self.field.clone(), self.size);
    for range in self.date_ranges.iter() {
      let (start, end) = range.bounds()?;
      builder.add_range(range.name.clone(), start, end);
    }
    Ok(builder)
  }
}
