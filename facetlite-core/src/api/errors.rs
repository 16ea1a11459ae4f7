use thiserror::Error;

#[derive(Debug, Error)]
pub enum FacetError {
  #[error("facet `{facet}` requires a field")]
  MissingField { facet: String },

  #[error("date range in facet on `{field}` requires a name")]
  MissingRangeName { field: String },

  #[error("date range `{range}` has an invalid {bound} `{value}`: {source}")]
  InvalidDate {
    range: String,
    bound: &'static str,
    value: String,
    #[source]
    source: chrono::ParseError,
  },

  #[error("cannot merge facet builders: {reason}")]
  IncompatibleMerge { reason: String },
}
