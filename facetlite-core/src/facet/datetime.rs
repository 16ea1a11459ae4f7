use std::cmp::Ordering;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::api::errors::FacetError;
use crate::facet::{DateRangeFacet, FacetBuilder, FacetResult};
use crate::index::FieldTerms;
use crate::numeric::PrefixCoded;

/// A named half-open interval `[start, end)`; `None` on either side is unbounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
  pub start: Option<DateTime<FixedOffset>>,
  pub end: Option<DateTime<FixedOffset>>,
}

impl DateRange {
  pub fn contains(&self, t: &DateTime<Utc>) -> bool {
    let after_start = self
      .start
      .map_or(true, |start| *t >= start.with_timezone(&Utc));
    let before_end = self.end.map_or(true, |end| *t < end.with_timezone(&Utc));
    after_start && before_end
  }
}

/// How a single encoded value was treated by the counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification<'a> {
  /// Full-precision instant that fell into the listed ranges, sorted by name.
  Matched(SmallVec<[&'a str; 4]>),
  /// Full-precision instant outside every registered range.
  NoMatch,
  /// A reduced-precision copy of a value, never counted.
  Ineligible { shift: u32 },
  Undecodable,
}

fn classify_term<'r>(ranges: &'r HashMap<String, DateRange>, term: &[u8]) -> Classification<'r> {
  let coded = PrefixCoded::new(term);
  let shift = match coded.shift() {
    Ok(shift) => shift,
    Err(_) => return Classification::Undecodable,
  };
  if shift != 0 {
    return Classification::Ineligible { shift };
  }
  let nanos = match coded.to_i64() {
    Ok(nanos) => nanos,
    Err(_) => return Classification::Undecodable,
  };
  let t = DateTime::<Utc>::from_timestamp_nanos(nanos);
  let mut matched: SmallVec<[&'r str; 4]> = ranges
    .iter()
    .filter(|(_, range)| range.contains(&t))
    .map(|(name, _)| name.as_str())
    .collect();
  matched.sort_unstable();
  if matched.is_empty() {
    Classification::NoMatch
  } else {
    Classification::Matched(matched)
  }
}

/// RFC 3339 with as many fractional digits as needed, up to nanoseconds.
fn format_instant(t: DateTime<FixedOffset>) -> String {
  let text = t.to_rfc3339_opts(SecondsFormat::Nanos, true);
  let Some(dot) = text.find('.') else {
    return text;
  };
  // Nanos always writes nine digits
  let frac_end = dot + 10;
  let digits = text[dot + 1..frac_end].trim_end_matches('0');
  if digits.is_empty() {
    format!("{}{}", &text[..dot], &text[frac_end..])
  } else {
    format!("{}.{}{}", &text[..dot], digits, &text[frac_end..])
  }
}

/// Counts matching documents per named date range for one field.
///
/// Every `update` call is one matching document. Counts are events, not
/// documents: a document with two values in the same range counts twice, and
/// overlapping ranges each count the same value.
#[derive(Debug, Clone)]
pub struct DateTimeFacetBuilder {
  field: String,
  size: usize,
  ranges: HashMap<String, DateRange>,
  counts: HashMap<String, u64>,
  total: u64,
  missing: u64,
}

impl DateTimeFacetBuilder {
  pub fn new(field: impl Into<String>, size: usize) -> Self {
    Self {
      field: field.into(),
      size,
      ranges: HashMap::new(),
      counts: HashMap::new(),
      total: 0,
      missing: 0,
    }
  }

  /// Registers a range, replacing any earlier range with the same name.
  pub fn add_range(
    &mut self,
    name: impl Into<String>,
    start: Option<DateTime<FixedOffset>>,
    end: Option<DateTime<FixedOffset>>,
  ) {
    self.ranges.insert(name.into(), DateRange { start, end });
  }

  pub fn size(&self) -> usize {
    self.size
  }

  pub fn ranges(&self) -> &HashMap<String, DateRange> {
    &self.ranges
  }

  pub fn total(&self) -> u64 {
    self.total
  }

  pub fn missing(&self) -> u64 {
    self.missing
  }

  pub fn count(&self, range: &str) -> u64 {
    self.counts.get(range).copied().unwrap_or(0)
  }

  pub fn classify(&self, term: &[u8]) -> Classification<'_> {
    classify_term(&self.ranges, term)
  }

  /// Returns an empty builder with the same field, size and ranges, for
  /// accumulating a disjoint share of the documents on another worker.
  pub fn shard(&self) -> Self {
    Self {
      field: self.field.clone(),
      size: self.size,
      ranges: self.ranges.clone(),
      counts: HashMap::new(),
      total: 0,
      missing: 0,
    }
  }

  /// Adds the counts of a builder that saw a disjoint set of documents.
  pub fn merge(&mut self, other: &DateTimeFacetBuilder) -> Result<(), FacetError> {
    if self.field != other.field {
      return Err(FacetError::IncompatibleMerge {
        reason: format!("field `{}` differs from `{}`", other.field, self.field),
      });
    }
    if self.size != other.size {
      return Err(FacetError::IncompatibleMerge {
        reason: format!("size {} differs from {}", other.size, self.size),
      });
    }
    if self.ranges != other.ranges {
      return Err(FacetError::IncompatibleMerge {
        reason: "registered ranges differ".to_string(),
      });
    }
    for (name, count) in other.counts.iter() {
      *self.counts.entry_ref(name.as_str()).or_insert(0) += count;
    }
    self.total += other.total;
    self.missing += other.missing;
    Ok(())
  }

  fn format_bound(bound: Option<DateTime<FixedOffset>>) -> Option<String> {
    bound.map(format_instant)
  }
}

impl FacetBuilder for DateTimeFacetBuilder {
  fn field(&self) -> &str {
    &self.field
  }

  fn update(&mut self, terms: &FieldTerms) {
    let Self {
      field,
      ranges,
      counts,
      total,
      missing,
      ..
    } = self;
    let Some(values) = terms.get(field.as_str()) else {
      *missing += 1;
      return;
    };
    for term in values.iter() {
      if let Classification::Matched(names) = classify_term(ranges, term) {
        for name in names {
          *counts.entry_ref(name).or_insert(0) += 1;
          *total += 1;
        }
      }
    }
  }

  fn result(&self) -> FacetResult {
    let mut date_ranges: Vec<DateRangeFacet> = self
      .counts
      .iter()
      .filter(|(_, count)| **count > 0)
      .filter_map(|(name, count)| {
        let range = self.ranges.get(name)?;
        Some(DateRangeFacet {
          name: name.clone(),
          count: *count,
          start: Self::format_bound(range.start),
          end: Self::format_bound(range.end),
        })
      })
      .collect();
    date_ranges.sort_by(|a, b| match b.count.cmp(&a.count) {
      Ordering::Equal => a.name.cmp(&b.name),
      other => other,
    });
    date_ranges.truncate(self.size);

    let retained: u64 = date_ranges.iter().map(|r| r.count).sum();
    FacetResult {
      field: self.field.clone(),
      total: self.total,
      missing: self.missing,
      other: self.total - retained,
      date_ranges,
    }
  }
}
