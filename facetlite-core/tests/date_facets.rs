use chrono::{DateTime, FixedOffset};
use facetlite_core::api::types::{Document, SearchRequest};
use facetlite_core::api::MemoryIndex;
use facetlite_core::numeric::{encode_all_precisions, encode_i64};
use facetlite_core::{DateTimeFacetBuilder, FacetBuilder, FieldTerms};
use serde_json::json;

fn at(s: &str) -> Option<DateTime<FixedOffset>> {
  Some(DateTime::parse_from_rfc3339(s).unwrap())
}

fn nanos(s: &str) -> i64 {
  DateTime::parse_from_rfc3339(s)
    .unwrap()
    .timestamp_nanos_opt()
    .unwrap()
}

fn date_doc(field: &str, dates: &[&str]) -> FieldTerms {
  let mut terms = FieldTerms::new();
  let mut values = Vec::new();
  for d in dates {
    values.extend(encode_all_precisions(nanos(d), 16).unwrap());
  }
  terms.insert(field.to_string(), values);
  terms
}

fn split_builder(size: usize) -> DateTimeFacetBuilder {
  let mut fb = DateTimeFacetBuilder::new("created", size);
  fb.add_range("old", None, at("2020-01-01T00:00:00Z"));
  fb.add_range("new", at("2020-01-01T00:00:00Z"), None);
  fb
}

#[test]
fn old_and_new_split_around_2020() {
  let mut fb = split_builder(2);
  for d in [
    "2019-05-01T00:00:00Z",
    "2020-06-01T00:00:00Z",
    "2020-07-01T00:00:00Z",
  ] {
    fb.update(&date_doc("created", &[d]));
  }
  fb.update(&FieldTerms::new());

  let res = fb.result();
  assert_eq!(res.field, "created");
  assert_eq!(res.missing, 1);
  assert_eq!(res.total, 3);
  assert_eq!(res.other, 0);
  assert_eq!(res.date_ranges.len(), 2);
  assert_eq!(res.date_ranges[0].name, "new");
  assert_eq!(res.date_ranges[0].count, 2);
  assert_eq!(
    res.date_ranges[0].start.as_deref(),
    Some("2020-01-01T00:00:00Z")
  );
  assert_eq!(res.date_ranges[0].end, None);
  assert_eq!(res.date_ranges[1].name, "old");
  assert_eq!(res.date_ranges[1].count, 1);
  assert_eq!(res.date_ranges[1].start, None);
}

#[test]
fn coarse_precision_terms_are_ignored() {
  let mut fb = DateTimeFacetBuilder::new("created", 10);
  fb.add_range("all", None, None);
  let mut terms = FieldTerms::new();
  terms.insert(
    "created".into(),
    vec![
      encode_i64(nanos("2020-06-01T00:00:00Z"), 16).unwrap(),
      encode_i64(nanos("2020-06-01T00:00:00Z"), 48).unwrap(),
    ],
  );
  fb.update(&terms);
  let res = fb.result();
  assert_eq!(res.total, 0);
  assert_eq!(res.missing, 0);
  assert!(res.date_ranges.is_empty());
}

#[test]
fn zero_size_puts_everything_in_other() {
  let mut fb = split_builder(0);
  fb.update(&date_doc(
    "created",
    &["2019-05-01T00:00:00Z", "2020-06-01T00:00:00Z"],
  ));
  let res = fb.result();
  assert!(res.date_ranges.is_empty());
  assert_eq!(res.total, 2);
  assert_eq!(res.other, 2);
}

#[test]
fn result_is_repeatable() {
  let mut fb = split_builder(1);
  fb.update(&date_doc("created", &["2019-05-01T00:00:00Z"]));
  fb.update(&date_doc("created", &["2021-05-01T00:00:00Z"]));
  assert_eq!(fb.result(), fb.result());
}

#[test]
fn search_request_end_to_end() {
  let mut idx = MemoryIndex::new();
  let docs = vec![
    json!({"_id": "a", "created": "2019-05-01T00:00:00Z"}),
    json!({"_id": "b", "created": "2020-06-01T00:00:00Z"}),
    json!({"_id": "c", "created": "2020-07-01T00:00:00+02:00"}),
    json!({"_id": "d", "title": "no date"}),
    json!({"_id": "e", "created": "not a date"}),
  ];
  for fields in docs {
    let doc: Document = serde_json::from_value(json!({ "fields": fields })).unwrap();
    idx.add_document(&doc).unwrap();
  }

  let req: SearchRequest = serde_json::from_value(json!({
    "query": {"ids": ["a", "b", "c", "d", "e"], "boost": 2.0},
    "facets": {
      "era": {
        "field": "created",
        "size": 1,
        "date_ranges": [
          {"name": "old", "end": "2020-01-01T00:00:00Z"},
          {"name": "new", "start": "2020-01-01T00:00:00Z"}
        ]
      }
    }
  }))
  .unwrap();
  let res = idx.search(&req).unwrap();
  assert_eq!(res.total_hits, 5);
  assert!(res.hits.iter().all(|h| h.score == 2.0));

  // "e" carries an undecodable keyword term, so it is neither counted nor missing
  let era = &res.facets["era"];
  assert_eq!(era.missing, 1);
  assert_eq!(era.total, 3);
  assert_eq!(era.date_ranges.len(), 1);
  assert_eq!(era.date_ranges[0].name, "new");
  assert_eq!(era.other, 1);

  let restricted: SearchRequest = serde_json::from_value(json!({
    "query": {"ids": ["a"]},
    "facets": {"era": req.facets["era"].clone()}
  }))
  .unwrap();
  let res = idx.search(&restricted).unwrap();
  assert_eq!(res.total_hits, 1);
  assert_eq!(res.facets["era"].date_ranges[0].name, "old");
}

#[test]
fn jsonl_fixture_feeds_facets() {
  use std::io::{BufRead, BufReader, Seek, SeekFrom, Write};

  let mut file = tempfile::tempfile().unwrap();
  writeln!(
    file,
    r#"{{"_id": "a", "created": ["2019-05-01T00:00:00Z", "2020-02-01T00:00:00Z"]}}"#
  )
  .unwrap();
  writeln!(file, r#"{{"_id": "b", "created": 1593561600000000000}}"#).unwrap();
  writeln!(file, r#"{{"_id": "c", "created": null}}"#).unwrap();
  file.seek(SeekFrom::Start(0)).unwrap();

  let mut idx = MemoryIndex::new();
  for line in BufReader::new(file).lines() {
    let fields: serde_json::Value = serde_json::from_str(&line.unwrap()).unwrap();
    let doc: Document = serde_json::from_value(json!({ "fields": fields })).unwrap();
    idx.add_document(&doc).unwrap();
  }
  assert_eq!(idx.len(), 3);

  let req: SearchRequest = serde_json::from_value(json!({
    "facets": {
      "era": {
        "field": "created",
        "size": 5,
        "date_ranges": [
          {"name": "old", "end": "2020-01-01T00:00:00Z"},
          {"name": "new", "start": "2020-01-01T00:00:00Z"}
        ]
      }
    }
  }))
  .unwrap();
  let res = idx.search(&req).unwrap();
  let era = &res.facets["era"];
  assert_eq!(era.missing, 1);
  assert_eq!(era.total, 3);
  assert_eq!(era.date_ranges[0].name, "new");
  assert_eq!(era.date_ranges[0].count, 2);
  assert_eq!(era.date_ranges[1].name, "old");
  assert_eq!(era.date_ranges[1].count, 1);
}
