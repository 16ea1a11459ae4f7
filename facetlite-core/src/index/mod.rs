//! In-memory document index that serves per-document field terms.

use anyhow::{anyhow, bail, Context, Result};
use chrono::DateTime;
use hashbrown::HashMap;

use crate::api::types::Document;
use crate::numeric::{encode_all_precisions, DATE_PRECISION_STEP};
use crate::DocId;

/// Encoded terms present on one document, keyed by field name.
pub type FieldTerms = HashMap<String, Vec<Vec<u8>>>;

pub const ID_FIELD: &str = "_id";

#[derive(Debug, Default)]
pub struct MemoryIndex {
  ids: Vec<String>,
  by_id: HashMap<String, DocId>,
  docs: Vec<FieldTerms>,
}

impl MemoryIndex {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn add_document(&mut self, doc: &Document) -> Result<DocId> {
    let id = doc
      .fields
      .get(ID_FIELD)
      .and_then(|v| v.as_str())
      .ok_or_else(|| anyhow!("document requires a string `{ID_FIELD}`"))?;
    if self.by_id.contains_key(id) {
      bail!("duplicate document id `{id}`");
    }
    let mut terms = FieldTerms::new();
    for (field, value) in doc.fields.iter() {
      if field == ID_FIELD {
        continue;
      }
      let mut out = Vec::new();
      index_value(value, &mut out).with_context(|| format!("indexing field `{field}`"))?;
      if !out.is_empty() {
        terms.insert(field.clone(), out);
      }
    }
    let doc_id = DocId::try_from(self.docs.len()).context("index is full")?;
    self.ids.push(id.to_string());
    self.by_id.insert(id.to_string(), doc_id);
    self.docs.push(terms);
    log::trace!("indexed `{id}` as doc {doc_id}");
    Ok(doc_id)
  }

  pub fn len(&self) -> usize {
    self.docs.len()
  }

  pub fn is_empty(&self) -> bool {
    self.docs.is_empty()
  }

  pub fn doc_id(&self, external: &str) -> Option<DocId> {
    self.by_id.get(external).copied()
  }

  pub fn external_id(&self, doc: DocId) -> Option<&str> {
    self.ids.get(doc as usize).map(String::as_str)
  }

  pub fn doc_ids(&self) -> impl Iterator<Item = DocId> + '_ {
    (0..self.docs.len()).map(|d| d as DocId)
  }

  /// Terms of `doc` restricted to `fields`. Fields the document lacks are absent.
  pub fn document_field_terms(&self, doc: DocId, fields: &[String]) -> FieldTerms {
    let mut out = FieldTerms::with_capacity(fields.len());
    if let Some(stored) = self.docs.get(doc as usize) {
      for field in fields.iter() {
        if let Some(values) = stored.get(field.as_str()) {
          out.insert(field.clone(), values.clone());
        }
      }
    }
    out
  }
}

fn index_value(value: &serde_json::Value, out: &mut Vec<Vec<u8>>) -> Result<()> {
  match value {
    serde_json::Value::String(s) => match DateTime::parse_from_rfc3339(s) {
      Ok(dt) => {
        let nanos = dt
          .timestamp_nanos_opt()
          .ok_or_else(|| anyhow!("date `{s}` is outside the nanosecond range"))?;
        out.extend(encode_all_precisions(nanos, DATE_PRECISION_STEP)?);
      }
      Err(_) => out.push(s.as_bytes().to_vec()),
    },
    serde_json::Value::Number(n) => {
      let v = n
        .as_i64()
        .ok_or_else(|| anyhow!("only integer numbers are indexed, got {n}"))?;
      out.extend(encode_all_precisions(v, DATE_PRECISION_STEP)?);
    }
    serde_json::Value::Bool(b) => out.push(if *b { b"T".to_vec() } else { b"F".to_vec() }),
    serde_json::Value::Array(items) => {
      for item in items.iter() {
        index_value(item, out)?;
      }
    }
    serde_json::Value::Null | serde_json::Value::Object(_) => {}
  }
  Ok(())
}
