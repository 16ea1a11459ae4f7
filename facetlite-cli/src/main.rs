use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use facetlite_core::api::types::{Document, SearchRequest};
use facetlite_core::api::MemoryIndex;

#[derive(Parser)]
#[command(name = "facetlite", version, about = "Date-range facets over JSONL documents")]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Index a JSONL file and run a search request with facets against it
  Search {
    docs: PathBuf,
    #[arg(long)]
    request: Option<PathBuf>,
    #[arg(long, conflicts_with = "request")]
    request_stdin: bool,
    /// Print only the facets, not the hits
    #[arg(long)]
    facets_only: bool,
  },
  /// Validate a search request without running it
  Check { request: PathBuf },
}

fn main() -> Result<()> {
  env_logger::init();
  let cli = Cli::parse();
  match cli.command {
    Commands::Search {
      docs,
      request,
      request_stdin,
      facets_only,
    } => {
      let req = read_request(request, request_stdin)?;
      cmd_search(docs.as_path(), &req, facets_only)
    }
    Commands::Check { request } => cmd_check(request.as_path()),
  }
}

fn read_request(path: Option<PathBuf>, from_stdin: bool) -> Result<SearchRequest> {
  let raw = if from_stdin {
    let mut buf = String::new();
    io::stdin()
      .read_to_string(&mut buf)
      .context("reading request from stdin")?;
    buf
  } else if let Some(path) = path {
    fs::read_to_string(&path).with_context(|| format!("reading request from {:?}", path))?
  } else {
    bail!("provide --request <path> or --request-stdin");
  };
  parse_request(&raw)
}

fn parse_request(raw: &str) -> Result<SearchRequest> {
  let req: SearchRequest = serde_json::from_str(raw).context("invalid search request JSON")?;
  for (name, facet) in req.facets.iter() {
    facet
      .validate(name)
      .with_context(|| format!("facet `{name}`"))?;
  }
  Ok(req)
}

fn load_index(doc_path: &Path) -> Result<MemoryIndex> {
  let content =
    fs::read_to_string(doc_path).with_context(|| format!("reading docs from {:?}", doc_path))?;
  let mut index = MemoryIndex::new();
  for (line_no, line) in content.lines().enumerate() {
    if line.trim().is_empty() {
      continue;
    }
    let value: serde_json::Value = serde_json::from_str(line)
      .with_context(|| format!("invalid JSON on line {}", line_no + 1))?;
    let Some(obj) = value.as_object() else {
      bail!("line {} is not a JSON object", line_no + 1);
    };
    let fields = obj.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    index
      .add_document(&Document { fields })
      .with_context(|| format!("line {}", line_no + 1))?;
  }
  log::info!("indexed {} documents from {:?}", index.len(), doc_path);
  Ok(index)
}

fn cmd_search(doc_path: &Path, req: &SearchRequest, facets_only: bool) -> Result<()> {
  let index = load_index(doc_path)?;
  let result = index.search(req)?;
  let out = if facets_only {
    serde_json::to_string_pretty(&result.facets)?
  } else {
    serde_json::to_string_pretty(&result)?
  };
  println!("{out}");
  Ok(())
}

fn cmd_check(path: &Path) -> Result<()> {
  let raw = fs::read_to_string(path).with_context(|| format!("reading request from {:?}", path))?;
  let req = parse_request(&raw)?;
  println!("request ok: {} facets", req.facets.len());
  Ok(())
}
