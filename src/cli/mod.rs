// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the quarry command-line interface.
//!
//! Two subcommands over a JSON corpus (an array of documents with `fields`
//! and optional `values`): `terms` shows which dictionary terms a pattern
//! enumerates, and `search` runs a JSON query tree with an optional sort and
//! score explanations.

pub mod display;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use quarry::collect::SortField;
use quarry::index::Document;
use quarry::{Error, IndexReader, Query, Result, SearchConfig, Searcher, Sort};

use display::*;

#[derive(Parser)]
#[command(
    name = "quarry",
    about = "Inspect term enumeration and scoring over a JSON corpus",
    version
)]
pub struct Cli {
    /// More log output (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// JSON search config; defaults apply to anything it leaves out
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the terms a pattern enumerates
    Terms {
        /// Corpus file (JSON array of documents)
        corpus: PathBuf,

        /// Field whose dictionary is walked
        field: String,

        /// Pattern, interpreted according to --kind
        pattern: String,

        #[arg(short, long, value_enum, default_value = "wildcard")]
        kind: PatternKind,

        /// Edit distance for fuzzy patterns
        #[arg(long, default_value = "2")]
        max_edits: u8,

        /// Maximum number of terms to print
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Run a query and print the ranked hits
    Search {
        /// Corpus file (JSON array of documents)
        corpus: PathBuf,

        /// Query tree as JSON, or @path to read it from a file
        query: String,

        /// Maximum number of results to return
        #[arg(short, long, default_value = "10")]
        limit: usize,

        /// Sort keys, comma separated: a field name, <score> or <doc>; prefix ! to reverse
        #[arg(short, long)]
        sort: Option<String>,

        /// Print the score explanation of every hit
        #[arg(long)]
        explain: bool,

        /// Print hits as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PatternKind {
    Wildcard,
    Regexp,
    Prefix,
    Fuzzy,
}

pub fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => SearchConfig::from_path(path)?,
        None => SearchConfig::default(),
    };
    match cli.command {
        Commands::Terms {
            corpus,
            field,
            pattern,
            kind,
            max_edits,
            limit,
        } => {
            let reader = load_corpus(&corpus, &config)?;
            let query = match kind {
                PatternKind::Wildcard => Query::wildcard(&field, &pattern),
                PatternKind::Regexp => Query::regexp(&field, &pattern),
                PatternKind::Prefix => Query::prefix(&field, &pattern),
                PatternKind::Fuzzy => Query::fuzzy(&field, &pattern, max_edits),
            };
            run_terms(&reader, &config, &query, limit)
        }
        Commands::Search {
            corpus,
            query,
            limit,
            sort,
            explain,
            json,
        } => {
            let reader = load_corpus(&corpus, &config)?;
            let query = load_query(&query)?;
            let sort = sort.as_deref().map(parse_sort).transpose()?;
            run_search(&reader, config, &query, limit, sort.as_ref(), explain, json)
        }
    }
}

// ============================================================================
// INPUT
// ============================================================================

fn load_corpus(path: &Path, config: &SearchConfig) -> Result<IndexReader> {
    let json = fs::read_to_string(path)?;
    let docs: Vec<Document> = serde_json::from_str(&json)?;
    info!(path = %path.display(), docs = docs.len(), "loaded corpus");
    IndexReader::from_documents(docs, config.segment_size, config.terms_cursor)
}

fn load_query(arg: &str) -> Result<Query> {
    match arg.strip_prefix('@') {
        Some(path) => Query::from_json(&fs::read_to_string(path)?),
        None => Query::from_json(arg),
    }
}

/// `year,!rank,<score>` → year ascending, rank descending, then relevance.
pub fn parse_sort(keys: &str) -> Result<Sort> {
    let mut fields = Vec::new();
    for key in keys.split(',').map(str::trim) {
        let (reverse, name) = match key.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, key),
        };
        let field = match name {
            "" => return Err(Error::InvalidArgument(format!("empty sort key in '{}'", keys))),
            "<score>" => SortField::score(),
            "<doc>" => SortField::doc(),
            name => SortField::field(name),
        };
        fields.push(if reverse { field.reversed() } else { field });
    }
    Ok(Sort::new(fields))
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_terms(reader: &IndexReader, config: &SearchConfig, query: &Query, limit: usize) -> Result<()> {
    let Some(multi) = query.as_multi_term() else {
        return Err(Error::InvalidArgument(format!("{} is not a pattern query", query)));
    };
    let compiled = multi.compile(config)?;
    debug!(kind = ?compiled.kind(), "compiled pattern");

    // term -> (doc_freq, total_term_freq) summed over segments
    let mut found: BTreeMap<Vec<u8>, (u64, u64)> = BTreeMap::new();
    for leaf in reader.leaves() {
        let Some(terms) = leaf.segment.terms(multi.field) else {
            continue;
        };
        let mut tenum = compiled.terms(terms, multi.field)?;
        while tenum.next()? {
            let entry = found.entry(tenum.term().to_vec()).or_default();
            entry.0 += u64::from(tenum.doc_freq()?);
            entry.1 += tenum.total_term_freq()?;
        }
    }

    section_top(&format!("TERMS  {}", query));
    for (term, (doc_freq, total)) in found.iter().take(limit) {
        let term = String::from_utf8_lossy(term);
        row(&format!(
            " {}  {}  {}",
            pad_right(&themed(GREEN, &[BOLD], &term), 32),
            pad_left(&themed(CYAN, &[], &doc_freq.to_string()), 8),
            pad_left(&themed(GRAY, &[], &total.to_string()), 8),
        ));
    }
    if found.len() > limit {
        row(&themed(GRAY, &[], &format!(" … {} more", found.len() - limit)));
    }
    section_mid("SUMMARY");
    row(&format!(
        " {} terms · kind {}",
        found.len(),
        themed(MAGENTA, &[], &format!("{:?}", compiled.kind()))
    ));
    section_bot();
    Ok(())
}

fn run_search(
    reader: &IndexReader,
    config: SearchConfig,
    query: &Query,
    limit: usize,
    sort: Option<&Sort>,
    explain: bool,
    json: bool,
) -> Result<()> {
    let searcher = Searcher::with_config(reader, config);
    let (total, hits): (u64, Vec<(i32, f32, String)>) = match sort {
        Some(sort) => {
            let top = searcher.search_sorted(query, limit, sort)?;
            let hits = top
                .field_docs
                .iter()
                .map(|fd| {
                    let values: Vec<String> = fd.fields.iter().map(ToString::to_string).collect();
                    (fd.doc, fd.score, values.join(", "))
                })
                .collect();
            (top.total_hits, hits)
        }
        None => {
            let top = searcher.search(query, limit)?;
            let hits = top.score_docs.iter().map(|sd| (sd.doc, sd.score, String::new())).collect();
            (top.total_hits, hits)
        }
    };

    if json {
        let out: Vec<serde_json::Value> = hits
            .iter()
            .map(|(doc, score, _)| {
                Ok(serde_json::json!({
                    "doc": doc,
                    "score": score,
                    "stored": searcher.doc(*doc)?,
                }))
            })
            .collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({ "total_hits": total, "hits": out }))?);
        return Ok(());
    }

    section_top(&format!("SEARCH  {}", query));
    for (rank, (doc, score, values)) in hits.iter().enumerate() {
        let stored = searcher.doc(*doc)?;
        let preview = stored.fields().map(|(_, text)| text).next().unwrap_or("");
        row(&format!(
            " {} {} {}  {}",
            pad_left(&themed(GRAY, &[], &format!("{}.", rank + 1)), 4),
            pad_left(&themed(CYAN, &[], &format!("#{}", doc)), 6),
            score_colored(*score),
            truncate(preview, 48),
        ));
        if !values.is_empty() {
            row(&themed(GRAY, &[], &format!("            sort [{}]", values)));
        }
        if explain {
            for line in explanation_lines(&searcher.explain(query, *doc)?) {
                row(&format!("            {}", line));
            }
        }
    }
    section_mid("SUMMARY");
    row(&format!(" {} of {} hits", hits.len(), total));
    section_bot();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry::collect::SortKey;

    #[test]
    fn test_parse_sort_keys() {
        let sort = parse_sort("year, !rank,<score>").unwrap();
        assert_eq!(sort.fields.len(), 3);
        assert_eq!(sort.fields[0].key, SortKey::Field("year".into()));
        assert!(sort.fields[1].reverse);
        assert_eq!(sort.fields[2].key, SortKey::Score);
    }

    #[test]
    fn test_parse_sort_rejects_empty_key() {
        assert!(parse_sort("year,,rank").is_err());
    }

    #[test]
    fn test_load_query_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("q.json");
        fs::write(&path, r#"{"type": "term", "field": "body", "term": "rust"}"#).unwrap();
        let query = load_query(&format!("@{}", path.display())).unwrap();
        assert_eq!(query, Query::term("body", "rust"));
    }
}
