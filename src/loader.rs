//! Chunk Store collaborator: reads the corpus from disk.
//!
//! Scans the configured data directory for markdown documents, parses
//! the product catalog CSV when present, and routes everything through
//! the chunker. Loading is idempotent and completes before the retrieval
//! index is built; any unreadable file or malformed catalog row is a
//! fatal initialization error, never a per-query condition.

use anyhow::{bail, Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeMap;
use std::path::Path;
use walkdir::WalkDir;

use crate::chunking;
use crate::config::Config;
use crate::models::Chunk;

/// Load and chunk the full corpus. Chunk order is deterministic:
/// markdown documents sorted by relative path, then catalog rows in
/// file order.
pub fn load_chunks(config: &Config) -> Result<Vec<Chunk>> {
    let root = &config.data.dir;
    if !root.exists() {
        bail!("Data directory does not exist: {}", root.display());
    }

    let include_set = build_globset(&config.data.include_globs)?;

    let mut markdown_paths = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        let relative = path.strip_prefix(root).unwrap_or(path);
        if include_set.is_match(relative) {
            markdown_paths.push((relative.to_string_lossy().to_string(), path.to_path_buf()));
        }
    }

    // Sort for deterministic corpus ordering
    markdown_paths.sort_by(|a, b| a.0.cmp(&b.0));

    let mut chunks = Vec::new();

    for (doc_id, path) in &markdown_paths {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read corpus document: {}", path.display()))?;
        chunks.extend(chunking::chunk_markdown_document(doc_id, &text));
    }

    let catalog_path = root.join(&config.data.catalog_file);
    if catalog_path.exists() {
        chunks.extend(load_catalog(&catalog_path, &config.data.catalog_file)?);
    }

    tracing::info!(
        documents = markdown_paths.len(),
        chunks = chunks.len(),
        "corpus loaded"
    );

    Ok(chunks)
}

/// Parse the product catalog CSV into one chunk per row.
fn load_catalog(path: &Path, doc_id: &str) -> Result<Vec<Chunk>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open product catalog: {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| "Failed to read catalog headers")?
        .clone();

    let mut chunks = Vec::new();

    for (line, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("Malformed catalog row at line {}", line + 2))?;

        let row: BTreeMap<String, String> = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.to_string(), v.to_string()))
            .collect();

        if let Some(chunk) = chunking::catalog_row_to_chunk(doc_id, &row) {
            chunks.push(chunk);
        }
    }

    Ok(chunks)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChunkType;
    use std::fs;
    use tempfile::TempDir;

    fn write_corpus(dir: &TempDir) {
        fs::write(
            dir.path().join("dosha_guide.md"),
            "## Vata\n\nVata governs movement and is traditionally described as light, \
             dry, and quick. When balanced it supports creativity and an easy flow \
             through the day, according to the internal guide.\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("products_catalog.csv"),
            "product_id,name,category,target_concerns,key_herbs,contraindications_short\n\
             KA-101,Triphala Tablets,digestive support,occasional irregularity,\"amalaki, bibhitaki, haritaki\",consult if pregnant\n",
        )
        .unwrap();
    }

    fn config_for(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.data.dir = dir.path().to_path_buf();
        config
    }

    #[test]
    fn test_load_markdown_and_catalog() {
        let dir = TempDir::new().unwrap();
        write_corpus(&dir);

        let chunks = load_chunks(&config_for(&dir)).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].doc_id, "dosha_guide.md");
        assert_eq!(chunks[0].chunk_type, ChunkType::Dosha);
        assert_eq!(chunks[1].doc_id, "products_catalog.csv");
        assert_eq!(chunks[1].section_id, "KA-101");
    }

    #[test]
    fn test_missing_dir_is_fatal() {
        let mut config = Config::default();
        config.data.dir = "/nonexistent/corpus/dir".into();
        assert!(load_chunks(&config).is_err());
    }

    #[test]
    fn test_idempotent() {
        let dir = TempDir::new().unwrap();
        write_corpus(&dir);
        let config = config_for(&dir);

        let a = load_chunks(&config).unwrap();
        let b = load_chunks(&config).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.doc_id, y.doc_id);
            assert_eq!(x.section_id, y.section_id);
            assert_eq!(x.text, y.text);
        }
    }

    #[test]
    fn test_empty_dir_yields_empty_corpus() {
        let dir = TempDir::new().unwrap();
        let chunks = load_chunks(&config_for(&dir)).unwrap();
        assert!(chunks.is_empty());
    }
}
