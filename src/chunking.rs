//! Type-routed markdown chunking and catalog-row conversion.
//!
//! Source documents are small curated markdown files plus one product
//! catalog CSV. Markdown is split on H2 (`##`) section boundaries so
//! prose and its bullets stay together in one passage; the chunking
//! strategy and section-id scheme depend on the document kind inferred
//! from the file name. Each catalog row becomes a single readable
//! sentence chunk carrying the raw row as metadata.

use std::collections::BTreeMap;

use crate::models::{Chunk, ChunkType};

/// Minimum section length for foundation documents.
const MIN_FOUNDATION_SECTION: usize = 150;
/// Minimum section length for all other document kinds.
const MIN_SECTION: usize = 100;

/// File-name markers identifying product dossiers.
const PRODUCT_MARKERS: &[&str] = &["product_", "ashwagandha", "triphala", "brahmi"];
/// File-name markers identifying clinic/treatment program documents.
const PROGRAM_MARKERS: &[&str] = &["clinic", "program", "treatment"];

/// Chunk one markdown document, routing on the document id.
/// First matching kind wins: dosha guide, FAQ, product dossier,
/// program, then foundation as the fallback.
pub fn chunk_markdown_document(doc_id: &str, text: &str) -> Vec<Chunk> {
    let name = doc_id.to_lowercase();

    if name.contains("dosha") {
        return typed_section_chunks(doc_id, text, ChunkType::Dosha, "dosha", MIN_SECTION);
    }

    if name.contains("faq") {
        return chunk_faq(doc_id, text);
    }

    if PRODUCT_MARKERS.iter().any(|m| name.contains(m)) {
        return typed_section_chunks(doc_id, text, ChunkType::Product, "section", MIN_SECTION);
    }

    if PROGRAM_MARKERS.iter().any(|m| name.contains(m)) {
        return typed_section_chunks(doc_id, text, ChunkType::Program, "section", MIN_SECTION);
    }

    chunk_foundation(doc_id, text)
}

/// Split text into H2 sections, keeping sections at or above `min_len`.
fn split_h2_sections(text: &str, min_len: usize) -> Vec<String> {
    // The leading segment (before any "## ") counts as a section too.
    let body = text.strip_prefix("## ").unwrap_or(text);

    body.split("\n## ")
        .map(str::trim)
        .filter(|s| s.len() >= min_len)
        .map(str::to_string)
        .collect()
}

fn typed_section_chunks(
    doc_id: &str,
    text: &str,
    chunk_type: ChunkType,
    prefix: &str,
    min_len: usize,
) -> Vec<Chunk> {
    split_h2_sections(text, min_len)
        .into_iter()
        .enumerate()
        .map(|(i, section)| Chunk {
            doc_id: doc_id.to_string(),
            section_id: format!("{}_{}", prefix, i + 1),
            text: section,
            chunk_type,
            metadata: None,
        })
        .collect()
}

/// Foundation documents split on H2 sections, falling back to blank-line
/// paragraphs when no section clears the length gate.
fn chunk_foundation(doc_id: &str, text: &str) -> Vec<Chunk> {
    let mut sections = split_h2_sections(text, MIN_FOUNDATION_SECTION);

    if sections.is_empty() {
        sections = text
            .split("\n\n")
            .map(str::trim)
            .filter(|p| p.len() >= MIN_FOUNDATION_SECTION)
            .map(str::to_string)
            .collect();
    }

    sections
        .into_iter()
        .enumerate()
        .map(|(i, section)| Chunk {
            doc_id: doc_id.to_string(),
            section_id: format!("section_{}", i + 1),
            text: section,
            chunk_type: ChunkType::Foundation,
            metadata: None,
        })
        .collect()
}

/// FAQ documents: each `## N. question` header plus its answer body
/// becomes one chunk.
fn chunk_faq(doc_id: &str, text: &str) -> Vec<Chunk> {
    let body = text.strip_prefix("## ").unwrap_or(text);
    let mut chunks = Vec::new();

    for section in body.split("\n## ") {
        let section = section.trim();
        if !is_numbered_question(section) {
            continue;
        }

        let combined = match section.split_once('\n') {
            Some((question, answer)) => {
                format!("{}\n\n{}", question.trim(), answer.trim())
            }
            None => section.to_string(),
        };

        if combined.len() >= MIN_SECTION {
            chunks.push(Chunk {
                doc_id: doc_id.to_string(),
                section_id: format!("faq_{}", chunks.len() + 1),
                text: combined,
                chunk_type: ChunkType::Faq,
                metadata: None,
            });
        }
    }

    chunks
}

/// True for sections opening like `3. Are natural products always safe?`.
fn is_numbered_question(section: &str) -> bool {
    let mut chars = section.chars();
    let mut saw_digit = false;
    for c in chars.by_ref() {
        if c.is_ascii_digit() {
            saw_digit = true;
        } else {
            return saw_digit && c == '.';
        }
    }
    false
}

/// Catalog columns folded into the chunk sentence, in render order.
const CATALOG_TEXT_COLUMNS: &[(&str, &str)] = &[
    ("name", ""),
    ("category", "is in the {} category"),
    ("target_concerns", "and is used for {}"),
    ("key_herbs", "It contains {}"),
    ("contraindications_short", "Please note: {}"),
];

/// Convert one catalog CSV row into a readable sentence chunk.
/// Returns `None` when the row has no usable text columns.
pub fn catalog_row_to_chunk(doc_id: &str, row: &BTreeMap<String, String>) -> Option<Chunk> {
    let mut parts = Vec::new();

    for (column, template) in CATALOG_TEXT_COLUMNS {
        if let Some(value) = row.get(*column).filter(|v| !v.trim().is_empty()) {
            if template.is_empty() {
                parts.push(value.trim().to_string());
            } else {
                parts.push(template.replace("{}", value.trim()));
            }
        }
    }

    if parts.is_empty() {
        return None;
    }

    let mut text = parts.join(". ");
    if !text.ends_with('.') {
        text.push('.');
    }

    let section_id = row
        .get("product_id")
        .filter(|v| !v.trim().is_empty())
        .map(|v| v.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    Some(Chunk {
        doc_id: doc_id.to_string(),
        section_id,
        text,
        chunk_type: ChunkType::ProductCatalog,
        metadata: Some(row.clone()),
    })
}
