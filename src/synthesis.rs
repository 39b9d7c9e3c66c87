//! Extractive answer synthesis.
//!
//! Converts ranked candidate chunks into a single cited answer without
//! free generation: every sentence in the output is extracted from
//! source text. The pipeline narrows candidates with intent rules, strips
//! structural and editorial noise from the surviving chunks, segments the
//! remaining prose into sentences, scores them against the query, and
//! assembles the top sentences with citations for every chunk that
//! contributed one.
//!
//! When nothing survives any stage, the answer is the fixed refusal
//! string with no citations. That is defined behavior, not an error.

use crate::config::SynthesisConfig;
use crate::lexical;
use crate::models::{Chunk, ChunkType, Citation, RankedCandidate};

/// Fixed refusal used for blocked queries and for queries with no
/// grounded answer. The two cases are deliberately indistinguishable.
pub const REFUSAL: &str = "This information is not available in our internal corpus.";

/// Appended when the query asks about timelines and the corpus has none.
const TIMELINE_DISCLAIMER: &str =
    "Specific timelines for results are not detailed in the internal corpus and can vary between individuals.";

/// Query tokens ignored during selection and scoring.
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "of", "and", "or", "to", "in", "on",
    "for", "with", "what", "which", "who", "how", "does", "do", "did", "by", "it", "its",
    "this", "that", "these", "about", "as", "can", "could", "should", "i", "my", "me", "you",
    "your", "we", "our", "mean", "means",
];

/// Editorial directive markers; lines containing one never reach the
/// answer.
const EDITORIAL_MARKERS: &[&str] = &[
    "keywords:",
    "avoid ",
    "emphasise",
    "emphasize",
    "tone:",
    "style:",
    "do not use",
    "internal note",
];

/// Section labels that open a symptom/tendency bullet list.
const SYMPTOM_SECTION_LABELS: &[&str] = &[
    "signs of imbalance",
    "common signs",
    "symptoms",
    "tendencies",
];

/// Minimum sentence length and word count kept after segmentation.
const MIN_SENTENCE_CHARS: usize = 25;
const MIN_SENTENCE_WORDS: usize = 4;

/// Weight of one query-token match in sentence scoring.
const KEYWORD_WEIGHT: f64 = 2.0;
/// Bonus when a sentence carries markers for a detected query intent.
const INTENT_BONUS: f64 = 3.0;

pub struct SynthesisOutcome {
    pub answer: String,
    pub citations: Vec<Citation>,
}

impl SynthesisOutcome {
    pub fn refusal() -> Self {
        Self {
            answer: REFUSAL.to_string(),
            citations: Vec::new(),
        }
    }
}

/// Run the full pipeline: selection, extraction, scoring, assembly.
pub fn synthesize(
    query: &str,
    candidates: &[RankedCandidate<'_>],
    config: &SynthesisConfig,
) -> SynthesisOutcome {
    if candidates.is_empty() {
        return SynthesisOutcome::refusal();
    }

    let info = QueryInfo::analyze(query);
    let selected = select_chunks(&info, candidates, config.max_chunks);

    // Gather scored sentences per chunk, in selection order.
    let mut picked: Vec<(String, usize)> = Vec::new();
    for (chunk_pos, chunk) in selected.iter().enumerate() {
        for sentence in top_sentences(chunk, &info, config.sentences_per_chunk) {
            picked.push((sentence, chunk_pos));
        }
    }

    // Deduplicate by case-folded exact match, then truncate.
    let mut seen = Vec::new();
    picked.retain(|(s, _)| {
        let folded = s.to_lowercase();
        if seen.contains(&folded) {
            false
        } else {
            seen.push(folded);
            true
        }
    });
    picked.truncate(config.max_sentences);

    if picked.is_empty() {
        return SynthesisOutcome::refusal();
    }

    let mut answer = String::new();
    for (sentence, _) in &picked {
        if !answer.is_empty() {
            answer.push(' ');
        }
        answer.push_str(sentence);
        if !sentence.ends_with(['.', '!', '?']) {
            answer.push('.');
        }
    }

    if info.intents.contains(&Intent::Timeline)
        && !picked.iter().any(|(s, _)| has_timeline_content(s))
    {
        answer.push(' ');
        answer.push_str(TIMELINE_DISCLAIMER);
    }

    // Citations: chunks that contributed a surviving sentence, in
    // first-contribution order, deduplicated by identity.
    let mut citations: Vec<Citation> = Vec::new();
    for (_, chunk_pos) in &picked {
        let citation = Citation::for_chunk(selected[*chunk_pos]);
        if !citations.contains(&citation) {
            citations.push(citation);
        }
    }

    SynthesisOutcome { answer, citations }
}

// ============ Query analysis ============

/// Intent classes recognized in queries; each adds a scoring bonus for
/// sentences carrying the matching markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Intent {
    Definition,
    DoshaProfile,
    Imbalance,
    TraditionalUse,
    Timeline,
}

struct QueryInfo {
    folded: String,
    /// Query tokens with stop words and punctuation removed.
    content_tokens: Vec<String>,
    intents: Vec<Intent>,
}

impl QueryInfo {
    fn analyze(query: &str) -> Self {
        let folded = query.to_lowercase();

        let content_tokens: Vec<String> = lexical::tokenize(query)
            .into_iter()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
            .filter(|t| !t.is_empty() && !STOP_WORDS.contains(&t.as_str()))
            .collect();

        let mut intents = Vec::new();
        if folded.contains("what is") || folded.contains("what does") || folded.contains("what are")
        {
            intents.push(Intent::Definition);
        }
        if ["vata", "pitta", "kapha", "dosha"].iter().any(|d| folded.contains(d)) {
            intents.push(Intent::DoshaProfile);
        }
        if ["imbalance", "symptom", "sign", "aggravat"].iter().any(|m| folded.contains(m)) {
            intents.push(Intent::Imbalance);
        }
        if ["benefit", "traditionally", "used for", "help with"].iter().any(|m| folded.contains(m))
        {
            intents.push(Intent::TraditionalUse);
        }
        if ["how fast", "how long", "how quickly", "timeline", "when will"]
            .iter()
            .any(|m| folded.contains(m))
        {
            intents.push(Intent::Timeline);
        }

        Self {
            folded,
            content_tokens,
            intents,
        }
    }
}

// ============ Chunk selection ============

/// A selection rule: when its predicate matches the query, candidates
/// passing its chunk filter are preferred over the raw ranking.
struct SelectionRule {
    name: &'static str,
    applies: fn(&QueryInfo) -> bool,
    keeps: fn(&QueryInfo, &Chunk) -> bool,
}

/// Rules evaluated in fixed order with first-match-wins semantics; a
/// rule "matches" when its predicate holds and it keeps at least one
/// candidate. Narrow intent rules come before the generic entity rule,
/// and the raw ranked list is the fallback.
const SELECTION_RULES: &[SelectionRule] = &[
    // "Is natural always safe?" style questions route to the general
    // safety FAQ rather than whichever product ranked highest.
    SelectionRule {
        name: "natural-safety-faq",
        applies: |info| info.folded.contains("natural") && info.folded.contains("safe"),
        keeps: |_, chunk| chunk.chunk_type == ChunkType::Faq,
    },
    SelectionRule {
        name: "program-replacement",
        applies: |info| info.folded.contains("replace") || info.folded.contains("substitute"),
        keeps: |_, chunk| chunk.chunk_type == ChunkType::Program,
    },
    SelectionRule {
        name: "dosha-guide",
        applies: |info| info.intents.contains(&Intent::DoshaProfile),
        keeps: |_, chunk| {
            chunk.chunk_type == ChunkType::Dosha || chunk.doc_id.to_lowercase().contains("dosha")
        },
    },
    // A content token from the query names a source document directly
    // (product and topic dossiers are keyed by entity name).
    SelectionRule {
        name: "entity-doc",
        applies: |info| !info.content_tokens.is_empty(),
        keeps: |info, chunk| {
            let doc = chunk.doc_id.to_lowercase();
            info.content_tokens
                .iter()
                .any(|t| t.len() >= 4 && doc.contains(t.as_str()))
        },
    },
];

/// Narrow the ranked candidates to at most `max_chunks`, deduplicated,
/// preserving rank order.
fn select_chunks<'a>(
    info: &QueryInfo,
    candidates: &[RankedCandidate<'a>],
    max_chunks: usize,
) -> Vec<&'a Chunk> {
    let mut chosen: Vec<&Chunk> = Vec::new();

    for rule in SELECTION_RULES {
        if !(rule.applies)(info) {
            continue;
        }
        let kept: Vec<&Chunk> = candidates
            .iter()
            .map(|c| c.chunk)
            .filter(|chunk| (rule.keeps)(info, chunk))
            .collect();
        if !kept.is_empty() {
            tracing::debug!(rule = rule.name, kept = kept.len(), "selection rule matched");
            chosen = kept;
            break;
        }
    }

    if chosen.is_empty() {
        chosen = candidates.iter().map(|c| c.chunk).collect();
    }

    let mut deduped: Vec<&Chunk> = Vec::new();
    for chunk in chosen {
        let already = deduped
            .iter()
            .any(|c| c.doc_id == chunk.doc_id && c.section_id == chunk.section_id);
        if !already {
            deduped.push(chunk);
        }
        if deduped.len() == max_chunks {
            break;
        }
    }

    deduped
}

// ============ Content-line extraction ============

/// Bullet handling depends on where we are in the section: symptom and
/// tendency lists carry real content, all other bullets are structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionContext {
    None,
    InSymptomSection,
}

/// Filter a chunk's lines down to answer-grade content, dropping
/// headers, rules, quoted examples, editorial directives, and metadata
/// labels.
fn extract_content_lines(text: &str) -> Vec<String> {
    let mut kept = Vec::new();
    let mut context = SectionContext::None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let folded = line.to_lowercase();

        if is_horizontal_rule(line) {
            context = SectionContext::None;
            continue;
        }

        if is_editorial_line(&folded) {
            context = SectionContext::None;
            continue;
        }

        // Quoted example phrases ("Traditionally used to...") are prompt
        // material, not content.
        if line.starts_with('"') || line.starts_with('>') {
            context = SectionContext::None;
            continue;
        }

        if let Some(bullet) = bullet_content(line) {
            if context == SectionContext::InSymptomSection {
                kept.push(bullet.to_string());
            }
            continue;
        }

        // Headers and label lines: may open a symptom section, are never
        // content themselves.
        if line.starts_with('#') || is_label_line(line) {
            if SYMPTOM_SECTION_LABELS.iter().any(|l| folded.contains(l)) {
                context = SectionContext::InSymptomSection;
            } else {
                context = SectionContext::None;
            }
            continue;
        }

        // Plain prose closes any open symptom section.
        context = SectionContext::None;
        kept.push(line.to_string());
    }

    kept
}

fn is_horizontal_rule(line: &str) -> bool {
    line.len() >= 3 && (line.chars().all(|c| c == '-') || line.chars().all(|c| c == '*') || line.chars().all(|c| c == '='))
}

fn is_editorial_line(folded: &str) -> bool {
    EDITORIAL_MARKERS.iter().any(|m| folded.contains(m))
}

fn bullet_content(line: &str) -> Option<&str> {
    line.strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
}

/// A short line ending in a colon is a metadata/section label
/// ("Key herbs:", "Positioning:"), not prose.
fn is_label_line(line: &str) -> bool {
    line.ends_with(':') && line.len() <= 48 && line.split_whitespace().count() <= 6
}

// ============ Prose normalization and segmentation ============

/// Join retained lines, collapse whitespace, strip emphasis markup.
fn normalize_prose(lines: &[String]) -> String {
    let joined = lines.join(" ");
    let stripped: String = joined
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split prose on sentence-terminal punctuation, keeping fragments that
/// look like sentences and still pass the editorial filter. The
/// terminator stays with its sentence, and a period between two digits
/// is a decimal point, not a boundary.
fn segment_sentences(prose: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = prose.chars().peekable();

    while let Some(c) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let decimal_point = c == '.'
                && current.chars().last().is_some_and(|p| p.is_ascii_digit())
                && chars.peek().is_some_and(|n| n.is_ascii_digit());
            current.push(c);
            if !decimal_point {
                push_sentence(&mut sentences, &current);
                current.clear();
            }
        } else {
            current.push(c);
        }
    }
    push_sentence(&mut sentences, &current);

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, fragment: &str) {
    let s = fragment.trim();
    if s.len() < MIN_SENTENCE_CHARS {
        return;
    }
    if s.split_whitespace().count() < MIN_SENTENCE_WORDS {
        return;
    }
    if s.ends_with(':') {
        return;
    }
    if is_editorial_line(&s.to_lowercase()) {
        return;
    }
    sentences.push(s.to_string());
}

// ============ Sentence scoring ============

/// Markers characteristic of each intent class.
fn intent_markers(intent: Intent) -> &'static [&'static str] {
    match intent {
        Intent::Definition => &[" is ", "refers to", "means", "described as", "known as"],
        Intent::DoshaProfile => &["vata", "pitta", "kapha", "dosha", "energy", "constitution"],
        Intent::Imbalance => &["imbalance", "excess", "aggravat", "tend", "sign", "symptom"],
        Intent::TraditionalUse => &["traditionally", "support", "commonly described", "may help"],
        Intent::Timeline => &["weeks", "gradual", "over time", "varies", "timeline"],
    }
}

fn has_timeline_content(sentence: &str) -> bool {
    let folded = sentence.to_lowercase();
    intent_markers(Intent::Timeline).iter().any(|m| folded.contains(m))
}

/// Keyword overlap plus intent bonuses. A sentence with no keyword
/// overlap scores zero regardless of intent markers — bonuses refine
/// ranking among grounded sentences, they never qualify an ungrounded
/// one. Zero-scoring sentences never reach the answer.
fn score_sentence(sentence: &str, info: &QueryInfo) -> f64 {
    let folded = sentence.to_lowercase();
    let mut score = 0.0;

    for token in &info.content_tokens {
        if folded.contains(token.as_str()) {
            score += KEYWORD_WEIGHT;
        }
    }

    if score == 0.0 {
        return 0.0;
    }

    for &intent in &info.intents {
        if intent_markers(intent).iter().any(|m| folded.contains(m)) {
            score += INTENT_BONUS;
        }
    }

    score
}

/// Extract, segment, and score one chunk's sentences; return the top
/// `limit` positive-scoring sentences in their original text order.
fn top_sentences(chunk: &Chunk, info: &QueryInfo, limit: usize) -> Vec<String> {
    let lines = extract_content_lines(&chunk.text);
    let prose = normalize_prose(&lines);
    let sentences = segment_sentences(&prose);

    let mut scored: Vec<(usize, f64)> = sentences
        .iter()
        .enumerate()
        .map(|(i, s)| (i, score_sentence(s, info)))
        .filter(|&(_, score)| score > 0.0)
        .collect();

    // Stable on ties: equal scores keep text order.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(limit);
    scored.sort_by_key(|&(i, _)| i);

    scored.into_iter().map(|(i, _)| sentences[i].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SynthesisConfig;
    use crate::models::ChunkType;

    fn chunk(doc_id: &str, section_id: &str, chunk_type: ChunkType, text: &str) -> Chunk {
        Chunk {
            doc_id: doc_id.to_string(),
            section_id: section_id.to_string(),
            text: text.to_string(),
            chunk_type,
            metadata: None,
        }
    }

    fn candidates(chunks: &[Chunk]) -> Vec<RankedCandidate<'_>> {
        chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| RankedCandidate {
                chunk,
                lexical_score: 1.0 - i as f64 * 0.1,
                semantic_score: 0.8 - i as f64 * 0.1,
                hybrid_score: 0.9 - i as f64 * 0.1,
            })
            .collect()
    }

    const DOSHA_TEXT: &str = "\
## Vata

Vata is traditionally described as the energy of movement in Ayurveda.
It governs breath, circulation, and the nervous system according to the internal guide.

Signs of imbalance:
- Restless sleep and a racing mind that will not settle in the evening
- Dry skin and irregular digestion across the week

Keywords: vata, movement, air
\"Traditionally used to support...\"
---
";

    #[test]
    fn test_extract_drops_headers_and_editorial() {
        let lines = extract_content_lines(DOSHA_TEXT);
        let joined = lines.join(" ");
        assert!(!joined.contains('#'));
        assert!(!joined.to_lowercase().contains("keywords:"));
        assert!(!joined.contains("Traditionally used to support..."));
        assert!(joined.contains("energy of movement"));
    }

    #[test]
    fn test_symptom_bullets_survive() {
        let lines = extract_content_lines(DOSHA_TEXT);
        let joined = lines.join(" ");
        assert!(joined.contains("Restless sleep"));
        assert!(joined.contains("Dry skin"));
    }

    #[test]
    fn test_bullets_outside_symptom_section_dropped() {
        let text = "Intro prose about the product line and its heritage today.\n\
                    - Packaging available in three sizes\n\
                    - Ships in recycled cartons\n";
        let lines = extract_content_lines(text);
        let joined = lines.join(" ");
        assert!(joined.contains("Intro prose"));
        assert!(!joined.contains("Packaging"));
    }

    #[test]
    fn test_prose_resets_symptom_section() {
        let text = "Signs of imbalance:\n\
                    - Restless sleep through the night and into morning\n\
                    Plain paragraph closes the list here for good.\n\
                    - This bullet is structure again, not symptoms\n";
        let lines = extract_content_lines(text);
        let joined = lines.join(" ");
        assert!(joined.contains("Restless sleep"));
        assert!(!joined.contains("structure again"));
    }

    #[test]
    fn test_normalize_strips_markup() {
        let prose = normalize_prose(&[
            "Vata  is   **the energy** of _movement_ in `Ayurveda`.".to_string(),
        ]);
        assert_eq!(prose, "Vata is the energy of movement in Ayurveda.");
    }

    #[test]
    fn test_segmentation_drops_fragments() {
        let sentences = segment_sentences(
            "Too short. Vata is traditionally described as the energy of movement. Key herbs:",
        );
        assert_eq!(sentences.len(), 1);
        assert!(sentences[0].starts_with("Vata is traditionally"));
    }

    #[test]
    fn test_segmentation_keeps_decimals_intact() {
        let sentences = segment_sentences(
            "The blend uses 1.5 grams of amalaki in every morning batch.",
        );
        assert_eq!(sentences.len(), 1);
        assert!(sentences[0].contains("1.5 grams"));
    }

    #[test]
    fn test_segmentation_keeps_terminators() {
        let sentences = segment_sentences(
            "Are natural products always safe for daily use? \
             Natural products are not automatically safe for everyone.",
        );
        assert_eq!(sentences.len(), 2);
        assert!(sentences[0].ends_with('?'));
        assert!(sentences[1].ends_with('.'));
    }

    #[test]
    fn test_scoring_prefers_keyword_overlap() {
        let info = QueryInfo::analyze("What governs movement?");
        let relevant = "Vata governs breath and movement through the body";
        let generic = "The clinic opened a second location last spring";
        assert!(score_sentence(relevant, &info) > score_sentence(generic, &info));
        assert_eq!(score_sentence(generic, &info), 0.0);
    }

    #[test]
    fn test_definition_intent_bonus() {
        let info = QueryInfo::analyze("What is Vata?");
        assert!(info.intents.contains(&Intent::Definition));
        let with_marker = "Vata is described as the energy of movement";
        let without = "People enjoy vata season walks outdoors daily";
        assert!(score_sentence(with_marker, &info) > score_sentence(without, &info));
    }

    #[test]
    fn test_selection_prefers_entity_doc() {
        let chunks = vec![
            chunk("faq_general.md", "faq_1", ChunkType::Faq, "irrelevant"),
            chunk("triphala_tablets.md", "section_1", ChunkType::Product, "irrelevant"),
        ];
        let cands = candidates(&chunks);
        let info = QueryInfo::analyze("What are the benefits of Triphala?");
        let selected = select_chunks(&info, &cands, 3);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].doc_id, "triphala_tablets.md");
    }

    #[test]
    fn test_selection_dosha_rule() {
        let chunks = vec![
            chunk("products_catalog.csv", "KA-101", ChunkType::ProductCatalog, "x"),
            chunk("dosha_guide.md", "dosha_1", ChunkType::Dosha, "x"),
            chunk("dosha_guide.md", "dosha_2", ChunkType::Dosha, "x"),
        ];
        let cands = candidates(&chunks);
        let info = QueryInfo::analyze("Tell me about pitta");
        let selected = select_chunks(&info, &cands, 3);
        assert_eq!(selected.len(), 2);
        assert!(selected.iter().all(|c| c.chunk_type == ChunkType::Dosha));
    }

    #[test]
    fn test_selection_falls_back_to_ranking() {
        let chunks = vec![
            chunk("a.md", "section_1", ChunkType::Foundation, "x"),
            chunk("b.md", "section_1", ChunkType::Foundation, "x"),
        ];
        let cands = candidates(&chunks);
        let info = QueryInfo::analyze("sleep routines");
        let selected = select_chunks(&info, &cands, 3);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].doc_id, "a.md");
    }

    #[test]
    fn test_selection_dedup_and_cap() {
        let chunks = vec![
            chunk("a.md", "section_1", ChunkType::Foundation, "x"),
            chunk("a.md", "section_1", ChunkType::Foundation, "x"),
            chunk("b.md", "section_1", ChunkType::Foundation, "x"),
            chunk("c.md", "section_1", ChunkType::Foundation, "x"),
            chunk("d.md", "section_1", ChunkType::Foundation, "x"),
        ];
        let cands = candidates(&chunks);
        let info = QueryInfo::analyze("anything here");
        let selected = select_chunks(&info, &cands, 3);
        assert_eq!(selected.len(), 3);
        assert_eq!(selected[0].doc_id, "a.md");
        assert_eq!(selected[1].doc_id, "b.md");
        assert_eq!(selected[2].doc_id, "c.md");
    }

    #[test]
    fn test_synthesize_produces_cited_answer() {
        let chunks = vec![chunk("dosha_guide.md", "dosha_1", ChunkType::Dosha, DOSHA_TEXT)];
        let cands = candidates(&chunks);
        let outcome = synthesize("What is Vata?", &cands, &SynthesisConfig::default());

        assert_ne!(outcome.answer, REFUSAL);
        assert!(outcome.answer.to_lowercase().contains("vata"));
        assert!(!outcome.answer.contains("Keywords:"));
        assert_eq!(outcome.citations.len(), 1);
        assert_eq!(outcome.citations[0].doc_id, "dosha_guide.md");
        assert_eq!(outcome.citations[0].section_id, "dosha_1");
        assert!(outcome.answer.ends_with('.'));
    }

    #[test]
    fn test_synthesize_refuses_when_nothing_relevant() {
        let chunks = vec![chunk(
            "dosha_guide.md",
            "dosha_1",
            ChunkType::Dosha,
            DOSHA_TEXT,
        )];
        let cands = candidates(&chunks);
        let outcome = synthesize(
            "quarterly shipping logistics forecast",
            &cands,
            &SynthesisConfig::default(),
        );
        assert_eq!(outcome.answer, REFUSAL);
        assert!(outcome.citations.is_empty());
    }

    #[test]
    fn test_synthesize_empty_candidates_refuses() {
        let outcome = synthesize("What is Vata?", &[], &SynthesisConfig::default());
        assert_eq!(outcome.answer, REFUSAL);
        assert!(outcome.citations.is_empty());
    }

    #[test]
    fn test_no_orphan_citations() {
        let chunks = vec![
            chunk("dosha_guide.md", "dosha_1", ChunkType::Dosha, DOSHA_TEXT),
            chunk(
                "dosha_guide.md",
                "dosha_2",
                ChunkType::Dosha,
                "Shipping cartons arrive on Tuesdays at the warehouse dock.",
            ),
        ];
        let cands = candidates(&chunks);
        let outcome = synthesize("What is Vata?", &cands, &SynthesisConfig::default());
        // Only the chunk that contributed text is cited.
        assert_eq!(outcome.citations.len(), 1);
        assert_eq!(outcome.citations[0].section_id, "dosha_1");
    }

    #[test]
    fn test_sentence_cap() {
        let text = "Vata is described as movement energy inside the body. \
                    Vata is also linked with breath and circulation daily. \
                    Vata is tied to the nervous system and the senses. \
                    Vata is said to govern elimination and flexibility too. \
                    Vata is associated with creativity and quick thinking.";
        let chunks = vec![
            chunk("dosha_guide.md", "dosha_1", ChunkType::Dosha, text),
            chunk("dosha_guide.md", "dosha_2", ChunkType::Dosha, text),
            chunk("dosha_guide.md", "dosha_3", ChunkType::Dosha, text),
        ];
        let cands = candidates(&chunks);
        let config = SynthesisConfig::default();
        let outcome = synthesize("What is Vata?", &cands, &config);
        let sentence_count = outcome.answer.matches('.').count();
        assert!(sentence_count <= config.max_sentences);
    }

    #[test]
    fn test_duplicate_sentences_collapse() {
        let text = "Vata is described as movement energy inside the body.";
        let chunks = vec![
            chunk("dosha_guide.md", "dosha_1", ChunkType::Dosha, text),
            chunk("overview.md", "section_1", ChunkType::Foundation, text),
        ];
        let cands = candidates(&chunks);
        let outcome = synthesize("What is Vata?", &cands, &SynthesisConfig::default());
        assert_eq!(outcome.answer.matches("movement energy").count(), 1);
        // The second chunk contributed nothing after dedup.
        assert_eq!(outcome.citations.len(), 1);
    }

    #[test]
    fn test_timeline_disclaimer_appended() {
        let text = "Triphala is traditionally described as gentle daily support for digestion.";
        let chunks = vec![chunk("triphala_tablets.md", "section_1", ChunkType::Product, text)];
        let cands = candidates(&chunks);
        let outcome = synthesize(
            "How fast does Triphala work?",
            &cands,
            &SynthesisConfig::default(),
        );
        assert!(outcome.answer.contains("Specific timelines"));
    }

    #[test]
    fn test_timeline_disclaimer_skipped_when_covered() {
        let text = "Triphala support builds gradually over time with consistent daily use.";
        let chunks = vec![chunk("triphala_tablets.md", "section_1", ChunkType::Product, text)];
        let cands = candidates(&chunks);
        let outcome = synthesize(
            "How fast does Triphala work?",
            &cands,
            &SynthesisConfig::default(),
        );
        assert!(!outcome.answer.contains("Specific timelines"));
    }

    #[test]
    fn test_idempotent() {
        let chunks = vec![chunk("dosha_guide.md", "dosha_1", ChunkType::Dosha, DOSHA_TEXT)];
        let cands = candidates(&chunks);
        let a = synthesize("What is Vata?", &cands, &SynthesisConfig::default());
        let b = synthesize("What is Vata?", &cands, &SynthesisConfig::default());
        assert_eq!(a.answer, b.answer);
        assert_eq!(a.citations, b.citations);
    }
}
