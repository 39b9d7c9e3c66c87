//! Query safety gate.
//!
//! Rejects query intents outside the educational mandate (diagnosis,
//! dosing, cure claims) before any retrieval-driven synthesis runs. A
//! blocked query always yields the fixed refusal response regardless of
//! corpus content.

/// Fixed deny-list matched as case-folded substrings.
const DENY_LIST: &[&str] = &[
    "cure",
    "permanent",
    "permanently",
    "diagnose",
    "dosage",
    "how many",
    "per day",
];

/// True when the query requests blocked content. Pure function: folds
/// case, then substring-matches the deny-list.
pub fn is_blocked(query: &str) -> bool {
    let q = query.to_lowercase();
    DENY_LIST.iter().any(|word| q.contains(word))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_dosing_questions() {
        assert!(is_blocked("What is the recommended daily dosage?"));
        assert!(is_blocked("How many tablets should I take?"));
        assert!(is_blocked("Can I take two per day?"));
    }

    #[test]
    fn test_blocks_cure_and_diagnosis() {
        assert!(is_blocked("Will this cure my condition?"));
        assert!(is_blocked("Can Ayurveda permanently fix insomnia?"));
        assert!(is_blocked("Can you diagnose my symptoms?"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(is_blocked("DOSAGE instructions please"));
        assert!(is_blocked("Cure?"));
    }

    #[test]
    fn test_admissible_queries_pass() {
        assert!(!is_blocked("What does Ayurveda mean by Vata, Pitta, and Kapha?"));
        assert!(!is_blocked("What are the benefits of Triphala?"));
        assert!(!is_blocked(""));
    }
}
