//! Rule-based script splitter.
//!
//! Deterministic, offline alternative to the LLM planner: turns a raw
//! narration script into ordered [`SegmentPlan`]s with no external calls.
//! Every input string, including the empty string, maps to a valid (possibly
//! empty) plan list.

use crate::planner::SegmentPlan;

/// Maximum number of keywords attached to a plan
pub const DEFAULT_KEYWORD_LIMIT: usize = 5;

/// Summary length cap when a chunk has no sentence-ending punctuation
const SUMMARY_FALLBACK_CHARS: usize = 200;

/// Common English and Turkish function words excluded from keywords
const STOPWORDS: &[&str] = &[
    "and", "the", "for", "with", "that", "from", "this", "have", "your",
    "into", "about", "when", "where", "while", "then", "over", "such",
    "very", "just", "because", "however", "also", "like", "but", "are",
    "was", "were", "you", "they", "them", "our", "their", "not", "bir",
    "ile", "ama", "gibi", "ve", "de", "da", "bu", "olan", "kadar", "çok",
    "daha", "için", "icin", "henüz",
];

/// Build segment plans from raw script text.
///
/// Chunks are separated by runs of two or more consecutive newlines; chunks
/// that are blank after trimming are discarded. Each surviving chunk yields
/// one plan whose `script` is the whitespace-normalized chunk text.
pub fn segment_script(script_text: &str) -> Vec<SegmentPlan> {
    split_chunks(script_text)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| {
            let index = i + 1;
            let summary = extract_summary(chunk);
            let keywords = extract_keywords(chunk, DEFAULT_KEYWORD_LIMIT);
            let title = derive_title(&summary, index);
            SegmentPlan {
                title,
                summary,
                script: normalize_whitespace(chunk),
                keywords,
            }
        })
        .collect()
}

/// Split text on runs of two or more consecutive newlines, dropping chunks
/// that are blank after trimming.
fn split_chunks(text: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let bytes = text.as_bytes();
    let mut start = 0;
    let mut i = 0;

    // '\n' is ASCII, so byte scanning never lands inside a UTF-8 sequence.
    while i < bytes.len() {
        if bytes[i] == b'\n' {
            let run_start = i;
            while i < bytes.len() && bytes[i] == b'\n' {
                i += 1;
            }
            if i - run_start >= 2 {
                chunks.push(&text[start..run_start]);
                start = i;
            }
        } else {
            i += 1;
        }
    }
    chunks.push(&text[start..]);

    chunks.retain(|chunk| !chunk.trim().is_empty());
    chunks
}

/// Collapse internal whitespace runs (including embedded newlines) to single
/// spaces and trim the ends.
fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First sentence of the normalized chunk, or its first 200 characters when
/// no `.`, `!` or `?` occurs anywhere in the text.
fn extract_summary(text: &str) -> String {
    let cleaned = normalize_whitespace(text);
    match cleaned.find(['.', '!', '?']) {
        // The delimiters are single-byte, so index + 1 is a char boundary.
        Some(index) => cleaned[..=index].to_string(),
        None => cleaned.chars().take(SUMMARY_FALLBACK_CHARS).collect(),
    }
}

/// First six whitespace-separated tokens of the summary, or a synthesized
/// `Segment {n}` label when the summary is empty.
fn derive_title(summary: &str, fallback_index: usize) -> String {
    let snippet = summary
        .split_whitespace()
        .take(6)
        .collect::<Vec<_>>()
        .join(" ");
    if snippet.is_empty() {
        format!("Segment {}", fallback_index)
    } else {
        snippet
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Candidate keyword tokens: lowercased maximal word-character runs, longer
/// than two characters and not in the stopword set.
fn keyword_candidates(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|word| word.chars().count() > 2)
        .filter(|word| !STOPWORDS.contains(word))
        .map(|word| word.to_string())
        .collect()
}

/// Up to `limit` distinct keywords ordered by descending frequency, ties
/// broken by first appearance in the chunk.
fn extract_keywords(text: &str, limit: usize) -> Vec<String> {
    // First-insertion order is preserved so that the stable sort below keeps
    // equal-count tokens in first-seen order.
    let mut counts: Vec<(String, usize)> = Vec::new();
    for word in keyword_candidates(text) {
        match counts.iter_mut().find(|(token, _)| *token == word) {
            Some((_, count)) => *count += 1,
            None => counts.push((word, 1)),
        }
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(limit)
        .map(|(token, _)| token)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_plans() {
        assert!(segment_script("").is_empty());
        assert!(segment_script("   ").is_empty());
        assert!(segment_script("\n\n\n\n").is_empty());
    }

    #[test]
    fn chunks_split_on_double_newlines() {
        let plans = segment_script("First block.\n\nSecond block.\n\n\n\nThird block.");
        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].script, "First block.");
        assert_eq!(plans[2].script, "Third block.");
    }

    #[test]
    fn single_newlines_do_not_split() {
        let plans = segment_script("Line one\nline two\nline three.");
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].script, "Line one line two line three.");
    }

    #[test]
    fn summary_stops_at_earliest_delimiter() {
        let plans = segment_script("Hello world. This is great!\n\n\nSecond chunk here without punctuation");
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].summary, "Hello world.");
        assert_eq!(plans[1].summary, "Second chunk here without punctuation");
    }

    #[test]
    fn summary_picks_smallest_index_across_delimiters() {
        let plans = segment_script("Wait! Really. Sure?");
        assert_eq!(plans[0].summary, "Wait!");
    }

    #[test]
    fn summary_without_punctuation_caps_at_200_chars() {
        let long = "word ".repeat(100);
        let plans = segment_script(&long);
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].summary.chars().count(), 200);
        assert!(plans[0].summary.starts_with("word word"));
    }

    #[test]
    fn title_takes_first_six_words_of_summary() {
        let plans = segment_script("One two three four five six seven eight.");
        assert_eq!(plans[0].title, "One two three four five six");
    }

    #[test]
    fn title_falls_back_to_segment_label_for_empty_summary() {
        assert_eq!(derive_title("", 1), "Segment 1");
        assert_eq!(derive_title("   ", 3), "Segment 3");
    }

    #[test]
    fn keywords_ordered_by_frequency_then_first_seen() {
        let text = "video cat dog video cat video bird video cat video \
                    sun sky sea fog ice oak";
        let keywords = extract_keywords(text, 5);
        assert_eq!(keywords.len(), 5);
        assert_eq!(keywords[0], "video");
        assert_eq!(keywords[1], "cat");
        // dog, bird, sun all appear once; first-seen order breaks the tie
        assert_eq!(&keywords[2..], ["dog", "bird", "sun"]);
    }

    #[test]
    fn keywords_exclude_short_tokens_and_stopwords() {
        let keywords = extract_keywords("a to ve the and kadar çok mountain a to mountain", 5);
        assert_eq!(keywords, vec!["mountain"]);
    }

    #[test]
    fn keywords_handle_turkish_letters() {
        let keywords = extract_keywords("Güneş doğdu ve güneş battı", 5);
        assert_eq!(keywords[0], "güneş");
        assert!(keywords.contains(&"doğdu".to_string()));
    }

    #[test]
    fn keywords_empty_when_nothing_survives_filtering() {
        assert!(extract_keywords("a an to ve de da", 5).is_empty());
        assert!(extract_keywords(". . .", 5).is_empty());
    }

    #[test]
    fn keyword_limit_is_enforced() {
        let text = "alpha beta gamma delta epsilon zeta eta theta";
        assert_eq!(extract_keywords(text, 5).len(), 5);
    }

    #[test]
    fn normalization_is_idempotent() {
        let chunk = "Hello   world.\nNew line\there.";
        let once = normalize_whitespace(chunk);
        assert_eq!(normalize_whitespace(&once), once);
        assert_eq!(extract_summary(&once), extract_summary(chunk));
        assert_eq!(extract_keywords(&once, 5), extract_keywords(chunk, 5));
    }

    #[test]
    fn segmenter_is_deterministic() {
        let input = "A tale of two cities. It was the best of times.\n\n\
                     It was the worst of times, it was the age of wisdom.";
        assert_eq!(segment_script(input), segment_script(input));
    }

    #[test]
    fn scripts_are_whitespace_normalized() {
        let plans = segment_script("  spaced\tout \n text here.  ");
        assert_eq!(plans[0].script, "spaced out text here.");
    }
}
