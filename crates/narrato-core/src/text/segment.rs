//! Sentence segmentation for chunked synthesis.
//!
//! Splits text at the sentence terminator and greedily groups consecutive
//! sentences into chunks of at most `max_len` characters. Grouping keeps
//! each synthesis call long enough to sound natural while letting the first
//! chunk come back quickly.

/// Default chunk cap in characters.
pub const DEFAULT_MAX_CHUNK_CHARS: usize = 500;

/// Sentence terminator. Every emitted sentence is re-suffixed with it.
const TERMINATOR: char = '.';

/// Split `text` into ordered chunks of grouped sentences.
///
/// - Sentences are trimmed and re-terminated with `.`; they are joined with
///   no separator, so `"A. B. C."` becomes `"A.B.C."`.
/// - Empty and whitespace-only sentences are dropped.
/// - A sentence that alone exceeds `max_len` becomes its own chunk, intact.
/// - Lengths count `char`s, not bytes.
///
/// Returns an empty vector only when `text` has no sentence content; callers
/// must treat that as invalid input.
#[must_use]
pub fn segment(text: &str, max_len: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for sentence in text.split(TERMINATOR) {
        let sentence = sentence.trim();
        if sentence.is_empty() {
            continue;
        }

        let sentence_len = sentence.chars().count() + 1;
        if !current.is_empty() && current_len + sentence_len > max_len {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        current.push_str(sentence);
        current.push(TERMINATOR);
        current_len += sentence_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    tracing::debug!(chunks = chunks.len(), max_len, "Text segmented");
    chunks
}

/// [`segment`] with [`DEFAULT_MAX_CHUNK_CHARS`].
#[must_use]
pub fn segment_default(text: &str) -> Vec<String> {
    segment(text, DEFAULT_MAX_CHUNK_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_sentences_share_one_chunk() {
        assert_eq!(segment("A. B. C.", 500), vec!["A.B.C."]);
    }

    #[test]
    fn text_without_terminator_is_one_sentence() {
        assert_eq!(segment("hello world", 500), vec!["hello world."]);
    }

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert!(segment("", 500).is_empty());
        assert!(segment("   \n\t ", 500).is_empty());
        assert!(segment(". . ...", 500).is_empty());
    }

    #[test]
    fn blank_sentences_are_skipped_without_breaking_groups() {
        assert_eq!(segment("A.. . B.", 500), vec!["A.B."]);
    }

    #[test]
    fn flushes_when_next_sentence_would_overflow() {
        // "aaaa." is 5 chars; two fit in 10, the third starts a new chunk.
        let chunks = segment("aaaa. bbbb. cccc.", 10);
        assert_eq!(chunks, vec!["aaaa.bbbb.", "cccc."]);
    }

    #[test]
    fn exact_fit_is_allowed() {
        let chunks = segment("aaaa. bbbb.", 10);
        assert_eq!(chunks, vec!["aaaa.bbbb."]);
    }

    #[test]
    fn oversized_sentence_is_emitted_whole() {
        let long = "x".repeat(30);
        let text = format!("short. {long}. tail.");
        let chunks = segment(&text, 10);
        assert_eq!(chunks, vec!["short.".to_string(), format!("{long}."), "tail.".to_string()]);
    }

    #[test]
    fn counts_characters_not_bytes() {
        // Four Arabic letters are 8 bytes but 4 chars; "+ ." makes 5 chars each.
        let chunks = segment("مرحب. مرحب.", 10);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn default_cap_is_five_hundred() {
        let sentence = "w".repeat(240);
        let text = format!("{sentence}. {sentence}. {sentence}.");
        let chunks = segment_default(&text);
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| c.chars().count() <= DEFAULT_MAX_CHUNK_CHARS));
    }
}
