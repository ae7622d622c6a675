//! Cleanup and statistics for text pulled out of PDFs.

use crate::constants::WORDS_PER_MINUTE;

/// Collapse whitespace and strip page markers left by PDF extraction.
///
/// Removes `Page <n>` pairs and tokens that are bare page numbers, then joins
/// the remaining words with single spaces.
#[must_use]
pub fn clean_text(raw: &str) -> String {
    let mut words: Vec<&str> = Vec::new();
    let mut tokens = raw.split_whitespace().peekable();
    while let Some(tok) = tokens.next() {
        if tok == "Page" && tokens.peek().is_some_and(|next| is_number(next)) {
            tokens.next();
            continue;
        }
        if is_number(tok) && words.is_empty() {
            // Leading page number ahead of the first real word.
            continue;
        }
        words.push(tok);
    }
    words.join(" ")
}

fn is_number(tok: &str) -> bool {
    !tok.is_empty() && tok.bytes().all(|b| b.is_ascii_digit())
}

#[must_use]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Minutes needed to read `text`, rounded up; zero only for empty text.
#[must_use]
pub fn reading_time_minutes(text: &str) -> usize {
    word_count(text).div_ceil(WORDS_PER_MINUTE)
}
