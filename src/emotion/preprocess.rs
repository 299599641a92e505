// Text normalization
//
// Lower-case, tokenize, keep alphanumeric tokens, drop English stop words.
// Used for diagnostics only; classification matches raw lower-cased text.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\w+|[^\w\s]+").expect("token pattern is valid")
});

/// English stop words (NLTK list)
pub const STOP_WORDS: &[&str] = &[
    "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
    "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
    "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
    "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
    "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
    "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
    "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
    "with", "about", "against", "between", "into", "through", "during", "before", "after",
    "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
    "again", "further", "then", "once", "here", "there", "when", "where", "why", "how", "all",
    "any", "both", "each", "few", "more", "most", "other", "some", "such", "no", "nor", "not",
    "only", "own", "same", "so", "than", "too", "very", "s", "t", "can", "will", "just", "don",
    "don't", "should", "should've", "now", "d", "ll", "m", "o", "re", "ve", "y", "ain",
    "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn", "doesn't", "hadn",
    "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma", "mightn",
    "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't", "shouldn",
    "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn", "wouldn't",
];

static STOP_WORD_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| STOP_WORDS.iter().copied().collect());

/// Split lower-cased text into word and punctuation tokens
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    TOKEN_RE
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

pub fn is_stop_word(token: &str) -> bool {
    STOP_WORD_SET.contains(token)
}

/// Normalize text into a space-joined stream of content words
pub fn normalize_text(text: &str) -> String {
    tokenize(text)
        .into_iter()
        .filter(|token| token.chars().all(char::is_alphanumeric))
        .filter(|token| !is_stop_word(token))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_stop_words_and_punctuation() {
        assert_eq!(normalize_text("I am so happy, and excited today!"), "happy excited today");
    }

    #[test]
    fn test_empty_and_punctuation_only() {
        assert_eq!(normalize_text(""), "");
        assert_eq!(normalize_text("?!... --"), "");
    }

    #[test]
    fn test_tokenize_splits_punctuation() {
        assert_eq!(tokenize("Wow!! Great"), vec!["wow", "!!", "great"]);
    }

    #[test]
    fn test_non_ascii_words_kept() {
        assert_eq!(normalize_text("Café très bien"), "café très bien");
    }
}
