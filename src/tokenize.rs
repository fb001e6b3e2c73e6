//! Text to word tokenization: split on anything that is not a letter or digit, lowercase.

/// Maximal runs of letters and digits. Underscore, hyphen, punctuation and
/// whitespace all separate words; empty runs are skipped.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|s| !s.is_empty())
}

/// Split text into lowercase words.
///
/// Separators are replaced before case folding, the same order as a
/// `[\W_]` substitution followed by lowercasing. Folding per word also means a
/// letter whose lowercase form carries a combining mark (`İ`) never breaks its
/// word in two.
pub fn tokenize(text: &str) -> Vec<String> {
    words(text).map(str::to_lowercase).collect()
}
