//! Text statistics shared by the analyzer heuristics.
//!
//! Readability scoring (Flesch reading ease and Flesch-Kincaid grade),
//! structural counts, phrase scanning and the similarity measures used by
//! the benchmark library all live here so every analyzer computes them the
//! same way.

use std::collections::BTreeSet;

/// Number of whitespace-separated words.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of non-empty period-delimited sentences.
///
/// This is the coarse count used by the structural heuristics; readability
/// scoring uses [`readability_sentences`] which also honours `!` and `?`.
pub fn sentence_count(text: &str) -> usize {
    text.split('.').filter(|s| !s.trim().is_empty()).count()
}

fn readability_sentences(text: &str) -> usize {
    text.split(['.', '!', '?'])
        .filter(|s| s.chars().any(char::is_alphanumeric))
        .count()
        .max(1)
}

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Estimate the syllables in a single word.
///
/// Counts vowel groups, drops a silent trailing `e` (but not `-le`), and
/// never returns less than one for a word containing letters.
pub fn syllable_count(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if letters.is_empty() {
        return 0;
    }

    let mut count: usize = 0;
    let mut previous_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            count += 1;
        }
        previous_vowel = vowel;
    }

    let n = letters.len();
    if n > 2 && letters[n - 1] == 'e' && letters[n - 2] != 'l' && !is_vowel(letters[n - 2]) {
        count = count.saturating_sub(1);
    }

    count.max(1)
}

fn total_syllables(text: &str) -> usize {
    text.split_whitespace().map(syllable_count).sum()
}

/// Flesch reading ease. Higher is easier; 60+ is plain language.
pub fn flesch_reading_ease(text: &str) -> f64 {
    let words = word_count(text);
    if words == 0 {
        return 0.0;
    }

    let w = words as f64;
    let s = readability_sentences(text) as f64;
    let sy = total_syllables(text) as f64;

    206.835 - 1.015 * (w / s) - 84.6 * (sy / w)
}

/// Flesch-Kincaid US grade level.
pub fn flesch_kincaid_grade(text: &str) -> f64 {
    let words = word_count(text);
    if words == 0 {
        return 0.0;
    }

    let w = words as f64;
    let s = readability_sentences(text) as f64;
    let sy = total_syllables(text) as f64;

    0.39 * (w / s) + 11.8 * (sy / w) - 15.59
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Return the phrases from `phrases` that occur in `text`, case-insensitively,
/// in list order.
pub fn find_phrases(text: &str, phrases: &[&'static str]) -> Vec<&'static str> {
    let lower = text.to_lowercase();
    phrases
        .iter()
        .copied()
        .filter(|phrase| lower.contains(phrase))
        .collect()
}

/// Lowercased alphanumeric tokens.
pub fn tokens(text: &str) -> BTreeSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Jaccard similarity of the token sets of two texts.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let a = tokens(a);
    let b = tokens(b);
    let union = a.union(&b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(&b).count() as f64 / union as f64
}

/// Ratcliff/Obershelp character-sequence ratio in `[0, 1]`.
///
/// `2 * M / T` where `M` is the number of characters in the recursively
/// found longest common blocks and `T` the combined length.
pub fn sequence_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

fn matching_chars(a: &[char], b: &[char]) -> usize {
    let (i, j, k) = longest_common_block(a, b);
    if k == 0 {
        return 0;
    }
    k + matching_chars(&a[..i], &b[..j]) + matching_chars(&a[i + k..], &b[j + k..])
}

/// (start in a, start in b, length) of the first longest common block.
fn longest_common_block(a: &[char], b: &[char]) -> (usize, usize, usize) {
    let mut best = (0, 0, 0);
    let mut previous = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        let mut current = vec![0usize; b.len() + 1];
        for (j, &cb) in b.iter().enumerate() {
            if ca == cb {
                let run = previous[j] + 1;
                current[j + 1] = run;
                if run > best.2 {
                    best = (i + 1 - run, j + 1 - run, run);
                }
            }
        }
        previous = current;
    }

    best
}
