//! Reply parsing.
//!
//! Models wrap structured replies in several ways: bare JSON, a ```` ```json ````
//! fence, an upper-case ```` ```JSON ```` fence or an untagged ```` ``` ````
//! fence. All of them are unwrapped before a strict parse. List and Q/A
//! extraction is lenient and never fails; it just yields fewer items.

use serde::de::DeserializeOwned;
use thiserror::Error;

/// Shortest line accepted as a list item.
pub const MIN_ITEM_LEN: usize = 10;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseError {
    #[error("model reply was empty")]
    Empty,

    #[error("model reply is not valid JSON for the expected shape: {0}")]
    InvalidJson(String),
}

/// Strip a surrounding code fence, if any.
///
/// An opening fence without a closing one is still stripped.
pub fn unwrap_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_ticks) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the language tag on the opening line.
    let body = match after_ticks.find('\n') {
        Some(newline) => &after_ticks[newline + 1..],
        None => after_ticks.trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };

    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

/// Unwrap and strictly parse a JSON reply into `T`.
pub fn parse_json<T: DeserializeOwned>(raw: &str) -> Result<T, ParseError> {
    let body = unwrap_fences(raw);
    if body.is_empty() {
        return Err(ParseError::Empty);
    }
    serde_json::from_str(body).map_err(|e| ParseError::InvalidJson(e.to_string()))
}

fn is_list_marker(c: char) -> bool {
    c.is_ascii_digit() || c.is_whitespace() || matches!(c, '.' | ')' | '-' | '*' | '•' | '#' | ':')
}

/// Pull up to `max` list items out of free text.
///
/// Leading numbering and bullet markers are removed; lines shorter than
/// [`MIN_ITEM_LEN`] characters after stripping are skipped.
pub fn extract_list_items(raw: &str, max: usize) -> Vec<String> {
    unwrap_fences(raw)
        .lines()
        .map(|line| line.trim_start_matches(is_list_marker).trim())
        .filter(|line| line.chars().count() >= MIN_ITEM_LEN)
        .take(max)
        .map(str::to_string)
        .collect()
}

/// Text after a `Q1:` / `A1:` style label, if the line carries one.
fn strip_label(line: &str, label: char) -> Option<&str> {
    let rest = line.strip_prefix(label)?;
    let rest = rest.trim_start_matches(|c: char| c.is_ascii_digit());
    rest.strip_prefix(':')
        .map(|text| text.trim_start_matches('*').trim())
}

/// Pull up to `max` question/answer pairs out of `Q1: ... A1: ...` text.
///
/// A question without a following answer is dropped.
pub fn extract_qa_pairs(raw: &str, max: usize) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    let mut question: Option<String> = None;

    for line in unwrap_fences(raw).lines() {
        let line = line.trim().trim_start_matches(['*', '#']).trim_start();
        if let Some(q) = strip_label(line, 'Q') {
            question = Some(q.to_string());
        } else if let Some(a) = strip_label(line, 'A') {
            if let Some(q) = question.take() {
                if !q.is_empty() && !a.is_empty() {
                    pairs.push((q, a.to_string()));
                }
            }
        }

        if pairs.len() >= max {
            break;
        }
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Reply {
        issues: Vec<String>,
    }

    #[test]
    fn test_unwrap_fences_variants() {
        let bare = r#"{"issues": []}"#;
        let wrapped = [
            bare.to_string(),
            format!("```json\n{}\n```", bare),
            format!("```JSON\n{}\n```", bare),
            format!("```\n{}\n```", bare),
            format!("  ```json\n{}\n```  \n", bare),
            format!("```json\n{}", bare),
            format!("```json{}```", bare),
        ];

        for raw in &wrapped {
            assert_eq!(unwrap_fences(raw), bare, "failed for {:?}", raw);
        }
    }

    #[test]
    fn test_parse_json_accepts_every_wrapper() {
        let expected = Reply {
            issues: vec!["vague wording".to_string()],
        };
        for raw in [
            r#"{"issues": ["vague wording"]}"#,
            "```json\n{\"issues\": [\"vague wording\"]}\n```",
            "```JSON\n{\"issues\": [\"vague wording\"]}\n```",
            "```\n{\"issues\": [\"vague wording\"]}\n```",
        ] {
            assert_eq!(parse_json::<Reply>(raw).unwrap(), expected);
        }
    }

    #[test]
    fn test_parse_json_errors() {
        assert_eq!(parse_json::<Reply>("   "), Err(ParseError::Empty));
        assert_eq!(parse_json::<Reply>("```json\n```"), Err(ParseError::Empty));
        assert!(matches!(
            parse_json::<Reply>("Sure! Here is the analysis."),
            Err(ParseError::InvalidJson(_))
        ));
        // Right syntax, wrong shape.
        assert!(matches!(
            parse_json::<Reply>(r#"{"problems": []}"#),
            Err(ParseError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_extract_list_items_strips_markers() {
        let raw = "Here are some examples:\n\
                   1. A driver hits a pole and the bumper is repaired.\n\
                   2) Hail dents the roof of a parked car.\n\
                   - A tree falls on the bonnet during a storm.\n\
                   * short\n\
                   • Flood water damages the engine in a basement.";
        let items = extract_list_items(raw, 10);

        assert_eq!(items.len(), 5);
        assert_eq!(items[0], "Here are some examples:");
        assert_eq!(items[1], "A driver hits a pole and the bumper is repaired.");
        assert_eq!(items[2], "Hail dents the roof of a parked car.");
        assert_eq!(items[4], "Flood water damages the engine in a basement.");
    }

    #[test]
    fn test_extract_list_items_respects_max() {
        let raw = "1. First example sentence\n2. Second example sentence\n3. Third example sentence";
        assert_eq!(extract_list_items(raw, 2).len(), 2);
        assert!(extract_list_items("", 3).is_empty());
    }

    #[test]
    fn test_extract_qa_pairs() {
        let raw = "Q1: What is covered?\nA1: Accidental damage to your car.\n\n\
                   Q2: How do I claim?\nA2: Call us within 30 days.\n\
                   Q3: Dangling question without answer?\n\
                   **Q4:** Is theft covered?\nA4: Yes, with a police report.";
        let pairs = extract_qa_pairs(raw, 5);

        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0].0, "What is covered?");
        assert_eq!(pairs[1].1, "Call us within 30 days.");
        assert_eq!(pairs[2].1, "Yes, with a police report.");
        assert_eq!(extract_qa_pairs(raw, 1).len(), 1);
    }
}
