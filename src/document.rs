//! Splitting policy documents into clauses.

/// Shortest paragraph treated as a clause.
pub const MIN_CLAUSE_CHARS: usize = 20;

/// Split plain text into clauses on blank lines.
///
/// Whitespace inside each paragraph is collapsed to single spaces. Headings,
/// page numbers and other fragments shorter than [`MIN_CLAUSE_CHARS`] are
/// dropped, and at most `max` clauses are returned.
pub fn split_clauses(text: &str, max: usize) -> Vec<String> {
    let mut clauses = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();

    for line in text.lines().chain(std::iter::once("")) {
        if line.trim().is_empty() {
            if !paragraph.is_empty() {
                let clause = paragraph.join(" ");
                if clause.chars().count() >= MIN_CLAUSE_CHARS {
                    clauses.push(clause);
                }
                paragraph.clear();
            }
        } else {
            paragraph.extend(line.split_whitespace());
        }

        if clauses.len() >= max {
            break;
        }
    }

    clauses
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_POLICY: &str = include_str!("../fixtures/sample_policy.txt");

    #[test]
    fn test_split_sample_policy() {
        let clauses = split_clauses(SAMPLE_POLICY, 20);

        assert_eq!(clauses.len(), 4);
        assert!(clauses[0].starts_with("The insurer will indemnify the insured"));
        assert!(clauses[0].contains("the insured vehicle caused"));
        assert!(!clauses[0].contains('\n'));
        assert!(clauses[3].ends_with("civil war."));
    }

    #[test]
    fn test_heading_and_page_number_dropped() {
        let clauses = split_clauses(SAMPLE_POLICY, 20);
        assert!(clauses.iter().all(|c| !c.starts_with("Page")));
        assert!(clauses.iter().all(|c| !c.starts_with("SECTION")));
    }

    #[test]
    fn test_max_clauses() {
        assert_eq!(split_clauses(SAMPLE_POLICY, 2).len(), 2);
        assert!(split_clauses(SAMPLE_POLICY, 0).is_empty());
    }

    #[test]
    fn test_whitespace_collapsed() {
        let text = "  Claims   must be\treported\n   within 30 days.  \n\n\n";
        assert_eq!(
            split_clauses(text, 5),
            vec!["Claims must be reported within 30 days."]
        );
    }
}
