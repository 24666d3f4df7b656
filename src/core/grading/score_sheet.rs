// Reading quiz scores out of a Forms response spreadsheet.
//
// The header row decides which columns hold the respondent email and the
// total score. Sheets exported in other locales use translated headers, so a
// few candidates are tried before falling back to columns B and C.

use std::collections::HashMap;

pub const HEADER_RANGE: &str = "A1:Z1";
pub const DATA_RANGE: &str = "A2:Z";

const EMAIL_HEADERS: [&str; 3] = ["Email Address", "Username", "Nome de usuário"];
const SCORE_HEADERS: [&str; 3] = ["Score", "Total score", "Pontuação total"];

const FALLBACK_EMAIL_COLUMN: usize = 1;
const FALLBACK_SCORE_COLUMN: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreColumns {
    pub email: usize,
    pub score: usize,
}

/// Finds the email and score columns. `None` when the header is too short to
/// hold both.
pub fn locate_columns(header: &[String]) -> Option<ScoreColumns> {
    let find = |candidates: &[&str]| {
        header
            .iter()
            .position(|cell| candidates.iter().any(|c| cell.trim() == *c))
    };

    match (find(&EMAIL_HEADERS), find(&SCORE_HEADERS)) {
        (Some(email), Some(score)) => Some(ScoreColumns { email, score }),
        _ if header.len() > FALLBACK_SCORE_COLUMN => Some(ScoreColumns {
            email: FALLBACK_EMAIL_COLUMN,
            score: FALLBACK_SCORE_COLUMN,
        }),
        _ => None,
    }
}

/// `"7.00 / 10"` -> 7.0, `"8"` -> 8.0.
pub fn parse_score_cell(cell: &str) -> Option<f64> {
    let earned = cell.split('/').next()?.trim();
    if earned.is_empty() {
        return None;
    }
    earned.replace(',', ".").parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Best score per lowercase email. Rows without an email or with an
/// unreadable score are skipped.
pub fn collect_scores(header: &[String], rows: &[Vec<String>]) -> HashMap<String, f64> {
    let mut scores = HashMap::new();
    let Some(columns) = locate_columns(header) else {
        tracing::warn!("Score sheet header has no email/score columns");
        return scores;
    };

    for row in rows {
        let email = match row.get(columns.email) {
            Some(cell) if !cell.trim().is_empty() => cell.trim().to_lowercase(),
            _ => continue,
        };
        let Some(score) = row.get(columns.score).and_then(|c| parse_score_cell(c)) else {
            tracing::debug!("Skipping row for {} with unreadable score", email);
            continue;
        };

        scores
            .entry(email)
            .and_modify(|best: &mut f64| {
                if score > *best {
                    *best = score;
                }
            })
            .or_insert(score);
    }

    scores
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_locate_by_header_name() {
        let header = row(&["Timestamp", "Score", "Email Address"]);
        assert_eq!(
            locate_columns(&header),
            Some(ScoreColumns { email: 2, score: 1 })
        );

        let header = row(&["Carimbo", "Nome de usuário", "Pontuação total"]);
        assert_eq!(
            locate_columns(&header),
            Some(ScoreColumns { email: 1, score: 2 })
        );
    }

    #[test]
    fn test_locate_falls_back_to_b_and_c() {
        let header = row(&["When", "Who", "Points", "Q1"]);
        assert_eq!(
            locate_columns(&header),
            Some(ScoreColumns { email: 1, score: 2 })
        );
        assert_eq!(locate_columns(&row(&["When", "Who"])), None);
        assert_eq!(locate_columns(&[]), None);
    }

    #[test]
    fn test_parse_score_cell() {
        assert_eq!(parse_score_cell("7.00 / 10"), Some(7.0));
        assert_eq!(parse_score_cell("8"), Some(8.0));
        assert_eq!(parse_score_cell(" 4,5 / 10 "), Some(4.5));
        assert_eq!(parse_score_cell(""), None);
        assert_eq!(parse_score_cell("/ 10"), None);
        assert_eq!(parse_score_cell("n/a"), None);
    }

    #[test]
    fn test_highest_score_wins() {
        let header = row(&["Timestamp", "Email Address", "Score"]);
        let rows = vec![
            row(&["t1", "Ana@School.org", "5 / 10"]),
            row(&["t2", "ana@school.org ", "9 / 10"]),
            row(&["t3", "ANA@school.org", "7 / 10"]),
            row(&["t4", "", "10 / 10"]),
            row(&["t5", "bob@school.org", "oops"]),
            row(&["t6", "carl@school.org"]),
        ];

        let scores = collect_scores(&header, &rows);

        assert_eq!(scores.len(), 1);
        assert_eq!(scores.get("ana@school.org"), Some(&9.0));
    }
}
