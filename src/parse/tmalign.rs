//! TM-align pairwise report scraping.
//!
//! One TM-align run compares exactly two structures and prints labeled
//! scalar scores. Only the TM-score normalized by Chain_1 is taken —
//! the report also prints a Chain_2-normalized value that must not be
//! picked up.

use regex::Regex;

/// Scores pulled from one pairwise report. A score whose pattern is
/// absent stays `None` and the pair contributes nothing for that
/// metric.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairScores {
    pub tm_score: Option<f64>,
    pub rmsd: Option<f64>,
}

pub fn extract_scores(text: &str) -> PairScores {
    let tm_re =
        Regex::new(r"TM-score=\s*([0-9.]+)\s+\(if normalized by length of Chain_1").unwrap();
    let rmsd_re = Regex::new(r"RMSD=\s*([0-9.]+)").unwrap();

    let capture = |re: &Regex| {
        re.captures(text)
            .and_then(|caps| caps[1].parse::<f64>().ok())
    };
    PairScores {
        tm_score: capture(&tm_re),
        rmsd: capture(&rmsd_re),
    }
}

/// Recovers the entity pair from a report file stem of the form
/// `<A>_vs_<B>`. Returns `None` when the stem does not follow the
/// convention.
pub fn pair_from_stem(stem: &str) -> Option<(String, String)> {
    let (a, b) = stem.split_once("_vs_")?;
    if a.is_empty() || b.is_empty() {
        return None;
    }
    Some((a.to_string(), b.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "\
 **************************************************************************
 *                                TM-align                                *
 **************************************************************************

Name of Chain_1: model_A.pdb
Name of Chain_2: model_B.pdb
Length of Chain_1: 120 residues
Length of Chain_2: 118 residues

Aligned length= 110, RMSD=   2.35, Seq_ID=n_identical/n_aligned= 0.450
TM-score= 0.71234 (if normalized by length of Chain_1, i.e., LN=120, d0=4.00)
TM-score= 0.72012 (if normalized by length of Chain_2, i.e., LN=118, d0=3.95)
";

    #[test]
    fn test_extract_scores() {
        let scores = extract_scores(REPORT);
        assert_eq!(scores.tm_score, Some(0.71234));
        assert_eq!(scores.rmsd, Some(2.35));
    }

    #[test]
    fn test_chain1_normalization_is_selected() {
        // The Chain_2-normalized line must not win even though it
        // appears in the same report.
        let scores = extract_scores(REPORT);
        assert_ne!(scores.tm_score, Some(0.72012));
    }

    #[test]
    fn test_missing_patterns_yield_none() {
        let scores = extract_scores("TM-align failed: no common residues\n");
        assert_eq!(scores.tm_score, None);
        assert_eq!(scores.rmsd, None);
    }

    #[test]
    fn test_partial_report() {
        let scores = extract_scores("Aligned length= 10, RMSD= 4.10, Seq_ID= 0.1\n");
        assert_eq!(scores.tm_score, None);
        assert_eq!(scores.rmsd, Some(4.1));
    }

    #[test]
    fn test_pair_from_stem() {
        assert_eq!(
            pair_from_stem("model_A_vs_model_B"),
            Some(("model_A".to_string(), "model_B".to_string()))
        );
        assert_eq!(pair_from_stem("no_separator_here"), None);
        assert_eq!(pair_from_stem("_vs_b"), None);
    }
}
