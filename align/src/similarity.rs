//! Similarity ratios between two already normalized strings.
//!
//! Every ratio is symmetric, bounded to `[0, 1]`, `1.0` for identical input
//! and `0.0` when the two sides share nothing.
use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub trait Similarity {
    fn ratio(&self, a: &str, b: &str) -> f64;
}

/// Edit distance over characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharacterRatio;

/// Edit distance over whole words, so a sentence has to keep its shape to score well.
#[derive(Debug, Clone, Copy, Default)]
pub struct WordRatio;

/// Mean of [`CharacterRatio`] and [`WordRatio`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Combined;

impl Similarity for CharacterRatio {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        strsim::normalized_levenshtein(a, b)
    }
}

impl Similarity for WordRatio {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        let a_words = a.split_whitespace().collect::<Vec<_>>();
        let b_words = b.split_whitespace().collect::<Vec<_>>();
        let longest = a_words.len().max(b_words.len());
        if longest == 0 {
            return 1.0;
        }
        let distance = strsim::generic_levenshtein(&a_words, &b_words);
        1.0 - distance as f64 / longest as f64
    }
}

impl Similarity for Combined {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        (CharacterRatio.ratio(a, b) + WordRatio.ratio(a, b)) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    CharacterRatio,
    WordRatio,
    #[default]
    Combined,
}

impl Similarity for SimilarityMetric {
    fn ratio(&self, a: &str, b: &str) -> f64 {
        match self {
            SimilarityMetric::CharacterRatio => CharacterRatio.ratio(a, b),
            SimilarityMetric::WordRatio => WordRatio.ratio(a, b),
            SimilarityMetric::Combined => Combined.ratio(a, b),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown similarity metric {0:?}, expected one of: character, word, combined")]
pub struct UnknownMetric(String);

impl FromStr for SimilarityMetric {
    type Err = UnknownMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "character" | "character_ratio" | "char" => Ok(SimilarityMetric::CharacterRatio),
            "word" | "word_ratio" => Ok(SimilarityMetric::WordRatio),
            "combined" => Ok(SimilarityMetric::Combined),
            _ => Err(UnknownMetric(s.to_string())),
        }
    }
}

impl fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SimilarityMetric::CharacterRatio => "character_ratio",
            SimilarityMetric::WordRatio => "word_ratio",
            SimilarityMetric::Combined => "combined",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METRICS: [SimilarityMetric; 3] = [
        SimilarityMetric::CharacterRatio,
        SimilarityMetric::WordRatio,
        SimilarityMetric::Combined,
    ];

    const PAIRS: &[(&str, &str)] = &[
        ("quick brown", "the quick"),
        ("going to talk about lambda", "gonna talk about lambda functions"),
        ("a", "a b c d"),
        ("", "something"),
        ("서버리스 아키텍처", "서버리스 아키텍쳐"),
    ];

    #[test]
    fn identical_is_one() {
        for metric in METRICS {
            assert_eq!(metric.ratio("quick brown fox", "quick brown fox"), 1.0);
            assert_eq!(metric.ratio("", ""), 1.0);
        }
    }

    #[test]
    fn disjoint_is_zero() {
        for metric in METRICS {
            assert_eq!(metric.ratio("abc", "xyz"), 0.0, "{}", metric);
            assert_eq!(metric.ratio("", "xyz"), 0.0, "{}", metric);
        }
    }

    #[test]
    fn symmetric_and_bounded() {
        for metric in METRICS {
            for (a, b) in PAIRS {
                let ab = metric.ratio(a, b);
                let ba = metric.ratio(b, a);
                assert!((ab - ba).abs() < 1e-12, "{} {:?} {:?}", metric, a, b);
                assert!((0.0..=1.0).contains(&ab), "{} {:?} {:?}", metric, a, b);
            }
        }
    }

    #[test]
    fn partial_overlap_degrades_gracefully() {
        let close = Combined.ratio("going to talk about lambda", "going to talk about lambdas");
        let far = Combined.ratio("going to talk about lambda", "something else entirely here");
        assert!(close > 0.8, "close={}", close);
        assert!(far < close);
    }

    #[test]
    fn word_ratio_counts_words() {
        // one word of four substituted
        assert_eq!(WordRatio.ratio("a b c d", "a b x d"), 0.75);
    }

    #[test]
    fn parse_metric_names() {
        assert_eq!(
            "character".parse::<SimilarityMetric>().unwrap(),
            SimilarityMetric::CharacterRatio
        );
        assert_eq!(
            "Word-Ratio".parse::<SimilarityMetric>().unwrap(),
            SimilarityMetric::WordRatio
        );
        assert_eq!(
            SimilarityMetric::Combined.to_string().parse::<SimilarityMetric>().unwrap(),
            SimilarityMetric::Combined
        );
        assert!("cosine".parse::<SimilarityMetric>().is_err());
    }
}
