use serde::Serialize;
use shorts_core::{clean_text::CleanTokens, TranscriptSequence};

use crate::{normalize::normalize, similarity::Similarity};

/// The best alignment found for one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchWindow {
    /// first token of the window, inclusive
    pub start_index: usize,
    /// last token of the window, inclusive
    pub end_index: usize,
    pub score: f64,
    pub window_text: String,
}

/// Normalized text of the spoken tokens laid end to end, with byte offsets
/// so any run of tokens can be sliced out without re-joining strings.
///
/// Spoken tokens with no comparable text (`♪♪`, `%`) are left out, so a
/// window never starts or ends on one.
struct IndexedTranscript<'t> {
    transcript: &'t TranscriptSequence,
    script: String,
    /// byte offset of each spoken token in `script`, plus the script length
    index: Vec<usize>,
    /// transcript index of each indexed token
    positions: Vec<usize>,
    /// running word budget, `budget[k]` is consumed by the spoken tokens before `k`
    budget: Vec<usize>,
}

impl<'t> IndexedTranscript<'t> {
    fn new(transcript: &'t TranscriptSequence) -> IndexedTranscript<'t> {
        let mut script = String::new();
        let mut index = Vec::new();
        let mut positions = Vec::new();
        let mut budget = vec![0];

        for (position, token) in transcript.tokens().iter().enumerate() {
            if !token.is_pronunciation() {
                continue;
            }
            let text = normalize(&token.text);
            if text.is_empty() {
                log::trace!("not indexing {:?}, nothing to compare", token.text);
                continue;
            }
            index.push(script.len());
            positions.push(position);
            // caption cues hold many words, a word token holds one
            let words = text.split_whitespace().count();
            budget.push(budget[budget.len() - 1] + words);
            script.push(' ');
            script.push_str(&text);
        }
        index.push(script.len());

        IndexedTranscript {
            transcript,
            script,
            index,
            positions,
            budget,
        }
    }

    fn spoken(&self) -> usize {
        self.positions.len()
    }

    /// Normalized text of spoken tokens `start..=end`.
    fn extract_window(&self, start: usize, end: usize) -> &str {
        self.script[self.index[start]..self.index[end + 1]].trim_start()
    }

    /// Last spoken token of a window starting at `start` that covers `words`
    /// words, clipped to the end of the transcript.
    fn window_end(&self, start: usize, words: usize) -> usize {
        let target = self.budget[start] + words;
        let reached = self.budget[start + 1..].partition_point(|&b| b < target);
        (start + reached).min(self.spoken() - 1)
    }
}

pub struct WindowMatcher<'t, S> {
    indexed: IndexedTranscript<'t>,
    similarity: S,
}

impl<'t, S: Similarity> WindowMatcher<'t, S> {
    pub fn new(transcript: &'t TranscriptSequence, similarity: S) -> WindowMatcher<'t, S> {
        WindowMatcher {
            indexed: IndexedTranscript::new(transcript),
            similarity,
        }
    }

    /// Slide every window size over the transcript and keep the best scoring
    /// window for `segment`, which must already be normalized.
    ///
    /// Windows start and end on spoken tokens with comparable text. Ties keep the earliest window, and
    /// a perfect score ends the search. Returns `None` when there is nothing
    /// to compare.
    pub fn best_window(&self, segment: &str, sizes: &[usize]) -> Option<MatchWindow> {
        let spoken = self.indexed.spoken();
        if segment.is_empty() || spoken == 0 || sizes.is_empty() {
            return None;
        }

        let mut best: Option<(usize, usize, f64)> = None;
        let mut scored_ends = Vec::with_capacity(sizes.len());
        'starts: for start in 0..spoken {
            scored_ends.clear();
            for &size in sizes {
                let end = self.indexed.window_end(start, size);
                // near the end of the transcript several sizes clip to the same window
                if scored_ends.contains(&end) {
                    continue;
                }
                scored_ends.push(end);

                let window = self.indexed.extract_window(start, end);
                let score = self.similarity.ratio(window, segment);
                if best.map(|(_, _, b)| score > b).unwrap_or(true) {
                    log::trace!("new best {:.3} at {}..={}: {:?}", score, start, end, window);
                    best = Some((start, end, score));
                    if score >= 1.0 {
                        break 'starts;
                    }
                }
            }
        }

        best.map(|(start, end, score)| {
            let start_index = self.indexed.positions[start];
            let end_index = self.indexed.positions[end];
            let tokens = &self.indexed.transcript.tokens()[start_index..=end_index];
            MatchWindow {
                start_index,
                end_index,
                score,
                window_text: CleanTokens(tokens).to_string(),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use shorts_core::TimedToken;

    use super::*;
    use crate::similarity::{CharacterRatio, Combined, SimilarityMetric};

    fn transcript(words: &[&str]) -> TranscriptSequence {
        let tokens = words
            .iter()
            .enumerate()
            .map(|(i, w)| {
                if w.chars().all(|c| c.is_ascii_punctuation()) {
                    TimedToken::punctuation(*w)
                } else {
                    TimedToken::pronunciation(*w, i as f64, i as f64 + 0.5)
                }
            })
            .collect();
        TranscriptSequence::new(tokens).unwrap()
    }

    #[test]
    fn window_end_counts_only_spoken_tokens() {
        let seq = transcript(&["Hello", ",", "big", "world", "."]);
        let idx = IndexedTranscript::new(&seq);
        assert_eq!(idx.spoken(), 3);
        assert_eq!(idx.window_end(0, 2), 1);
        assert_eq!(idx.extract_window(0, 1), "hello big");
        // clipped at the end
        assert_eq!(idx.window_end(1, 10), 2);
    }

    #[test]
    fn window_end_with_multi_word_cues() {
        let seq = TranscriptSequence::new(vec![
            TimedToken::pronunciation("Welcome to the show.", 0.0, 2.0),
            TimedToken::pronunciation("Today we talk", 2.0, 4.0),
            TimedToken::pronunciation("about serverless.", 4.0, 5.0),
        ])
        .unwrap();
        let idx = IndexedTranscript::new(&seq);
        assert_eq!(idx.window_end(0, 1), 0);
        assert_eq!(idx.window_end(0, 4), 0);
        assert_eq!(idx.window_end(0, 5), 1);
        assert_eq!(idx.window_end(1, 5), 2);
        assert_eq!(idx.extract_window(1, 2), "today we talk about serverless");
    }

    #[test]
    fn exact_run_scores_one() {
        let seq = transcript(&["The", "quick", "brown", "fox"]);
        let matcher = WindowMatcher::new(&seq, SimilarityMetric::Combined);
        let w = matcher.best_window("quick brown", &[2, 1, 3, 4]).unwrap();
        assert_eq!((w.start_index, w.end_index), (1, 2));
        assert_eq!(w.score, 1.0);
        assert_eq!(w.window_text, "quick brown");
    }

    #[test]
    fn punctuation_pads_the_window() {
        let seq = transcript(&["Well", ",", "hello", "there", "!", "Bye"]);
        let matcher = WindowMatcher::new(&seq, Combined);
        let w = matcher.best_window("well hello", &[2]).unwrap();
        assert_eq!((w.start_index, w.end_index), (0, 2));
        assert_eq!(w.score, 1.0);
        assert_eq!(w.window_text, "Well, hello");
    }

    #[test]
    fn first_best_wins() {
        let seq = transcript(&["say", "it", "again", "say", "it", "again"]);
        let matcher = WindowMatcher::new(&seq, CharacterRatio);
        let w = matcher.best_window("say it", &[2]).unwrap();
        assert_eq!((w.start_index, w.end_index), (0, 1));
    }

    #[test]
    fn segment_longer_than_transcript_is_clipped() {
        let seq = transcript(&["short", "one"]);
        let matcher = WindowMatcher::new(&seq, Combined);
        let w = matcher
            .best_window("short one and a lot more words", &[7, 6, 8])
            .unwrap();
        assert_eq!((w.start_index, w.end_index), (0, 1));
        assert!(w.score < 1.0);
    }

    #[test]
    fn nothing_to_compare() {
        let empty = TranscriptSequence::new(vec![]).unwrap();
        let matcher = WindowMatcher::new(&empty, Combined);
        assert_eq!(matcher.best_window("anything", &[1]), None);

        let seq = transcript(&["a", "b"]);
        let matcher = WindowMatcher::new(&seq, Combined);
        assert_eq!(matcher.best_window("", &[1]), None);
        assert_eq!(matcher.best_window("a", &[]), None);
    }

    #[test]
    fn music_cue_does_not_widen_the_window() {
        let seq = TranscriptSequence::new(vec![
            TimedToken::pronunciation("♪♪", 0.0, 10.0),
            TimedToken::pronunciation("hello world", 10.0, 12.0),
            TimedToken::pronunciation("♪", 12.0, 20.0),
        ])
        .unwrap();
        let matcher = WindowMatcher::new(&seq, Combined);
        let w = matcher.best_window("hello world", &[2, 1, 3, 4]).unwrap();
        assert_eq!((w.start_index, w.end_index), (1, 1));
        assert_eq!(w.window_text, "hello world");
    }

    #[test]
    fn symbol_word_is_skipped_as_window_start() {
        let seq = TranscriptSequence::new(vec![
            TimedToken::pronunciation("So", 0.0, 0.3),
            TimedToken::pronunciation("%", 0.3, 5.0),
            TimedToken::pronunciation("quick", 5.0, 5.4),
            TimedToken::pronunciation("brown", 5.4, 5.8),
        ])
        .unwrap();
        let idx = IndexedTranscript::new(&seq);
        assert_eq!(idx.spoken(), 3);
        assert_eq!(idx.extract_window(1, 2), "quick brown");

        let matcher = WindowMatcher::new(&seq, Combined);
        let w = matcher.best_window("quick brown", &[2, 1, 3]).unwrap();
        assert_eq!((w.start_index, w.end_index), (2, 3));
        assert_eq!(w.score, 1.0);
    }

    #[test]
    fn nothing_comparable_in_transcript() {
        let seq = TranscriptSequence::new(vec![TimedToken::pronunciation("♪♪", 0.0, 3.0)]).unwrap();
        let matcher = WindowMatcher::new(&seq, Combined);
        assert_eq!(matcher.best_window("la la", &[2]), None);
    }

    #[test]
    fn window_never_starts_or_ends_on_punctuation() {
        let seq = transcript(&[".", "one", ",", "two", "."]);
        let matcher = WindowMatcher::new(&seq, Combined);
        let w = matcher.best_window("one two", &[2, 3]).unwrap();
        assert!(seq.tokens()[w.start_index].is_pronunciation());
        assert!(seq.tokens()[w.end_index].is_pronunciation());
        assert_eq!((w.start_index, w.end_index), (1, 3));
    }
}
