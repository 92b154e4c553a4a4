//! Offline word-weight scorers used by the lexicon providers.

/// Sentiment word weights.
///
/// Keys are lowercase single words. Values in `(0.0, 1.0]` are positive,
/// in `[-1.0, 0.0)` are negative. The final score is clamped to `[-1.0, 1.0]`.
pub(crate) const SENTIMENT_LEXICON: &[(&str, f32)] = &[
    // Positive signals
    ("great", 0.4),
    ("good", 0.3),
    ("excellent", 0.5),
    ("amazing", 0.5),
    ("awesome", 0.5),
    ("happy", 0.4),
    ("glad", 0.3),
    ("love", 0.5),
    ("loved", 0.5),
    ("best", 0.5),
    ("beautiful", 0.4),
    ("wonderful", 0.5),
    ("enjoy", 0.4),
    ("enjoyed", 0.4),
    ("recommend", 0.4),
    ("thanks", 0.3),
    ("helpful", 0.3),
    ("nice", 0.3),
    ("win", 0.4),
    // Negative signals
    ("terrible", -0.6),
    ("awful", -0.6),
    ("horrible", -0.6),
    ("worst", -0.6),
    ("bad", -0.4),
    ("hate", -0.6),
    ("hated", -0.6),
    ("sad", -0.4),
    ("angry", -0.5),
    ("disappointing", -0.5),
    ("disappointed", -0.5),
    ("boring", -0.4),
    ("broken", -0.4),
    ("failed", -0.4),
    ("failure", -0.4),
    ("problem", -0.3),
    ("wrong", -0.3),
    ("ugly", -0.4),
    ("useless", -0.5),
];

/// Abusive word weights. Values are in `(0.0, 1.0]`; the total is clamped
/// to `[0.0, 1.0]`.
pub(crate) const TOXICITY_LEXICON: &[(&str, f32)] = &[
    ("idiot", 0.6),
    ("idiots", 0.6),
    ("stupid", 0.5),
    ("moron", 0.7),
    ("dumb", 0.4),
    ("loser", 0.4),
    ("scum", 0.7),
    ("trash", 0.3),
    ("pathetic", 0.4),
    ("shut", 0.2),
    ("kill", 0.6),
    ("die", 0.5),
    ("damn", 0.3),
    ("crap", 0.3),
    ("disgusting", 0.4),
    ("freak", 0.4),
];

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace().map(|word| {
        word.trim_matches(|c: char| !c.is_alphabetic())
            .to_lowercase()
    })
}

fn weight_of(lexicon: &[(&str, f32)], word: &str) -> Option<f32> {
    lexicon
        .iter()
        .find(|(lex_word, _)| *lex_word == word)
        .map(|&(_, weight)| weight)
}

/// Score a text string using the sentiment lexicon.
///
/// Splits text into lowercase words, sums matching weights, and clamps
/// the result to `[-1.0, 1.0]`. Returns `0.0` for empty or unknown text.
#[must_use]
pub fn lexicon_score(text: &str) -> f32 {
    let score: f32 = words(text)
        .filter_map(|w| weight_of(SENTIMENT_LEXICON, &w))
        .sum();
    score.clamp(-1.0, 1.0)
}

/// Score a text string for abusive language, in `[0.0, 1.0]`.
#[must_use]
pub fn toxicity_score(text: &str) -> f32 {
    let score: f32 = words(text)
        .filter_map(|w| weight_of(TOXICITY_LEXICON, &w))
        .sum();
    score.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_returns_zero() {
        assert_eq!(lexicon_score(""), 0.0);
        assert_eq!(toxicity_score("   "), 0.0);
    }

    #[test]
    fn unknown_text_returns_zero() {
        assert_eq!(lexicon_score("the quick brown fox"), 0.0);
    }

    #[test]
    fn neutral_weather_sentence_is_neutral() {
        assert_eq!(lexicon_score("the weather is fine"), 0.0);
        assert_eq!(toxicity_score("the weather is fine"), 0.0);
    }

    #[test]
    fn negative_keyword_returns_negative() {
        let score = lexicon_score("this is terrible");
        assert!(score < 0.0, "expected negative score, got {score}");
        assert_eq!(toxicity_score("this is terrible"), 0.0);
    }

    #[test]
    fn mixed_text_returns_intermediate() {
        // great (+0.4) + terrible (-0.6) = -0.2
        let score = lexicon_score("great start but a terrible ending");
        assert!((score + 0.2).abs() < 1e-6, "got {score}");
    }

    #[test]
    fn score_clamps_to_bounds() {
        assert_eq!(
            lexicon_score("great excellent best love recommend amazing"),
            1.0
        );
        assert_eq!(lexicon_score("terrible awful horrible worst hate"), -1.0);
        assert_eq!(toxicity_score("you idiot moron scum"), 1.0);
    }

    #[test]
    fn punctuation_stripped_from_words() {
        assert!(lexicon_score("great!") > 0.0);
        assert!(toxicity_score("Idiot!!") > 0.5);
    }
}
