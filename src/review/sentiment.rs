// src/review/sentiment.rs
//
// Small lexicon based polarity scorer. Polarity is the mean polarity of the
// opinion words found in a text, in [-1.0, 1.0]; 0.0 when none are found.
// A negator directly before an opinion word flips and halves it, an
// intensifier scales it.

const LEXICON: &[(&str, f64)] = &[
    ("amazing", 0.6),
    ("authentic", 0.5),
    ("awesome", 1.0),
    ("bad", -0.7),
    ("beautiful", 0.85),
    ("best", 1.0),
    ("bland", -0.5),
    ("boring", -1.0),
    ("charming", 0.5),
    ("cheap", 0.4),
    ("clean", 0.37),
    ("cold", -0.6),
    ("cozy", 0.5),
    ("delicious", 1.0),
    ("dirty", -0.6),
    ("disappointing", -0.6),
    ("excellent", 1.0),
    ("expensive", -0.5),
    ("fantastic", 0.4),
    ("fresh", 0.3),
    ("friendly", 0.375),
    ("good", 0.7),
    ("great", 0.8),
    ("horrible", -1.0),
    ("lovely", 0.5),
    ("mediocre", -0.5),
    ("nice", 0.6),
    ("overpriced", -0.6),
    ("perfect", 1.0),
    ("pleasant", 0.73),
    ("poor", -0.4),
    ("rude", -0.3),
    ("salty", -0.2),
    ("slow", -0.3),
    ("tasty", 0.6),
    ("terrible", -1.0),
    ("wonderful", 1.0),
    ("worst", -1.0),
];

const NEGATORS: &[&str] = &["not", "never", "no", "isn't", "wasn't", "don't", "didn't"];

const INTENSIFIERS: &[(&str, f64)] = &[
    ("very", 1.3),
    ("really", 1.3),
    ("extremely", 1.5),
    ("quite", 1.1),
    ("super", 1.3),
];

fn word_polarity(word: &str) -> Option<f64> {
    LEXICON
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, polarity)| *polarity)
}

fn intensity(word: &str) -> Option<f64> {
    INTENSIFIERS
        .iter()
        .find(|(w, _)| *w == word)
        .map(|(_, factor)| *factor)
}

/// Polarity of `text` in [-1.0, 1.0].
pub fn polarity(text: &str) -> f64 {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .collect();

    let mut total = 0.0;
    let mut found = 0usize;

    for (i, word) in words.iter().enumerate() {
        let Some(mut value) = word_polarity(word) else {
            continue;
        };

        let mut j = i;
        if j > 0 {
            if let Some(factor) = intensity(words[j - 1]) {
                value *= factor;
                j -= 1;
            }
        }
        if j > 0 && NEGATORS.contains(&words[j - 1]) {
            value *= -0.5;
        }

        total += value.clamp(-1.0, 1.0);
        found += 1;
    }

    if found == 0 {
        0.0
    } else {
        total / found as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_text_has_zero_polarity() {
        assert_eq!(polarity("We ordered the set menu and sat by the window."), 0.0);
    }

    #[test]
    fn opinion_words_move_polarity() {
        assert!(polarity("Delicious food, great staff!") > 0.5);
        assert!(polarity("Terrible service and a cold pizza.") < -0.5);
    }

    #[test]
    fn negation_flips_and_softens() {
        let plain = polarity("good");
        let negated = polarity("not good");
        assert!(negated < 0.0);
        assert!(negated.abs() < plain.abs());
    }

    #[test]
    fn intensifier_is_capped() {
        assert_eq!(polarity("extremely perfect"), 1.0);
    }
}
