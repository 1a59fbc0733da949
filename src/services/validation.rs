use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::errors::ValidationError;

static SINGLE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]+$").unwrap());

/// Accept only a single word of ASCII letters, as the lookup form does
pub fn validate_word(input: &str) -> Result<&str, ValidationError> {
    if input.is_empty() {
        return Err(ValidationError::Empty);
    }
    if !SINGLE_WORD.is_match(input) {
        return Err(ValidationError::NotASingleWord);
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_single_words() {
        assert_eq!(validate_word("hello"), Ok("hello"));
        assert_eq!(validate_word("Hello"), Ok("Hello"));
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(validate_word(""), Err(ValidationError::Empty));
    }

    #[test]
    fn test_rejects_everything_else() {
        for input in ["two words", " hello", "hello!", "don't", "café", "42", "-"] {
            assert_eq!(
                validate_word(input),
                Err(ValidationError::NotASingleWord),
                "{:?} should be rejected",
                input
            );
        }
    }
}
