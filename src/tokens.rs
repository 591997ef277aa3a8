//! Token counting backed by tiktoken BPE encodings.

use anyhow::Result;
use once_cell::sync::OnceCell;
use tiktoken_rs::CoreBPE;

/// Counts tokens with one BPE encoding
pub struct TokenCounter {
    bpe: CoreBPE,
}

impl TokenCounter {
    /// Counter using the cl100k_base encoding.
    pub fn new() -> Result<Self> {
        Ok(Self {
            bpe: tiktoken_rs::cl100k_base()?,
        })
    }

    /// Counter using the encoding tiktoken associates with `model`.
    pub fn for_model(model: &str) -> Result<Self> {
        Ok(Self {
            bpe: tiktoken_rs::get_bpe_from_model(model)?,
        })
    }

    /// Number of tokens in `text`
    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter").finish_non_exhaustive()
    }
}

static SHARED: OnceCell<TokenCounter> = OnceCell::new();

/// Count tokens with a process-wide cl100k_base counter, built on first use.
pub fn count_tokens(text: &str) -> Result<usize> {
    let counter = SHARED.get_or_try_init(TokenCounter::new)?;
    Ok(counter.count(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_known_strings() {
        let counter = TokenCounter::new().unwrap();
        assert_eq!(counter.count(""), 0);
        assert_eq!(counter.count("hello world"), 2);
    }

    #[test]
    fn test_shared_counter_matches_instance() {
        let counter = TokenCounter::new().unwrap();
        let text = "What is the capital of the United States?";
        assert_eq!(count_tokens(text).unwrap(), counter.count(text));
        assert!(count_tokens(text).unwrap() > 0);
    }

    #[test]
    fn test_for_model() {
        let counter = TokenCounter::for_model("gpt-4").unwrap();
        assert_eq!(counter.count("hello world"), 2);
        assert!(TokenCounter::for_model("definitely-not-a-model").is_err());
    }
}
