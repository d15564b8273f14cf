use zeroize::Zeroizing;

/// Secure seed phrase wrapper
///
/// Holds a normalized (lowercase, single-spaced) phrase that is wiped on drop.
pub struct SecureSeedPhrase {
    phrase: Zeroizing<String>,
}

impl SecureSeedPhrase {
    /// Create a new secure seed phrase from already validated words
    pub fn from_words(words: &[String]) -> Self {
        Self {
            phrase: Zeroizing::new(words.join(" ")),
        }
    }

    pub fn new(phrase: &str) -> Self {
        let words: Zeroizing<Vec<String>> =
            Zeroizing::new(phrase.split_whitespace().map(str::to_lowercase).collect());
        Self::from_words(&words)
    }

    /// Get the seed phrase as a &str
    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    /// Get the seed phrase as `Vec<&str>`, in order
    pub fn as_words(&self) -> Vec<&str> {
        self.phrase.split(' ').collect()
    }

    pub fn word_count(&self) -> usize {
        self.phrase.split(' ').count()
    }
}

impl std::fmt::Debug for SecureSeedPhrase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecureSeedPhrase(<{} words redacted>)", self.word_count())
    }
}
