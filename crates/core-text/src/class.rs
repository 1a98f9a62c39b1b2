//! Character classification shared by word motions and word text objects.

/// Class of a single character for word-boundary decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharClass {
    Whitespace,
    /// Non-blank, non-word characters (`.`, `(`, `-`, ...).
    Punctuation,
    /// Letters, digits and underscore.
    Word,
}

/// `w`/`b`/`e` (word) versus `W`/`B`/`E` (WORD) boundary rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WordKind {
    #[default]
    Word,
    /// Any run of non-whitespace is one WORD.
    BigWord,
}

pub fn is_word_char(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

/// Classify `c`. Under `WordKind::BigWord` punctuation folds into `Word`.
pub fn classify(c: char, kind: WordKind) -> CharClass {
    if c.is_whitespace() {
        CharClass::Whitespace
    } else if kind == WordKind::BigWord || is_word_char(c) {
        CharClass::Word
    } else {
        CharClass::Punctuation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_and_big_word_classes() {
        assert_eq!(classify('a', WordKind::Word), CharClass::Word);
        assert_eq!(classify('_', WordKind::Word), CharClass::Word);
        assert_eq!(classify('9', WordKind::Word), CharClass::Word);
        assert_eq!(classify('é', WordKind::Word), CharClass::Word);
        assert_eq!(classify('.', WordKind::Word), CharClass::Punctuation);
        assert_eq!(classify('.', WordKind::BigWord), CharClass::Word);
        assert_eq!(classify('\t', WordKind::BigWord), CharClass::Whitespace);
    }
}
