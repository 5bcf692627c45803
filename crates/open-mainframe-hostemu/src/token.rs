//! Host-command token types.

/// Keywords recognized by the host-command lexer.
///
/// Matching is case-insensitive; anything else becomes a [`TokenKind::Constant`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// `HI`: halt interpretation.
    Hi,
    /// `TE`: trace end.
    Te,
    /// `TS`: trace start.
    Ts,
    /// `EXECIO`
    Execio,
    /// `DISKW`: write records.
    Diskw,
    /// `DISKR`: read records.
    Diskr,
    /// `STEM`
    Stem,
    /// `FINIS`: close the file after the transfer.
    Finis,
    /// `FIFO`
    Fifo,
    /// `LIFO`
    Lifo,
    /// `SKIP`
    Skip,
}

/// Fixed keyword table, searched linearly.
const KEYWORDS: &[(&str, Keyword)] = &[
    ("HI", Keyword::Hi),
    ("TE", Keyword::Te),
    ("TS", Keyword::Ts),
    ("EXECIO", Keyword::Execio),
    ("DISKW", Keyword::Diskw),
    ("DISKR", Keyword::Diskr),
    ("STEM", Keyword::Stem),
    ("FINIS", Keyword::Finis),
    ("FIFO", Keyword::Fifo),
    ("LIFO", Keyword::Lifo),
    ("SKIP", Keyword::Skip),
];

impl Keyword {
    /// Look up an identifier (any case) in the keyword table.
    pub fn lookup(ident: &str) -> Option<Keyword> {
        KEYWORDS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(ident))
            .map(|(_, kw)| *kw)
    }

    /// Canonical upper-case spelling.
    pub fn as_str(self) -> &'static str {
        KEYWORDS
            .iter()
            .find(|(_, kw)| *kw == self)
            .map(|(name, _)| *name)
            .unwrap_or("?")
    }
}

/// A host-command token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A recognized keyword.
    Keyword(Keyword),
    /// Any other identifier, number, or quoted string. Literal text is kept
    /// as written (quotes removed).
    Constant(String),
    /// `*`: all remaining records.
    Star,
    /// `(`: start of the option list.
    LParen,
    /// End of the command text.
    Eof,
}

impl TokenKind {
    /// True when this is a constant made entirely of ASCII digits.
    pub fn is_numeric(&self) -> bool {
        matches!(self, TokenKind::Constant(text) if is_numeric(text))
    }
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenKind::Keyword(kw) => write!(f, "{}", kw.as_str()),
            TokenKind::Constant(text) => write!(f, "'{text}'"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::LParen => write!(f, "("),
            TokenKind::Eof => write!(f, "end of command"),
        }
    }
}

/// True when `text` is non-empty and every character is an ASCII digit.
pub fn is_numeric(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_lookup_case_insensitive() {
        assert_eq!(Keyword::lookup("execio"), Some(Keyword::Execio));
        assert_eq!(Keyword::lookup("DiskR"), Some(Keyword::Diskr));
        assert_eq!(Keyword::lookup("finis"), Some(Keyword::Finis));
        assert_eq!(Keyword::lookup("OUTFILE"), None);
    }

    #[test]
    fn test_keyword_round_trip_spelling() {
        for (name, kw) in KEYWORDS {
            assert_eq!(kw.as_str(), *name);
        }
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric("0"));
        assert!(is_numeric("0042"));
        assert!(!is_numeric(""));
        assert!(!is_numeric("12a"));
        assert!(!is_numeric("-1"));
        assert!(TokenKind::Constant("7".into()).is_numeric());
        assert!(!TokenKind::Star.is_numeric());
    }
}
