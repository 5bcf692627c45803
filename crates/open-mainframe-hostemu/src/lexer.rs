//! Host-command lexer: splits an EXECIO/HI/TE/TS command line into tokens.
//!
//! Lexical rules:
//! - Blanks and tabs separate tokens and are otherwise ignored.
//! - `*` and `(` are single-character tokens.
//! - `"..."` is a quoted constant; `""` inside it stands for one `"`.
//! - Anything else runs to the next blank and is either a keyword
//!   (case-insensitive) or a constant kept exactly as written.

use crate::token::{Keyword, TokenKind};

/// Longest token the lexer will accept, in characters.
pub const MAX_TOKEN_LEN: usize = 1023;

/// Maximum number of tokens extracted from one command.
pub const SYMTABLESIZE: usize = 64;

/// Lexer error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated quoted string starting at column {col}")]
    UnterminatedString { col: usize },
    #[error("token at column {col} is too long")]
    TokenTooLong { col: usize },
    #[error("too many tokens in command")]
    TooManyTokens,
}

/// Tokenize a host command. The returned vector always ends with
/// [`TokenKind::Eof`].
pub fn lex(command: &str) -> Result<Vec<TokenKind>, LexError> {
    let mut lexer = Lexer::new(command);
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        if tok == TokenKind::Eof {
            tokens.push(tok);
            return Ok(tokens);
        }
        if tokens.len() == SYMTABLESIZE {
            return Err(LexError::TooManyTokens);
        }
        tokens.push(tok);
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
}

impl Lexer {
    fn new(command: &str) -> Self {
        // A NUL terminates the command, as it would in an RXSTRING.
        let text = command.split('\0').next().unwrap_or_default();
        Self {
            chars: text.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_blanks(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }
    }

    fn next_token(&mut self) -> Result<TokenKind, LexError> {
        self.skip_blanks();
        let Some(c) = self.peek() else {
            return Ok(TokenKind::Eof);
        };
        match c {
            '*' => {
                self.pos += 1;
                Ok(TokenKind::Star)
            }
            '(' => {
                self.pos += 1;
                Ok(TokenKind::LParen)
            }
            '"' => self.lex_quoted(),
            _ => self.lex_word(),
        }
    }

    fn lex_quoted(&mut self) -> Result<TokenKind, LexError> {
        let col = self.pos + 1;
        self.pos += 1; // opening quote
        let mut text = String::new();
        loop {
            match self.peek() {
                None => return Err(LexError::UnterminatedString { col }),
                Some('"') => {
                    if self.chars.get(self.pos + 1) == Some(&'"') {
                        text.push('"');
                        self.pos += 2;
                    } else {
                        self.pos += 1;
                        break;
                    }
                }
                Some(c) => {
                    text.push(c);
                    self.pos += 1;
                }
            }
            if text.chars().count() > MAX_TOKEN_LEN {
                return Err(LexError::TokenTooLong { col });
            }
        }
        Ok(TokenKind::Constant(text))
    }

    fn lex_word(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' {
                break;
            }
            self.pos += 1;
        }
        if self.pos - start > MAX_TOKEN_LEN {
            return Err(LexError::TokenTooLong { col: start + 1 });
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        Ok(match Keyword::lookup(&word) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Constant(word),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(s: &str) -> TokenKind {
        TokenKind::Constant(s.to_string())
    }

    #[test]
    fn test_lex_execio_write() {
        let tokens = lex("EXECIO 2 DISKW OUT1 (STEM MY.").unwrap();
        assert_eq!(
            tokens,
            vec![
                TokenKind::Keyword(Keyword::Execio),
                constant("2"),
                TokenKind::Keyword(Keyword::Diskw),
                constant("OUT1"),
                TokenKind::LParen,
                TokenKind::Keyword(Keyword::Stem),
                constant("MY."),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_lex_keywords_any_case_constants_keep_case() {
        let tokens = lex("execio * diskr data.txt (finis").unwrap();
        assert_eq!(tokens[0], TokenKind::Keyword(Keyword::Execio));
        assert_eq!(tokens[1], TokenKind::Star);
        assert_eq!(tokens[3], constant("data.txt"));
        assert_eq!(tokens[5], TokenKind::Keyword(Keyword::Finis));
    }

    #[test]
    fn test_lex_tabs_and_extra_blanks() {
        let tokens = lex("  HI\t ").unwrap();
        assert_eq!(tokens, vec![TokenKind::Keyword(Keyword::Hi), TokenKind::Eof]);
    }

    #[test]
    fn test_lex_quoted_filename() {
        let tokens = lex(r#"EXECIO 1 DISKR "my file.txt""#).unwrap();
        assert_eq!(tokens[3], constant("my file.txt"));
    }

    #[test]
    fn test_lex_quoted_doubled_quote() {
        let tokens = lex(r#""a""b""#).unwrap();
        assert_eq!(tokens[0], constant("a\"b"));
    }

    #[test]
    fn test_lex_quoted_keyword_is_constant() {
        let tokens = lex(r#""FINIS""#).unwrap();
        assert_eq!(tokens[0], constant("FINIS"));
    }

    #[test]
    fn test_lex_unterminated_quote() {
        let err = lex(r#"EXECIO 1 DISKR "oops"#).unwrap_err();
        assert_eq!(err, LexError::UnterminatedString { col: 16 });
    }

    #[test]
    fn test_lex_token_too_long() {
        let long = "X".repeat(MAX_TOKEN_LEN + 1);
        assert!(matches!(lex(&long), Err(LexError::TokenTooLong { .. })));
        let ok = "X".repeat(MAX_TOKEN_LEN);
        assert_eq!(lex(&ok).unwrap()[0], constant(&ok));
    }

    #[test]
    fn test_lex_too_many_tokens() {
        let cmd = vec!["A"; SYMTABLESIZE + 1].join(" ");
        assert_eq!(lex(&cmd), Err(LexError::TooManyTokens));
        let cmd = vec!["A"; SYMTABLESIZE].join(" ");
        assert_eq!(lex(&cmd).unwrap().len(), SYMTABLESIZE + 1);
    }

    #[test]
    fn test_lex_nul_terminates() {
        let tokens = lex("TS\0 garbage").unwrap();
        assert_eq!(tokens, vec![TokenKind::Keyword(Keyword::Ts), TokenKind::Eof]);
    }

    #[test]
    fn test_lex_star_and_paren_split_words() {
        let tokens = lex("*(FINIS").unwrap();
        assert_eq!(
            tokens,
            vec![
                TokenKind::Star,
                TokenKind::LParen,
                TokenKind::Keyword(Keyword::Finis),
                TokenKind::Eof
            ]
        );
    }
}
