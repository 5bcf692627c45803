//! Host-command parser: recognizes EXECIO, HI, TE and TS statements.
//!
//! Accepted forms:
//! ```text
//! EXECIO count|* DISKW ddname [( [FINIS] [STEM name] ]
//! EXECIO count|* DISKR ddname [linenum] [( [FINIS [FIFO|LIFO|SKIP]] [STEM name] ]
//! HI | TE | TS
//! ```
//!
//! Within the option list `FINIS` and `STEM name` may appear in either
//! order. `FIFO`, `LIFO` and `SKIP` are only accepted directly after
//! `FINIS` on DISKR.

use crate::command::{
    Direction, ExecIoOptions, RecordCount, StatementType, MAX_FILENAME_LEN, MAX_STEM_LEN,
};
use crate::lexer::{lex, LexError};
use crate::token::{is_numeric, Keyword, TokenKind};

/// Parser error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error("invalid numeric argument '{token}'")]
    InvalidNumber { token: String },
    #[error("expected {expected}, found {found}")]
    UnexpectedToken { expected: &'static str, found: String },
    #[error("expected {expected} before end of command")]
    UnexpectedEnd { expected: &'static str },
    #[error("{what} longer than {max} characters")]
    NameTooLong { what: &'static str, max: usize },
}

impl ParseError {
    /// Two-way failure signal: `1` for a malformed numeric argument, `2` for
    /// any other syntax error.
    pub fn signal(&self) -> u8 {
        match self {
            ParseError::InvalidNumber { .. } => 1,
            _ => 2,
        }
    }
}

/// Parse a host command into a fresh set of options.
///
/// # Examples
///
/// ```
/// use open_mainframe_hostemu::parser::parse_command;
/// use open_mainframe_hostemu::command::RecordCount;
///
/// let opts = parse_command("EXECIO 2 DISKW OUT1 (STEM MY.").unwrap();
/// assert_eq!(opts.record_count, RecordCount::Exact(2));
/// assert!(opts.is_write);
/// assert_eq!(opts.file_name, "OUT1");
/// assert_eq!(opts.stem_name, "MY.");
/// ```
pub fn parse_command(command: &str) -> Result<ExecIoOptions, ParseError> {
    let tokens = lex(command)?;
    Parser::new(tokens).statement()
}

struct Parser {
    tokens: Vec<TokenKind>,
    pos: usize,
}

impl Parser {
    fn new(tokens: Vec<TokenKind>) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &TokenKind {
        self.tokens.get(self.pos).unwrap_or(&TokenKind::Eof)
    }

    fn advance(&mut self) -> TokenKind {
        let tok = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn at_keyword(&self, kw: Keyword) -> bool {
        self.peek() == &TokenKind::Keyword(kw)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        match self.peek() {
            TokenKind::Eof => ParseError::UnexpectedEnd { expected },
            found => ParseError::UnexpectedToken {
                expected,
                found: found.to_string(),
            },
        }
    }

    fn expect_keyword(&mut self, kw: Keyword, expected: &'static str) -> Result<(), ParseError> {
        if self.at_keyword(kw) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_constant(&mut self, expected: &'static str) -> Result<String, ParseError> {
        if let TokenKind::Constant(text) = self.peek().clone() {
            self.advance();
            Ok(text)
        } else {
            Err(self.unexpected(expected))
        }
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        match self.peek() {
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of command")),
        }
    }

    // stmt := EXECIO count disk_clause | HI | TE | TS
    fn statement(&mut self) -> Result<ExecIoOptions, ParseError> {
        let statement = match self.peek() {
            TokenKind::Keyword(Keyword::Execio) => {
                self.advance();
                return self.execio();
            }
            TokenKind::Keyword(Keyword::Hi) => StatementType::Hi,
            TokenKind::Keyword(Keyword::Te) => StatementType::Te,
            TokenKind::Keyword(Keyword::Ts) => StatementType::Ts,
            _ => return Err(self.unexpected("EXECIO, HI, TE or TS")),
        };
        self.advance();
        self.expect_end()?;
        Ok(ExecIoOptions::simple(statement))
    }

    fn execio(&mut self) -> Result<ExecIoOptions, ParseError> {
        let mut opts = ExecIoOptions::default();
        opts.record_count = match self.peek() {
            TokenKind::Star => {
                self.advance();
                RecordCount::All
            }
            TokenKind::Constant(_) => {
                let text = self.expect_constant("record count")?;
                RecordCount::Exact(parse_number(&text)?)
            }
            _ => return Err(self.unexpected("record count or *")),
        };

        match self.peek() {
            TokenKind::Keyword(Keyword::Diskw) => {
                self.advance();
                opts.is_write = true;
                opts.file_name = self.file_name()?;
                if self.open_options()? {
                    self.diskw_options(&mut opts)?;
                }
            }
            TokenKind::Keyword(Keyword::Diskr) => {
                self.advance();
                opts.is_write = false;
                opts.file_name = self.file_name()?;
                if matches!(self.peek(), TokenKind::Constant(_)) {
                    let text = self.expect_constant("start record")?;
                    let start = parse_number(&text)?;
                    if start == 0 {
                        return Err(ParseError::InvalidNumber { token: text });
                    }
                    opts.start_record = start;
                }
                if self.open_options()? {
                    self.diskr_options(&mut opts)?;
                }
            }
            _ => return Err(self.unexpected("DISKW or DISKR")),
        }

        self.expect_end()?;
        Ok(opts)
    }

    /// Consume an optional `(`; returns whether an option list follows.
    fn open_options(&mut self) -> Result<bool, ParseError> {
        match self.peek() {
            TokenKind::LParen => {
                self.advance();
                Ok(true)
            }
            TokenKind::Eof => Ok(false),
            _ => Err(self.unexpected("( or end of command")),
        }
    }

    // diskw_options := FINIS | STEM c | STEM c FINIS | FINIS STEM c | ε
    fn diskw_options(&mut self, opts: &mut ExecIoOptions) -> Result<(), ParseError> {
        match self.peek() {
            TokenKind::Keyword(Keyword::Finis) => {
                self.advance();
                opts.finis = true;
                if self.at_keyword(Keyword::Stem) {
                    self.stem_clause(opts)?;
                }
            }
            TokenKind::Keyword(Keyword::Stem) => {
                self.stem_clause(opts)?;
                if self.at_keyword(Keyword::Finis) {
                    self.advance();
                    opts.finis = true;
                }
            }
            _ => {}
        }
        Ok(())
    }

    // diskr_options := FINIS [FIFO | LIFO | SKIP] | STEM c | STEM c FINIS
    //                | FINIS STEM c | ε
    fn diskr_options(&mut self, opts: &mut ExecIoOptions) -> Result<(), ParseError> {
        match self.peek() {
            TokenKind::Keyword(Keyword::Finis) => {
                self.advance();
                opts.finis = true;
                match self.peek() {
                    TokenKind::Keyword(Keyword::Fifo) => {
                        self.advance();
                        opts.direction = Direction::Fifo;
                    }
                    TokenKind::Keyword(Keyword::Lifo) => {
                        self.advance();
                        opts.direction = Direction::Lifo;
                    }
                    TokenKind::Keyword(Keyword::Skip) => {
                        self.advance();
                        opts.direction = Direction::Skip;
                    }
                    TokenKind::Keyword(Keyword::Stem) => self.stem_clause(opts)?,
                    _ => {}
                }
            }
            TokenKind::Keyword(Keyword::Stem) => {
                self.stem_clause(opts)?;
                if self.at_keyword(Keyword::Finis) {
                    self.advance();
                    opts.finis = true;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn file_name(&mut self) -> Result<String, ParseError> {
        let name = self.expect_constant("file name")?;
        if name.chars().count() > MAX_FILENAME_LEN {
            return Err(ParseError::NameTooLong {
                what: "file name",
                max: MAX_FILENAME_LEN,
            });
        }
        Ok(name)
    }

    fn stem_clause(&mut self, opts: &mut ExecIoOptions) -> Result<(), ParseError> {
        self.expect_keyword(Keyword::Stem, "STEM")?;
        let name = self.expect_constant("stem name")?;
        if name.chars().count() > MAX_STEM_LEN {
            return Err(ParseError::NameTooLong {
                what: "stem name",
                max: MAX_STEM_LEN,
            });
        }
        opts.stem_name = name;
        Ok(())
    }
}

/// Convert an all-digit constant; anything else is an invalid numeric argument.
fn parse_number(text: &str) -> Result<u64, ParseError> {
    if !is_numeric(text) {
        return Err(ParseError::InvalidNumber {
            token: text.to_string(),
        });
    }
    text.parse().map_err(|_| ParseError::InvalidNumber {
        token: text.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_execio_stem_write() {
        let opts = parse_command("EXECIO 2 DISKW OUT1 (STEM MY.").unwrap();
        assert_eq!(opts.statement, StatementType::Execio);
        assert_eq!(opts.record_count, RecordCount::Exact(2));
        assert!(opts.is_write);
        assert_eq!(opts.file_name, "OUT1");
        assert_eq!(opts.stem_name, "MY.");
        assert!(!opts.finis);
        assert_eq!(opts.start_record, 1);
    }

    #[test]
    fn test_parse_star_count() {
        let opts = parse_command("EXECIO * DISKR IN1").unwrap();
        assert_eq!(opts.record_count, RecordCount::All);
        assert!(!opts.is_write);
        assert!(opts.uses_queue());
    }

    #[test]
    fn test_parse_diskr_start_record() {
        let opts = parse_command("EXECIO 3 DISKR IN1 5 (FINIS").unwrap();
        assert_eq!(opts.start_record, 5);
        assert!(opts.finis);
    }

    #[test]
    fn test_parse_diskw_option_orders() {
        let a = parse_command("EXECIO * DISKW F (STEM S. FINIS").unwrap();
        let b = parse_command("EXECIO * DISKW F (FINIS STEM S.").unwrap();
        assert_eq!(a, b);
        assert!(a.finis);
        assert_eq!(a.stem_name, "S.");
    }

    #[test]
    fn test_parse_diskr_directions() {
        let fifo = parse_command("EXECIO * DISKR F (FINIS FIFO").unwrap();
        assert_eq!(fifo.direction, Direction::Fifo);
        let lifo = parse_command("EXECIO * DISKR F (FINIS LIFO").unwrap();
        assert_eq!(lifo.direction, Direction::Lifo);
        let skip = parse_command("EXECIO 4 DISKR F (FINIS SKIP").unwrap();
        assert_eq!(skip.direction, Direction::Skip);
        assert!(skip.finis);
    }

    #[test]
    fn test_parse_empty_option_list() {
        let opts = parse_command("EXECIO 0 DISKW F (").unwrap();
        assert!(!opts.finis);
        assert!(opts.record_count.is_noop());
    }

    #[test]
    fn test_parse_hi_te_ts() {
        assert_eq!(parse_command("HI").unwrap().statement, StatementType::Hi);
        assert_eq!(parse_command("te").unwrap().statement, StatementType::Te);
        assert_eq!(parse_command(" TS ").unwrap().statement, StatementType::Ts);
    }

    #[test]
    fn test_parse_hi_with_trailing_token_fails() {
        let err = parse_command("HI NOW").unwrap_err();
        assert_eq!(err.signal(), 2);
    }

    #[test]
    fn test_parse_bad_count_signals_one() {
        let err = parse_command("EXECIO ABC DISKW F").unwrap_err();
        assert_eq!(err, ParseError::InvalidNumber { token: "ABC".into() });
        assert_eq!(err.signal(), 1);
    }

    #[test]
    fn test_parse_bad_start_record_signals_one() {
        let err = parse_command("EXECIO 1 DISKR F X1").unwrap_err();
        assert_eq!(err.signal(), 1);
        let err = parse_command("EXECIO 1 DISKR F 0").unwrap_err();
        assert_eq!(err.signal(), 1);
    }

    #[test]
    fn test_parse_bad_keyword_signals_two() {
        let err = parse_command("EXECIO 1 DISKX F").unwrap_err();
        assert_eq!(err.signal(), 2);
        let err = parse_command("COPY A B").unwrap_err();
        assert_eq!(err.signal(), 2);
    }

    #[test]
    fn test_parse_direction_without_finis_rejected() {
        assert!(parse_command("EXECIO * DISKR F (LIFO").is_err());
        assert!(parse_command("EXECIO * DISKW F (FINIS LIFO").is_err());
    }

    #[test]
    fn test_parse_start_record_on_diskw_rejected() {
        assert!(parse_command("EXECIO 1 DISKW F 3").is_err());
    }

    #[test]
    fn test_parse_missing_pieces() {
        assert_eq!(
            parse_command("EXECIO 1 DISKW").unwrap_err(),
            ParseError::UnexpectedEnd { expected: "file name" }
        );
        assert!(matches!(
            parse_command("EXECIO").unwrap_err(),
            ParseError::UnexpectedEnd { .. }
        ));
        assert!(parse_command("").is_err());
        assert!(parse_command("EXECIO 1 DISKW F (STEM").is_err());
    }

    #[test]
    fn test_parse_stem_name_too_long() {
        let cmd = format!("EXECIO * DISKW F (STEM {}", "S".repeat(MAX_STEM_LEN + 1));
        assert!(matches!(
            parse_command(&cmd),
            Err(ParseError::NameTooLong { .. })
        ));
    }

    #[test]
    fn test_parse_file_name_length_limit() {
        let name = "F".repeat(MAX_FILENAME_LEN);
        let opts = parse_command(&format!("EXECIO 1 DISKR {name}")).unwrap();
        assert_eq!(opts.file_name, name);

        let cmd = format!("EXECIO 1 DISKW {}", "F".repeat(MAX_FILENAME_LEN + 1));
        let err = parse_command(&cmd).unwrap_err();
        assert_eq!(err.signal(), 2);
    }

    #[test]
    fn test_parse_count_overflow_is_invalid_number() {
        let err = parse_command("EXECIO 99999999999999999999999 DISKW F").unwrap_err();
        assert_eq!(err.signal(), 1);
    }

    #[test]
    fn test_parse_lex_error_propagates() {
        let err = parse_command("EXECIO 1 DISKR \"open").unwrap_err();
        assert!(matches!(err, ParseError::Lex(_)));
        assert_eq!(err.signal(), 2);
    }
}
