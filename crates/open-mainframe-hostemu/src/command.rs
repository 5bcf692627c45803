//! Recognized host-command statements and EXECIO options.

/// Longest file name accepted by EXECIO.
pub const MAX_FILENAME_LEN: usize = 1023;

/// Longest stem name accepted by EXECIO.
pub const MAX_STEM_LEN: usize = 250;

/// Which host command was recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementType {
    /// `EXECIO` record transfer.
    Execio,
    /// `HI`: halt interpretation.
    Hi,
    /// `TE`: trace end.
    Te,
    /// `TS`: trace start.
    Ts,
}

/// How many records an EXECIO transfer moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordCount {
    /// `*`: every remaining record.
    All,
    /// An exact count; `0` makes the transfer a no-op.
    Exact(u64),
}

impl RecordCount {
    /// A zero count short-circuits every transfer routine.
    pub fn is_noop(self) -> bool {
        self == RecordCount::Exact(0)
    }
}

/// Where records read by DISKR go on the external queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Queue at the tail (QUEUE).
    #[default]
    Fifo,
    /// Push at the head (PUSH).
    Lifo,
    /// Read and discard.
    Skip,
}

/// Options collected while a command is parsed.
///
/// A fresh value is built for every dispatch; `start_record` doubles as the
/// cursor while stem transfers run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecIoOptions {
    pub statement: StatementType,
    pub record_count: RecordCount,
    /// `true` for DISKW, `false` for DISKR.
    pub is_write: bool,
    pub file_name: String,
    /// Empty means the external queue is the source or target.
    pub stem_name: String,
    pub finis: bool,
    /// First record to act on (1-based).
    pub start_record: u64,
    pub direction: Direction,
}

impl Default for ExecIoOptions {
    fn default() -> Self {
        Self {
            statement: StatementType::Execio,
            record_count: RecordCount::Exact(0),
            is_write: false,
            file_name: String::new(),
            stem_name: String::new(),
            finis: false,
            start_record: 1,
            direction: Direction::Fifo,
        }
    }
}

impl ExecIoOptions {
    /// Options for one of the argument-less statements (HI, TE, TS).
    pub fn simple(statement: StatementType) -> Self {
        Self {
            statement,
            ..Self::default()
        }
    }

    /// True when the transfer targets the external queue rather than a stem.
    pub fn uses_queue(&self) -> bool {
        self.stem_name.is_empty()
    }

    /// Compound variable name for element `index` of the stem.
    pub fn stem_var(&self, index: u64) -> String {
        format!("{}{index}", self.stem_name)
    }
}
