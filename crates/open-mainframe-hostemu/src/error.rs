//! Host-emulation error types and the EXECIO return-code vocabulary.

use thiserror::Error;

use crate::parser::ParseError;

/// EXECIO finished correctly.
pub const RC_OK: u32 = 0;
/// End of file reached before the requested record count was satisfied.
pub const RC_EOF: u32 = 2;
/// Bad parameter list: malformed statement or unopenable file.
pub const RC_BAD_PLIST: u32 = 24;
/// Insufficient storage.
pub const RC_NO_STORAGE: u32 = 41;
/// Invalid stem or variable name.
pub const RC_VAR_INVALID: u32 = 2008;
/// Fallback for I/O errors that carry no OS error number.
pub const RC_IO_FAILURE: u32 = 20;

/// Subcommand completion flag reported back to the interpreter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubcomFlag {
    /// Command completed (possibly with RC 2).
    Ok,
    /// The command text itself was malformed.
    Error,
    /// The command was attempted but failed.
    Failure,
}

/// Host-emulation error type.
#[derive(Debug, Error, miette::Diagnostic)]
pub enum HostEmuError {
    /// The command text could not be parsed.
    #[error("invalid host command: {0}")]
    #[diagnostic(code(hostemu::parse))]
    Parse(#[from] ParseError),

    /// No open mode could be satisfied for the file.
    #[error("unable to open {name}: {source}")]
    #[diagnostic(code(hostemu::open))]
    Open {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// A stem or variable could not be fetched or set.
    #[error("variable {name} is invalid: {reason}")]
    #[diagnostic(code(hostemu::variable))]
    VarInvalid { name: String, reason: String },

    /// Allocation failed while moving records.
    #[error("insufficient storage")]
    #[diagnostic(code(hostemu::storage))]
    InsufficientStorage,

    /// Read or write failed on an open file.
    #[error("I/O error on {name}: {source}")]
    #[diagnostic(code(hostemu::io))]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

impl HostEmuError {
    /// Wrap an I/O error raised while transferring records for `name`.
    pub(crate) fn io(name: &str, source: std::io::Error) -> Self {
        if source.kind() == std::io::ErrorKind::OutOfMemory {
            return HostEmuError::InsufficientStorage;
        }
        HostEmuError::Io {
            name: name.to_string(),
            source,
        }
    }

    pub(crate) fn var_invalid(name: &str, reason: impl Into<String>) -> Self {
        HostEmuError::VarInvalid {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    /// Numeric return code reported to the calling exec.
    pub fn rc(&self) -> u32 {
        match self {
            HostEmuError::Parse(_) | HostEmuError::Open { .. } => RC_BAD_PLIST,
            HostEmuError::VarInvalid { .. } => RC_VAR_INVALID,
            HostEmuError::InsufficientStorage => RC_NO_STORAGE,
            HostEmuError::Io { source, .. } => source
                .raw_os_error()
                .and_then(|code| u32::try_from(code).ok())
                .unwrap_or(RC_IO_FAILURE),
        }
    }

    /// Subcommand flag: malformed requests are errors, everything else a failure.
    pub fn flag(&self) -> SubcomFlag {
        match self {
            HostEmuError::Parse(_) => SubcomFlag::Error,
            _ => SubcomFlag::Failure,
        }
    }
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, HostEmuError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_is_bad_plist() {
        let err = HostEmuError::from(ParseError::UnexpectedEnd { expected: "file name" });
        assert_eq!(err.rc(), RC_BAD_PLIST);
        assert_eq!(err.flag(), SubcomFlag::Error);
    }

    #[test]
    fn test_open_failure_is_bad_plist_failure() {
        let err = HostEmuError::Open {
            name: "OUT1".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.rc(), 24);
        assert_eq!(err.flag(), SubcomFlag::Failure);
    }

    #[test]
    fn test_var_invalid_rc() {
        let err = HostEmuError::var_invalid("MY.1", "not set");
        assert_eq!(err.rc(), 2008);
        assert!(err.to_string().contains("MY.1"));
    }

    #[test]
    fn test_out_of_memory_maps_to_storage() {
        let err = HostEmuError::io("F", std::io::Error::from(std::io::ErrorKind::OutOfMemory));
        assert_eq!(err.rc(), RC_NO_STORAGE);
    }

    #[test]
    fn test_io_error_uses_os_code() {
        let err = HostEmuError::io("F", std::io::Error::from_raw_os_error(28));
        assert_eq!(err.rc(), 28);
        let err = HostEmuError::io("F", std::io::Error::other("boom"));
        assert_eq!(err.rc(), RC_IO_FAILURE);
    }
}
