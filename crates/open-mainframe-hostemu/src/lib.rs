//! EXECIO host-command emulation for REXX execs.
//!
//! This crate implements the host-command environment that REXX execs
//! address for record I/O, providing:
//!
//! - **Lexer/Parser**: recognizes `EXECIO`, `HI`, `TE` and `TS` command text
//! - **Open-file registry**: one handle per file name, kept open until FINIS
//! - **Transfer engine**: DISKW/DISKR between files and stems or the data queue
//! - **Dispatcher**: serialized entry point returning the EXECIO return code
//!
//! The interpreter side (variable pool, external queue, halt/trace switches)
//! is supplied by the caller through [`HostServices`].
//!
//! ```
//! use open_mainframe_hostemu::{HostEmuConfig, HostEmulator, MemoryServices};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let host = HostEmulator::new(HostEmuConfig {
//!     base_dir: Some(dir.path().to_path_buf()),
//!     ..HostEmuConfig::default()
//! });
//! let mut svc = MemoryServices::new();
//! svc.set_stem("MY.", &["a", "b", "c"]);
//!
//! let result = host.execute("EXECIO 2 DISKW OUT1 (STEM MY. FINIS", &mut svc);
//! assert_eq!(result.rc, 0);
//! assert_eq!(std::fs::read_to_string(dir.path().join("OUT1")).unwrap(), "a\nb\n");
//! ```

pub mod command;
pub mod config;
pub mod error;
pub mod host;
pub mod lexer;
pub mod parser;
pub mod registry;
pub mod services;
pub mod token;
pub mod transfer;

pub use command::{Direction, ExecIoOptions, RecordCount, StatementType};
pub use config::{HostEmuConfig, OpenPolicy};
pub use error::{HostEmuError, Result, SubcomFlag};
pub use host::{HostEmulator, HostResult};
pub use parser::{parse_command, ParseError};
pub use registry::{OpenFile, OpenFileRegistry};
pub use services::{
    ExternalQueue, HostServices, InterpreterControl, MemoryServices, QueueOrder, ServiceError,
    VariablePool,
};
