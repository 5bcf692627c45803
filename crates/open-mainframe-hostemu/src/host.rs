//! Host-command dispatcher: the subcommand handler behind `ADDRESS` for
//! EXECIO, HI, TE and TS.
//!
//! One process-wide lock serializes every dispatch: parsing, registry
//! lookup, the transfer itself and the FINIS close all run while it is held.
//! Options are rebuilt for every call, so nothing but the open-file registry
//! survives between commands.

use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::command::{ExecIoOptions, StatementType};
use crate::config::HostEmuConfig;
use crate::error::{Result, SubcomFlag, RC_OK};
use crate::parser::parse_command;
use crate::registry::OpenFileRegistry;
use crate::services::HostServices;
use crate::transfer::transfer;

static GLOBAL: LazyLock<HostEmulator> =
    LazyLock::new(|| HostEmulator::new(HostEmuConfig::default()));

/// Completion of one host command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostResult {
    pub flag: SubcomFlag,
    pub rc: u32,
}

impl HostResult {
    /// Decimal return code, as placed in the interpreter's return buffer.
    pub fn rc_string(&self) -> String {
        self.rc.to_string()
    }
}

/// State shared by every dispatch.
#[derive(Debug)]
struct HostSession {
    config: HostEmuConfig,
    registry: OpenFileRegistry,
}

/// EXECIO host-command environment.
#[derive(Debug)]
pub struct HostEmulator {
    session: Mutex<HostSession>,
}

impl Default for HostEmulator {
    fn default() -> Self {
        Self::new(HostEmuConfig::default())
    }
}

impl HostEmulator {
    pub fn new(config: HostEmuConfig) -> Self {
        Self {
            session: Mutex::new(HostSession {
                config,
                registry: OpenFileRegistry::new(),
            }),
        }
    }

    /// The process-wide emulator, created on first use with the default
    /// configuration.
    pub fn global() -> &'static HostEmulator {
        &GLOBAL
    }

    fn lock(&self) -> MutexGuard<'_, HostSession> {
        // A panic in another dispatch leaves the registry usable.
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Execute one host command against the caller's interpreter services.
    ///
    /// # Examples
    ///
    /// ```
    /// use open_mainframe_hostemu::{HostEmulator, MemoryServices, SubcomFlag};
    ///
    /// let host = HostEmulator::default();
    /// let mut svc = MemoryServices::new();
    /// let result = host.execute("TS", &mut svc);
    /// assert_eq!(result.flag, SubcomFlag::Ok);
    /// assert_eq!(result.rc_string(), "0");
    /// assert!(svc.tracing);
    /// ```
    pub fn execute<S: HostServices + ?Sized>(&self, command: &str, services: &mut S) -> HostResult {
        let mut session = self.lock();
        let result = match session.dispatch(command, services) {
            Ok(rc) => HostResult {
                flag: SubcomFlag::Ok,
                rc,
            },
            Err(e) => {
                warn!(command, error = %e, "host command failed");
                HostResult {
                    flag: e.flag(),
                    rc: e.rc(),
                }
            }
        };
        debug!(command, rc = result.rc, flag = ?result.flag, "host command complete");
        result
    }

    /// Names of the files currently held open, sorted.
    pub fn open_files(&self) -> Vec<String> {
        self.lock().registry.names()
    }

    /// Flush and close every open file; returns how many were open.
    pub fn close_all(&self) -> usize {
        self.lock().registry.close_all()
    }
}

impl HostSession {
    fn dispatch<S: HostServices + ?Sized>(&mut self, command: &str, services: &mut S) -> Result<u32> {
        let mut opts = parse_command(command)?;
        match opts.statement {
            StatementType::Hi => services.set_halt(),
            StatementType::Te => services.set_trace(false),
            StatementType::Ts => services.set_trace(true),
            StatementType::Execio => return self.execio(&mut opts, services),
        }
        Ok(RC_OK)
    }

    fn execio<S: HostServices + ?Sized>(
        &mut self,
        opts: &mut ExecIoOptions,
        services: &mut S,
    ) -> Result<u32> {
        let strip = self.config.strip_carriage_return;
        let file = self
            .registry
            .open_or_get(&opts.file_name, opts.is_write, &self.config)?;
        let outcome = transfer(opts, file, services, strip);
        if !opts.finis {
            return outcome;
        }
        // FINIS closes the file whether or not the transfer succeeded.
        let closed = self.registry.close(&opts.file_name);
        let rc = outcome?;
        closed?;
        Ok(rc)
    }
}
