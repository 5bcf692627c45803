//! Interpreter services consumed by the host emulator: variable pool,
//! external data queue, and halt/trace control.
//!
//! The emulator never owns interpreter state. Every call receives the
//! services of the calling exec, so the same emulator can serve any number
//! of interpreters. [`MemoryServices`] is a self-contained implementation for
//! tests and the batch runner.

use std::collections::{BTreeMap, VecDeque};

/// Failure reported by a variable-pool operation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// The name is not a valid variable symbol.
    #[error("invalid variable name '{0}'")]
    InvalidName(String),
    /// The pool refused the request.
    #[error("variable pool request failed: {0}")]
    Failed(String),
}

/// Queue position for a pushed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueOrder {
    /// Tail of the queue (REXX `QUEUE`).
    Fifo,
    /// Head of the queue (REXX `PUSH`).
    Lifo,
}

/// Access to the calling exec's variables.
pub trait VariablePool {
    /// Fetch a variable. `Ok(None)` means the variable has never been set.
    fn fetch(&mut self, name: &str) -> Result<Option<String>, ServiceError>;

    /// Assign a variable.
    fn set(&mut self, name: &str, value: &str) -> Result<(), ServiceError>;
}

/// The session's external data queue.
pub trait ExternalQueue {
    /// Number of lines currently queued.
    fn depth(&self) -> usize;

    /// Add a line at the tail (FIFO) or head (LIFO).
    fn push(&mut self, line: &str, order: QueueOrder) -> Result<(), ServiceError>;

    /// Remove the line at the head; `None` when the queue is empty.
    fn pull(&mut self) -> Option<String>;
}

/// Interpreter halt/trace switches toggled by HI, TE and TS.
pub trait InterpreterControl {
    /// Request that the exec halts (HI).
    fn set_halt(&mut self);

    /// Turn interactive trace on (TS) or off (TE).
    fn set_trace(&mut self, on: bool);
}

/// Everything a host command may touch.
pub trait HostServices: VariablePool + ExternalQueue + InterpreterControl {}

impl<T: VariablePool + ExternalQueue + InterpreterControl + ?Sized> HostServices for T {}

/// In-memory services: a flat variable pool, a queue, and two flags.
///
/// Variable names are upper-cased on the way in, as a REXX variable pool
/// does for symbolic access.
#[derive(Debug, Clone, Default)]
pub struct MemoryServices {
    vars: BTreeMap<String, String>,
    queue: VecDeque<String>,
    /// Set by HI.
    pub halted: bool,
    /// Set by TS, cleared by TE.
    pub tracing: bool,
}

impl MemoryServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a variable directly (test setup).
    pub fn set_var(&mut self, name: &str, value: impl Into<String>) {
        self.vars.insert(name.to_ascii_uppercase(), value.into());
    }

    /// Read a variable directly.
    pub fn var(&self, name: &str) -> Option<&str> {
        self.vars.get(&name.to_ascii_uppercase()).map(|s| s.as_str())
    }

    /// Populate `stem.0 .. stem.n` from a list of values.
    pub fn set_stem<S: AsRef<str>>(&mut self, stem: &str, values: &[S]) {
        self.set_var(&format!("{stem}0"), values.len().to_string());
        for (i, v) in values.iter().enumerate() {
            self.set_var(&format!("{stem}{}", i + 1), v.as_ref());
        }
    }

    /// Collect `stem.1 .. stem.<stem.0>`; missing elements end the list.
    pub fn stem_values(&self, stem: &str) -> Vec<String> {
        let count: usize = self
            .var(&format!("{stem}0"))
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0);
        (1..=count)
            .map_while(|i| self.var(&format!("{stem}{i}")).map(str::to_string))
            .collect()
    }

    /// All variables, sorted by name.
    pub fn variables(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Queue `line` at the tail (test setup).
    pub fn queue_line(&mut self, line: impl Into<String>) {
        self.queue.push_back(line.into());
    }

    /// Current queue contents, head first.
    pub fn queued(&self) -> Vec<String> {
        self.queue.iter().cloned().collect()
    }
}

fn check_name(name: &str) -> Result<String, ServiceError> {
    if name.is_empty() || name.chars().any(|c| c.is_whitespace()) {
        return Err(ServiceError::InvalidName(name.to_string()));
    }
    Ok(name.to_ascii_uppercase())
}

impl VariablePool for MemoryServices {
    fn fetch(&mut self, name: &str) -> Result<Option<String>, ServiceError> {
        let key = check_name(name)?;
        Ok(self.vars.get(&key).cloned())
    }

    fn set(&mut self, name: &str, value: &str) -> Result<(), ServiceError> {
        let key = check_name(name)?;
        self.vars.insert(key, value.to_string());
        Ok(())
    }
}

impl ExternalQueue for MemoryServices {
    fn depth(&self) -> usize {
        self.queue.len()
    }

    fn push(&mut self, line: &str, order: QueueOrder) -> Result<(), ServiceError> {
        match order {
            QueueOrder::Fifo => self.queue.push_back(line.to_string()),
            QueueOrder::Lifo => self.queue.push_front(line.to_string()),
        }
        Ok(())
    }

    fn pull(&mut self) -> Option<String> {
        self.queue.pop_front()
    }
}

impl InterpreterControl for MemoryServices {
    fn set_halt(&mut self) {
        self.halted = true;
    }

    fn set_trace(&mut self, on: bool) {
        self.tracing = on;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_set_case_insensitive() {
        let mut svc = MemoryServices::new();
        svc.set("my.1", "a").unwrap();
        assert_eq!(svc.fetch("MY.1").unwrap(), Some("a".to_string()));
        assert_eq!(svc.fetch("MY.2").unwrap(), None);
    }

    #[test]
    fn test_invalid_names_rejected() {
        let mut svc = MemoryServices::new();
        assert!(matches!(svc.fetch(""), Err(ServiceError::InvalidName(_))));
        assert!(svc.set("A B", "x").is_err());
    }

    #[test]
    fn test_queue_fifo_lifo() {
        let mut svc = MemoryServices::new();
        svc.push("one", QueueOrder::Fifo).unwrap();
        svc.push("two", QueueOrder::Fifo).unwrap();
        svc.push("zero", QueueOrder::Lifo).unwrap();
        assert_eq!(svc.depth(), 3);
        assert_eq!(svc.pull().as_deref(), Some("zero"));
        assert_eq!(svc.pull().as_deref(), Some("one"));
        assert_eq!(svc.pull().as_deref(), Some("two"));
        assert_eq!(svc.pull(), None);
    }

    #[test]
    fn test_stem_helpers() {
        let mut svc = MemoryServices::new();
        svc.set_stem("IN.", &["a", "b", "c"]);
        assert_eq!(svc.var("in.0"), Some("3"));
        assert_eq!(svc.stem_values("IN."), vec!["a", "b", "c"]);
        assert!(svc.stem_values("NONE.").is_empty());
    }

    #[test]
    fn test_control_flags() {
        let mut svc = MemoryServices::new();
        svc.set_trace(true);
        assert!(svc.tracing);
        svc.set_trace(false);
        assert!(!svc.tracing);
        svc.set_halt();
        assert!(svc.halted);
    }
}
