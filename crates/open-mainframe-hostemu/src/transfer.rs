//! EXECIO record transfer between an open file and either a stem or the
//! external data queue.
//!
//! | Direction | Stem              | Queue              |
//! |-----------|-------------------|--------------------|
//! | DISKW     | [`write_from_stem`] | [`write_from_queue`] |
//! | DISKR     | [`read_to_stem`]    | [`read_to_queue`]    |
//!
//! Every routine returns [`RC_OK`] or [`RC_EOF`] on success. A zero record
//! count is a successful no-op in all four.

use std::io::{BufWriter, Write};

use tracing::warn;

use crate::command::{Direction, ExecIoOptions, RecordCount};
use crate::error::{HostEmuError, Result, RC_EOF, RC_OK};
use crate::registry::OpenFile;
use crate::services::{ExternalQueue, HostServices, QueueOrder, VariablePool};

/// Run the transfer routine selected by the options.
pub fn transfer<S: HostServices + ?Sized>(
    opts: &mut ExecIoOptions,
    file: &mut OpenFile,
    services: &mut S,
    strip_carriage_return: bool,
) -> Result<u32> {
    match (opts.is_write, opts.uses_queue()) {
        (true, false) => write_from_stem(opts, file, services),
        (true, true) => write_from_queue(opts, file, services),
        (false, false) => read_to_stem(opts, file, services, strip_carriage_return),
        (false, true) => read_to_queue(opts, file, services, strip_carriage_return),
    }
}

/// DISKW from `stem.<start> ..`. `start_record` is advanced past every
/// element written.
pub fn write_from_stem<P: VariablePool + ?Sized>(
    opts: &mut ExecIoOptions,
    file: &mut OpenFile,
    pool: &mut P,
) -> Result<u32> {
    if opts.record_count.is_noop() {
        return Ok(RC_OK);
    }
    let last = match opts.record_count {
        RecordCount::All => {
            let name = opts.stem_var(0);
            let count = fetch_required(pool, &name)?;
            count
                .trim()
                .parse::<u64>()
                .map_err(|_| HostEmuError::var_invalid(&name, format!("'{count}' is not a count")))?
        }
        RecordCount::Exact(n) => opts.start_record.saturating_add(n - 1),
    };

    let name = opts.file_name.clone();
    let mut out = BufWriter::new(file.writer().map_err(|e| HostEmuError::io(&name, e))?);
    while opts.start_record <= last {
        let value = fetch_required(pool, &opts.stem_var(opts.start_record))?;
        write_record(&mut out, &value).map_err(|e| HostEmuError::io(&name, e))?;
        opts.start_record += 1;
    }
    out.flush().map_err(|e| HostEmuError::io(&name, e))?;
    Ok(RC_OK)
}

/// DISKW from the external queue. Stops quietly when the queue runs dry.
pub fn write_from_queue<Q: ExternalQueue + ?Sized>(
    opts: &mut ExecIoOptions,
    file: &mut OpenFile,
    queue: &mut Q,
) -> Result<u32> {
    if opts.record_count.is_noop() {
        return Ok(RC_OK);
    }
    // The queue has no random access; discard up to the start record.
    for _ in 1..opts.start_record {
        if queue.pull().is_none() {
            break;
        }
    }
    let limit = match opts.record_count {
        RecordCount::All => queue.depth() as u64,
        RecordCount::Exact(n) => n,
    };

    let name = opts.file_name.clone();
    let mut out = BufWriter::new(file.writer().map_err(|e| HostEmuError::io(&name, e))?);
    let mut written = 0u64;
    while written < limit {
        let Some(line) = queue.pull() else {
            warn!(file = %name, written, requested = limit, "queue exhausted");
            break;
        };
        write_record(&mut out, &line).map_err(|e| HostEmuError::io(&name, e))?;
        written += 1;
    }
    out.flush().map_err(|e| HostEmuError::io(&name, e))?;
    Ok(RC_OK)
}

/// DISKR into `stem.1 ..`, then `stem.0` = number of records stored.
///
/// Returns [`RC_EOF`] when an exact count could not be satisfied; the
/// records that were read are still stored.
pub fn read_to_stem<P: VariablePool + ?Sized>(
    opts: &mut ExecIoOptions,
    file: &mut OpenFile,
    pool: &mut P,
    strip_carriage_return: bool,
) -> Result<u32> {
    if opts.record_count.is_noop() {
        return Ok(RC_OK);
    }
    skip_records(opts, file, strip_carriage_return)?;

    let mut stored = 0u64;
    let mut rc = RC_OK;
    loop {
        if let RecordCount::Exact(n) = opts.record_count {
            if stored == n {
                break;
            }
        }
        match read(opts, file, strip_carriage_return)? {
            Some(line) => {
                stored += 1;
                set_required(pool, &opts.stem_var(stored), &line)?;
            }
            None => {
                if opts.record_count != RecordCount::All {
                    rc = RC_EOF;
                }
                break;
            }
        }
    }
    set_required(pool, &opts.stem_var(0), &stored.to_string())?;
    Ok(rc)
}

/// DISKR onto the external queue, FIFO or LIFO; with SKIP the records are
/// read and dropped.
pub fn read_to_queue<Q: ExternalQueue + ?Sized>(
    opts: &mut ExecIoOptions,
    file: &mut OpenFile,
    queue: &mut Q,
    strip_carriage_return: bool,
) -> Result<u32> {
    if opts.record_count.is_noop() {
        return Ok(RC_OK);
    }
    skip_records(opts, file, strip_carriage_return)?;

    let order = match opts.direction {
        Direction::Fifo => Some(QueueOrder::Fifo),
        Direction::Lifo => Some(QueueOrder::Lifo),
        Direction::Skip => None,
    };
    let mut read_count = 0u64;
    loop {
        if let RecordCount::Exact(n) = opts.record_count {
            if read_count == n {
                return Ok(RC_OK);
            }
        }
        let Some(line) = read(opts, file, strip_carriage_return)? else {
            return Ok(match opts.record_count {
                RecordCount::All => RC_OK,
                RecordCount::Exact(_) => RC_EOF,
            });
        };
        read_count += 1;
        if let Some(order) = order {
            queue
                .push(&line, order)
                .map_err(|e| HostEmuError::var_invalid("queue", e.to_string()))?;
        }
    }
}

/// Discard `start_record - 1` records. EOF simply ends the skip.
fn skip_records(opts: &ExecIoOptions, file: &mut OpenFile, strip: bool) -> Result<()> {
    for _ in 1..opts.start_record {
        if read(opts, file, strip)?.is_none() {
            break;
        }
    }
    Ok(())
}

fn read(opts: &ExecIoOptions, file: &mut OpenFile, strip: bool) -> Result<Option<String>> {
    file.read_record(strip)
        .map_err(|e| HostEmuError::io(&opts.file_name, e))
}

fn write_record<W: Write>(out: &mut W, value: &str) -> std::io::Result<()> {
    out.write_all(value.as_bytes())?;
    out.write_all(b"\n")
}

fn fetch_required<P: VariablePool + ?Sized>(pool: &mut P, name: &str) -> Result<String> {
    match pool.fetch(name) {
        Ok(Some(value)) => Ok(value),
        Ok(None) => {
            warn!(variable = name, "EXECIO variable not set");
            Err(HostEmuError::var_invalid(name, "variable is not set"))
        }
        Err(e) => {
            warn!(variable = name, error = %e, "EXECIO variable fetch failed");
            Err(HostEmuError::var_invalid(name, e.to_string()))
        }
    }
}

fn set_required<P: VariablePool + ?Sized>(pool: &mut P, name: &str, value: &str) -> Result<()> {
    pool.set(name, value).map_err(|e| {
        warn!(variable = name, error = %e, "EXECIO variable set failed");
        HostEmuError::var_invalid(name, e.to_string())
    })
}
