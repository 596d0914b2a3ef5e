//! Parser for metadata workload files.
//!
//! A workload file has a prose header ending at the `Code:` token,
//! followed by a stream of opcode tokens of the form
//! `<code>(<descriptor>)<cycles>` separated by commas, semicolons, colons
//! or newlines and terminated by a period:
//!
//! ```text
//! Start Program Meta-Data Code:
//! S(start)0; A(start)0; P(run)11; I(hard drive)2;
//! O(monitor)2; A(end)0; S(end)0.
//! ```
//!
//! A process extends from the preceding `A(start)` through its matching
//! `A(end)`; each `A(end)` assigns the next 1-based process number.
//! Opcodes after the final `A(end)` (the trailing `S(end)` and any
//! partial process) are dropped.

use thiserror::Error;

use crate::process::{OpKind, Opcode, Process};
use crate::types::{Cycles, DeviceClass, IoDirection};

/// Errors from parsing a metadata workload.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("metadata header is missing the `Code:` sentinel")]
    MissingHeader,
    #[error("malformed opcode token {token:?}: {reason}")]
    MalformedToken { token: String, reason: &'static str },
    #[error("unknown opcode code {code:?} in token {token:?}")]
    UnknownCode { code: char, token: String },
    #[error("unknown descriptor {descriptor:?} for opcode {code:?}")]
    UnknownDescriptor { code: char, descriptor: String },
}

/// Parse a workload file's contents into its processes.
pub fn parse_metadata(input: &str) -> Result<Vec<Process>, MetadataError> {
    let body = input
        .find("Code:")
        .map(|at| &input[at + "Code:".len()..])
        .ok_or(MetadataError::MissingHeader)?;

    let mut processes = Vec::new();
    let mut pending = Process::new(0);
    let mut token = String::new();

    for ch in body.chars() {
        match ch {
            '.' => break,
            ';' | ':' | ',' | '\n' => flush_token(&mut token, &mut pending, &mut processes)?,
            '\r' => {}
            _ => token.push(ch),
        }
    }
    flush_token(&mut token, &mut pending, &mut processes)?;

    Ok(processes)
}

/// Consume an accumulated token, if it is non-blank, into the pending
/// process; finalize the process on `A(end)`.
fn flush_token(
    token: &mut String,
    pending: &mut Process,
    processes: &mut Vec<Process>,
) -> Result<(), MetadataError> {
    let trimmed = token.trim();
    if !trimmed.is_empty() {
        let op = parse_token(trimmed)?;
        let ends_process = op.kind == OpKind::AppEnd;
        pending.push_op(op);

        if ends_process {
            let number = processes.len() as u32 + 1;
            let mut done = std::mem::replace(pending, Process::new(0));
            done.number = number;
            processes.push(done);
        }
    }
    token.clear();
    Ok(())
}

/// Parse one `<code>(<descriptor>)<cycles>` token.
fn parse_token(token: &str) -> Result<Opcode, MetadataError> {
    let malformed = |reason| MetadataError::MalformedToken {
        token: token.to_string(),
        reason,
    };

    let open = token.find('(').ok_or_else(|| malformed("missing `(`"))?;
    let close = token.find(')').ok_or_else(|| malformed("missing `)`"))?;
    if open == 0 || close < open {
        return Err(malformed("code must precede `(descriptor)`"));
    }

    let code = token.chars().next().unwrap();
    let descriptor = &token[open + 1..close];
    let cycles: Cycles = token[close + 1..]
        .trim()
        .parse()
        .map_err(|_| malformed("cycle count is not an integer"))?;

    let kind = classify(code, descriptor, token)?;
    Ok(Opcode::new(kind, cycles))
}

/// Resolve a (code, descriptor) pair to its operation.
fn classify(code: char, descriptor: &str, token: &str) -> Result<OpKind, MetadataError> {
    let unknown_descriptor = || MetadataError::UnknownDescriptor {
        code,
        descriptor: descriptor.to_string(),
    };

    match code {
        'S' => match descriptor {
            "start" => Ok(OpKind::SimStart),
            "end" => Ok(OpKind::SimEnd),
            _ => Err(unknown_descriptor()),
        },
        'A' => match descriptor {
            "start" => Ok(OpKind::AppStart),
            "end" => Ok(OpKind::AppEnd),
            _ => Err(unknown_descriptor()),
        },
        'P' => match descriptor {
            "run" => Ok(OpKind::Processing),
            _ => Err(unknown_descriptor()),
        },
        'M' => match descriptor {
            "allocate" => Ok(OpKind::MemAllocate),
            "cache" => Ok(OpKind::MemCache),
            _ => Err(unknown_descriptor()),
        },
        'I' | 'O' => {
            let class = match descriptor {
                "hard drive" => DeviceClass::HardDrive,
                "keyboard" => DeviceClass::Keyboard,
                "monitor" => DeviceClass::Monitor,
                "printer" => DeviceClass::Printer,
                _ => return Err(unknown_descriptor()),
            };
            // Keyboard, monitor and printer are direction-fixed; only the
            // hard drive honors the opcode letter.
            let direction = class.fixed_direction().unwrap_or(if code == 'I' {
                IoDirection::Input
            } else {
                IoDirection::Output
            });
            Ok(OpKind::Io { class, direction })
        }
        _ => Err(MetadataError::UnknownCode {
            code,
            token: token.to_string(),
        }),
    }
}
