//! Simulator configuration and its file parser.
//!
//! The configuration format is whitespace-tokenized prose with sentinel
//! tokens ahead of each value (`"Processor Quantum Number: 3"` is found by
//! scanning to the `Number:` token and reading the next one). The parser
//! consumes sentinels in file order and fails loudly on a truncated or
//! unparsable value rather than running a wrong schedule.

use thiserror::Error;

use crate::types::{Cycles, DeviceClass, LogTarget, SchedPolicy};

/// Frozen simulation parameters. All cycle times are in milliseconds,
/// memory sizes in kilobytes.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the metadata workload file.
    pub metadata_path: String,
    /// Path the journal is written to when logging to file.
    pub log_path: String,
    /// Maximum CPU/memory cycles per scheduler turn. Always >= 1.
    pub quantum: Cycles,
    pub policy: SchedPolicy,
    pub processor_ms: u32,
    pub monitor_ms: u32,
    pub hard_drive_ms: u32,
    pub printer_ms: u32,
    pub keyboard_ms: u32,
    pub memory_ms: u32,
    pub system_memory_kb: u64,
    pub block_size_kb: u32,
    pub printer_count: usize,
    pub hd_count: usize,
    pub log_to: LogTarget,
}

impl Config {
    /// Per-cycle duration for a device class, in milliseconds.
    pub fn device_ms(&self, class: DeviceClass) -> u32 {
        match class {
            DeviceClass::HardDrive => self.hard_drive_ms,
            DeviceClass::Keyboard => self.keyboard_ms,
            DeviceClass::Monitor => self.monitor_ms,
            DeviceClass::Printer => self.printer_ms,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            metadata_path: String::new(),
            log_path: String::new(),
            quantum: 10,
            policy: SchedPolicy::RoundRobin,
            processor_ms: 1,
            monitor_ms: 1,
            hard_drive_ms: 1,
            printer_ms: 1,
            keyboard_ms: 1,
            memory_ms: 1,
            system_memory_kb: 2048,
            block_size_kb: 128,
            printer_count: 1,
            hd_count: 1,
            log_to: LogTarget::Both,
        }
    }
}

/// Errors from parsing a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration ended before the {0:?} sentinel")]
    MissingSentinel(&'static str),
    #[error("configuration ended before the value after {0:?}")]
    MissingValue(&'static str),
    #[error("invalid value {value:?} after {sentinel:?}")]
    InvalidValue {
        sentinel: &'static str,
        value: String,
    },
    #[error("unknown memory unit {0:?}")]
    UnknownMemoryUnit(String),
    #[error("quantum must be at least 1")]
    ZeroQuantum,
}

impl Config {
    /// Parse a configuration file's contents.
    pub fn parse(input: &str) -> Result<Config, ConfigError> {
        let mut tokens = input.split_whitespace();
        let mut cfg = Config::default();

        cfg.metadata_path = value_after(&mut tokens, "Path:")?.to_string();
        cfg.quantum = numeric_after(&mut tokens, "Number:")?;
        if cfg.quantum == 0 {
            return Err(ConfigError::ZeroQuantum);
        }
        cfg.policy = match value_after(&mut tokens, "Code:")? {
            "RR" => SchedPolicy::RoundRobin,
            "SRTF" => SchedPolicy::Srtf,
            _ => SchedPolicy::Sjf,
        };

        // Six cycle times, in file order.
        cfg.processor_ms = numeric_after(&mut tokens, "(msec):")?;
        cfg.monitor_ms = numeric_after(&mut tokens, "(msec):")?;
        cfg.hard_drive_ms = numeric_after(&mut tokens, "(msec):")?;
        cfg.printer_ms = numeric_after(&mut tokens, "(msec):")?;
        cfg.keyboard_ms = numeric_after(&mut tokens, "(msec):")?;
        cfg.memory_ms = numeric_after(&mut tokens, "(msec):")?;

        // "System memory (kbytes): N" -- the unit token follows "memory".
        skip_until(&mut tokens, "memory")?;
        let unit = tokens.next().ok_or(ConfigError::MissingValue("memory"))?;
        let multiplier = match unit {
            "(kbytes):" => 1,
            "(Mbytes):" => 1_000,
            "(Gbytes):" => 1_000_000,
            other => return Err(ConfigError::UnknownMemoryUnit(other.to_string())),
        };
        let raw: u64 = parse_value(&mut tokens, "memory")?;
        cfg.system_memory_kb = raw * multiplier;

        cfg.block_size_kb = numeric_after(&mut tokens, "(kbytes):")?;
        cfg.printer_count = numeric_after(&mut tokens, "quantity:")?;
        cfg.hd_count = numeric_after(&mut tokens, "quantity:")?;

        cfg.log_to = match value_after(&mut tokens, "to")? {
            "File" => LogTarget::File,
            "Monitor" => LogTarget::Monitor,
            _ => LogTarget::Both,
        };
        cfg.log_path = value_after(&mut tokens, "Path:")?.to_string();

        Ok(cfg)
    }
}

/// Advance the token stream past the next occurrence of `sentinel`.
fn skip_until<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    sentinel: &'static str,
) -> Result<(), ConfigError> {
    for token in tokens.by_ref() {
        if token == sentinel {
            return Ok(());
        }
    }
    Err(ConfigError::MissingSentinel(sentinel))
}

/// The token immediately after the next occurrence of `sentinel`.
fn value_after<'a>(
    tokens: &mut impl Iterator<Item = &'a str>,
    sentinel: &'static str,
) -> Result<&'a str, ConfigError> {
    skip_until(tokens, sentinel)?;
    tokens.next().ok_or(ConfigError::MissingValue(sentinel))
}

fn parse_value<'a, T: std::str::FromStr>(
    tokens: &mut impl Iterator<Item = &'a str>,
    sentinel: &'static str,
) -> Result<T, ConfigError> {
    let value = tokens.next().ok_or(ConfigError::MissingValue(sentinel))?;
    value.parse().map_err(|_| ConfigError::InvalidValue {
        sentinel,
        value: value.to_string(),
    })
}

fn numeric_after<'a, T: std::str::FromStr>(
    tokens: &mut impl Iterator<Item = &'a str>,
    sentinel: &'static str,
) -> Result<T, ConfigError> {
    skip_until(tokens, sentinel)?;
    parse_value(tokens, sentinel)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Start Simulator Configuration File
Version/Phase: 4.0
File Path: Test_4e.mdf
Processor Quantum Number: 3
CPU Scheduling Code: RR
Processor cycle time (msec): 10
Monitor display time (msec): 20
Hard drive cycle time (msec): 15
Printer cycle time (msec): 25
Keyboard cycle time (msec): 50
Memory cycle time (msec): 30
System memory (kbytes): 2048
Memory block size (kbytes): 128
Printer quantity: 2
Hard drive quantity: 2
Log: Log to Both
Log File Path: logfile_1.lgf
End Simulator Configuration File
";

    #[test]
    fn test_parse_sample() {
        let cfg = Config::parse(SAMPLE).unwrap();
        assert_eq!(cfg.metadata_path, "Test_4e.mdf");
        assert_eq!(cfg.quantum, 3);
        assert_eq!(cfg.policy, SchedPolicy::RoundRobin);
        assert_eq!(cfg.processor_ms, 10);
        assert_eq!(cfg.monitor_ms, 20);
        assert_eq!(cfg.hard_drive_ms, 15);
        assert_eq!(cfg.printer_ms, 25);
        assert_eq!(cfg.keyboard_ms, 50);
        assert_eq!(cfg.memory_ms, 30);
        assert_eq!(cfg.system_memory_kb, 2048);
        assert_eq!(cfg.block_size_kb, 128);
        assert_eq!(cfg.printer_count, 2);
        assert_eq!(cfg.hd_count, 2);
        assert_eq!(cfg.log_to, LogTarget::Both);
        assert_eq!(cfg.log_path, "logfile_1.lgf");
    }

    #[test]
    fn test_memory_unit_scaling() {
        let mb = SAMPLE.replace("System memory (kbytes): 2048", "System memory (Mbytes): 4");
        assert_eq!(Config::parse(&mb).unwrap().system_memory_kb, 4_000);

        let gb = SAMPLE.replace("System memory (kbytes): 2048", "System memory (Gbytes): 4");
        assert_eq!(Config::parse(&gb).unwrap().system_memory_kb, 4_000_000);
    }

    #[test]
    fn test_policy_mapping() {
        let srtf = SAMPLE.replace("Code: RR", "Code: SRTF");
        assert_eq!(Config::parse(&srtf).unwrap().policy, SchedPolicy::Srtf);

        // Anything else falls back to SJF.
        let sjf = SAMPLE.replace("Code: RR", "Code: FIFO");
        assert_eq!(Config::parse(&sjf).unwrap().policy, SchedPolicy::Sjf);
    }

    #[test]
    fn test_log_target_mapping() {
        let file = SAMPLE.replace("Log to Both", "Log to File");
        assert_eq!(Config::parse(&file).unwrap().log_to, LogTarget::File);

        let monitor = SAMPLE.replace("Log to Both", "Log to Monitor");
        assert_eq!(Config::parse(&monitor).unwrap().log_to, LogTarget::Monitor);
    }

    #[test]
    fn test_truncated_input_is_an_error() {
        let cut = &SAMPLE[..SAMPLE.find("Printer quantity:").unwrap()];
        assert!(matches!(
            Config::parse(cut),
            Err(ConfigError::MissingSentinel("quantity:"))
        ));
    }

    #[test]
    fn test_zero_quantum_rejected() {
        let zero = SAMPLE.replace("Number: 3", "Number: 0");
        assert!(matches!(Config::parse(&zero), Err(ConfigError::ZeroQuantum)));
    }

    #[test]
    fn test_bad_numeric_value() {
        let bad = SAMPLE.replace("(msec): 10", "(msec): fast");
        assert!(matches!(
            Config::parse(&bad),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
