//! procsim - Multiprogrammed operating system simulator.
//!
//! Schedules a batch of processes, described declaratively as sequences
//! of timed opcodes, across a single simulated CPU with quantum
//! preemption, while I/O operations run concurrently against device
//! pools of finite multiplicity. Every observable transition lands in a
//! strictly serialized event journal.
//!
//! # Architecture
//!
//! - **Engine**: scheduler loop that selects processes by policy (round
//!   robin or shortest-remaining) and drives runner turns
//! - **Runner**: quantum-bounded opcode interpreter for one process
//! - **Devices**: per-class slot pools admitting bounded concurrent I/O
//! - **Workers**: one thread per dispatched I/O opcode, joined at shutdown
//! - **Journal**: lock-serialized append-only event log
//!
//! # Usage
//!
//! ```rust,no_run
//! use procsim::{parse_metadata, Config, Journal, Simulator};
//!
//! let processes =
//!     parse_metadata("Code: S(start)0; A(start)0; P(run)5; A(end)0; S(end)0.").unwrap();
//! let mut sim = Simulator::new(Config::default(), processes, Journal::new());
//! sim.run();
//! print!("{}", sim.journal().render());
//! ```

pub mod clock;
pub mod config;
pub mod devices;
pub mod engine;
pub mod journal;
pub mod memory;
pub mod metadata;
pub mod process;
pub mod runner;
pub mod types;
pub mod workers;

// Re-export the main public types for convenience.
pub use config::{Config, ConfigError};
pub use engine::{SimContext, Simulator};
pub use journal::{Entry, Journal};
pub use metadata::{parse_metadata, MetadataError};
pub use process::{OpKind, Opcode, Process};
pub use types::{Cycles, DeviceClass, IoDirection, LogTarget, ProcState, SchedPolicy, TimeUs};
