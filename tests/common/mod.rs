use procsim::{parse_metadata, Config, Journal, Simulator, TimeUs};

/// Initialize tracing from `RUST_LOG`.
///
/// `try_init()` is idempotent: first call in the process succeeds,
/// subsequent calls are silently ignored.
pub fn setup_test() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

/// Slack for timing assertions, in microseconds. Busy-wait references are
/// captured just before the matching start event is recorded, so observed
/// gaps can undershoot the simulated duration by the lock/format latency.
#[allow(dead_code)]
pub const SLACK_US: TimeUs = 500;

/// Parse a workload, run it under `cfg`, and return the finished simulator.
pub fn run_workload(cfg: Config, metadata: &str) -> Simulator {
    let processes = parse_metadata(metadata).expect("workload parses");
    let mut sim = Simulator::new(cfg, processes, Journal::new());
    sim.run();
    sim
}

/// Positions of every message containing `needle`, in journal order.
#[allow(dead_code)]
pub fn positions(messages: &[String], needle: &str) -> Vec<usize> {
    messages
        .iter()
        .enumerate()
        .filter(|(_, m)| m.contains(needle))
        .map(|(i, _)| i)
        .collect()
}

/// Index of the first message containing `needle`; panics if absent.
#[allow(dead_code)]
pub fn position_of(messages: &[String], needle: &str) -> usize {
    messages
        .iter()
        .position(|m| m.contains(needle))
        .unwrap_or_else(|| panic!("no message contains {needle:?}"))
}
