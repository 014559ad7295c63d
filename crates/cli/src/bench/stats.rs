//! Bench statistics.

use std::time::Duration;

use observability::MonitorSummary;

/// Statistics from a bench run
#[derive(Debug, Clone, Default)]
pub struct BenchStats {
    /// Messages pushed into the pipe
    pub messages: u64,

    /// Messages accepted by every child
    pub forwarded: u64,

    /// Messages rejected by a child
    pub forward_failures: u64,

    /// Successful commit calls
    pub commits: u64,

    /// Failed commit calls
    pub commit_failures: u64,

    /// Children wired to the pipe
    pub children: usize,

    /// Last committed offset per source
    pub committed_offsets: Vec<(String, Option<u64>)>,

    /// Wall-clock duration of the run
    pub duration: Duration,

    /// Pipe time per reporting window
    pub monitor: MonitorSummary,
}

impl BenchStats {
    /// Messages per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.messages as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Forward failure rate as percentage
    pub fn failure_rate(&self) -> f64 {
        if self.messages > 0 {
            (self.forward_failures as f64 / self.messages as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Share of the run spent inside the pipe, as percentage
    pub fn pipe_share(&self) -> f64 {
        let pipe_time: Duration = self.monitor.stages.iter().map(|s| s.total).sum();
        if self.duration.as_secs_f64() > 0.0 {
            pipe_time.as_secs_f64() / self.duration.as_secs_f64() * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Bench Statistics ===\n");

        println!("Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Messages: {}", self.messages);
        println!("   ├─ Throughput: {:.2} msg/s", self.throughput());
        println!("   ├─ Children: {}", self.children);
        println!(
            "   ├─ Forward failures: {} ({:.2}%)",
            self.forward_failures,
            self.failure_rate()
        );
        println!(
            "   ├─ Commits: {} ({} failed)",
            self.commits, self.commit_failures
        );
        println!("   └─ Pipe share: {:.2}%", self.pipe_share());

        if !self.committed_offsets.is_empty() {
            println!("\nCommitted offsets");
            for (source, offset) in &self.committed_offsets {
                match offset {
                    Some(offset) => println!("   ├─ {}: {}", source, offset),
                    None => println!("   ├─ {}: -", source),
                }
            }
        }

        println!("\n{}", self.monitor);
    }
}
