//! Episode loggers for training runs.
//!
//! The per-episode summary is intended for log consumption only; no other
//! component parses it.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Per-episode summary for logging.
#[derive(Debug, Clone)]
pub struct EpisodeSnapshot {
    /// Episode index.
    pub episode: usize,
    /// Trailing moving average of episodic reward (last 40 episodes).
    pub avg_reward: f64,
    /// Reward accumulated this episode.
    pub episode_reward: f64,
    /// Whether the autopilot exploration flag was on this episode.
    pub autopilot: bool,
    /// Last observed policy loss.
    pub policy_loss: f64,
    /// Last observed value loss.
    pub value_loss: f64,
}

/// Logger trait for different logging backends.
pub trait MetricsLogger: Send {
    /// Log an episode snapshot.
    fn log(&mut self, snapshot: &EpisodeSnapshot);

    /// Flush any buffered output.
    fn flush(&mut self);
}

/// Console logger printing a boxed two-line summary per episode.
#[derive(Debug, Default)]
pub struct ConsoleLogger;

impl ConsoleLogger {
    /// Create a new console logger.
    pub fn new() -> Self {
        Self
    }
}

impl MetricsLogger for ConsoleLogger {
    fn log(&mut self, snapshot: &EpisodeSnapshot) {
        let line1 = format!(
            "| Episode * {} * Avg Reward is ==> {:.2} * Ep. Reward {:.2} autopilot {}",
            snapshot.episode, snapshot.avg_reward, snapshot.episode_reward, snapshot.autopilot
        );
        let line2 = format!(
            "| Policy loss ==> {:.2} * Value loss ==> {:.2}",
            snapshot.policy_loss, snapshot.value_loss
        );
        let width = line1.len().max(line2.len());

        println!("{}", "-".repeat(width + 1));
        println!("{}{}|", line1, " ".repeat(width - line1.len()));
        println!("{}{}|", line2, " ".repeat(width - line2.len()));
        println!("{}", "-".repeat(width + 1));
        println!();
    }

    fn flush(&mut self) {
        // stdout is line-buffered, nothing to do
    }
}

/// CSV file logger for analysis.
pub struct CSVLogger {
    writer: BufWriter<File>,
}

impl CSVLogger {
    /// Create a new CSV logger writing to `path`.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        writeln!(
            writer,
            "episode,avg_reward,episode_reward,autopilot,policy_loss,value_loss"
        )?;
        Ok(Self { writer })
    }
}

impl MetricsLogger for CSVLogger {
    fn log(&mut self, snapshot: &EpisodeSnapshot) {
        let row = writeln!(
            self.writer,
            "{},{:.6},{:.6},{},{:.6},{:.6}",
            snapshot.episode,
            snapshot.avg_reward,
            snapshot.episode_reward,
            snapshot.autopilot,
            snapshot.policy_loss,
            snapshot.value_loss
        );
        // A lost metrics row must not abort training.
        if let Err(e) = row {
            log::warn!("episode CSV write failed: {}", e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::warn!("episode CSV flush failed: {}", e);
        }
    }
}

impl Drop for CSVLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

/// Multi-logger that writes to multiple backends.
#[derive(Default)]
pub struct MultiLogger {
    loggers: Vec<Box<dyn MetricsLogger>>,
}

impl MultiLogger {
    /// Create a new multi-logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a logger.
    pub fn add<L: MetricsLogger + 'static>(mut self, logger: L) -> Self {
        self.loggers.push(Box::new(logger));
        self
    }
}

impl MetricsLogger for MultiLogger {
    fn log(&mut self, snapshot: &EpisodeSnapshot) {
        for logger in &mut self.loggers {
            logger.log(snapshot);
        }
    }

    fn flush(&mut self) {
        for logger in &mut self.loggers {
            logger.flush();
        }
    }
}
