//! Episode metrics and logging.
//!
//! ## Loggers
//!
//! - [`ConsoleLogger`]: boxed per-episode summary on stdout
//! - [`CSVLogger`]: CSV file logging for analysis
//! - [`MultiLogger`]: combine multiple loggers

pub mod logger;

pub use logger::{
    CSVLogger,
    ConsoleLogger,
    EpisodeSnapshot,
    MetricsLogger,
    MultiLogger,
};
