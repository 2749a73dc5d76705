pub mod error;
pub mod logging;
pub mod runner;

pub use error::BenchError;
pub use runner::{run, RunSummary};

/// Queue the `dequeue` procedure is called for.
pub const QUEUE_NAME: &str = "performance_test";

/// Number of jobs requested per `dequeue` call.
pub const BATCH_SIZE: i32 = 1;

/// A `rows <N>` progress line is printed every this many dequeues.
pub const PROGRESS_INTERVAL: i64 = 1000;

pub const CONNINFO: &str = "dbname=db_database";

#[derive(clap::Parser, Debug)]
#[command(version)]
pub struct Opts {
  /// Stop after this many successful dequeues. Zero or negative runs until
  /// the queue is empty.
  #[arg(allow_negative_numbers = true)]
  pub iterations: i64,
}

/// A single connection that can pull jobs off a queue.
///
/// `dequeue` opens a transaction when none is open, the way a DB-API driver
/// does implicitly, and `commit` ends it. `close` consumes the connection,
/// rolling back whatever was left uncommitted.
pub trait QueueConnection {
  type Row;

  fn dequeue(&mut self, queue: &str, batch_size: i32) -> Result<Option<Self::Row>, BenchError>;

  fn commit(&mut self) -> Result<(), BenchError>;

  fn close(self) -> Result<(), BenchError>;
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;

  #[test]
  fn parses_positional_iterations() {
    let opts = Opts::try_parse_from(["bench", "2500"]).unwrap();
    assert_eq!(opts.iterations, 2500);
  }

  #[test]
  fn accepts_negative_iterations() {
    let opts = Opts::try_parse_from(["bench", "-1"]).unwrap();
    assert_eq!(opts.iterations, -1);
  }

  #[test]
  fn rejects_missing_or_non_numeric_iterations() {
    assert!(Opts::try_parse_from(["bench"]).is_err());
    assert!(Opts::try_parse_from(["bench", "lots"]).is_err());
  }
}
