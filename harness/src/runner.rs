use std::io::Write;
use std::time::{Duration, Instant};

use tracing::{debug, error, warn};

use crate::{BenchError, QueueConnection, BATCH_SIZE, PROGRESS_INTERVAL, QUEUE_NAME};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
  /// Dequeues that were committed.
  pub rows: i64,
  pub elapsed: Duration,
  /// A database or output failure ended the run early.
  pub failed: bool,
}

impl RunSummary {
  pub fn rows_per_sec(&self) -> f64 {
    let secs = self.elapsed.as_secs_f64();
    if secs == 0.0 {
      return 0.0;
    }
    return self.rows as f64 / secs;
  }
}

/// Dequeues from [`QUEUE_NAME`] until the queue is empty or `limit` jobs
/// have been committed, writing a `rows <N>` line to `out` every
/// [`PROGRESS_INTERVAL`] jobs.
///
/// Failures are not returned. Their message is written to `out` and the
/// connection, if one was opened, is closed exactly once regardless.
pub fn run<C, F, W>(connect: F, limit: i64, out: &mut W) -> RunSummary
where
  C: QueueConnection,
  F: FnOnce() -> Result<C, BenchError>,
  W: Write,
{
  let start = Instant::now();
  let mut rows = 0;

  let mut conn = match connect() {
    Ok(conn) => conn,
    Err(err) => {
      report(out, &err, rows);
      return RunSummary {
        rows,
        elapsed: start.elapsed(),
        failed: true,
      };
    }
  };
  debug!("connection opened");

  let result = dequeue_loop(&mut conn, limit, &mut rows, out);
  if let Err(err) = &result {
    report(out, err, rows);
  }

  match conn.close() {
    Ok(()) => debug!("connection closed"),
    Err(err) => warn!(error = %err, "closing connection failed"),
  }

  return RunSummary {
    rows,
    elapsed: start.elapsed(),
    failed: result.is_err(),
  };
}

// The limit is only checked after a commit, and reaching it ends the loop
// without a trailing lookahead call.
fn dequeue_loop<C, W>(
  conn: &mut C,
  limit: i64,
  rows: &mut i64,
  out: &mut W,
) -> Result<(), BenchError>
where
  C: QueueConnection,
  W: Write,
{
  let mut row = conn.dequeue(QUEUE_NAME, BATCH_SIZE)?;
  while row.is_some() {
    conn.commit()?;
    *rows += 1;

    if *rows % PROGRESS_INTERVAL == 0 {
      writeln!(out, "rows {rows}")?;
      out.flush()?;
    }

    if *rows == limit {
      break;
    }

    row = conn.dequeue(QUEUE_NAME, BATCH_SIZE)?;
  }
  return Ok(());
}

fn report<W: Write>(out: &mut W, err: &BenchError, rows: i64) {
  error!(error = %err, rows, "dequeue run failed");

  // Nowhere left to report to if this fails too.
  let _ = writeln!(out, "{err}");
  let _ = out.flush();
}
