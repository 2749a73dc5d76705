mod queue;

use clap::Parser;
use harness::{Opts, QUEUE_NAME};
use rusqlite::Connection;
use tracing::info;

use crate::queue::{SqliteQueue, N};

const NAME: &str = "RUSQLITE";

fn main() {
  let opts = Opts::parse();
  harness::logging::init();

  let tmp_dir = tempfile::TempDir::new().unwrap();

  let fname = tmp_dir.path().join("dequeue.sqlite");
  println!("DB file: {fname:?}");

  {
    let mut conn = Connection::open(&fname).unwrap();

    let version: String = conn
      .query_row("SELECT sqlite_version()", (), |row| row.get(0))
      .unwrap();
    println!("Sqlite v{version:?}");

    queue::setup(&conn).unwrap();
    queue::seed(&mut conn, QUEUE_NAME, N).unwrap();
  }

  let summary = harness::run(
    || SqliteQueue::open(&fname),
    opts.iterations,
    &mut std::io::stdout().lock(),
  );

  info!(
    backend = NAME,
    rows = summary.rows,
    elapsed = ?summary.elapsed,
    rows_per_sec = summary.rows_per_sec(),
    failed = summary.failed,
    "dequeue run finished"
  );

  let remaining = queue::count(&Connection::open(&fname).unwrap()).unwrap();
  if !summary.failed {
    assert_eq!(remaining as i64, N as i64 - summary.rows);
  }
  info!(remaining, "jobs left in queue");

  std::fs::remove_file(fname).unwrap();
}
