use harness::{BenchError, QueueConnection};
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;

pub const N: usize = 100000;

pub const AGENCY_ID: i64 = 870970;

pub const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

pub const PRAGMAS: &str = r#"
    PRAGMA busy_timeout       = 10000;
    PRAGMA journal_mode       = WAL;
    PRAGMA journal_size_limit = 200000000;
    PRAGMA synchronous        = NORMAL;
    PRAGMA temp_store         = MEMORY;
    PRAGMA cache_size         = -16000;
"#;

pub const CREATE_QUEUE_QUERY: &str = r#"
    DROP TABLE IF EXISTS queue;
    CREATE TABLE queue (
      bibliographicrecordid TEXT NOT NULL,
      agencyid              INTEGER NOT NULL,
      worker                TEXT NOT NULL,
      queued                DATETIME DEFAULT CURRENT_TIMESTAMP NOT NULL
    );
    CREATE INDEX queue_worker ON queue (worker, queued);
"#;

pub const ENQUEUE_QUERY: &str =
  "INSERT INTO queue (bibliographicrecordid, agencyid, worker) VALUES ($1, $2, $3)";

// SQLite has no stored procedures. This stands in for `dequeue(worker, wanted)`:
// the oldest `wanted` jobs for the worker are removed and handed back.
pub const DEQUEUE_QUERY: &str = r#"
    DELETE FROM queue WHERE rowid IN (
      SELECT rowid FROM queue WHERE worker = $1 ORDER BY queued, rowid LIMIT $2
    ) RETURNING rowid
"#;

pub const COUNT_QUERY: &str = "SELECT COUNT(*) FROM queue";

pub fn setup(conn: &Connection) -> rusqlite::Result<()> {
  return conn.execute_batch(&format!("{PRAGMAS}\n{CREATE_QUEUE_QUERY}"));
}

pub fn seed(conn: &mut Connection, worker: &str, count: usize) -> rusqlite::Result<()> {
  let tx = conn.transaction()?;
  {
    let mut stmt = tx.prepare_cached(ENQUEUE_QUERY)?;
    for i in 0..count {
      stmt.execute((format!("{i:08}"), AGENCY_ID, worker))?;
    }
  }
  return tx.commit();
}

pub fn count(conn: &Connection) -> rusqlite::Result<usize> {
  return conn.query_row(COUNT_QUERY, (), |row| row.get(0));
}

/// Queue connection over a SQLite file prepared by [`setup`]. Rows are the
/// rowids of dequeued jobs.
pub struct SqliteQueue {
  conn: Connection,
  in_transaction: bool,
}

impl SqliteQueue {
  pub fn open(path: &Path) -> Result<Self, BenchError> {
    let conn = Connection::open(path).map_err(BenchError::database)?;
    conn.busy_timeout(BUSY_TIMEOUT).map_err(BenchError::database)?;

    return Ok(SqliteQueue {
      conn,
      in_transaction: false,
    });
  }
}

impl QueueConnection for SqliteQueue {
  type Row = i64;

  fn dequeue(&mut self, queue: &str, batch_size: i32) -> Result<Option<i64>, BenchError> {
    if !self.in_transaction {
      self.conn.execute_batch("BEGIN").map_err(BenchError::database)?;
      self.in_transaction = true;
    }

    let mut stmt = self
      .conn
      .prepare_cached(DEQUEUE_QUERY)
      .map_err(BenchError::database)?;
    let mut rows = stmt
      .query((queue, batch_size))
      .map_err(BenchError::database)?;

    let first = match rows.next().map_err(BenchError::database)? {
      Some(row) => Some(row.get(0).map_err(BenchError::database)?),
      None => None,
    };
    return Ok(first);
  }

  fn commit(&mut self) -> Result<(), BenchError> {
    if self.in_transaction {
      self.conn.execute_batch("COMMIT").map_err(BenchError::database)?;
      self.in_transaction = false;
    }
    return Ok(());
  }

  // Closing with a transaction still open rolls it back.
  fn close(self) -> Result<(), BenchError> {
    return self
      .conn
      .close()
      .map_err(|(_conn, err)| BenchError::database(err));
  }
}
