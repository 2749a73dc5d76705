use harness::{BenchError, QueueConnection};
use postgres::types::Type;
use postgres::{Client, Config, NoTls, Row, Statement};

const DEQUEUE_QUERY: &str = "SELECT * FROM dequeue($1, $2)";

pub struct PgQueue {
  client: Client,
  dequeue: Statement,
  in_transaction: bool,
}

impl PgQueue {
  pub fn connect(config: &Config) -> Result<Self, BenchError> {
    let mut client = config.connect(NoTls).map_err(BenchError::database)?;
    let dequeue = client
      .prepare_typed(DEQUEUE_QUERY, &[Type::TEXT, Type::INT4])
      .map_err(BenchError::database)?;

    return Ok(PgQueue {
      client,
      dequeue,
      in_transaction: false,
    });
  }
}

impl QueueConnection for PgQueue {
  type Row = Row;

  fn dequeue(&mut self, queue: &str, batch_size: i32) -> Result<Option<Row>, BenchError> {
    if !self.in_transaction {
      self.client.batch_execute("BEGIN").map_err(BenchError::database)?;
      self.in_transaction = true;
    }

    let rows = self
      .client
      .query(&self.dequeue, &[&queue, &batch_size])
      .map_err(BenchError::database)?;
    return Ok(rows.into_iter().next());
  }

  fn commit(&mut self) -> Result<(), BenchError> {
    if self.in_transaction {
      self.client.batch_execute("COMMIT").map_err(BenchError::database)?;
      self.in_transaction = false;
    }
    return Ok(());
  }

  // The server rolls back an open transaction when the session terminates.
  fn close(self) -> Result<(), BenchError> {
    return self.client.close().map_err(BenchError::database);
  }
}
