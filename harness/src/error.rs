use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
  /// Connect, call, fetch or commit failed. Displays as the driver's message.
  #[error("{0}")]
  Database(Box<dyn std::error::Error + Send + Sync + 'static>),

  #[error("writing progress: {0}")]
  Output(#[from] std::io::Error),
}

impl BenchError {
  pub fn database<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    return BenchError::Database(Box::new(err));
  }
}
