mod config;
mod queue;

use clap::Parser;
use harness::{Opts, CONNINFO};
use tracing::info;

use crate::queue::PgQueue;

const NAME: &str = "POSTGRES";

fn main() {
  let opts = Opts::parse();
  harness::logging::init();

  let stdout = std::io::stdout();
  let summary = harness::run(
    || {
      let config = config::from_env(CONNINFO)?;
      return PgQueue::connect(&config);
    },
    opts.iterations,
    &mut stdout.lock(),
  );

  info!(
    backend = NAME,
    rows = summary.rows,
    elapsed = ?summary.elapsed,
    rows_per_sec = summary.rows_per_sec(),
    failed = summary.failed,
    "dequeue run finished"
  );
}
