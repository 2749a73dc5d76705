use harness::BenchError;
use postgres::Config;

/// Socket directories libpq looks in when no host is given, before falling
/// back to TCP.
#[cfg(unix)]
pub const DEFAULT_SOCKET_DIRS: &[&str] = &["/var/run/postgresql", "/tmp"];
#[cfg(not(unix))]
pub const DEFAULT_SOCKET_DIRS: &[&str] = &[];

pub const DEFAULT_HOST: &str = "localhost";

/// Parses `conninfo` and fills in whatever it leaves out from the libpq
/// environment variables in the process environment.
pub fn from_env(conninfo: &str) -> Result<Config, BenchError> {
  return build(conninfo, |key| std::env::var(key).ok());
}

/// Values given in `conninfo` always win over `env`, and empty variables
/// count as unset. `PGDATABASE` is not consulted since the benchmark names
/// its database explicitly.
pub fn build<F>(conninfo: &str, env: F) -> Result<Config, BenchError>
where
  F: Fn(&str) -> Option<String>,
{
  let env = |key: &str| env(key).filter(|value| !value.is_empty());
  let mut config: Config = conninfo.parse().map_err(BenchError::database)?;

  if config.get_hosts().is_empty() {
    match env("PGHOST") {
      Some(hosts) => {
        for host in hosts.split(',').filter(|h| !h.is_empty()) {
          config.host(host);
        }
      }
      None => {
        for dir in DEFAULT_SOCKET_DIRS {
          config.host(*dir);
        }
        config.host(DEFAULT_HOST);
      }
    }
  }

  if config.get_ports().is_empty() {
    if let Some(ports) = env("PGPORT") {
      for port in ports.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        config.port(port.parse::<u16>().map_err(BenchError::database)?);
      }
    }
  }

  if config.get_user().is_none() {
    if let Some(user) = env("PGUSER").or_else(|| env("USER")) {
      config.user(&user);
    }
  }

  if config.get_password().is_none() {
    if let Some(password) = env("PGPASSWORD") {
      config.password(password);
    }
  }

  if config.get_application_name().is_none() {
    if let Some(name) = env("PGAPPNAME") {
      config.application_name(&name);
    }
  }

  return Ok(config);
}

#[cfg(test)]
mod tests {
  use super::*;
  use postgres::config::Host;
  use rstest::rstest;
  use std::collections::HashMap;

  fn env_of(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
      .iter()
      .map(|(k, v)| (k.to_string(), v.to_string()))
      .collect();
    return move |key| vars.get(key).cloned();
  }

  fn tcp_hosts(config: &Config) -> Vec<String> {
    return config
      .get_hosts()
      .iter()
      .filter_map(|host| match host {
        Host::Tcp(name) => Some(name.clone()),
        #[allow(unreachable_patterns)]
        _ => None,
      })
      .collect();
  }

  #[test]
  fn fills_missing_parameters_from_env() {
    let env = env_of(&[
      ("PGHOST", "db.internal"),
      ("PGPORT", "6543"),
      ("PGUSER", "bench"),
      ("PGPASSWORD", "secret"),
      ("PGAPPNAME", "dequeue-bench"),
      ("PGDATABASE", "elsewhere"),
    ]);
    let config = build("dbname=db_database", env).unwrap();

    assert_eq!(tcp_hosts(&config), vec!["db.internal"]);
    assert_eq!(config.get_ports(), &[6543]);
    assert_eq!(config.get_user(), Some("bench"));
    assert_eq!(config.get_password(), Some(&b"secret"[..]));
    assert_eq!(config.get_application_name(), Some("dequeue-bench"));
    assert_eq!(config.get_dbname(), Some("db_database"));
  }

  #[rstest]
  #[case::unset(&[("USER", "alice")])]
  #[case::empty(&[("USER", "alice"), ("PGHOST", ""), ("PGPORT", ""), ("PGUSER", "")])]
  fn falls_back_to_sockets_then_localhost(#[case] vars: &[(&str, &str)]) {
    let config = build("dbname=db_database", env_of(vars)).unwrap();

    assert_eq!(config.get_hosts().len(), DEFAULT_SOCKET_DIRS.len() + 1);
    assert!(matches!(config.get_hosts().last(), Some(Host::Tcp(h)) if h == DEFAULT_HOST));
    assert!(config.get_ports().is_empty());
    assert_eq!(config.get_user(), Some("alice"));
    assert_eq!(config.get_password(), None);
  }

  #[cfg(unix)]
  #[test]
  fn tries_socket_dirs_before_tcp() {
    let config = build("dbname=db_database", env_of(&[])).unwrap();

    let sockets: Vec<String> = config
      .get_hosts()
      .iter()
      .filter_map(|host| match host {
        Host::Unix(path) => Some(path.to_string_lossy().into_owned()),
        _ => None,
      })
      .collect();
    assert_eq!(sockets, DEFAULT_SOCKET_DIRS);
    assert!(matches!(config.get_hosts()[0], Host::Unix(_)));
  }

  #[test]
  fn conninfo_wins_over_env() {
    let env = env_of(&[("PGHOST", "replica"), ("PGUSER", "bench"), ("PGPORT", "6543")]);
    let config = build("dbname=db_database host=primary port=5433 user=owner", env).unwrap();

    assert_eq!(tcp_hosts(&config), vec!["primary"]);
    assert_eq!(config.get_ports(), &[5433]);
    assert_eq!(config.get_user(), Some("owner"));
  }

  #[rstest]
  #[case::single("a", &["a"])]
  #[case::list("a,b", &["a", "b"])]
  #[case::trailing_comma("a,b,", &["a", "b"])]
  fn splits_host_lists(#[case] pghost: &str, #[case] expected: &[&str]) {
    let config = build("dbname=db_database", env_of(&[("PGHOST", pghost)])).unwrap();
    assert_eq!(tcp_hosts(&config), expected);
  }

  #[rstest]
  #[case::single("6543", &[6543])]
  #[case::list("6543, 6544", &[6543, 6544])]
  fn parses_port_lists(#[case] pgport: &str, #[case] expected: &[u16]) {
    let config = build("dbname=db_database", env_of(&[("PGPORT", pgport)])).unwrap();
    assert_eq!(config.get_ports(), expected);
  }

  #[rstest]
  #[case::name("postgres")]
  #[case::out_of_range("70000")]
  fn rejects_bad_port(#[case] pgport: &str) {
    assert!(build("dbname=db_database", env_of(&[("PGPORT", pgport)])).is_err());
  }
}
