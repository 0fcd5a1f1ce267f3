//! Echo service configuration.

use std::net::SocketAddr;
use tokio_bincode::Framing;
use tracing::warn;

/// Address used when `BINCODE_ECHO_ADDR` is unset.
pub const DEFAULT_ADDR: &str = "127.0.0.1:15151";

/// Environment variable holding the listen/connect address.
pub const ADDR_ENV: &str = "BINCODE_ECHO_ADDR";

/// Environment variable selecting the framing.
pub const FRAMING_ENV: &str = "BINCODE_ECHO_FRAMING";

/// Echo service configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoConfig {
    /// Address to listen on (server) or connect to (client)
    pub addr: SocketAddr,
    /// Framing both sides must agree on
    pub framing: Framing,
    /// Stop accepting after this many connections (unbounded when `None`)
    pub max_connections: Option<usize>,
}

impl Default for EchoConfig {
    fn default() -> Self {
        EchoConfig {
            addr: parse_env(ADDR_ENV).unwrap_or_else(default_addr),
            framing: parse_env(FRAMING_ENV).unwrap_or_default(),
            max_connections: None,
        }
    }
}

impl EchoConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific address, ignoring the environment
    pub fn new(addr: SocketAddr) -> Self {
        EchoConfig {
            addr,
            framing: Framing::default(),
            max_connections: None,
        }
    }

    /// Set the framing
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Bound the number of accepted connections
    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = Some(max);
        self
    }
}

fn default_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 15151))
}

/// Read and parse an environment variable, warning on malformed values.
fn parse_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring invalid environment value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_addr_constant_parses() {
        let parsed: SocketAddr = DEFAULT_ADDR.parse().unwrap();
        assert_eq!(parsed, default_addr());
    }

    #[test]
    fn test_new_ignores_environment() {
        let addr: SocketAddr = "10.0.0.1:9000".parse().unwrap();
        let config = EchoConfig::new(addr);
        assert_eq!(config.addr, addr);
        assert_eq!(config.framing, Framing::default());
        assert!(config.max_connections.is_none());
    }

    #[test]
    fn test_builders() {
        let config = EchoConfig::new(default_addr())
            .with_framing(Framing::length_delimited())
            .with_max_connections(3);
        assert_eq!(config.framing, Framing::length_delimited());
        assert_eq!(config.max_connections, Some(3));
    }

    /// Sets a variable for the life of the guard. Every test uses its own
    /// key so parallel tests never see each other's values.
    struct EnvVarGuard(&'static str);

    impl EnvVarGuard {
        fn set(key: &'static str, value: &str) -> Self {
            std::env::set_var(key, value);
            EnvVarGuard(key)
        }
    }

    impl Drop for EnvVarGuard {
        fn drop(&mut self) {
            std::env::remove_var(self.0);
        }
    }

    #[test]
    fn test_parse_env_rejects_garbage() {
        let _guard = EnvVarGuard::set("BINCODE_ECHO_TEST_GARBAGE_ADDR", "not-an-addr");
        assert!(parse_env::<SocketAddr>("BINCODE_ECHO_TEST_GARBAGE_ADDR").is_none());
    }

    #[test]
    fn test_parse_env_reads_framing() {
        let _guard = EnvVarGuard::set("BINCODE_ECHO_TEST_PARSED_FRAMING", "length-delimited");
        assert_eq!(
            parse_env::<Framing>("BINCODE_ECHO_TEST_PARSED_FRAMING"),
            Some(Framing::length_delimited())
        );
    }

    #[test]
    fn test_parse_env_unset_is_none() {
        assert!(parse_env::<SocketAddr>("BINCODE_ECHO_TEST_NEVER_SET").is_none());
    }

    #[test]
    fn test_env_guard_removes_variable() {
        {
            let _guard = EnvVarGuard::set("BINCODE_ECHO_TEST_GUARDED", "127.0.0.1:1");
            assert!(std::env::var("BINCODE_ECHO_TEST_GUARDED").is_ok());
        }
        assert!(std::env::var("BINCODE_ECHO_TEST_GUARDED").is_err());
    }
}
