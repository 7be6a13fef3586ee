//! Configuration loading from files and the process environment

use nrpc_server::ServerConfig;
use serial_test::serial;
use std::io::Write;
use std::time::Duration;

const NRPC_VARS: &[&str] = &[
    "NRPC_BIND",
    "NRPC_PORT",
    "NRPC_MAX_CONNECTIONS",
    "NRPC_READ_TIMEOUT",
    "NRPC_STACK_SIZE",
];

/// Runs `f` with the given NRPC_* variables set, restoring the originals after
fn with_env(vars: &[(&str, &str)], f: impl FnOnce()) {
    let saved: Vec<_> = NRPC_VARS
        .iter()
        .map(|key| (*key, std::env::var(key).ok()))
        .collect();

    // SAFETY: every test touching the environment is #[serial]
    unsafe {
        for key in NRPC_VARS {
            std::env::remove_var(key);
        }
        for (key, value) in vars {
            std::env::set_var(key, value);
        }
    }

    f();

    // SAFETY: restoring environment to original state
    unsafe {
        for (key, value) in saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

#[test]
fn test_load_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "bind = \"127.0.0.1\"").unwrap();
    writeln!(file, "port = 4242").unwrap();
    writeln!(file, "read_timeout_secs = 60").unwrap();

    let config = ServerConfig::load(file.path()).unwrap();
    assert_eq!(config.addr(), "127.0.0.1:4242");
    assert_eq!(config.read_timeout(), Some(Duration::from_secs(60)));
    assert_eq!(config.max_connections, None);
}

#[test]
fn test_load_rejects_malformed_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = ").unwrap();
    assert!(ServerConfig::load(file.path()).is_err());
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port = 4242").unwrap();
    writeln!(file, "max_connections = 10").unwrap();

    with_env(&[("NRPC_PORT", "5353"), ("NRPC_MAX_CONNECTIONS", "0")], || {
        let mut config = ServerConfig::load(file.path()).unwrap();
        config.apply_env();
        assert_eq!(config.port, 5353);
        assert_eq!(config.max_connections, None);
    });
}

#[test]
#[serial]
fn test_no_env_keeps_defaults() {
    with_env(&[], || {
        let mut config = ServerConfig::default();
        config.apply_env();
        assert_eq!(config, ServerConfig::default());
    });
}

#[test]
#[serial]
fn test_invalid_env_is_ignored() {
    with_env(&[("NRPC_PORT", "99999"), ("NRPC_STACK_SIZE", "big")], || {
        let mut config = ServerConfig::default();
        config.apply_env();
        assert_eq!(config, ServerConfig::default());
    });
}
