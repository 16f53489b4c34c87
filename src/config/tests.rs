use super::*;
use serial_test::serial;
use std::env;
use std::net::IpAddr;
use std::path::PathBuf;

use crate::model::{DevicePreference, TokenizerFamily};

fn with_env_vars<F, R>(vars: &[(&str, &str)], f: F) -> R
where
    F: FnOnce() -> R,
{
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, value) in vars {
        unsafe { env::set_var(key, value) };
    }

    let result = f();

    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    for (key, _) in vars {
        unsafe { env::remove_var(key) };
    }

    result
}

fn clear_polarity_env() {
    // SAFETY: Test code only, we accept the thread-safety risk in tests.
    unsafe {
        env::remove_var("POLARITY_PORT");
        env::remove_var("POLARITY_BIND_ADDR");
        env::remove_var("POLARITY_MODEL_PATH");
        env::remove_var("POLARITY_TOKENIZER_FAMILY");
        env::remove_var("POLARITY_DEVICE");
        env::remove_var("POLARITY_MAX_TOKENS_PER_CHUNK");
        env::remove_var("POLARITY_SESSION_CAPACITY");
        env::remove_var("POLARITY_SESSION_TTL_SECS");
        env::remove_var("POLARITY_EXPLAIN_BATCH_SIZE");
        env::remove_var("POLARITY_MAX_UPLOAD_BYTES");
    }
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.port, 8080);
    assert_eq!(
        config.bind_addr,
        IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1))
    );
    assert!(config.model.is_stub());
    assert_eq!(config.max_tokens_per_chunk, 450);
    assert_eq!(config.session_capacity, 10_000);
    assert_eq!(config.session_ttl_secs, 3600);
    assert_eq!(config.explain_batch_size, 16);
    assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
}

#[test]
fn test_socket_addr() {
    let config = Config::default();
    assert_eq!(config.socket_addr(), "127.0.0.1:8080");

    let config = Config {
        port: 3000,
        bind_addr: IpAddr::V4(std::net::Ipv4Addr::new(0, 0, 0, 0)),
        ..Default::default()
    };
    assert_eq!(config.socket_addr(), "0.0.0.0:3000");
}

#[test]
fn test_derived_configs() {
    let config = Config {
        max_tokens_per_chunk: 128,
        explain_batch_size: 4,
        session_ttl_secs: 90,
        ..Default::default()
    };

    assert_eq!(
        config.analyzer_config(),
        AnalyzerConfig {
            max_tokens_per_chunk: 128,
            explain_batch_size: 4,
        }
    );
    assert_eq!(config.session_ttl(), Duration::from_secs(90));
}

#[test]
#[serial]
fn test_from_env_with_defaults() {
    clear_polarity_env();

    let config = Config::from_env().expect("should parse with defaults");

    assert_eq!(config.port, 8080);
    assert!(config.model.model_path.is_none());
    assert!(config.model.tokenizer_family.is_none());
    assert_eq!(config.model.device, DevicePreference::Auto);
    assert_eq!(config.max_tokens_per_chunk, 450);
}

#[test]
#[serial]
fn test_from_env_custom_port() {
    clear_polarity_env();

    with_env_vars(&[("POLARITY_PORT", "9090")], || {
        let config = Config::from_env().expect("should parse custom port");
        assert_eq!(config.port, 9090);
    });
}

#[test]
#[serial]
fn test_from_env_ipv6_bind_addr() {
    clear_polarity_env();

    with_env_vars(&[("POLARITY_BIND_ADDR", "::1")], || {
        let config = Config::from_env().expect("should parse IPv6 address");
        assert_eq!(config.bind_addr, "::1".parse::<IpAddr>().unwrap());
    });
}

#[test]
#[serial]
fn test_full_config_parse() {
    clear_polarity_env();

    with_env_vars(
        &[
            ("POLARITY_PORT", "3000"),
            ("POLARITY_BIND_ADDR", "0.0.0.0"),
            ("POLARITY_MODEL_PATH", "/models/twitter-roberta"),
            ("POLARITY_TOKENIZER_FAMILY", "wordpiece"),
            ("POLARITY_DEVICE", "cpu"),
            ("POLARITY_MAX_TOKENS_PER_CHUNK", "256"),
            ("POLARITY_SESSION_CAPACITY", "50"),
            ("POLARITY_SESSION_TTL_SECS", "120"),
            ("POLARITY_EXPLAIN_BATCH_SIZE", "8"),
            ("POLARITY_MAX_UPLOAD_BYTES", "1024"),
        ],
        || {
            let config = Config::from_env().expect("should parse full config");

            assert_eq!(config.port, 3000);
            assert_eq!(config.bind_addr.to_string(), "0.0.0.0");
            assert_eq!(
                config.model.model_path,
                Some(PathBuf::from("/models/twitter-roberta"))
            );
            assert_eq!(
                config.model.tokenizer_family,
                Some(TokenizerFamily::WordPiece)
            );
            assert_eq!(config.model.device, DevicePreference::Cpu);
            assert_eq!(config.max_tokens_per_chunk, 256);
            assert_eq!(config.session_capacity, 50);
            assert_eq!(config.session_ttl_secs, 120);
            assert_eq!(config.explain_batch_size, 8);
            assert_eq!(config.max_upload_bytes, 1024);
        },
    );
}

#[test]
#[serial]
fn test_auto_tokenizer_family_means_detect() {
    clear_polarity_env();

    with_env_vars(&[("POLARITY_TOKENIZER_FAMILY", "auto")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.model.tokenizer_family.is_none());
    });
}

#[test]
#[serial]
fn test_blank_model_path_is_stub() {
    clear_polarity_env();

    with_env_vars(&[("POLARITY_MODEL_PATH", "   ")], || {
        let config = Config::from_env().expect("should parse");
        assert!(config.model.is_stub());
    });
}

#[test]
#[serial]
fn test_invalid_port_zero() {
    clear_polarity_env();

    with_env_vars(&[("POLARITY_PORT", "0")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));
        assert!(err.to_string().contains("invalid port"));
    });
}

#[test]
#[serial]
fn test_invalid_port_not_number() {
    clear_polarity_env();

    with_env_vars(&[("POLARITY_PORT", "not_a_port")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::PortParseError { .. }));
        assert!(err.to_string().contains("failed to parse port"));
    });
}

#[test]
#[serial]
fn test_invalid_bind_addr() {
    clear_polarity_env();

    with_env_vars(&[("POLARITY_BIND_ADDR", "not.an.ip.address")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    });
}

#[test]
#[serial]
fn test_invalid_number_is_an_error() {
    clear_polarity_env();

    with_env_vars(&[("POLARITY_SESSION_CAPACITY", "lots")], || {
        let err = Config::from_env().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidNumber {
                name: "POLARITY_SESSION_CAPACITY",
                ..
            }
        ));
        assert!(err.to_string().contains("lots"));
    });
}

#[test]
#[serial]
fn test_negative_chunk_size_is_an_error() {
    clear_polarity_env();

    with_env_vars(&[("POLARITY_MAX_TOKENS_PER_CHUNK", "-5")], || {
        assert!(matches!(
            Config::from_env(),
            Err(ConfigError::InvalidNumber { .. })
        ));
    });
}

#[test]
fn test_validate_success_with_defaults() {
    assert!(Config::default().validate().is_ok());
}

#[test]
fn test_validate_chunk_size_range() {
    for bad in [0, 513] {
        let config = Config {
            max_tokens_per_chunk: bad,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::OutOfRange { .. }));
    }

    for good in [1, 512] {
        let config = Config {
            max_tokens_per_chunk: good,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}

#[test]
fn test_validate_zero_values() {
    let cases = [
        Config {
            session_capacity: 0,
            ..Default::default()
        },
        Config {
            session_ttl_secs: 0,
            ..Default::default()
        },
        Config {
            explain_batch_size: 0,
            ..Default::default()
        },
        Config {
            max_upload_bytes: 0,
            ..Default::default()
        },
    ];

    for config in cases {
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MustBePositive { .. })
        ));
    }
}

#[test]
fn test_validate_nonexistent_model_path() {
    let config = Config {
        model: ModelConfig::new("/nonexistent/path/to/model"),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::PathNotFound { .. }));
}

#[test]
fn test_validate_model_path_is_file() {
    let config = Config {
        model: ModelConfig::new(PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml")),
        ..Default::default()
    };

    let err = config.validate().unwrap_err();
    assert!(matches!(err, ConfigError::NotADirectory { .. }));
}

#[test]
fn test_validate_model_directory() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = Config {
        model: ModelConfig::new(dir.path()),
        ..Default::default()
    };

    assert!(config.validate().is_ok());
}

#[test]
fn test_error_messages_are_descriptive() {
    let err = ConfigError::InvalidPort {
        value: "0".to_string(),
    };
    assert!(err.to_string().contains("1 and 65535"));

    let err = ConfigError::OutOfRange {
        name: "POLARITY_MAX_TOKENS_PER_CHUNK",
        value: 600,
        min: 1,
        max: 512,
    };
    assert!(err.to_string().contains("POLARITY_MAX_TOKENS_PER_CHUNK"));
    assert!(err.to_string().contains("600"));

    let err = ConfigError::PathNotFound {
        path: PathBuf::from("/some/path"),
    };
    assert!(err.to_string().contains("/some/path"));
}
