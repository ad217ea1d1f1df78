use clap::Parser;
use dupesweep::cli::Cli;
use dupesweep::config::Config;
use dupesweep::duplicates::HashErrorPolicy;
use figment::providers::Serialized;
use figment::{Figment, Jail};
use std::path::Path;

#[test]
fn test_config_load_defaults() {
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.on_hash_error, HashErrorPolicy::Abort);
}

#[test]
fn test_config_load_from_env() {
    Jail::expect_with(|jail| {
        jail.set_env("DUPESWEEP_WORKERS", 6);
        jail.set_env("DUPESWEEP_ON_HASH_ERROR", "report");
        jail.set_env("DUPESWEEP_MIN_SIZE", 4096);

        let config: Config = Config::figment(None).extract()?;

        assert_eq!(config.workers, 6);
        assert_eq!(config.on_hash_error, HashErrorPolicy::Report);
        assert_eq!(config.min_size, Some(4096));
        Ok(())
    });
}

#[test]
fn test_config_load_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
workers = 8
queue_depth = 0
trash = true
on_hash_error = "report"
"#,
        )?;

        let config: Config = Config::figment(Some(Path::new("config.toml"))).extract()?;

        assert_eq!(config.workers, 8);
        assert_eq!(config.queue_depth, 0);
        assert!(config.trash);
        assert_eq!(config.on_hash_error, HashErrorPolicy::Report);
        Ok(())
    });
}

#[test]
fn test_layer_precedence() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "workers = 2\nqueue_depth = 3\nparanoid = true\n")?;
        jail.set_env("DUPESWEEP_QUEUE_DEPTH", 5);

        let cli = Cli::try_parse_from(["dupesweep", "/data", "9", "--config", "config.toml"])
            .expect("valid args");
        let config = Config::load(&cli).map_err(|e| e.to_string())?;

        // CLI > env > file > defaults
        assert_eq!(config.workers, 9);
        assert_eq!(config.queue_depth, 5);
        assert!(config.paranoid);
        assert_eq!(config.buffer_size, 32 * 1024);
        Ok(())
    });
}

#[test]
fn test_invalid_values_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "workers = 0\n")?;

        let cli = Cli::try_parse_from(["dupesweep", "/data", "--config", "config.toml"])
            .expect("valid args");
        assert!(Config::load(&cli).is_err());
        Ok(())
    });
}

#[test]
fn test_invalid_toml_is_an_error() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "workers = \"many\"\n")?;

        let result: Result<Config, _> = Config::figment(Some(Path::new("config.toml"))).extract();
        assert!(result.is_err());
        Ok(())
    });
}

#[test]
fn test_missing_explicit_config_file() {
    let cli = Cli::try_parse_from([
        "dupesweep",
        "/data",
        "--config",
        "/definitely/not/here/config.toml",
    ])
    .unwrap();

    let err = Config::load(&cli).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}
