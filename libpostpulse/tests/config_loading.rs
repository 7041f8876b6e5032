//! Configuration file loading and environment resolution

use anyhow::Result;
use libpostpulse::config::resolve_config_path;
use libpostpulse::error::ConfigError;
use libpostpulse::{
    Config, ExecutionContext, MemoryContext, PostPulseError, PostPulseNode, UploadProtocol,
};
use secrecy::ExposeSecret;
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> Result<PathBuf> {
    let path = dir.path().join("config.toml");
    fs::write(&path, content)?;
    Ok(path)
}

#[test]
fn test_load_from_path() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[credentials]
client_id = "client-abc"
access_token = "token-abc"

[node]
continue_on_fail = true
"#,
    )?;

    let config = Config::load_from_path(&path)?;

    assert!(config.node.continue_on_fail);
    assert_eq!(config.node.upload_protocol, UploadProtocol::Presigned);
    assert_eq!(config.credentials.base_url, "https://api.post-pulse.com");

    let ctx = MemoryContext::from_config(&config)?;
    assert!(ctx.continue_on_fail());
    assert_eq!(ctx.credential()?.client_id, "client-abc");

    let _node = PostPulseNode::from_config(&config)?;
    Ok(())
}

#[test]
fn test_missing_file_is_read_error() -> Result<()> {
    let dir = TempDir::new()?;
    let result = Config::load_from_path(&dir.path().join("absent.toml"));

    assert!(matches!(
        result,
        Err(PostPulseError::Config(ConfigError::ReadError(_)))
    ));
    Ok(())
}

#[test]
fn test_invalid_toml_is_parse_error() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(&dir, "[credentials\nclient_id = ")?;

    let result = Config::load_from_path(&path);

    assert!(matches!(
        result,
        Err(PostPulseError::Config(ConfigError::ParseError(_)))
    ));
    Ok(())
}

#[test]
#[serial]
fn test_postpulse_config_env_overrides_location() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[http]
user_agent = "scheduler-host/1.4"
"#,
    )?;

    std::env::set_var("POSTPULSE_CONFIG", &path);
    let resolved = resolve_config_path();
    let loaded = Config::load();
    std::env::remove_var("POSTPULSE_CONFIG");

    assert_eq!(resolved?, path);
    assert_eq!(loaded?.http.user_agent, "scheduler-host/1.4");
    Ok(())
}

#[test]
#[serial]
fn test_access_token_from_environment() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_config(
        &dir,
        r#"
[credentials]
base_url = "https://sandbox.post-pulse.test/"
client_id = "client-env"
access_token_env = "POSTPULSE_TEST_ACCESS_TOKEN"
"#,
    )?;
    let config = Config::load_from_path(&path)?;

    std::env::set_var("POSTPULSE_TEST_ACCESS_TOKEN", "token-from-env");
    let credential = config.credential();
    std::env::remove_var("POSTPULSE_TEST_ACCESS_TOKEN");

    let credential = credential?;
    assert_eq!(credential.access_token.expose_secret(), "token-from-env");
    assert_eq!(credential.normalized_base_url(), "https://sandbox.post-pulse.test");

    // Unset variable is a missing field
    assert!(matches!(
        config.credential(),
        Err(PostPulseError::Config(ConfigError::MissingField(_)))
    ));
    Ok(())
}
