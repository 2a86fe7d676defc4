//! Configuration resolution tests
//!
//! Settings resolve ENV → TOML → compiled default. Tests that manipulate
//! environment variables are marked #[serial] to prevent races between
//! parallel test threads.

use serial_test::serial;
use songsnap_common::config::TomlConfig;
use songsnap_id::config::{
    resolve_downloader_path, resolve_port, resolve_recognizer_url, resolve_work_dir,
    DEFAULT_DOWNLOADER, DEFAULT_PORT, DEFAULT_RECOGNIZER_URL,
};
use std::env;
use std::path::PathBuf;

fn clear_env() {
    env::remove_var("SONGSNAP_PORT");
    env::remove_var("PORT");
    env::remove_var("SONGSNAP_WORK_DIR");
    env::remove_var("SONGSNAP_DOWNLOADER");
    env::remove_var("SONGSNAP_RECOGNIZER_URL");
}

#[test]
#[serial]
fn port_defaults_to_8000() {
    clear_env();
    assert_eq!(resolve_port(&TomlConfig::default()), DEFAULT_PORT);
    assert_eq!(DEFAULT_PORT, 8000);
}

#[test]
#[serial]
fn service_port_var_takes_precedence() {
    clear_env();
    env::set_var("SONGSNAP_PORT", "9001");
    env::set_var("PORT", "9002");

    let mut toml = TomlConfig::default();
    toml.port = Some(9003);

    assert_eq!(resolve_port(&toml), 9001);
    clear_env();
}

#[test]
#[serial]
fn generic_port_var_beats_toml() {
    clear_env();
    env::set_var("PORT", "9002");

    let mut toml = TomlConfig::default();
    toml.port = Some(9003);

    assert_eq!(resolve_port(&toml), 9002);
    clear_env();
}

#[test]
#[serial]
fn toml_port_used_when_env_absent() {
    clear_env();

    let mut toml = TomlConfig::default();
    toml.port = Some(9003);

    assert_eq!(resolve_port(&toml), 9003);
}

#[test]
#[serial]
fn invalid_port_var_is_skipped() {
    clear_env();
    env::set_var("SONGSNAP_PORT", "not-a-port");

    assert_eq!(resolve_port(&TomlConfig::default()), DEFAULT_PORT);
    clear_env();
}

#[test]
#[serial]
fn work_dir_defaults_to_os_temp() {
    clear_env();
    assert_eq!(resolve_work_dir(&TomlConfig::default()), env::temp_dir());
}

#[test]
#[serial]
fn work_dir_env_beats_toml() {
    clear_env();
    env::set_var("SONGSNAP_WORK_DIR", "/tmp/songsnap-env");

    let mut toml = TomlConfig::default();
    toml.work_dir = Some(PathBuf::from("/tmp/songsnap-toml"));

    assert_eq!(resolve_work_dir(&toml), PathBuf::from("/tmp/songsnap-env"));
    clear_env();
}

#[test]
#[serial]
fn downloader_resolution_tiers() {
    clear_env();
    assert_eq!(
        resolve_downloader_path(&TomlConfig::default()),
        DEFAULT_DOWNLOADER
    );

    let mut toml = TomlConfig::default();
    toml.downloader_path = Some("/opt/yt-dlp".to_string());
    assert_eq!(resolve_downloader_path(&toml), "/opt/yt-dlp");

    env::set_var("SONGSNAP_DOWNLOADER", "/usr/local/bin/yt-dlp");
    assert_eq!(resolve_downloader_path(&toml), "/usr/local/bin/yt-dlp");
    clear_env();
}

#[test]
#[serial]
fn recognizer_url_resolution_tiers() {
    clear_env();
    assert_eq!(
        resolve_recognizer_url(&TomlConfig::default()),
        DEFAULT_RECOGNIZER_URL
    );

    let mut toml = TomlConfig::default();
    toml.recognizer_url = Some("http://recognizer.internal:5005".to_string());
    assert_eq!(
        resolve_recognizer_url(&toml),
        "http://recognizer.internal:5005"
    );

    env::set_var("SONGSNAP_RECOGNIZER_URL", "http://127.0.0.1:9999");
    assert_eq!(resolve_recognizer_url(&toml), "http://127.0.0.1:9999");
    clear_env();
}
