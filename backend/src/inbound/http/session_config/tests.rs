//! Unit tests for session key resolution.

use super::*;
use rstest::rstest;
use uuid::Uuid;

#[derive(Debug)]
struct TempKeyFile {
    path: PathBuf,
}

impl TempKeyFile {
    fn new(len: usize) -> std::io::Result<Self> {
        let path = std::env::temp_dir().join(format!("session-key-{}", Uuid::new_v4()));
        std::fs::write(&path, vec![b'a'; len])?;
        Ok(Self { path })
    }
}

impl Drop for TempKeyFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

fn app_settings(key_file: Option<PathBuf>, allow_ephemeral: bool) -> AppSettings {
    AppSettings {
        host: None,
        port: None,
        database_url: None,
        expose_error_detail: None,
        session_key_file: key_file,
        session_cookie_secure: None,
        session_allow_ephemeral: Some(allow_ephemeral),
    }
}

fn missing_path() -> PathBuf {
    std::env::temp_dir().join(format!("absent-key-{}", Uuid::new_v4()))
}

#[rstest]
fn key_file_is_used_when_long_enough() {
    let file = TempKeyFile::new(64).expect("write key");
    let settings = session_settings(
        &app_settings(Some(file.path.clone()), false),
        BuildMode::Release,
    )
    .expect("settings");

    assert!(settings.cookie_secure);
    let again = session_settings(
        &app_settings(Some(file.path.clone()), false),
        BuildMode::Release,
    )
    .expect("settings");
    assert_eq!(settings.key.master(), again.key.master());
}

#[rstest]
#[case(BuildMode::Debug)]
#[case(BuildMode::Release)]
fn short_key_is_rejected_in_every_mode(#[case] mode: BuildMode) {
    let file = TempKeyFile::new(32).expect("write key");
    let result = session_settings(&app_settings(Some(file.path.clone()), true), mode);

    assert!(matches!(
        result,
        Err(SessionConfigError::KeyTooShort { length: 32, min_len: 64, .. })
    ));
}

#[rstest]
#[case(None)]
#[case(Some(missing_path()))]
fn release_without_key_fails(#[case] key_file: Option<PathBuf>) {
    let result = session_settings(&app_settings(key_file, false), BuildMode::Release);
    assert!(result.is_err());
}

#[rstest]
#[case(BuildMode::Debug, false)]
#[case(BuildMode::Release, true)]
fn ephemeral_key_when_permitted(#[case] mode: BuildMode, #[case] allow: bool) {
    let result = session_settings(&app_settings(Some(missing_path()), allow), mode);
    assert!(result.is_ok());
}
