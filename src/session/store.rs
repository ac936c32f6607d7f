use crate::session::{Session, SCHEMA_VERSION};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("USERPROFILE").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn config_dir() -> PathBuf {
    home_dir().join(".opsdesk")
}

fn session_path() -> PathBuf {
    config_dir().join("session.json")
}

fn read_session_file(path: &Path) -> Result<Session, String> {
    let data = fs::read(path).map_err(|err| format!("failed to read {}: {err}", path.display()))?;
    let session: Session = serde_json::from_slice(&data)
        .map_err(|err| format!("failed to parse {}: {err}", path.display()))?;
    if session.schema_version != SCHEMA_VERSION {
        return Err(format!(
            "unknown schema_version in {}: {}",
            path.display(),
            session.schema_version
        ));
    }
    Ok(session)
}

fn ensure_config_dir() -> io::Result<PathBuf> {
    let dir = config_dir();
    fs::create_dir_all(&dir)?;
    Ok(dir)
}

pub fn save(session: &Session) -> io::Result<()> {
    let dir = ensure_config_dir()?;
    let final_path = session_path();
    let tmp_path = dir.join("session.json.tmp");
    let bytes = serde_json::to_vec_pretty(session)
        .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err.to_string()))?;

    fs::write(&tmp_path, bytes)?;
    match fs::rename(&tmp_path, &final_path) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            if final_path.exists() {
                fs::remove_file(&final_path)?;
                fs::rename(&tmp_path, &final_path)?;
                Ok(())
            } else {
                Err(rename_err)
            }
        }
    }
}

pub fn load() -> (Option<Session>, Option<String>) {
    let path = session_path();
    if !path.exists() {
        return (None, None);
    }

    match read_session_file(&path) {
        Ok(session) => (Some(session), None),
        Err(err) => (None, Some(err)),
    }
}

fn remove_file_idempotent(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err),
    }
}

pub fn clear() -> io::Result<()> {
    remove_file_idempotent(&session_path())
}

#[cfg(test)]
mod tests {
    use super::{read_session_file, remove_file_idempotent};
    use crate::session::{Role, Session, SCHEMA_VERSION};
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir().join(format!(
            "opsdesk_session_store_{prefix}_{}_{}.json",
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn read_session_file_round_trips_current_schema() {
        let path = temp_file("current");
        let session = Session {
            schema_version: SCHEMA_VERSION,
            auth_token: "token-a".to_string(),
            refresh_token: "token-r".to_string(),
            user_id: "7".to_string(),
            role: Role::Admin,
            signed_in_at: "1".to_string(),
        };
        let bytes = serde_json::to_vec_pretty(&session).expect("session fixture should encode");
        fs::write(&path, bytes).expect("session fixture should write");

        let loaded = read_session_file(&path).expect("current schema should load");
        assert_eq!(loaded, session);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn read_session_file_tolerates_missing_refresh_token() {
        let path = temp_file("no_refresh");
        let data = r#"{
  "schema_version": 1,
  "auth_token": "token-a",
  "user_id": "7",
  "role": "agent",
  "signed_in_at": "1"
}"#;
        fs::write(&path, data).expect("session fixture should write");

        let loaded = read_session_file(&path).expect("session without refresh token should load");
        assert_eq!(loaded.role, Role::Agent);
        assert!(loaded.refresh_token.is_empty());

        let _ = fs::remove_file(path);
    }

    #[test]
    fn read_session_file_rejects_unknown_schema() {
        let path = temp_file("unknown");
        let data = r#"{
  "schema_version": 99,
  "auth_token": "token-a",
  "refresh_token": "token-r",
  "user_id": "7",
  "role": "admin",
  "signed_in_at": "1"
}"#;
        fs::write(&path, data).expect("unknown schema fixture should write");

        let error = read_session_file(&path).expect_err("unknown schema should fail");
        assert!(error.contains("unknown schema_version"));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn remove_file_idempotent_succeeds_when_already_gone() {
        let path = temp_file("clear");
        fs::write(&path, b"{}").expect("fixture should write");

        remove_file_idempotent(&path).expect("first removal should succeed");
        remove_file_idempotent(&path).expect("second removal should be a no-op");
        assert!(!path.exists());
    }
}
