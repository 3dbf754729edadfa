//! Persisted session artifacts.
//!
//! The session (tokens, user, login time) is written as one JSON record so a
//! reader never sees half of it. Storage problems are logged and degrade to an
//! empty store; they are never returned to callers.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;

use stay_config::{CredentialBackend, SessionConfig};
use stay_core::ActiveSession;

const SESSION_FILE_NAME: &str = "session.json";
const REMEMBERED_FILE_NAME: &str = "remembered.json";
const KEYRING_SESSION_USER: &str = "session";
const KEYRING_REMEMBERED_USER: &str = "remembered";

/// Login form defaults kept between runs. Never includes the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RememberedLogin {
    #[serde(default)]
    pub organization_slug: Option<String>,
    pub email: String,
}

pub trait CredentialStore: Send + Sync {
    fn save(&self, session: &ActiveSession);

    /// Last saved session, or `None` if absent or unreadable.
    fn load(&self) -> Option<ActiveSession>;

    /// Remove the session record. Remembered login defaults survive.
    fn clear(&self);

    fn remember(&self, login: &RememberedLogin);

    fn remembered(&self) -> Option<RememberedLogin>;

    /// Which tier currently holds the session record.
    fn source(&self) -> Option<&'static str>;
}

/// Open the store selected by `[session] credential_backend`.
#[must_use]
pub fn open(config: &SessionConfig) -> Arc<dyn CredentialStore> {
    let file = config.credentials_dir().map(FileCredentialStore::new);
    match (config.credential_backend, file) {
        (CredentialBackend::Memory, _) => Arc::new(MemoryCredentialStore::default()),
        (CredentialBackend::Keyring, fallback) => Arc::new(KeyringCredentialStore::new(
            &config.keyring_service,
            fallback,
        )),
        (CredentialBackend::File, Some(file)) => Arc::new(file),
        (CredentialBackend::File, None) => {
            tracing::warn!("home directory not found; credentials will not be persisted");
            Arc::new(NullCredentialStore)
        }
    }
}

// ---------------------------------------------------------------------------
// Memory
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    session: Mutex<Option<ActiveSession>>,
    remembered: Mutex<Option<RememberedLogin>>,
}

impl MemoryCredentialStore {
    #[must_use]
    pub fn with_session(session: ActiveSession) -> Self {
        Self {
            session: Mutex::new(Some(session)),
            remembered: Mutex::new(None),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn save(&self, session: &ActiveSession) {
        *self.session.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
    }

    fn load(&self) -> Option<ActiveSession> {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn clear(&self) {
        self.session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    fn remember(&self, login: &RememberedLogin) {
        *self.remembered.lock().unwrap_or_else(PoisonError::into_inner) = Some(login.clone());
    }

    fn remembered(&self) -> Option<RememberedLogin> {
        self.remembered
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn source(&self) -> Option<&'static str> {
        self.load().map(|_| "memory")
    }
}

// ---------------------------------------------------------------------------
// File
// ---------------------------------------------------------------------------

/// `session.json` and `remembered.json` under one directory.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    dir: PathBuf,
}

impl FileCredentialStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn session_path(&self) -> PathBuf {
        self.dir.join(SESSION_FILE_NAME)
    }

    fn remembered_path(&self) -> PathBuf {
        self.dir.join(REMEMBERED_FILE_NAME)
    }

    fn ensure_dir(&self) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(error) = fs::set_permissions(&self.dir, fs::Permissions::from_mode(0o700)) {
                tracing::warn!(%error, dir = %self.dir.display(), "failed to chmod 0700");
            }
        }
        Ok(())
    }

    /// Write to a sibling temp file, restrict it, then rename over `path`.
    fn write_atomic(&self, path: &Path, contents: &str) -> std::io::Result<()> {
        self.ensure_dir()?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, contents)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp, fs::Permissions::from_mode(0o600))?;
        }
        fs::rename(&tmp, path)
    }

    fn write_record<T: Serialize>(&self, path: &Path, record: &T) {
        let result = serde_json::to_string(record)
            .map_err(std::io::Error::other)
            .and_then(|json| self.write_atomic(path, &json));
        if let Err(error) = result {
            tracing::warn!(%error, path = %path.display(), "failed to write credentials file");
        }
    }

    fn remove(path: &Path) {
        match fs::remove_file(path) {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => {
                tracing::warn!(%error, path = %path.display(), "failed to delete credentials file");
            }
        }
    }
}

fn read_record<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return None,
        Err(error) => {
            tracing::warn!(%error, path = %path.display(), "failed to read credentials file");
            return None;
        }
    };
    if contents.trim().is_empty() {
        return None;
    }
    decode_record(&contents, &path.display().to_string())
}

fn decode_record<T: DeserializeOwned>(contents: &str, origin: &str) -> Option<T> {
    match serde_json::from_str(contents) {
        Ok(record) => Some(record),
        Err(error) => {
            tracing::warn!(%error, origin, "ignoring unreadable credentials record");
            None
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn save(&self, session: &ActiveSession) {
        self.write_record(&self.session_path(), session);
    }

    fn load(&self) -> Option<ActiveSession> {
        read_record(&self.session_path())
    }

    fn clear(&self) {
        Self::remove(&self.session_path());
    }

    fn remember(&self, login: &RememberedLogin) {
        self.write_record(&self.remembered_path(), login);
    }

    fn remembered(&self) -> Option<RememberedLogin> {
        read_record(&self.remembered_path())
    }

    fn source(&self) -> Option<&'static str> {
        self.load().map(|_| "file")
    }
}

// ---------------------------------------------------------------------------
// Keyring
// ---------------------------------------------------------------------------

/// OS keychain, with the file store as fallback when the keychain is
/// unavailable.
///
/// Entries are resolved once at construction; a keychain that cannot be
/// opened behaves like one whose writes always fail.
#[derive(Debug)]
pub struct KeyringCredentialStore {
    session: Option<keyring::Entry>,
    remembered: Option<keyring::Entry>,
    fallback: Option<FileCredentialStore>,
}

impl KeyringCredentialStore {
    #[must_use]
    pub fn new(service: &str, fallback: Option<FileCredentialStore>) -> Self {
        Self {
            session: open_entry(service, KEYRING_SESSION_USER),
            remembered: open_entry(service, KEYRING_REMEMBERED_USER),
            fallback,
        }
    }

    fn keyring_session(&self) -> Option<ActiveSession> {
        read_entry(self.session.as_ref()?).and_then(|json| decode_record(&json, "keyring"))
    }
}

fn open_entry(service: &str, user: &str) -> Option<keyring::Entry> {
    match keyring::Entry::new(service, user) {
        Ok(entry) => Some(entry),
        Err(error) => {
            tracing::warn!(%error, user, "keyring unavailable");
            None
        }
    }
}

fn read_entry(entry: &keyring::Entry) -> Option<String> {
    match entry.get_password() {
        Ok(value) if !value.trim().is_empty() => Some(value),
        Ok(_) | Err(keyring::Error::NoEntry) => None,
        Err(error) => {
            tracing::warn!(%error, "keyring read failed");
            None
        }
    }
}

fn write_entry(entry: Option<&keyring::Entry>, value: &str) -> bool {
    let Some(entry) = entry else {
        return false;
    };
    match entry.set_password(value) {
        Ok(()) => true,
        Err(error) => {
            tracing::warn!(%error, "keyring store failed; falling back to file");
            false
        }
    }
}

fn delete_entry(entry: Option<&keyring::Entry>) {
    if let Some(entry) = entry {
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => {}
            Err(error) => tracing::warn!(%error, "keyring delete failed"),
        }
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn save(&self, session: &ActiveSession) {
        let json = match serde_json::to_string(session) {
            Ok(json) => json,
            Err(error) => {
                tracing::warn!(%error, "failed to serialize session");
                return;
            }
        };
        if write_entry(self.session.as_ref(), &json) {
            // Drop any stale fallback copy so it cannot resurface later.
            if let Some(file) = &self.fallback {
                file.clear();
            }
        } else {
            // `load` prefers the keychain, so an older record there would
            // shadow the one written to the file.
            delete_entry(self.session.as_ref());
            if let Some(file) = &self.fallback {
                file.save(session);
            }
        }
    }

    fn load(&self) -> Option<ActiveSession> {
        self.keyring_session()
            .or_else(|| self.fallback.as_ref().and_then(FileCredentialStore::load))
    }

    fn clear(&self) {
        delete_entry(self.session.as_ref());
        if let Some(file) = &self.fallback {
            file.clear();
        }
    }

    fn remember(&self, login: &RememberedLogin) {
        match &self.fallback {
            Some(file) => file.remember(login),
            None => {
                if let Ok(json) = serde_json::to_string(login) {
                    write_entry(self.remembered.as_ref(), &json);
                }
            }
        }
    }

    fn remembered(&self) -> Option<RememberedLogin> {
        match &self.fallback {
            Some(file) => file.remembered(),
            None => self
                .remembered
                .as_ref()
                .and_then(read_entry)
                .and_then(|json| decode_record(&json, "keyring")),
        }
    }

    fn source(&self) -> Option<&'static str> {
        if self.keyring_session().is_some() {
            return Some("keyring");
        }
        self.fallback.as_ref().and_then(FileCredentialStore::source)
    }
}

// ---------------------------------------------------------------------------
// Null
// ---------------------------------------------------------------------------

/// Stores nothing. Used when no storage location can be resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCredentialStore;

impl CredentialStore for NullCredentialStore {
    fn save(&self, _session: &ActiveSession) {}

    fn load(&self) -> Option<ActiveSession> {
        None
    }

    fn clear(&self) {}

    fn remember(&self, _login: &RememberedLogin) {}

    fn remembered(&self) -> Option<RememberedLogin> {
        None
    }

    fn source(&self) -> Option<&'static str> {
        None
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    use stay_core::{EntityId, Role, TokenPair, User};

    use super::*;

    fn session() -> ActiveSession {
        ActiveSession::new(
            TokenPair::new("t1", "r1"),
            User {
                id: EntityId::Int(1),
                role: Role::Manager,
                first_name: "Anna".into(),
                last_name: "Berg".into(),
                email: Some("a@x.com".into()),
                organization: None,
            },
            Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
        )
    }

    fn remembered() -> RememberedLogin {
        RememberedLogin {
            organization_slug: Some("hotel-paradise".into()),
            email: "a@x.com".into(),
        }
    }

    #[test]
    fn memory_store_save_load_clear_cycle() {
        let store = MemoryCredentialStore::default();
        assert!(store.load().is_none());
        assert!(store.source().is_none());

        store.save(&session());
        assert_eq!(store.load(), Some(session()));
        assert_eq!(store.source(), Some("memory"));

        store.clear();
        store.clear();
        assert!(store.load().is_none());
    }

    #[test]
    fn clear_keeps_remembered_login() {
        let store = MemoryCredentialStore::with_session(session());
        store.remember(&remembered());
        store.clear();
        assert_eq!(store.remembered(), Some(remembered()));
    }

    #[test]
    fn file_store_save_load_clear_cycle() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileCredentialStore::new(tmp.path().join("creds"));

        store.save(&session());
        assert_eq!(store.load(), Some(session()));
        assert_eq!(store.source(), Some("file"));
        assert!(!tmp.path().join("creds").join("session.json.tmp").exists());

        store.clear();
        assert!(store.load().is_none());
        store.clear();
    }

    #[cfg(unix)]
    #[test]
    fn file_store_restricts_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let dir = tmp.path().join("creds");
        FileCredentialStore::new(&dir).save(&session());

        let file_mode = fs::metadata(dir.join(SESSION_FILE_NAME))
            .expect("metadata")
            .permissions()
            .mode()
            & 0o777;
        let dir_mode = fs::metadata(&dir).expect("metadata").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600, "session file should be 0600");
        assert_eq!(dir_mode, 0o700, "credentials dir should be 0700");
    }

    #[test]
    fn file_store_ignores_corrupt_record() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        fs::write(tmp.path().join(SESSION_FILE_NAME), r#"{"access_token":"t1""#).expect("write");
        let store = FileCredentialStore::new(tmp.path());
        assert!(store.load().is_none());
    }

    #[test]
    fn file_store_ignores_whitespace_record() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        fs::write(tmp.path().join(SESSION_FILE_NAME), "   \n  ").expect("write");
        assert!(FileCredentialStore::new(tmp.path()).load().is_none());
    }

    #[test]
    fn file_store_remembers_login() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = FileCredentialStore::new(tmp.path());
        assert!(store.remembered().is_none());

        store.remember(&remembered());
        assert_eq!(store.remembered(), Some(remembered()));

        let contents = fs::read_to_string(tmp.path().join(REMEMBERED_FILE_NAME)).expect("read");
        assert!(!contents.contains("password"));
    }

    #[test]
    fn open_memory_backend() {
        let config = SessionConfig {
            credential_backend: CredentialBackend::Memory,
            ..SessionConfig::default()
        };
        let store = open(&config);
        store.save(&session());
        assert_eq!(store.source(), Some("memory"));
    }

    #[test]
    fn open_file_backend_uses_configured_dir() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let config = SessionConfig {
            credential_backend: CredentialBackend::File,
            credentials_dir: tmp.path().display().to_string(),
            ..SessionConfig::default()
        };
        open(&config).save(&session());
        assert!(tmp.path().join(SESSION_FILE_NAME).exists());
    }

    fn keyring_with_file(tmp: &tempfile::TempDir) -> KeyringCredentialStore {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        KeyringCredentialStore::new(
            "staybook-test",
            Some(FileCredentialStore::new(tmp.path().join("creds"))),
        )
    }

    fn fail_next_keyring_call(store: &KeyringCredentialStore) {
        let entry = store.session.as_ref().expect("mock entry");
        let mock: &keyring::mock::MockCredential = entry
            .get_credential()
            .downcast_ref()
            .expect("mock credential");
        mock.set_error(keyring::Error::Invalid("keychain".into(), "locked".into()));
    }

    #[test]
    fn keyring_store_prefers_keychain() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = keyring_with_file(&tmp);

        store.save(&session());

        assert_eq!(store.load(), Some(session()));
        assert_eq!(store.source(), Some("keyring"));
        assert!(!tmp.path().join("creds").join(SESSION_FILE_NAME).exists());
    }

    #[test]
    fn keyring_failure_does_not_leave_older_record_in_front_of_file() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let store = keyring_with_file(&tmp);
        store.save(&session());

        let newer = ActiveSession::new(
            TokenPair::new("t2", "r2"),
            session().user,
            Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap(),
        );
        fail_next_keyring_call(&store);
        store.save(&newer);

        assert_eq!(store.load(), Some(newer));
        assert_eq!(store.source(), Some("file"));
    }

    #[test]
    fn null_store_holds_nothing() {
        let store = NullCredentialStore;
        store.save(&session());
        store.remember(&remembered());
        assert!(store.load().is_none());
        assert!(store.remembered().is_none());
    }
}
