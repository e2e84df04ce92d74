use crate::{
    fs,
    lock::{FileLockGuard, LockMode},
    logger::{LogSink, Logger},
    prelude::*,
    properties,
    sync::*,
};
/// Best-effort key-value store over one properties file
use std::{
    fmt,
    io::{Read, Seek, SeekFrom, Write},
    path::Path,
};

/// What `safe_read` hands back for a key that is not there.
pub const NO_VALUE: &str = "none";

/// A configuration file and the operations over its entries.
///
/// Nothing is cached: each call opens the file, does its work under an
/// advisory lock and closes it again. Readers share the lock, writers hold
/// it exclusively across the whole load-modify-store cycle.
///
/// The plain methods never fail. Errors go to the [`Logger`] and the call
/// returns `None`, `false`, `0` or does nothing. Use the `try_*` methods
/// to tell a missing key from an unreadable file.
#[derive(Clone)]
pub struct ConfigStore {
    config: Config,
    logger: Arc<dyn Logger>,
}

impl fmt::Debug for ConfigStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigStore").field("path", &self.config.path).finish()
    }
}

impl ConfigStore {
    /// Store `name` under the default `<execution dir>/config/` directory.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_config(Config::new(name))
    }

    /// Store `name` under `location`, which should end with a separator.
    pub fn with_location(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self::from_config(Config::with_location(name, location))
    }

    pub fn from_config(config: Config) -> Self {
        Self::open_logged(config, LogSink::shared())
    }

    /// Like [`from_config`](Self::from_config) but reporting to `logger`.
    pub fn with_logger(config: Config, logger: impl Logger + 'static) -> Self {
        Self::open_logged(config, Arc::new(logger))
    }

    /// Open and surface a failure to create the directory or file.
    pub fn try_open(config: Config, logger: impl Logger + 'static) -> IResult<Self> {
        let store = Self { config, logger: Arc::new(logger) };
        store.ensure()?;
        Ok(store)
    }

    fn open_logged(config: Config, logger: Arc<dyn Logger>) -> Self {
        let store = Self { config, logger };
        if let Err(e) = store.ensure() {
            store.logger.log_error(&format!("cannot create config: {}", e));
        }
        store
    }

    fn ensure(&self) -> IResult<()> {
        if let Some(dir) = self.config.directory() {
            fs::ensure_directory(&dir).map_err(Error::io(dir))?;
        }
        if fs::ensure_file(self.path()).map_err(Error::io(self.path()))? {
            log::debug!("created {}", self.path().display());
        }
        Ok(())
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn location(&self) -> &str {
        &self.config.location
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// The whole mapping as it is on disk right now.
    pub fn entries(&self) -> IResult<Properties> {
        let path = self.path();
        let mut file = FileLockGuard::open(path, LockMode::Shared).map_err(Error::io(path))?;

        let mut text = String::new();
        file.read_to_string(&mut text).map_err(Error::io(path))?;
        properties::parse(&text)
    }

    /// Load under an exclusive lock, let `apply` edit the mapping, and
    /// rewrite the file if it returned `true`.
    fn update<F>(&self, apply: F) -> IResult<bool>
    where
        F: FnOnce(&mut Properties) -> bool,
    {
        let path = self.path();
        let mut file = FileLockGuard::open(path, LockMode::Exclusive).map_err(Error::io(path))?;

        let mut text = String::new();
        file.read_to_string(&mut text).map_err(Error::io(path))?;
        let mut props = properties::parse(&text)?;

        if !apply(&mut props) {
            return Ok(false)
        }

        let rendered = properties::render(&props);
        file.set_len(0).map_err(Error::io(path))?;
        file.seek(SeekFrom::Start(0)).map_err(Error::io(path))?;
        file.write_all(rendered.as_bytes()).map_err(Error::io(path))?;
        file.flush().map_err(Error::io(path))?;

        Ok(true)
    }

    pub fn try_read(&self, key: &str) -> IResult<Option<Value>> {
        Ok(self.entries()?.remove(key))
    }

    pub fn try_exists(&self, key: &str) -> IResult<bool> {
        Ok(self.entries()?.contains_key(key))
    }

    pub fn try_write(&self, key: &str, value: &str) -> IResult<()> {
        self.update(|props| {
            props.insert(key.to_owned(), value.to_owned());
            true
        })
        .map(|_| ())
    }

    /// Write-if-absent as one locked step. Returns whether `value` was stored.
    pub fn try_safe_write(&self, key: &str, value: &str) -> IResult<bool> {
        self.update(|props| {
            if props.contains_key(key) {
                false
            } else {
                props.insert(key.to_owned(), value.to_owned());
                true
            }
        })
    }

    fn or_log<T>(&self, res: IResult<T>, op: &str, key: &str, default: T) -> T {
        match res {
            Ok(v) => v,
            Err(e) => {
                self.logger.log_error(&format!("{} `{}` failed: {}", op, key, e));
                default
            }
        }
    }

    /// Set `key` to `value`, replacing any previous value.
    pub fn write(&self, key: &str, value: &str) {
        let res = self.try_write(key, value);
        self.or_log(res, "write", key, ())
    }

    /// Value of `key`, or `None` if it is missing or the file is unreadable.
    pub fn read(&self, key: &str) -> Option<Value> {
        let res = self.try_read(key);
        self.or_log(res, "read", key, None)
    }

    pub fn exists(&self, key: &str) -> bool {
        let res = self.try_exists(key);
        self.or_log(res, "exists", key, false)
    }

    /// Store `value` only if `key` is not set yet.
    pub fn safe_write(&self, key: &str, value: &str) -> bool {
        let res = self.try_safe_write(key, value);
        self.or_log(res, "safe_write", key, false)
    }

    /// Value of `key`, or [`NO_VALUE`].
    pub fn safe_read(&self, key: &str) -> Value {
        self.read(key).unwrap_or_else(|| NO_VALUE.to_owned())
    }

    /// Integer value of `key`, ignoring anything but digits and a leading `-`.
    /// Missing keys, digitless values and overflow give `0`.
    pub fn safe_read_int(&self, key: &str) -> i64 {
        self.read(key).map_or(0, |raw| lenient_int(&raw))
    }

    /// `true` only for a stored `"true"`, in any case.
    pub fn safe_read_bool(&self, key: &str) -> bool {
        self.read(key).map_or(false, |raw| raw.eq_ignore_ascii_case("true"))
    }
}

fn lenient_int(raw: &str) -> i64 {
    // a `-` only counts before the first digit
    let negative = raw.chars().find(|c| c.is_ascii_digit() || *c == '-') == Some('-');
    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return 0
    }
    if negative {
        digits.insert(0, '-');
    }
    match digits.parse() {
        Ok(n) => n,
        Err(e) => {
            log::debug!("`{}` is not an integer ({}), using 0", raw, e);
            0
        }
    }
}
