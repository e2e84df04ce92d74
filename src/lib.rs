//! Flat `key=value` configuration files that never take the host down.
//!
//! A [`ConfigStore`] is bound to `location + name + ".sanfig"`. Every call
//! re-reads the file, and every write rewrites it. The plain API logs
//! failures and falls back to defaults; the `try_*` family returns them.
//!
//! ```no_run
//! use sanfig::ConfigStore;
//!
//! let store = ConfigStore::with_location("app", "/tmp/sanfig/");
//! store.safe_write("retries", "5");
//! assert_eq!(store.safe_read_int("retries"), 5);
//! ```

pub mod prelude {
    pub use super::Error;

    pub use super::{
        config::{Config, ConfigBuilder, EXTENSION},
        logger::{LogSink, Logger, MemoryLogger},
        store::{ConfigStore, NO_VALUE},
    };

    pub type Key = String;
    pub type Value = String;
    pub type Properties = std::collections::BTreeMap<Key, Value>;
    pub type IResult<T> = Result<T, Error>;
}

mod sync {
    pub use parking_lot::Mutex;
    pub use std::sync::Arc;
}

mod config;
pub mod fs;
mod lock;
mod logger;
pub mod properties;
mod store;

pub use config::{Config, ConfigBuilder, ConfigInner, EXTENSION};
pub use logger::{LogSink, Logger, MemoryLogger};
pub use store::{ConfigStore, NO_VALUE};

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed properties at line {line}: {reason}")]
    Malformed { line: usize, reason: &'static str },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Error {
        let path = path.into();
        move |source| Error::Io { path, source }
    }
}
