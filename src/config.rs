use crate::{fs, sync::*};
/// Identity of one configuration file
use std::path::{PathBuf, MAIN_SEPARATOR};

/// Suffix of every backing file.
pub const EXTENSION: &str = ".sanfig";

/// Subdirectory of the execution directory used when no location is given.
pub const DEFAULT_SUBDIR: &str = "config";

#[derive(Clone, Debug)]
pub struct Config(Arc<ConfigInner>);

impl Config {
    /// Config named `name` under `<execution dir>/config/`.
    pub fn new(name: impl Into<String>) -> Self {
        ConfigBuilder::new(name).build()
    }

    /// Config named `name` under `location`.
    ///
    /// `location` is concatenated as-is, so it should end with a separator.
    pub fn with_location(name: impl Into<String>, location: impl Into<String>) -> Self {
        ConfigBuilder::new(name).location(location).build()
    }

    pub fn builder(name: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(name)
    }
}

impl std::ops::Deref for Config {
    type Target = ConfigInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigInner {
    /// Base name of the file
    pub name: String,
    /// Directory of the file, separator included
    pub location: String,
    /// `location + name + EXTENSION`
    pub path: PathBuf,
}

impl ConfigInner {
    /// Directory part to ensure on open. Empty means the working directory.
    pub(crate) fn directory(&self) -> Option<PathBuf> {
        if self.location.is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.location))
        }
    }
}

#[derive(Clone, Debug)]
pub struct ConfigBuilder {
    name: String,
    location: Option<String>,
}

impl ConfigBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), location: None }
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location.replace(location.into());
        self
    }

    pub fn build(self) -> Config {
        let location = match self.location {
            Some(location) => location,
            None => default_location(),
        };
        let path = PathBuf::from(format!("{}{}{}", location, self.name, EXTENSION));

        Config(Arc::new(ConfigInner { name: self.name, location, path }))
    }
}

/// `<execution dir>/config/`, falling back to a relative `config/`.
pub fn default_location() -> String {
    match fs::current_execution_directory() {
        Ok(dir) => join_location(&dir.to_string_lossy()),
        Err(e) => {
            log::warn!("cannot resolve execution directory: {}", e);
            join_location(".")
        }
    }
}

fn join_location(base: &str) -> String {
    let mut location = base.to_owned();
    if !location.ends_with(MAIN_SEPARATOR) {
        location.push(MAIN_SEPARATOR);
    }
    location.push_str(DEFAULT_SUBDIR);
    location.push(MAIN_SEPARATOR);
    location
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_is_plain_concatenation() {
        let config = Config::with_location("app", "/srv/conf/");
        assert_eq!(config.name, "app");
        assert_eq!(config.location, "/srv/conf/");
        assert_eq!(config.path, PathBuf::from("/srv/conf/app.sanfig"));
    }

    #[test]
    fn missing_separator_is_not_fixed_up() {
        let config = Config::with_location("app", "/srv/conf");
        assert_eq!(config.path, PathBuf::from("/srv/confapp.sanfig"));
    }

    #[test]
    fn default_location_ends_in_config_dir() {
        let config = Config::new("app");
        let suffix = format!("{}{}{}", MAIN_SEPARATOR, DEFAULT_SUBDIR, MAIN_SEPARATOR);
        assert!(config.location.ends_with(&suffix), "{}", config.location);

        let exe_dir = fs::current_execution_directory().unwrap();
        assert!(config.location.starts_with(&*exe_dir.to_string_lossy()));
    }

    #[test]
    fn clones_share_identity() {
        let a = Config::with_location("app", "/srv/");
        let b = a.clone();
        assert_eq!(*a, *b);
    }
}
