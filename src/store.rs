use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use log::{debug, warn};
use parking_lot::Mutex;

use crate::archive::{Archive, ArchiveConfig};
use crate::entry::Entry;
use crate::error::{FileError, LineError, ValueError};
use crate::factory::DefaultFactory;

/// Read-only, typed access to a loaded [`Archive`].
///
/// The `get_*` accessors never fail: a missing section or entry, or a first value that does not
/// parse, yields the caller's default (parse failures are logged). The `try_*` accessors report
/// the same conditions as [`ValueError`]s.
#[derive(Debug)]
pub struct ParameterStore {
    archive: Archive,
    path: Option<PathBuf>,
    line_errors: Vec<LineError>,
}

impl ParameterStore {
    #[must_use]
    pub fn new(archive: Archive) -> Self {
        Self {
            archive,
            path: None,
            line_errors: Vec::new(),
        }
    }

    /// # Errors
    ///
    /// See [`Archive::read_from_file`].
    pub fn open(path: impl AsRef<Path>, config: ArchiveConfig) -> Result<Self, FileError> {
        let path = path.as_ref();
        let mut archive = Archive::with_config(DefaultFactory, config);
        let line_errors = archive.read_from_file(path)?;

        Ok(Self {
            archive,
            path: Some(path.to_owned()),
            line_errors,
        })
    }

    #[must_use]
    pub fn archive(&self) -> &Archive {
        &self.archive
    }

    /// The file this store was loaded from, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Lines that were skipped while loading.
    #[must_use]
    pub fn line_errors(&self) -> &[LineError] {
        &self.line_errors
    }

    fn entry(&self, section: &str, name: &str) -> Result<&Entry, ValueError> {
        self.archive
            .section(section)
            .ok_or_else(|| ValueError::MissingSection {
                section: section.to_owned(),
            })?
            .entry(name)
            .ok_or_else(|| ValueError::MissingEntry {
                section: section.to_owned(),
                name: name.to_owned(),
            })
    }

    /// All values of the entry, empty if it does not exist.
    #[must_use]
    pub fn get_values(&self, section: &str, name: &str) -> &[String] {
        self.entry(section, name)
            .map(Entry::value_array)
            .unwrap_or_default()
    }

    /// Joins all values with `separator`, or returns `default` if there are none.
    #[must_use]
    pub fn get_joined(&self, section: &str, name: &str, separator: &str, default: &str) -> String {
        match self.get_values(section, name) {
            [] => default.to_owned(),
            values => values.join(separator),
        }
    }

    /// # Errors
    ///
    /// Returns [`ValueError`] if the section or entry is missing or the entry has no values.
    pub fn try_string(&self, section: &str, name: &str) -> Result<&str, ValueError> {
        self.entry(section, name)?
            .first_value()
            .ok_or_else(|| ValueError::NoValue {
                section: section.to_owned(),
                name: name.to_owned(),
            })
    }

    /// # Errors
    ///
    /// As [`ParameterStore::try_string`], plus [`ValueError::Invalid`] if the value is not an
    /// `i32`.
    pub fn try_int(&self, section: &str, name: &str) -> Result<i32, ValueError> {
        self.try_parse(section, name, "integer")
    }

    /// # Errors
    ///
    /// As [`ParameterStore::try_string`], plus [`ValueError::Invalid`] if the value is not a
    /// number.
    pub fn try_double(&self, section: &str, name: &str) -> Result<f64, ValueError> {
        self.try_parse(section, name, "number")
    }

    /// The first character of the first value.
    ///
    /// # Errors
    ///
    /// As [`ParameterStore::try_string`], plus [`ValueError::Invalid`] if the value is empty.
    pub fn try_char(&self, section: &str, name: &str) -> Result<char, ValueError> {
        let value = self.try_string(section, name)?;
        value
            .chars()
            .next()
            .ok_or_else(|| invalid(section, name, value, "character"))
    }

    /// Accepts exactly `true`, `TRUE`, `false` and `FALSE`.
    ///
    /// # Errors
    ///
    /// As [`ParameterStore::try_string`], plus [`ValueError::Invalid`] for any other token.
    pub fn try_bool(&self, section: &str, name: &str) -> Result<bool, ValueError> {
        match self.try_string(section, name)? {
            "true" | "TRUE" => Ok(true),
            "false" | "FALSE" => Ok(false),
            value => Err(invalid(section, name, value, "boolean")),
        }
    }

    fn try_parse<T: FromStr>(
        &self,
        section: &str,
        name: &str,
        expected: &'static str,
    ) -> Result<T, ValueError> {
        let value = self.try_string(section, name)?;
        value
            .parse()
            .map_err(|_| invalid(section, name, value, expected))
    }

    #[must_use]
    pub fn get_string<'a>(&'a self, section: &str, name: &str, default: &'a str) -> &'a str {
        lenient(self.try_string(section, name), default)
    }

    #[must_use]
    pub fn get_int(&self, section: &str, name: &str, default: i32) -> i32 {
        lenient(self.try_int(section, name), default)
    }

    #[must_use]
    pub fn get_double(&self, section: &str, name: &str, default: f64) -> f64 {
        lenient(self.try_double(section, name), default)
    }

    #[must_use]
    pub fn get_char(&self, section: &str, name: &str, default: char) -> char {
        lenient(self.try_char(section, name), default)
    }

    #[must_use]
    pub fn get_bool(&self, section: &str, name: &str, default: bool) -> bool {
        lenient(self.try_bool(section, name), default)
    }
}

fn invalid(section: &str, name: &str, value: &str, expected: &'static str) -> ValueError {
    ValueError::Invalid {
        section: section.to_owned(),
        name: name.to_owned(),
        value: value.to_owned(),
        expected,
    }
}

/// Missing data falls back quietly; malformed data falls back with a warning.
fn lenient<T>(result: Result<T, ValueError>, default: T) -> T {
    match result {
        Ok(value) => value,
        Err(error @ ValueError::Invalid { .. }) => {
            warn!("{error}, using default");
            default
        }
        Err(_) => default,
    }
}

/// One [`ParameterStore`] per file path, loaded at most once.
///
/// Failed loads are not cached, so a later request retries the file.
#[derive(Debug, Default)]
pub struct StoreCache {
    config: ArchiveConfig,
    stores: Mutex<HashMap<PathBuf, Arc<ParameterStore>>>,
}

impl StoreCache {
    #[must_use]
    pub fn new(config: ArchiveConfig) -> Self {
        Self {
            config,
            stores: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached store for `path`, loading it first if needed.
    ///
    /// The lock is held while loading, so concurrent callers for the same path wait for the
    /// first load instead of repeating it.
    ///
    /// # Errors
    ///
    /// See [`Archive::read_from_file`].
    pub fn get_or_load(&self, path: impl AsRef<Path>) -> Result<Arc<ParameterStore>, FileError> {
        let path = path.as_ref();
        let mut stores = self.stores.lock();

        if let Some(store) = stores.get(path) {
            return Ok(Arc::clone(store));
        }

        let store = Arc::new(ParameterStore::open(path, self.config.clone())?);
        debug!("caching parameters from {}", path.display());
        stores.insert(path.to_owned(), Arc::clone(&store));

        Ok(store)
    }

    /// Returns the store for `path` if it has already been loaded.
    #[must_use]
    pub fn get(&self, path: impl AsRef<Path>) -> Option<Arc<ParameterStore>> {
        self.stores.lock().get(path.as_ref()).cloned()
    }

    pub fn clear(&self) {
        self.stores.lock().clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stores.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stores.lock().is_empty()
    }
}
