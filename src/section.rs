use std::collections::HashMap;

use crate::entry::Entry;
use crate::error::ParseError;

/// Name reserved for the section that holds entries appearing before any `[header]`.
///
/// Header names are stripped of brackets on both ends, so no parsed header can produce it.
pub const NULL_SECTION_NAME: &str = "[null]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    name: String,
    entries: HashMap<String, Entry>,
    // Keeps printing deterministic. Callers should not rely on entry order.
    order: Vec<String>,
}

impl Section {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: HashMap::new(),
            order: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        self.name == NULL_SECTION_NAME
    }

    /// # Errors
    ///
    /// Returns [`ParseError::DuplicateEntry`] if an entry with the same name is already present.
    pub fn add_entry(&mut self, entry: Entry) -> Result<(), ParseError> {
        if self.entries.contains_key(entry.name()) {
            return Err(ParseError::DuplicateEntry {
                name: entry.name().to_owned(),
            });
        }

        self.order.push(entry.name().to_owned());
        self.entries.insert(entry.name().to_owned(), entry);
        Ok(())
    }

    /// Adds `entry`, appending its values to an existing entry of the same name instead.
    pub(crate) fn merge_entry(&mut self, entry: Entry) {
        if let Some(existing) = self.entries.get_mut(entry.name()) {
            existing.merge(entry);
        } else {
            self.order.push(entry.name().to_owned());
            self.entries.insert(entry.name().to_owned(), entry);
        }
    }

    #[must_use]
    pub fn has_entry(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.entries.get(name)
    }

    pub fn entry_mut(&mut self, name: &str) -> Option<&mut Entry> {
        self.entries.get_mut(name)
    }

    pub fn remove_entry(&mut self, name: &str) -> Option<Entry> {
        let entry = self.entries.remove(name)?;
        self.order.retain(|n| n != name);
        Some(entry)
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.order.iter().filter_map(|name| self.entries.get(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_entry_is_rejected() {
        let mut section = Section::new("drivers");
        section.add_entry(Entry::new("wave")).unwrap();

        assert_eq!(
            section.add_entry(Entry::new("wave")),
            Err(ParseError::DuplicateEntry {
                name: "wave".to_owned()
            })
        );
        assert_eq!(section.len(), 1);
    }

    #[test]
    fn merge_appends_values_to_existing_entry() {
        let mut section = Section::new("FOO");

        let mut first = Entry::new("foo1");
        first.add_value("val1");
        section.merge_entry(first);

        let mut second = Entry::new("foo1");
        second.add_value("val2");
        section.merge_entry(second);

        let entry = section.entry("foo1").unwrap();
        assert_eq!(entry.value_array(), ["val1", "val2"]);
        assert_eq!(section.len(), 1);
    }

    #[test]
    fn lookup_misses_are_none() {
        let section = Section::new("empty");

        assert!(!section.has_entry("nope"));
        assert!(section.entry("nope").is_none());
        assert!(section.is_empty());
    }

    #[test]
    fn remove_entry() {
        let mut section = Section::new("s");
        section.add_entry(Entry::new("a")).unwrap();
        section.add_entry(Entry::new("b")).unwrap();

        assert!(section.remove_entry("a").is_some());
        assert!(section.remove_entry("a").is_none());
        assert_eq!(
            section.entries().map(Entry::name).collect::<Vec<_>>(),
            ["b"]
        );
    }

    #[test]
    fn null_section() {
        assert!(Section::new(NULL_SECTION_NAME).is_null());
        assert!(!Section::new("null").is_null());
    }
}
