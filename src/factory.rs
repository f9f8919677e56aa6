use crate::entry::Entry;
use crate::section::Section;

/// Creates the sections and entries an [`crate::Archive`] fills while reading.
///
/// Swap it out to post-process names or pre-populate new objects.
pub trait Factory {
    fn new_section(&self, name: &str) -> Section;

    fn new_entry(&self, name: &str) -> Entry;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultFactory;

impl Factory for DefaultFactory {
    fn new_section(&self, name: &str) -> Section {
        Section::new(name)
    }

    fn new_entry(&self, name: &str) -> Entry {
        Entry::new(name)
    }
}

/// Folds section and entry names to lowercase, for case-insensitive lookups.
///
/// The null section keeps its reserved name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LowercaseFactory;

impl Factory for LowercaseFactory {
    fn new_section(&self, name: &str) -> Section {
        if name == crate::NULL_SECTION_NAME {
            Section::new(name)
        } else {
            Section::new(name.to_lowercase())
        }
    }

    fn new_entry(&self, name: &str) -> Entry {
        Entry::new(name.to_lowercase())
    }
}
