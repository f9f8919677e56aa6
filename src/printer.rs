use std::fmt;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use log::{info, warn};

use crate::archive::Archive;
use crate::entry::Entry;
use crate::error::FileError;
use crate::factory::Factory;
use crate::parser::{is_delimiter, is_whitespace};

impl<F: Factory> Archive<F> {
    /// Writes the archive in canonical form: one `[name]` header per section (none for the null
    /// section, which always comes first) followed by `name=value,value` lines.
    ///
    /// # Errors
    ///
    /// Returns any error from `out`.
    pub fn print<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write!(out, "{self}")?;
        out.flush()
    }

    /// # Errors
    ///
    /// Returns [`FileError::Write`] if the file cannot be created or written.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> Result<(), FileError> {
        let path = path.as_ref();
        let write_error = |source| FileError::Write {
            path: path.to_owned(),
            source,
        };

        let file = File::create(path).map_err(write_error)?;
        self.print(&mut BufWriter::new(file)).map_err(write_error)?;

        info!("saved {} section(s) to {}", self.len(), path.display());
        Ok(())
    }
}

impl<F: Factory> fmt::Display for Archive<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bare entries after a header would be read back into that section.
        let null = self.sections().filter(|s| s.is_null());
        let named = self.sections().filter(|s| !s.is_null());

        for section in null.chain(named) {
            if !section.is_null() {
                writeln!(f, "[{}]", section.name())?;
            }

            for entry in section.entries() {
                write_entry(f, entry, self.comment_delimiters())?;
            }
        }

        Ok(())
    }
}

fn write_entry(f: &mut fmt::Formatter<'_>, entry: &Entry, comments: &str) -> fmt::Result {
    f.write_str(entry.name())?;

    for (i, value) in entry.values().enumerate() {
        f.write_str(if i == 0 { "=" } else { "," })?;

        match quote_for(value, comments) {
            Some(quote) => write!(f, "{quote}{value}{quote}")?,
            None => f.write_str(value)?,
        }
    }

    writeln!(f)
}

/// Picks the quote character needed for `value` to read back unchanged, if any.
fn quote_for(value: &str, comments: &str) -> Option<char> {
    let is_edge = |c: char| is_whitespace(c) || is_delimiter(c) || comments.contains(c);
    let needs_quotes = value.is_empty()
        || value.starts_with(is_edge)
        || value.ends_with(is_edge)
        || value.contains(|c: char| c == ',' || comments.contains(c));

    if !needs_quotes {
        None
    } else if !value.contains('"') {
        Some('"')
    } else if !value.contains('\'') {
        Some('\'')
    } else {
        warn!("value {value:?} contains both quote characters and cannot be quoted");
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::SectionOrder;
    use crate::factory::DefaultFactory;
    use crate::section::{NULL_SECTION_NAME, Section};

    fn entry(name: &str, values: &[&str]) -> Entry {
        let mut entry = Entry::new(name);
        entry.extend(values.iter().copied());
        entry
    }

    fn section(name: &str, entries: Vec<Entry>) -> Section {
        let mut section = Section::new(name);
        for entry in entries {
            section.add_entry(entry).unwrap();
        }
        section
    }

    #[test]
    fn canonical_output() {
        let mut archive = Archive::new();
        archive.add_section(section(
            "drivers",
            vec![entry("wave", &["mmdrv.dll"]), entry("flag", &[])],
        ));
        archive.add_section(section("FOO", vec![entry("foo1", &["val1", "val2", "val3"])]));

        assert_eq!(
            archive.to_string(),
            "[drivers]\nwave=mmdrv.dll\nflag\n[FOO]\nfoo1=val1,val2,val3\n"
        );
    }

    #[test]
    fn null_section_is_printed_bare_and_first() {
        let mut archive = Archive::with_factory(DefaultFactory, SectionOrder::Alphabetical);
        archive.add_section(section("A", vec![entry("a", &["1"])]));
        archive.add_section(section(NULL_SECTION_NAME, vec![entry("x", &["1"])]));

        assert_eq!(archive.to_string(), "x=1\n[A]\na=1\n");
    }

    #[test]
    fn values_are_quoted_when_needed() {
        assert_eq!(quote_for("plain value", "#;"), None);
        assert_eq!(quote_for("a,b", "#;"), Some('"'));
        assert_eq!(quote_for(" padded", "#;"), Some('"'));
        assert_eq!(quote_for("", "#;"), Some('"'));
        assert_eq!(quote_for("50;50", "#;"), Some('"'));
        assert_eq!(quote_for("50;50", "#"), None);
        assert_eq!(quote_for(r#""quoted""#, "#;"), Some('\''));
        assert_eq!(quote_for(r#"'both"'"#, "#;"), None);
    }

    #[test]
    fn print_to_writer() {
        let mut archive = Archive::new();
        archive.add_section(section("s", vec![entry("k", &["a,b", "c"])]));

        let mut out = Vec::new();
        archive.print(&mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), "[s]\nk=\"a,b\",c\n");
    }
}
