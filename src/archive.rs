use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use log::{debug, info, warn};

use crate::error::{FileError, LineError, ParseError};
use crate::factory::{DefaultFactory, Factory};
use crate::parser::{self, Line};
use crate::section::{NULL_SECTION_NAME, Section};

/// How [`Archive::sections`] orders its output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SectionOrder {
    /// First-insertion order.
    #[default]
    Insertion,
    /// Lexicographic order of section names.
    Alphabetical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveConfig {
    pub order: SectionOrder,
    /// Characters that start a comment, either as the first non-blank character of a line or
    /// inline after a value.
    pub comment_delimiters: String,
}

impl ArchiveConfig {
    pub const DEFAULT_COMMENT_DELIMITERS: &'static str = "#;";

    /// Settings for flat `.properties` files, where `;` is ordinary text.
    #[must_use]
    pub fn properties() -> Self {
        Self {
            comment_delimiters: "#".to_owned(),
            ..Self::default()
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            order: SectionOrder::default(),
            comment_delimiters: Self::DEFAULT_COMMENT_DELIMITERS.to_owned(),
        }
    }
}

/// An in-memory configuration document: uniquely named [`Section`]s of [`crate::Entry`]s.
///
/// Populate it with [`Archive::add_section`] or by reading text, and serialize it back with
/// [`Archive::print`] or [`Archive::write_to_file`]. Comments and layout are not kept.
#[derive(Debug, Clone)]
pub struct Archive<F = DefaultFactory> {
    sections: HashMap<String, Section>,
    order: Vec<String>,
    section_order: SectionOrder,
    comment_delimiters: String,
    factory: F,
}

impl Archive {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DefaultFactory, ArchiveConfig::default())
    }
}

impl Default for Archive {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: Factory> Archive<F> {
    #[must_use]
    pub fn with_factory(factory: F, order: SectionOrder) -> Self {
        Self::with_config(
            factory,
            ArchiveConfig {
                order,
                ..ArchiveConfig::default()
            },
        )
    }

    #[must_use]
    pub fn with_config(factory: F, config: ArchiveConfig) -> Self {
        Self {
            sections: HashMap::new(),
            order: Vec::new(),
            section_order: config.order,
            comment_delimiters: config.comment_delimiters,
            factory,
        }
    }

    /// Replaces the comment delimiters used by later reads and writes, returning the old ones.
    pub fn set_comment_delimiters(&mut self, delimiters: impl Into<String>) -> String {
        std::mem::replace(&mut self.comment_delimiters, delimiters.into())
    }

    #[must_use]
    pub fn comment_delimiters(&self) -> &str {
        &self.comment_delimiters
    }

    #[must_use]
    pub fn order(&self) -> SectionOrder {
        self.section_order
    }

    #[must_use]
    pub fn factory(&self) -> &F {
        &self.factory
    }

    #[must_use]
    pub fn has_section(&self, name: &str) -> bool {
        self.sections.contains_key(name)
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn section_mut(&mut self, name: &str) -> Option<&mut Section> {
        self.sections.get_mut(name)
    }

    /// Sections in the archive's [`SectionOrder`].
    pub fn sections(&self) -> impl Iterator<Item = &Section> + '_ {
        self.order.iter().filter_map(|name| self.sections.get(name))
    }

    /// Adds `section`, returning `false` (and dropping it) if the name is taken.
    pub fn add_section(&mut self, section: Section) -> bool {
        if self.has_section(section.name()) {
            return false;
        }

        let name = section.name().to_owned();

        match self.section_order {
            SectionOrder::Insertion => self.order.push(name.clone()),
            SectionOrder::Alphabetical => {
                let i = self.order.partition_point(|existing| *existing < name);
                self.order.insert(i, name.clone());
            }
        }

        self.sections.insert(name, section);
        true
    }

    pub fn remove_section(&mut self, name: &str) -> Option<Section> {
        let section = self.sections.remove(name)?;
        self.order.retain(|n| n != name);
        Some(section)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Reads the file at `path` into this archive.
    ///
    /// Lines that cannot be understood are logged and skipped; they are returned so the caller
    /// can report them.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::NotFound`] if `path` does not exist and [`FileError::Read`] if the
    /// file cannot be read. Sections read before a failure stay in the archive.
    pub fn read_from_file(&mut self, path: impl AsRef<Path>) -> Result<Vec<LineError>, FileError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => FileError::NotFound {
                path: path.to_owned(),
            },
            _ => {
                warn!("cannot open {}: {source}", path.display());
                FileError::Read {
                    path: path.to_owned(),
                    source,
                }
            }
        })?;

        let errors = self
            .read(BufReader::new(file))
            .map_err(|source| FileError::Read {
                path: path.to_owned(),
                source,
            })?;

        info!(
            "loaded {} section(s) from {} ({} line error(s))",
            self.len(),
            path.display(),
            errors.len()
        );

        Ok(errors)
    }

    /// Reads line-oriented text from `reader` into this archive.
    ///
    /// Input starting with a UTF-16 LE byte order mark is decoded as UTF-16, anything else as
    /// (lossy) UTF-8.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error from `reader`. Lines read before it stay in the archive.
    pub fn read<R: BufRead>(&mut self, mut reader: R) -> io::Result<Vec<LineError>> {
        let is_utf16 = reader
            .fill_buf()
            .inspect_err(|e| warn!("read aborted before the first line: {e}"))?
            .starts_with(crate::BOM_UTF16_LE);

        if is_utf16 {
            let mut data = Vec::new();
            reader
                .read_to_end(&mut data)
                .inspect_err(|e| warn!("read aborted: {e}"))?;
            return Ok(self.parse(&crate::decode_data(&data)));
        }

        let mut state = ReadState::default();
        let mut buffer = Vec::with_capacity(256);
        let mut number = 0;

        loop {
            buffer.clear();
            let read = reader
                .read_until(b'\n', &mut buffer)
                .inspect_err(|e| warn!("read aborted after line {number}: {e}"))?;
            if read == 0 {
                break;
            }
            number += 1;

            let bytes = if number == 1 {
                buffer.strip_prefix(crate::BOM_UTF8).unwrap_or(buffer.as_slice())
            } else {
                buffer.as_slice()
            };
            let line = String::from_utf8_lossy(bytes);
            state.line(self, number, strip_line_ending(&line));
        }

        Ok(state.errors)
    }

    /// Parses in-memory text into this archive. See [`Archive::read`].
    pub fn parse(&mut self, text: &str) -> Vec<LineError> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut state = ReadState::default();

        for (i, line) in text.lines().enumerate() {
            state.line(self, i + 1, line);
        }

        state.errors
    }

    /// Returns the name of the section entries appearing before any header go into, creating
    /// it on first use.
    fn null_section(&mut self) -> String {
        let section = self.factory.new_section(NULL_SECTION_NAME);
        let name = section.name().to_owned();

        if self.add_section(section) {
            debug!("created section for entries without a header");
        }

        name
    }
}

fn strip_line_ending(line: &str) -> &str {
    let line = line.strip_suffix('\n').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Where entry lines currently go.
#[derive(Debug, Default)]
enum Target {
    /// No header seen yet.
    #[default]
    None,
    Section(String),
    /// The last header was rejected; its entries are dropped with it.
    Discarded,
}

/// State carried across the lines of one read.
#[derive(Debug, Default)]
struct ReadState {
    target: Target,
    errors: Vec<LineError>,
}

impl ReadState {
    fn line<F: Factory>(&mut self, archive: &mut Archive<F>, number: usize, line: &str) {
        let result = match parser::classify(line, &archive.comment_delimiters) {
            Line::Blank | Line::Comment => Ok(()),
            Line::Header(line) => self.header(archive, line),
            Line::Entry(line) => self.entry(archive, line),
        };

        if let Err(error) = result {
            warn!("line {number}: {error}: {line:?}");
            self.errors.push(LineError {
                line: number,
                error,
            });
        }
    }

    fn header<F: Factory>(&mut self, archive: &mut Archive<F>, line: &str) -> Result<(), ParseError> {
        let name = parser::parse_header(line)?;
        let section = archive.factory.new_section(name);
        let name = section.name().to_owned();

        if archive.add_section(section) {
            debug!("added section {name:?}");
            self.target = Target::Section(name);
            Ok(())
        } else {
            self.target = Target::Discarded;
            Err(ParseError::DuplicateSection { name })
        }
    }

    fn entry<F: Factory>(&mut self, archive: &mut Archive<F>, line: &str) -> Result<(), ParseError> {
        let section_name = match &self.target {
            Target::Section(name) => name.clone(),
            Target::None => {
                let name = archive.null_section();
                self.target = Target::Section(name.clone());
                name
            }
            Target::Discarded => {
                debug!("dropping entry of rejected section: {line:?}");
                return Ok(());
            }
        };

        let parsed = parser::parse_entry(line, &archive.comment_delimiters)?;
        let mut entry = archive.factory.new_entry(parsed.name);
        entry.extend(parsed.values);

        if let Some(section) = archive.sections.get_mut(&section_name) {
            section.merge_entry(entry);
        }

        Ok(())
    }
}
