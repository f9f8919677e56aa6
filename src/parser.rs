use crate::error::{MalformedEntry, ParseError};

pub(crate) const WHITESPACE: &[char] = &[' ', '\t', '\r', '\n'];
pub(crate) const DELIMITERS: &[char] = &['[', ']', ',', '=', '\'', '"'];

pub(crate) fn is_whitespace(c: char) -> bool {
    WHITESPACE.contains(&c)
}

pub(crate) fn is_delimiter(c: char) -> bool {
    DELIMITERS.contains(&c)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Line<'a> {
    Blank,
    Comment,
    Header(&'a str),
    Entry(&'a str),
}

/// Decides what a raw line is. Comments win over headers, and a `[` anywhere makes a header.
pub(crate) fn classify<'a>(line: &'a str, comments: &str) -> Line<'a> {
    match line.chars().find(|&c| !is_whitespace(c)) {
        None => Line::Blank,
        Some(c) if comments.contains(c) => Line::Comment,
        Some(_) if line.contains('[') => Line::Header(line),
        Some(_) => Line::Entry(line),
    }
}

/// Extracts the name between the first `[` and the first `]`. Anything around them is ignored.
pub(crate) fn parse_header(line: &str) -> Result<&str, ParseError> {
    let start = line.find('[').ok_or(ParseError::MalformedHeader)?;
    let end = line.find(']').ok_or(ParseError::MalformedHeader)?;

    if end < start {
        return Err(ParseError::MalformedHeader);
    }

    let name = line[start + 1..end].trim_matches(|c| is_whitespace(c) || is_delimiter(c));

    if name.is_empty() {
        Err(ParseError::MalformedHeader)
    } else {
        Ok(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedEntry<'a> {
    pub name: &'a str,
    pub values: Vec<String>,
}

/// Splits an entry line into its name and values.
///
/// The name runs up to the first `=`, or to the end of the line for a flag without values.
/// Comment delimiters inside it are kept; only trailing ones are trimmed. Values follow the `=`
/// and are separated by commas; see [`Scanner`] for the per-character rules.
pub(crate) fn parse_entry<'a>(
    line: &'a str,
    comments: &str,
) -> Result<ParsedEntry<'a>, MalformedEntry> {
    let split = line.find('=');
    let raw_name = split.map_or(line, |i| &line[..i]);
    let name = raw_name
        .trim_start_matches(|c| is_whitespace(c) || is_delimiter(c))
        .trim_end_matches(|c| is_whitespace(c) || is_delimiter(c) || comments.contains(c));

    if name.is_empty() {
        return Err(MalformedEntry::EmptyName);
    }

    let values = match split {
        Some(i) => Scanner::new(&line[i + 1..], comments).run()?,
        None => Vec::new(),
    };

    Ok(ParsedEntry { name, values })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Between values: skipping whitespace, delimiters and commas.
    Start,
    /// Inside an unquoted value that began at `start`.
    Unquoted { start: usize },
    /// Inside a value quoted with `quote`, whose text begins at `start`.
    Quoted { quote: char, start: usize },
    /// The rest of the line is a comment.
    Comment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Comment,
    Quote(char),
    Separator,
    Skip,
    Other,
}

impl CharClass {
    fn of(c: char, comments: &str) -> Self {
        match c {
            c if comments.contains(c) => Self::Comment,
            '\'' | '"' => Self::Quote(c),
            ',' => Self::Separator,
            c if is_whitespace(c) || is_delimiter(c) => Self::Skip,
            _ => Self::Other,
        }
    }
}

/// Value tokenizer for the text after `=`.
#[derive(Debug)]
struct Scanner<'a> {
    text: &'a str,
    comments: &'a str,
    state: State,
    values: Vec<String>,
}

impl<'a> Scanner<'a> {
    fn new(text: &'a str, comments: &'a str) -> Self {
        Self {
            text,
            comments,
            state: State::Start,
            values: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<String>, MalformedEntry> {
        for (i, c) in self.text.char_indices() {
            self.state = match CharClass::of(c, self.comments) {
                CharClass::Comment => self.on_comment(i)?,
                CharClass::Quote(q) => self.on_quote(i, q),
                CharClass::Separator => self.on_separator(i)?,
                CharClass::Skip => self.on_skip(),
                CharClass::Other => self.on_other(i),
            };

            if self.state == State::Comment {
                break;
            }
        }

        let state = self.state;
        match state {
            State::Start if self.values.is_empty() => return Err(MalformedEntry::EmptyValue),
            State::Start | State::Comment => {}
            State::Unquoted { start } => self.push_trimmed(start, self.text.len())?,
            State::Quoted { quote, .. } => return Err(MalformedEntry::UnterminatedQuote { quote }),
        }

        Ok(self.values)
    }

    fn on_comment(&mut self, i: usize) -> Result<State, MalformedEntry> {
        match self.state {
            State::Start | State::Comment => Ok(State::Comment),
            State::Unquoted { start } => {
                self.push_trimmed(start, i)?;
                Ok(State::Comment)
            }
            // Comment delimiters inside quotes are literal text.
            quoted @ State::Quoted { .. } => Ok(quoted),
        }
    }

    fn on_quote(&mut self, i: usize, q: char) -> State {
        match self.state {
            State::Start => State::Quoted {
                quote: q,
                start: i + q.len_utf8(),
            },
            State::Quoted { quote, start } if quote == q => {
                self.values.push(self.text[start..i].to_owned());
                State::Start
            }
            other => other,
        }
    }

    fn on_separator(&mut self, i: usize) -> Result<State, MalformedEntry> {
        match self.state {
            State::Unquoted { start } => {
                self.push_trimmed(start, i)?;
                Ok(State::Start)
            }
            other => Ok(other),
        }
    }

    fn on_skip(&self) -> State {
        self.state
    }

    fn on_other(&self, i: usize) -> State {
        match self.state {
            State::Start => State::Unquoted { start: i },
            other => other,
        }
    }

    /// Pushes `text[start..end]` without trailing whitespace, delimiters and comment characters.
    fn push_trimmed(&mut self, start: usize, end: usize) -> Result<(), MalformedEntry> {
        let comments = self.comments;
        let value = self.text[start..end]
            .trim_end_matches(|c| is_whitespace(c) || is_delimiter(c) || comments.contains(c));

        if value.is_empty() {
            return Err(MalformedEntry::EmptyValue);
        }

        self.values.push(value.to_owned());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMMENTS: &str = "#;";

    fn values(line: &str) -> Vec<String> {
        parse_entry(line, COMMENTS)
            .expect("expected hardcoded entry to be valid")
            .values
    }

    #[test]
    fn classify_lines() {
        assert_eq!(classify("", COMMENTS), Line::Blank);
        assert_eq!(classify(" \t\r", COMMENTS), Line::Blank);
        assert_eq!(classify("  # [not a header]", COMMENTS), Line::Comment);
        assert_eq!(classify("; note", COMMENTS), Line::Comment);
        assert_eq!(classify("junk [386Enh]", COMMENTS), Line::Header("junk [386Enh]"));
        assert_eq!(classify("key = value", COMMENTS), Line::Entry("key = value"));
        assert_eq!(classify("; entry", "#"), Line::Entry("; entry"));
    }

    #[test]
    fn header_names_are_trimmed() {
        assert_eq!(parse_header("[drivers]"), Ok("drivers"));
        assert_eq!(parse_header("  [ mci ]   # comment"), Ok("mci"));
        assert_eq!(parse_header("prefix[\"quoted\"]suffix"), Ok("quoted"));
        assert_eq!(parse_header("[a[b]"), Ok("a[b"));
    }

    #[test]
    fn malformed_headers() {
        assert_eq!(parse_header("[unterminated"), Err(ParseError::MalformedHeader));
        assert_eq!(parse_header("]backwards["), Err(ParseError::MalformedHeader));
        assert_eq!(parse_header("[]"), Err(ParseError::MalformedHeader));
        assert_eq!(parse_header("[ , ]"), Err(ParseError::MalformedHeader));
    }

    #[test]
    fn entry_without_equals_is_a_flag() {
        let entry = parse_entry("  test_entry3  ", COMMENTS).unwrap();
        assert_eq!(entry.name, "test_entry3");
        assert!(entry.values.is_empty());

        let entry = parse_entry("flag ;", COMMENTS).unwrap();
        assert_eq!(entry.name, "flag");
        assert!(entry.values.is_empty());
    }

    #[test]
    fn comment_delimiters_inside_names_are_kept() {
        let entry = parse_entry("key;x = v", COMMENTS).unwrap();
        assert_eq!(entry.name, "key;x");
        assert_eq!(entry.values, ["v"]);

        let entry = parse_entry("a#b=1", COMMENTS).unwrap();
        assert_eq!(entry.name, "a#b");
        assert_eq!(entry.values, ["1"]);
    }

    #[test]
    fn comma_separated_values() {
        assert_eq!(values("test_entry1 = val1, val2, val3"), ["val1", "val2", "val3"]);
        assert_eq!(values("EGA80WOA.FON=EGA80WOA.FON"), ["EGA80WOA.FON"]);
    }

    #[test]
    fn empty_tokens_between_commas_are_skipped() {
        assert_eq!(values("k = a,,b,"), ["a", "b"]);
    }

    #[test]
    fn quoted_values_keep_commas_and_spaces() {
        assert_eq!(values(r#"k = "a,b", c"#), ["a,b", "c"]);
        assert_eq!(values("k = ' padded ' "), [" padded "]);
        assert_eq!(values(r#"k = 'say "hi"'"#), [r#"say "hi""#]);
        assert_eq!(values(r#"k = """#), [""]);
    }

    #[test]
    fn comment_inside_quotes_is_text() {
        assert_eq!(values(r#"k = "v1 # not a comment"; real"#), ["v1 # not a comment"]);
    }

    #[test]
    fn inline_comment_ends_values() {
        assert_eq!(values("k = v1 # trailing"), ["v1"]);
        assert_eq!(values("waveSysChange=mmdrv.dll   ;this is a comment"), ["mmdrv.dll"]);
        assert_eq!(values("k = a, b;c, d"), ["a", "b"]);
    }

    #[test]
    fn comment_right_after_equals_gives_no_values() {
        assert!(values("k = # nothing").is_empty());
    }

    #[test]
    fn unquoted_values_keep_inner_text() {
        assert_eq!(values("k = hello world"), ["hello world"]);
        assert_eq!(values("k = a=b"), ["a=b"]);
        assert_eq!(values("k = it's"), ["it's"]);
    }

    #[test]
    fn trailing_delimiters_are_stripped() {
        assert_eq!(values("k = value]  "), ["value"]);
    }

    #[test]
    fn custom_comment_set() {
        let entry = parse_entry("url = a;b # c", "#").unwrap();
        assert_eq!(entry.values, ["a;b"]);
    }

    #[test]
    fn malformed_entries() {
        assert_eq!(parse_entry("k =", COMMENTS), Err(MalformedEntry::EmptyValue));
        assert_eq!(parse_entry("k = , ,", COMMENTS), Err(MalformedEntry::EmptyValue));
        assert_eq!(parse_entry("= v", COMMENTS), Err(MalformedEntry::EmptyName));
        assert_eq!(
            parse_entry(r#"k = "open"#, COMMENTS),
            Err(MalformedEntry::UnterminatedQuote { quote: '"' })
        );
        assert_eq!(
            parse_entry("k = 'open", COMMENTS),
            Err(MalformedEntry::UnterminatedQuote { quote: '\'' })
        );
    }

    #[test]
    fn scanner_states() {
        let mut scanner = Scanner::new("ab, 'c'", COMMENTS);
        scanner.state = scanner.on_other(0);
        assert_eq!(scanner.state, State::Unquoted { start: 0 });

        scanner.state = scanner.on_separator(2).unwrap();
        assert_eq!(scanner.state, State::Start);
        assert_eq!(scanner.values, ["ab"]);

        scanner.state = scanner.on_skip();
        assert_eq!(scanner.state, State::Start);

        scanner.state = scanner.on_quote(4, '\'');
        assert_eq!(scanner.state, State::Quoted { quote: '\'', start: 5 });

        assert_eq!(scanner.on_quote(5, '"'), scanner.state);
        assert_eq!(scanner.on_comment(5), Ok(scanner.state));

        scanner.state = scanner.on_quote(6, '\'');
        assert_eq!(scanner.state, State::Start);
        assert_eq!(scanner.values, ["ab", "c"]);
    }
}
