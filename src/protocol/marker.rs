// src/protocol/marker.rs

//! Single-byte control markers that delimit records in the result stream.

/// A marker line in the executor's stdout.
///
/// Each marker occupies a line of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Marker {
    /// ASCII STX: results follow; everything before it is preamble chatter.
    StartOfResults,
    /// ASCII US: the previous record is complete, another one follows.
    Separator,
    /// ASCII ETX: the previous record is complete and the run is over.
    EndOfResults,
}

impl Marker {
    pub const START_OF_RESULTS: u8 = 0x02;
    pub const SEPARATOR: u8 = 0x1f;
    pub const END_OF_RESULTS: u8 = 0x03;

    pub fn byte(self) -> u8 {
        match self {
            Marker::StartOfResults => Self::START_OF_RESULTS,
            Marker::Separator => Self::SEPARATOR,
            Marker::EndOfResults => Self::END_OF_RESULTS,
        }
    }

    /// Recognise a (already trimmed) line as a marker.
    pub fn from_line(line: &str) -> Option<Marker> {
        match line.as_bytes() {
            [Self::START_OF_RESULTS] => Some(Marker::StartOfResults),
            [Self::SEPARATOR] => Some(Marker::Separator),
            [Self::END_OF_RESULTS] => Some(Marker::EndOfResults),
            _ => None,
        }
    }

    /// The marker as a line, without the trailing newline.
    pub fn as_str(self) -> &'static str {
        match self {
            Marker::StartOfResults => "\u{2}",
            Marker::Separator => "\u{1f}",
            Marker::EndOfResults => "\u{3}",
        }
    }
}

/// Decode one raw line read from a pipe.
///
/// Invalid UTF-8 is replaced rather than rejected, and surrounding ASCII
/// whitespace (including the line terminator) is removed. Control markers
/// are not whitespace and survive.
pub fn clean_line(raw: &[u8]) -> String {
    let text = String::from_utf8_lossy(raw);
    text.trim_matches(|c: char| matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'))
        .to_string()
}

/// Drop a leading terminal escape sequence that some tools print before
/// the JSON payload.
pub fn strip_escape_prefix(line: &str) -> &str {
    if line.starts_with('\x1b') {
        if let Some(idx) = line.find('{') {
            return &line[idx..];
        }
    }
    line
}
