//! X12 segment tokenizer.
//!
//! Splits raw X12 text into ordered segments using the delimiters the
//! document declares about itself in the fixed-width ISA header window.

use std::io::Cursor;

use csv::{ReaderBuilder, StringRecord, Terminator};
use x12_types::Segment;

use crate::types::{X12Error, X12Result};

/// Fixed length of the ISA segment including its terminator.
pub const ISA_WINDOW_LEN: usize = 106;

/// Byte position of the element separator within the ISA window.
const ELEMENT_POS: usize = 3;
/// Byte position of the repetition separator (ISA11).
const REPETITION_POS: usize = 82;
/// Byte position of the component separator (ISA16).
const COMPONENT_POS: usize = 104;
/// Byte position of the segment terminator.
const TERMINATOR_POS: usize = 105;

/// Delimiters discovered from an interchange header.
///
/// # Examples
///
/// ```
/// # fn isa() -> String {
/// #     format!(
/// #         "ISA*00*{:10}*00*{:10}*ZZ*{:15}*ZZ*{:15}*240115*1200*^*00501*000000001*0*P*:~",
/// #         "", "", "SUBMITTER", "RECEIVER"
/// #     )
/// # }
/// use x12_parser::Delimiters;
///
/// let delims = Delimiters::from_header(&isa()).unwrap();
/// assert_eq!(delims.element, '*');
/// assert_eq!(delims.component, ':');
/// assert_eq!(delims.segment, '~');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiters {
    /// Element separator (ISA byte 3).
    pub element: char,
    /// Component separator for composite elements (ISA16).
    pub component: char,
    /// Repetition separator (ISA11). Older interchange versions carry `U`
    /// here, so this one is not held to the collision rules.
    pub repetition: char,
    /// Segment terminator.
    pub segment: char,
}

impl Delimiters {
    /// Discovers delimiters from the fixed-position ISA header window.
    ///
    /// # Errors
    /// Returns [`X12Error::MalformedEnvelope`] when the input is shorter
    /// than the 106-byte window, does not begin with `ISA`, or declares
    /// structural delimiters that collide (two equal, or alphanumeric).
    pub fn from_header(text: &str) -> X12Result<Self> {
        let bytes = text.as_bytes();

        if bytes.len() < ISA_WINDOW_LEN {
            return Err(X12Error::MalformedEnvelope {
                reason: format!(
                    "header is {} bytes, ISA window requires {}",
                    bytes.len(),
                    ISA_WINDOW_LEN
                ),
                offset: bytes.len(),
            });
        }

        if &bytes[..3] != b"ISA" {
            return Err(X12Error::MalformedEnvelope {
                reason: "input does not begin with an ISA segment".to_string(),
                offset: 0,
            });
        }

        let delims = Self {
            element: bytes[ELEMENT_POS] as char,
            repetition: bytes[REPETITION_POS] as char,
            component: bytes[COMPONENT_POS] as char,
            segment: bytes[TERMINATOR_POS] as char,
        };

        for (ch, offset) in [
            (delims.element, ELEMENT_POS),
            (delims.component, COMPONENT_POS),
            (delims.segment, TERMINATOR_POS),
        ] {
            if ch.is_ascii_alphanumeric() {
                return Err(X12Error::MalformedEnvelope {
                    reason: format!("delimiter {ch:?} collides with a reserved character"),
                    offset,
                });
            }
        }

        if delims.element == delims.component
            || delims.element == delims.segment
            || delims.component == delims.segment
        {
            return Err(X12Error::MalformedEnvelope {
                reason: format!(
                    "contradictory delimiters: element {:?}, component {:?}, segment {:?}",
                    delims.element, delims.component, delims.segment
                ),
                offset: ELEMENT_POS,
            });
        }

        Ok(delims)
    }
}

/// A lazy tokenizer over one interchange.
///
/// Yields [`Segment`]s in source order. Tokenizing is a pure function of
/// the input text: constructing a new tokenizer over the same buffer
/// restarts the sequence from the top.
pub struct SegmentTokenizer {
    reader: csv::Reader<Cursor<Vec<u8>>>,
    delimiters: Delimiters,
    segments_read: usize,
}

impl SegmentTokenizer {
    /// Creates a tokenizer, discovering delimiters from the ISA window.
    ///
    /// # Errors
    /// Returns [`X12Error::MalformedEnvelope`] when the header window is
    /// invalid; see [`Delimiters::from_header`].
    pub fn new(text: &str) -> X12Result<Self> {
        let delimiters = Delimiters::from_header(text)?;
        Ok(Self::with_delimiters(text, delimiters))
    }

    /// Creates a tokenizer with already-known delimiters.
    pub fn with_delimiters(text: &str, delimiters: Delimiters) -> Self {
        // Interchanges commonly put line breaks after segment terminators
        // for readability; they are not part of the grammar.
        let cleaned: Vec<u8> = text
            .bytes()
            .filter(|&b| b != b'\n' && b != b'\r')
            .collect();

        let reader = ReaderBuilder::new()
            .delimiter(delimiters.element as u8)
            .terminator(Terminator::Any(delimiters.segment as u8))
            .has_headers(false)
            .flexible(true)
            .quoting(false)
            .from_reader(Cursor::new(cleaned));

        Self {
            reader,
            delimiters,
            segments_read: 0,
        }
    }

    /// Returns the delimiters in effect.
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Returns the number of segments read so far.
    pub fn segments_read(&self) -> usize {
        self.segments_read
    }

    /// Collects all remaining segments.
    pub fn read_all(mut self) -> X12Result<Vec<Segment>> {
        let mut segments = Vec::new();
        for segment in self.by_ref() {
            segments.push(segment?);
        }
        Ok(segments)
    }
}

impl Iterator for SegmentTokenizer {
    type Item = X12Result<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let mut record = StringRecord::new();
            match self.reader.read_record(&mut record) {
                Ok(true) => {
                    // Skip the empty record after a trailing terminator
                    if record.iter().all(|f| f.trim().is_empty()) {
                        continue;
                    }

                    self.segments_read += 1;
                    match Segment::from_fields(record.iter().map(str::trim)) {
                        Some(segment) => return Some(Ok(segment)),
                        None => continue,
                    }
                }
                Ok(false) => return None, // End of input
                Err(e) => return Some(Err(e.into())),
            }
        }
    }
}
