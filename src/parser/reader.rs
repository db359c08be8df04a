//! Streaming export reader
//!
//! Walks `export.xml` event by event with `quick-xml`, materializing only the
//! top-level element currently being read. Each finished element is either
//! turned into a [`HealthRecord`] and yielded, or dropped; nothing read
//! earlier is retained, so memory stays flat regardless of export size.
//!
//! ```text
//! <HealthData>            depth 1 (root)
//!   <Record ...>          depth 2 (top-level)
//!     <MetadataEntry/>    depth 3
//!   </Record>             -> pre-filter, build, filter, then yield or drop
//! ```
//!
//! End tags are matched by name against the open elements. One that matches
//! nothing is ignored; one that matches an outer element also closes every
//! element still open inside it.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, warn};

use super::error::{ParseError, ParseResult};
use super::record::{derive_window, resolve_element_type, window_intersects, Element, HealthRecord};
use super::timestamp::{parse_timestamp, IntoTimestamp, Timestamp};

const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Type and time filter applied while streaming
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    types: Option<HashSet<String>>,
    start: Option<Timestamp>,
    end: Option<Timestamp>,
}

impl RecordFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept only these record types or tags. An empty list disables the
    /// type filter.
    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: HashSet<String> = types.into_iter().map(Into::into).collect();
        self.types = if set.is_empty() { None } else { Some(set) };
        self
    }

    /// Inclusive lower bound; unparseable input leaves the bound open
    pub fn start(mut self, start: impl IntoTimestamp) -> Self {
        self.start = start.into_timestamp();
        self
    }

    /// Inclusive upper bound; unparseable input leaves the bound open
    pub fn end(mut self, end: impl IntoTimestamp) -> Self {
        self.end = end.into_timestamp();
        self
    }

    pub fn type_set(&self) -> Option<&HashSet<String>> {
        self.types.as_ref()
    }

    pub fn window(&self) -> (Option<Timestamp>, Option<Timestamp>) {
        (self.start, self.end)
    }

    /// Reject a window that ends before it starts
    pub fn validate(&self) -> ParseResult<()> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end < start => Err(ParseError::InvalidRange { start, end }),
            _ => Ok(()),
        }
    }

    /// Full filter on a constructed record
    pub fn accepts(&self, record: &HealthRecord) -> bool {
        record.is_any_of_types(self.types.as_ref()) && record.intersects(self.start, self.end)
    }

    /// Cheap check on a fully read element, before flattening.
    ///
    /// Looks at direct attributes and direct metadata entries only, and
    /// rejects only when flattening could not change the outcome of
    /// [`RecordFilter::accepts`].
    fn rejects_early(&self, element: &Element) -> bool {
        if let Some(types) = &self.types {
            if !types.contains(&element.name) {
                if let Some(record_type) = resolve_element_type(element) {
                    if !types.contains(record_type) {
                        return true;
                    }
                }
            }
        }

        if self.start.is_some() || self.end.is_some() {
            let s = element.flattened_get("startDate").and_then(parse_timestamp);
            let e = element.flattened_get("endDate").and_then(parse_timestamp);
            if s.is_some() && e.is_some() {
                let (start, end) = derive_window(s, None, e);
                if !window_intersects(start, end, self.start, self.end) {
                    return true;
                }
            }
        }

        false
    }
}

/// Counters for one pass over an export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderStats {
    /// Top-level elements encountered
    pub elements_seen: u64,
    /// Discarded by the pre-filter before flattening
    pub prefiltered: u64,
    /// Built but rejected by the full filter
    pub filtered: u64,
    /// Yielded to the caller
    pub emitted: u64,
    /// Malformed fragments and unmatched end tags skipped
    pub recovered_errors: u64,
}

impl std::fmt::Display for ReaderStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "seen={}, prefiltered={}, filtered={}, emitted={}, errors={}",
            self.elements_seen, self.prefiltered, self.filtered, self.emitted, self.recovered_errors
        )
    }
}

/// Forward-only iterator over the top-level records of an export.
///
/// The underlying source is owned by the reader and released when it is
/// dropped, whether the stream was exhausted or abandoned early.
pub struct RecordReader<R: BufRead> {
    reader: Reader<R>,
    buf: Vec<u8>,
    filter: RecordFilter,
    /// Names of the open elements, root first
    open: Vec<String>,
    /// Top-level element under construction and its open descendants;
    /// `stack[i]` is the element named `open[i + 1]`
    stack: Vec<Element>,
    last_error_pos: Option<u64>,
    finished: bool,
    stats: ReaderStats,
}

impl RecordReader<BufReader<File>> {
    /// Open an export file.
    ///
    /// The window is validated before the file is touched.
    pub fn open(path: impl AsRef<Path>, filter: RecordFilter) -> ParseResult<Self> {
        filter.validate()?;

        let path = path.as_ref();
        let not_found = |source| ParseError::SourceNotFound {
            path: path.to_path_buf(),
            source,
        };
        if path.is_dir() {
            return Err(not_found(std::io::Error::new(
                std::io::ErrorKind::Other,
                "path is a directory",
            )));
        }
        let file = File::open(path).map_err(not_found)?;

        debug!(path = %path.display(), "Opened health export");
        Ok(Self::new(BufReader::with_capacity(READ_BUFFER_SIZE, file), filter))
    }
}

impl<R: BufRead> RecordReader<R> {
    /// Stream from any buffered source
    pub fn from_reader(source: R, filter: RecordFilter) -> ParseResult<Self> {
        filter.validate()?;
        Ok(Self::new(source, filter))
    }

    fn new(source: R, filter: RecordFilter) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(true);
        reader.check_end_names(false);

        Self {
            reader,
            buf: Vec::with_capacity(4096),
            filter,
            open: Vec::new(),
            stack: Vec::new(),
            last_error_pos: None,
            finished: false,
            stats: ReaderStats::default(),
        }
    }

    pub fn filter(&self) -> &RecordFilter {
        &self.filter
    }

    pub fn stats(&self) -> ReaderStats {
        self.stats
    }

    fn next_record(&mut self) -> Option<HealthRecord> {
        while !self.finished {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf);

            match event {
                Ok(Event::Start(start)) => {
                    let element = element_from(&start);
                    self.open.push(element.name.clone());
                    match self.open.len() {
                        // Root
                        1 => {}
                        2 => {
                            self.stats.elements_seen += 1;
                            self.stack.push(element);
                        }
                        _ => self.stack.push(element),
                    }
                }
                Ok(Event::Empty(start)) => {
                    let element = element_from(&start);
                    match self.open.len() {
                        // Self-closing root, nothing follows
                        0 => {
                            self.finished = true;
                            return self.recover_partial();
                        }
                        1 => {
                            self.stats.elements_seen += 1;
                            if let Some(record) = self.finish(element) {
                                return Some(record);
                            }
                        }
                        _ => self.attach(element),
                    }
                }
                Ok(Event::End(end)) => {
                    let name = String::from_utf8_lossy(end.name().as_ref()).into_owned();
                    match self.open.iter().rposition(|open| *open == name) {
                        Some(depth) => {
                            if let Some(record) = self.close_to(depth) {
                                return Some(record);
                            }
                        }
                        None => {
                            self.stats.recovered_errors += 1;
                            warn!(element = %name, "Ignoring end tag without an open element");
                        }
                    }
                }
                Ok(Event::Eof) => {
                    self.finished = true;
                    return self.recover_partial();
                }
                Ok(_) => {}
                Err(err) => {
                    let pos = self.reader.buffer_position() as u64;
                    self.stats.recovered_errors += 1;
                    warn!(position = pos, error = %err, "Skipping malformed XML fragment");
                    if self.last_error_pos == Some(pos) {
                        self.finished = true;
                        return self.recover_partial();
                    }
                    self.last_error_pos = Some(pos);
                }
            }
        }
        None
    }

    /// Close open elements until only `depth` remain, yielding the top-level
    /// record if it was among them. Closing the root ends the stream.
    fn close_to(&mut self, depth: usize) -> Option<HealthRecord> {
        if self.open.len() > depth + 1 {
            debug!(
                element = self.open.get(depth).map(String::as_str).unwrap_or_default(),
                unclosed = self.open.len() - depth - 1,
                "End tag closes unclosed children"
            );
        }

        let mut record = None;
        while self.open.len() > depth {
            let closing = self.open.len();
            self.open.pop();
            match closing {
                1 => {
                    self.finished = true;
                    debug!(stats = %self.stats, "Finished reading health export");
                }
                2 => {
                    if let Some(element) = self.stack.pop() {
                        record = self.finish(element);
                    }
                }
                _ => {
                    if let Some(child) = self.stack.pop() {
                        self.attach(child);
                    }
                }
            }
        }
        record
    }

    /// Append a finished element to the element currently open
    fn attach(&mut self, element: Element) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(element),
            None => debug!(element = %element.name, "Dropping element without an open parent"),
        }
    }

    /// Pre-filter, build, filter and release one top-level element
    fn finish(&mut self, element: Element) -> Option<HealthRecord> {
        if self.filter.rejects_early(&element) {
            self.stats.prefiltered += 1;
            return None;
        }

        let record = HealthRecord::from_element(element);
        if self.filter.accepts(&record) {
            self.stats.emitted += 1;
            Some(record)
        } else {
            self.stats.filtered += 1;
            None
        }
    }

    /// Close whatever a truncated document left open and process it
    fn recover_partial(&mut self) -> Option<HealthRecord> {
        let record = if self.stack.is_empty() {
            None
        } else {
            warn!(open_elements = self.stack.len(), "Export truncated, recovering partial element");
            while self.stack.len() > 1 {
                if let Some(child) = self.stack.pop() {
                    self.attach(child);
                }
            }
            self.stack.pop().and_then(|element| self.finish(element))
        };
        self.open.clear();

        debug!(stats = %self.stats, "Finished reading health export");
        record
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = HealthRecord;

    fn next(&mut self) -> Option<HealthRecord> {
        self.next_record()
    }
}

impl<R: BufRead> std::iter::FusedIterator for RecordReader<R> {}

fn element_from(start: &BytesStart<'_>) -> Element {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());

    for attr in start.attributes().with_checks(false) {
        match attr {
            Ok(attr) => {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let value = match attr.unescape_value() {
                    Ok(value) => value.into_owned(),
                    Err(_) => String::from_utf8_lossy(&attr.value).into_owned(),
                };
                element.attributes.push((key, value));
            }
            Err(err) => {
                debug!(element = %element.name, error = %err, "Skipping malformed attribute");
            }
        }
    }

    element
}
