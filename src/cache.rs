//! # cmus Cache Decoder
//!
//! cmus keeps every scanned track in `~/.cmus/cache`, a binary dump of its
//! in-memory track structs. The format is undocumented and only ever read
//! here, never written.
//!
//! ## Layout
//!
//! ```text
//! file   := "CTC\x02" reserved[4] record*
//! record := size:u32 duration:i32 mtime:long strings pad
//! strings:= filename NUL (key NUL value NUL)*
//! ```
//!
//! - `size` covers the record header and the string block, not the pad.
//! - `long` is the writer's C `long`: 8 bytes on LP64 hosts, 4 bytes on
//!   32-bit ones. The same width sets the record alignment, so the pad brings
//!   each record to a multiple of it.
//! - All integers are in the writer's native byte order. Reading a cache on a
//!   host with a different endianness than the one that wrote it is not
//!   supported.
//!
//! The width can be forced or detected from the record chain itself, see
//! [`WordSize`].
//!
//! ## Error Handling
//!
//! Nothing in here fails hard. A bad signature yields an empty index, a
//! truncated buffer keeps every record read so far, and a malformed record is
//! skipped. Each case is reported as a [`DecodeWarning`] in [`Decoded`].

use crate::error::DecodeWarning;
use crate::index::ArtistIndex;
use crate::library::LibrarySet;
use anyhow::{Context, Result};
use clap::ValueEnum;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Magic bytes at the start of a cache with the supported layout.
pub const MAGIC: &[u8; 4] = b"CTC\x02";

/// Magic plus four reserved bytes.
pub const FILE_HEADER_LEN: usize = 8;

/// Width of the writer's `long`, which is both the `mtime` field width and
/// the record alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum WordSize {
    /// Walk the record chain and pick the width that fits.
    #[default]
    #[serde(rename = "auto")]
    #[value(name = "auto")]
    Auto,
    /// 32-bit writer.
    #[serde(rename = "4")]
    #[value(name = "4")]
    Four,
    /// 64-bit writer.
    #[serde(rename = "8")]
    #[value(name = "8")]
    Eight,
}

impl WordSize {
    /// Width of a C `long` on this host.
    #[must_use]
    pub const fn native() -> usize {
        std::mem::size_of::<libc::c_long>()
    }

    /// Concrete width to use for `buf`.
    #[must_use]
    pub fn resolve(self, buf: &[u8]) -> usize {
        match self {
            Self::Four => 4,
            Self::Eight => 8,
            Self::Auto => detect_word_size(buf),
        }
    }
}

/// Record geometry for one word width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    word: usize,
}

impl RecordLayout {
    /// # Panics
    ///
    /// Panics unless `word` is 4 or 8.
    #[must_use]
    pub fn new(word: usize) -> Self {
        assert!(word == 4 || word == 8, "unsupported word width {word}");
        Self { word }
    }

    #[must_use]
    pub const fn word(&self) -> usize {
        self.word
    }

    /// `size` + `duration` + `mtime`.
    #[must_use]
    pub const fn header_len(&self) -> usize {
        4 + 4 + self.word
    }

    /// Rounds `size` up to the next multiple of the word width.
    #[must_use]
    pub const fn align(&self, size: usize) -> usize {
        (size + self.word - 1) & !(self.word - 1)
    }
}

/// One decoded record. Borrowed from the cache buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheRecord<'a> {
    /// Byte offset of the record within the cache.
    pub offset: usize,
    pub size: u32,
    /// Track length in seconds as cmus stores it.
    pub duration: i32,
    /// File modification time, widened to 64 bits.
    pub mtime: i64,
    pub path: &'a str,
    /// Tag pairs in file order.
    pub tags: Vec<(&'a str, &'a str)>,
}

impl<'a> CacheRecord<'a> {
    /// Value of the last tag named `key`.
    #[must_use]
    pub fn tag(&self, key: &str) -> Option<&'a str> {
        self.tags
            .iter()
            .rev()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| *v)
    }
}

/// Single-pass iterator over the records of a cache buffer.
///
/// Yields `Err(MalformedRecord)` for a record it skips and keeps going.
/// Yields `Err(TruncatedCache)` once and stops when the buffer ends inside a
/// record. The file header must have been validated by the caller.
#[derive(Debug)]
pub struct Records<'a> {
    buf: &'a [u8],
    layout: RecordLayout,
    offset: usize,
    decoded: usize,
    done: bool,
}

impl<'a> Records<'a> {
    #[must_use]
    pub fn new(buf: &'a [u8], layout: RecordLayout) -> Self {
        Self {
            buf,
            layout,
            offset: FILE_HEADER_LEN,
            decoded: 0,
            done: false,
        }
    }

    fn truncated(&mut self) -> DecodeWarning {
        self.done = true;
        DecodeWarning::TruncatedCache {
            offset: self.offset,
            records: self.decoded,
        }
    }
}

impl<'a> Iterator for Records<'a> {
    type Item = Result<CacheRecord<'a>, DecodeWarning>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.buf.len() {
            return None;
        }

        let offset = self.offset;
        let header_len = self.layout.header_len();
        let Some(header) = offset
            .checked_add(header_len)
            .and_then(|end| self.buf.get(offset..end))
        else {
            return Some(Err(self.truncated()));
        };

        let size = u32::from_ne_bytes([header[0], header[1], header[2], header[3]]);
        let duration = i32::from_ne_bytes([header[4], header[5], header[6], header[7]]);
        let mtime = match self.layout.word() {
            8 => i64::from_ne_bytes([
                header[8], header[9], header[10], header[11],
                header[12], header[13], header[14], header[15],
            ]),
            _ => i64::from(i32::from_ne_bytes([header[8], header[9], header[10], header[11]])),
        };

        let size_bytes = size as usize;
        if size_bytes < header_len {
            // The next offset derives from `size`, so there is nothing to resume from.
            self.done = true;
            return Some(Err(DecodeWarning::MalformedRecord {
                offset,
                reason: format!("record size {size} is smaller than its {header_len}-byte header"),
            }));
        }

        let Some(block) = offset
            .checked_add(size_bytes)
            .and_then(|end| self.buf.get(offset + header_len..end))
        else {
            return Some(Err(self.truncated()));
        };

        self.offset = offset + self.layout.align(size_bytes);

        match split_strings(block) {
            Ok((path, tags)) => {
                self.decoded += 1;
                trace!("Record at {offset}: {path} ({} tags)", tags.len());
                Some(Ok(CacheRecord {
                    offset,
                    size,
                    duration,
                    mtime,
                    path,
                    tags,
                }))
            }
            Err(reason) => Some(Err(DecodeWarning::MalformedRecord { offset, reason })),
        }
    }
}

type StringBlock<'a> = (&'a str, Vec<(&'a str, &'a str)>);

/// Splits a NUL-terminated string block into the file name and tag pairs.
fn split_strings(block: &[u8]) -> std::result::Result<StringBlock<'_>, String> {
    let Some((&0, body)) = block.split_last() else {
        return Err("string block is not NUL-terminated".to_string());
    };

    let strings = body
        .split(|&b| b == 0)
        .map(std::str::from_utf8)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| format!("string block is not valid UTF-8: {e}"))?;

    let (path, rest) = strings
        .split_first()
        .ok_or_else(|| "missing file name".to_string())?;
    if path.is_empty() {
        return Err("empty file name".to_string());
    }
    if rest.len() % 2 != 0 {
        return Err(format!("odd number of tag strings ({})", rest.len()));
    }

    let tags = rest.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();
    Ok((path, tags))
}

/// Checks the file header.
#[must_use]
pub fn has_valid_signature(buf: &[u8]) -> bool {
    buf.len() >= FILE_HEADER_LEN && buf.starts_with(MAGIC)
}

/// Outcome of guessing the writer's word width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordDetection {
    /// Width to decode with.
    pub word: usize,
    /// Records exist and both widths chain through them.
    pub ambiguous: bool,
}

impl WordDetection {
    /// Walks the record chain of `buf` with both widths.
    ///
    /// A width fits when every record:
    /// - covers at least its header and ends with a NUL inside the buffer,
    /// - starts its string block with a non-empty file name,
    /// - is followed by zero padding up to the next aligned offset,
    /// - and, for 8-byte words, holds an `mtime` whose high half only
    ///   sign-extends the low half.
    ///
    /// The host's native width wins when both fit (flagged as ambiguous) and
    /// is the fallback when neither does.
    #[must_use]
    pub fn of(buf: &[u8]) -> Self {
        let native = WordSize::native();
        let other = if native == 8 { 4 } else { 8 };

        match (chain_fits(buf, RecordLayout::new(native)), chain_fits(buf, RecordLayout::new(other))) {
            (true, true) => Self {
                word: native,
                ambiguous: buf.len() > FILE_HEADER_LEN,
            },
            (false, true) => {
                debug!("Cache records chain with {other}-byte words, not the native {native}");
                Self { word: other, ambiguous: false }
            }
            _ => Self { word: native, ambiguous: false },
        }
    }
}

/// Guesses the writer's word width from the record chain.
///
/// See [`WordDetection::of`] for what makes a width fit.
#[must_use]
pub fn detect_word_size(buf: &[u8]) -> usize {
    WordDetection::of(buf).word
}

fn chain_fits(buf: &[u8], layout: RecordLayout) -> bool {
    if !has_valid_signature(buf) {
        return false;
    }

    let mut offset = FILE_HEADER_LEN;
    while offset < buf.len() {
        let Some(size) = buf.get(offset..offset + 4) else {
            return false;
        };
        let size = u32::from_ne_bytes([size[0], size[1], size[2], size[3]]) as usize;
        let end = offset + size;
        if size <= layout.header_len() || end > buf.len() {
            return false;
        }
        if buf[end - 1] != 0 || buf[offset + layout.header_len()] == 0 {
            return false;
        }
        if layout.word() == 8 && !mtime_is_plausible(&buf[offset + 8..offset + 16]) {
            return false;
        }

        let next = offset + layout.align(size);
        if buf[end..next.min(buf.len())].iter().any(|&b| b != 0) {
            return false;
        }
        offset = next;
    }
    true
}

/// A 64-bit `mtime` written by cmus is a real timestamp, so its high 32 bits
/// are all zeros or all ones. Text read at that position is neither.
fn mtime_is_plausible(field: &[u8]) -> bool {
    let mtime = i64::from_ne_bytes([
        field[0], field[1], field[2], field[3],
        field[4], field[5], field[6], field[7],
    ]);
    matches!(mtime >> 32, 0 | -1)
}

/// Result of decoding one cache buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decoded {
    pub index: ArtistIndex,
    /// Advisory problems, in the order they were found.
    pub warnings: Vec<DecodeWarning>,
    /// Records read successfully, filtered out or not.
    pub records: usize,
    /// Word width used.
    pub word: usize,
}

impl Decoded {
    /// Logs every warning at `warn` level.
    pub fn log_warnings(&self) {
        for warning in &self.warnings {
            warn!("{warning}");
        }
    }
}

/// Decodes a cache buffer into an [`ArtistIndex`].
///
/// Records are read in one pass from the start of the buffer. A record with
/// both an `artist` and a `title` tag adds `artist → title → path` (a later
/// record with the same artist and title replaces the earlier path).
///
/// # Library Filter
///
/// With a `library` filter, only paths it contains get titles. Artists are
/// still registered from every record that names one, so an artist may end
/// up with no titles at all.
///
/// # Word Size
///
/// `word_size` fixes the width of the writer's `long`. [`WordSize::Auto`]
/// guesses it with [`WordDetection::of`] and adds
/// [`DecodeWarning::AmbiguousWordSize`] when both widths fit.
///
/// # Returns
///
/// A [`Decoded`] holding the index and every [`DecodeWarning`] found:
/// - a bad signature gives an empty index and `InvalidSignature`
/// - a record cut off by the end of the buffer ends decoding with
///   `TruncatedCache`; earlier records are kept
/// - a record that cannot be read is skipped with `MalformedRecord`
///
/// # Examples
///
/// ```
/// use segue::cache::{decode, WordSize};
///
/// let decoded = decode(b"CTC\x02\0\0\0\0", None, WordSize::Auto);
/// assert!(decoded.index.is_empty());
/// assert!(decoded.warnings.is_empty());
/// ```
#[must_use]
pub fn decode(buf: &[u8], library: Option<&LibrarySet>, word_size: WordSize) -> Decoded {
    let (word, ambiguous) = match word_size {
        WordSize::Auto => {
            let detection = WordDetection::of(buf);
            (detection.word, detection.ambiguous)
        }
        fixed => (fixed.resolve(buf), false),
    };
    let mut decoded = Decoded {
        word,
        ..Decoded::default()
    };

    if !has_valid_signature(buf) {
        decoded.warnings.push(DecodeWarning::InvalidSignature);
        return decoded;
    }
    if ambiguous {
        decoded.warnings.push(DecodeWarning::AmbiguousWordSize { word });
    }

    for record in Records::new(buf, RecordLayout::new(word)) {
        let record = match record {
            Ok(record) => record,
            Err(warning) => {
                decoded.warnings.push(warning);
                continue;
            }
        };
        decoded.records += 1;

        let Some(artist) = record.tag("artist") else {
            continue;
        };
        decoded.index.ensure_artist(artist);

        if let Some(title) = record.tag("title") {
            if library.map_or(true, |lib| lib.contains(record.path)) {
                decoded.index.insert(artist, title, record.path);
            }
        }
    }

    debug!(
        "Decoded {} records ({}-byte words) into {} artists / {} tracks, {} warnings",
        decoded.records,
        word,
        decoded.index.len(),
        decoded.index.track_count(),
        decoded.warnings.len()
    );
    decoded
}

/// Reads and decodes the cache file at `path`.
///
/// The whole file is read into memory and handed to [`decode`]. Nothing is
/// kept between calls.
///
/// # Returns
///
/// * `Ok(Decoded)` - The index and any decode warnings
/// * `Err(anyhow::Error)` - If the file cannot be read
///
/// # Errors
///
/// Returns an error only if the file cannot be opened or read. Format
/// problems end up in [`Decoded::warnings`].
///
/// # Examples
///
/// ```no_run
/// use segue::cache::{read_cache, WordSize};
/// use std::path::Path;
///
/// let decoded = read_cache(Path::new("/home/me/.cmus/cache"), None, WordSize::Auto)?;
/// decoded.log_warnings();
/// println!("{} artists", decoded.index.len());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn read_cache(path: &Path, library: Option<&LibrarySet>, word_size: WordSize) -> Result<Decoded> {
    let buf = std::fs::read(path)
        .with_context(|| format!("could not open {}", path.display()))?;
    debug!("Read {} bytes from {}", buf.len(), path.display());
    Ok(decode(&buf, library, word_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds cache bytes the way a writer with `word`-sized longs would.
    struct CacheBuilder {
        layout: RecordLayout,
        buf: Vec<u8>,
    }

    impl CacheBuilder {
        fn new(word: usize) -> Self {
            let mut buf = MAGIC.to_vec();
            buf.extend_from_slice(&[0; 4]);
            Self {
                layout: RecordLayout::new(word),
                buf,
            }
        }

        fn raw(mut self, strings: &[&[u8]]) -> Self {
            let mut block = Vec::new();
            for s in strings {
                block.extend_from_slice(s);
                block.push(0);
            }
            let size = self.layout.header_len() + block.len();
            self.buf.extend_from_slice(&(size as u32).to_ne_bytes());
            self.buf.extend_from_slice(&215_i32.to_ne_bytes());
            if self.layout.word() == 8 {
                self.buf.extend_from_slice(&1_700_000_000_i64.to_ne_bytes());
            } else {
                self.buf.extend_from_slice(&1_700_000_000_i32.to_ne_bytes());
            }
            self.buf.extend_from_slice(&block);
            let padded = self.layout.align(size);
            self.buf.resize(self.buf.len() + padded - size, 0);
            self
        }

        fn track(self, path: &str, tags: &[(&str, &str)]) -> Self {
            let mut strings: Vec<&[u8]> = vec![path.as_bytes()];
            for (k, v) in tags {
                strings.push(k.as_bytes());
                strings.push(v.as_bytes());
            }
            self.raw(&strings)
        }

        fn build(self) -> Vec<u8> {
            self.buf
        }
    }

    fn sample(word: usize) -> Vec<u8> {
        CacheBuilder::new(word)
            .track("/x/1.mp3", &[("artist", "A"), ("title", "t1"), ("album", "α")])
            .track("/x/2.mp3", &[("title", "t2"), ("artist", "B")])
            .track("/x/3.mp3", &[("artist", "B"), ("title", "t3"), ("tracknumber", "3")])
            .track("/x/4.mp3", &[("artist", "C")])
            .track("/x/5.mp3", &[("title", "no artist")])
            .build()
    }

    #[test]
    fn test_layout_alignment() {
        let long = RecordLayout::new(8);
        assert_eq!(long.header_len(), 16);
        assert_eq!(long.align(16), 16);
        assert_eq!(long.align(17), 24);
        assert_eq!(long.align(23), 24);

        let short = RecordLayout::new(4);
        assert_eq!(short.header_len(), 12);
        assert_eq!(short.align(13), 16);
        assert_eq!(short.align(16), 16);
    }

    #[test]
    fn test_decode_well_formed_cache() {
        let decoded = decode(&sample(8), None, WordSize::Eight);

        assert!(decoded.warnings.is_empty(), "unexpected warnings: {:?}", decoded.warnings);
        assert_eq!(decoded.records, 5);
        assert_eq!(decoded.index.len(), 3);
        assert_eq!(decoded.index.paths("A"), vec!["/x/1.mp3"]);
        assert_eq!(decoded.index.paths("B"), vec!["/x/2.mp3", "/x/3.mp3"]);
        assert!(decoded.index.contains_artist("C"));
        assert!(decoded.index.paths("C").is_empty());
    }

    #[test]
    fn test_decode_32_bit_writer() {
        let decoded = decode(&sample(4), None, WordSize::Four);
        assert!(decoded.warnings.is_empty());
        assert_eq!(decoded.index.track_count(), 3);
    }

    #[test]
    fn test_record_fields() {
        let buf = sample(8);
        let first = Records::new(&buf, RecordLayout::new(8))
            .next()
            .expect("one record")
            .expect("well formed");

        assert_eq!(first.offset, FILE_HEADER_LEN);
        assert_eq!(first.duration, 215);
        assert_eq!(first.mtime, 1_700_000_000);
        assert_eq!(first.path, "/x/1.mp3");
        assert_eq!(first.tag("album"), Some("α"));
        assert_eq!(first.tag("genre"), None);
    }

    #[test]
    fn test_library_filter_is_subset() {
        let buf = sample(8);
        let library: LibrarySet = ["/x/1.mp3", "/x/3.mp3"].into_iter().collect();

        let all = decode(&buf, None, WordSize::Eight);
        let filtered = decode(&buf, Some(&library), WordSize::Eight);

        assert!(filtered.index.is_subset_of(&all.index));
        assert_eq!(filtered.index.paths("B"), vec!["/x/3.mp3"]);
        assert!(filtered.index.tracks("B").is_some_and(|t| !t.contains_key("t2")));
        // Artists are registered even if the filter drops all their titles.
        let only_one: LibrarySet = ["/x/1.mp3"].into_iter().collect();
        let narrow = decode(&buf, Some(&only_one), WordSize::Eight);
        assert!(narrow.index.contains_artist("B"));
        assert!(narrow.index.paths("B").is_empty());
    }

    #[test]
    fn test_bad_signature_yields_empty_index() {
        let mut buf = sample(8);
        buf[3] = 0x0c;
        let decoded = decode(&buf, None, WordSize::Eight);
        assert!(decoded.index.is_empty());
        assert_eq!(decoded.warnings, vec![DecodeWarning::InvalidSignature]);

        let decoded = decode(b"CTC", None, WordSize::Auto);
        assert_eq!(decoded.warnings, vec![DecodeWarning::InvalidSignature]);

        let decoded = decode(&[], None, WordSize::Auto);
        assert_eq!(decoded.warnings, vec![DecodeWarning::InvalidSignature]);
    }

    #[test]
    fn test_header_only_cache_is_empty_without_warnings() {
        let decoded = decode(&CacheBuilder::new(8).build(), None, WordSize::Auto);
        assert!(decoded.index.is_empty());
        assert!(decoded.warnings.is_empty());
    }

    #[test]
    fn test_truncated_mid_record_keeps_complete_records() {
        let full = CacheBuilder::new(8)
            .track("/x/1.mp3", &[("artist", "A"), ("title", "t1")])
            .build();
        let cut_at = full.len();
        let mut buf = CacheBuilder::new(8)
            .track("/x/1.mp3", &[("artist", "A"), ("title", "t1")])
            .track("/x/2.mp3", &[("artist", "B"), ("title", "t2")])
            .build();

        // The second record's string block ends 43 bytes past `cut_at`.
        for len in [cut_at + 3, cut_at + 20, cut_at + 42] {
            let decoded = decode(&buf[..len], None, WordSize::Eight);
            assert_eq!(decoded.records, 1, "cut at {len}");
            assert_eq!(decoded.index.paths("A"), vec!["/x/1.mp3"]);
            assert!(!decoded.index.contains_artist("B"));
            assert_eq!(
                decoded.warnings,
                vec![DecodeWarning::TruncatedCache { offset: cut_at, records: 1 }]
            );
        }

        buf.truncate(cut_at);
        assert!(decode(&buf, None, WordSize::Eight).warnings.is_empty());
    }

    #[test]
    fn test_odd_tag_count_skips_only_that_record() {
        let buf = CacheBuilder::new(8)
            .track("/x/1.mp3", &[("artist", "A"), ("title", "t1")])
            .raw(&[b"/x/bad.mp3", b"artist", b"Bad", b"title"])
            .track("/x/2.mp3", &[("artist", "B"), ("title", "t2")])
            .build();

        let decoded = decode(&buf, None, WordSize::Eight);

        assert_eq!(decoded.records, 2);
        assert!(!decoded.index.contains_artist("Bad"));
        assert_eq!(decoded.index.paths("B"), vec!["/x/2.mp3"]);
        assert!(matches!(
            decoded.warnings.as_slice(),
            [DecodeWarning::MalformedRecord { reason, .. }] if reason.contains("odd")
        ));
    }

    #[test]
    fn test_invalid_utf8_record_is_skipped() {
        let buf = CacheBuilder::new(8)
            .raw(&[b"/x/1.mp3", b"artist", b"\xff\xfe"])
            .track("/x/2.mp3", &[("artist", "B"), ("title", "t2")])
            .build();

        let decoded = decode(&buf, None, WordSize::Eight);
        assert_eq!(decoded.index.len(), 1);
        assert_eq!(decoded.warnings.len(), 1);
    }

    #[test]
    fn test_undersized_record_stops_decoding() {
        let mut buf = CacheBuilder::new(8)
            .track("/x/1.mp3", &[("artist", "A"), ("title", "t1")])
            .build();
        let at = buf.len();
        buf.extend_from_slice(&0_u32.to_ne_bytes());
        buf.extend_from_slice(&[0; 12]);

        let decoded = decode(&buf, None, WordSize::Eight);
        assert_eq!(decoded.records, 1);
        assert!(matches!(
            decoded.warnings.as_slice(),
            [DecodeWarning::MalformedRecord { offset, .. }] if *offset == at
        ));
    }

    #[test]
    fn test_detect_word_size() {
        // "/m/a.flac" gives a 41-byte record on 32-bit writers, where 4- and
        // 8-byte alignment disagree.
        let long = CacheBuilder::new(8)
            .track("/m/a.flac", &[("artist", "A"), ("title", "one")])
            .track("/music/bb.flac", &[("artist", "B"), ("title", "two")])
            .build();
        let short = CacheBuilder::new(4)
            .track("/m/a.flac", &[("artist", "A"), ("title", "one")])
            .track("/music/bb.flac", &[("artist", "B"), ("title", "two")])
            .build();

        assert_eq!(detect_word_size(&long), 8);
        assert_eq!(detect_word_size(&short), 4);

        let decoded = decode(&short, None, WordSize::Auto);
        assert_eq!(decoded.word, 4);
        assert!(decoded.warnings.is_empty());
        assert_eq!(decoded.index.track_count(), 2);
    }

    #[test]
    fn test_detect_does_not_read_path_as_mtime() {
        // 12-byte header plus a 36-byte string block: a multiple of 8, so the
        // chain alone cannot tell the widths apart.
        let buf = CacheBuilder::new(4)
            .track("/m/abcdefghij.flac", &[("artist", "A"), ("title", "t")])
            .build();
        assert_eq!(buf.len(), FILE_HEADER_LEN + 48);

        assert_eq!(detect_word_size(&buf), 4);
        let decoded = decode(&buf, None, WordSize::Auto);
        assert_eq!(decoded.word, 4);
        assert!(decoded.warnings.is_empty(), "unexpected warnings: {:?}", decoded.warnings);
        assert_eq!(decoded.index.paths("A"), vec!["/m/abcdefghij.flac"]);
    }

    #[test]
    fn test_detect_rejects_nonzero_padding() {
        let mut buf = CacheBuilder::new(8)
            .track("/m/a.flac", &[("artist", "A"), ("title", "one")])
            .build();
        let last = buf.len() - 1;
        assert_eq!(buf[last], 0);
        buf[last] = b'x';

        assert!(!chain_fits(&buf, RecordLayout::new(8)));
    }

    #[test]
    fn test_ambiguous_width_is_reported() {
        // A negative mtime makes the 8-byte record also chain as a 4-byte
        // one whose file name starts with 0xff.
        let block = b"/x/1.mp3\0artist\0A\0title\0t123456\0";
        let size = 16 + block.len();
        assert_eq!(size % 8, 0);
        let mut buf = MAGIC.to_vec();
        buf.extend_from_slice(&[0; 4]);
        buf.extend_from_slice(&(size as u32).to_ne_bytes());
        buf.extend_from_slice(&215_i32.to_ne_bytes());
        buf.extend_from_slice(&(-1_i64).to_ne_bytes());
        buf.extend_from_slice(block);

        let detection = WordDetection::of(&buf);
        assert!(detection.ambiguous);
        assert_eq!(detection.word, WordSize::native());

        let decoded = decode(&buf, None, WordSize::Auto);
        assert!(decoded
            .warnings
            .contains(&DecodeWarning::AmbiguousWordSize { word: WordSize::native() }));
        if WordSize::native() == 8 {
            assert_eq!(decoded.index.paths("A"), vec!["/x/1.mp3"]);
        }

        let pinned = decode(&buf, None, WordSize::Eight);
        assert!(pinned.warnings.is_empty());
        assert_eq!(pinned.index.paths("A"), vec!["/x/1.mp3"]);
    }

    #[test]
    fn test_detect_falls_back_to_native() {
        assert_eq!(detect_word_size(b"garbage"), WordSize::native());
        assert_eq!(detect_word_size(&CacheBuilder::new(4).build()), WordSize::native());
    }
}
