use chrono::NaiveDateTime;
use exif::{In, Reader, Tag};
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ExifError {
    #[error("cannot open image: {0}")]
    Io(#[from] io::Error),
    #[error("cannot read EXIF: {0}")]
    Exif(#[from] exif::Error),
    #[error("no capture timestamp in EXIF")]
    MissingTimestamp,
    #[error("unparsable EXIF timestamp {0:?}")]
    BadTimestamp(String),
}

/// Tags holding a capture time, most trustworthy first.
const TIMESTAMP_TAGS: [Tag; 3] = [Tag::DateTimeOriginal, Tag::DateTimeDigitized, Tag::DateTime];

/// Capture time stored in the EXIF block of an image file.
/// EXIF datetimes have no timezone info - they are local time as-is.
pub fn read_capture_time(path: &Path) -> Result<NaiveDateTime, ExifError> {
    let file = File::open(path)?;
    let exif = Reader::new().read_from_container(&mut BufReader::new(file))?;

    let mut unparsable = None;
    for tag in TIMESTAMP_TAGS {
        if let Some(field) = exif.get_field(tag, In::PRIMARY) {
            let val = field.display_value().to_string();
            match parse_exif_datetime(&val) {
                Some(dt) => return Ok(dt),
                None => unparsable = unparsable.or(Some(val)),
            }
        }
    }

    Err(unparsable.map_or(ExifError::MissingTimestamp, ExifError::BadTimestamp))
}

/// Parse `YYYY:MM:DD HH:MM:SS`. Separator variants seen in the wild (and the
/// `YYYY-MM-DD` form kamadak-exif displays) are normalized first.
pub fn parse_exif_datetime(s: &str) -> Option<NaiveDateTime> {
    let cleaned = s
        .trim()
        .trim_matches('"')
        .replace('-', ":")
        .replace('/', ":")
        .replace('\\', ":")
        .replace('.', ":");

    NaiveDateTime::parse_from_str(&cleaned, "%Y:%m:%d %H:%M:%S").ok()
}

/// Minimal JPEG (SOI, APP1/Exif, EOI) carrying `DateTime` in IFD0 and
/// `DateTimeOriginal` in the Exif IFD, each only when given.
#[cfg(test)]
pub(crate) fn jpeg_with_exif(original: Option<&str>, modified: Option<&str>) -> Vec<u8> {
    fn entry(tiff: &mut Vec<u8>, tag: u16, typ: u16, count: u32, value: u32) {
        tiff.extend_from_slice(&tag.to_le_bytes());
        tiff.extend_from_slice(&typ.to_le_bytes());
        tiff.extend_from_slice(&count.to_le_bytes());
        tiff.extend_from_slice(&value.to_le_bytes());
    }
    const ASCII: u16 = 2;
    const LONG: u16 = 4;

    let nul_terminated = |s: &str| {
        let mut v = s.as_bytes().to_vec();
        v.push(0);
        v
    };
    let ifd0_entries = u16::from(modified.is_some()) + u16::from(original.is_some());
    let ifd0_len = 2 + 12 * u32::from(ifd0_entries) + 4;
    let exif_ifd_at = 8 + ifd0_len;
    let mut data_at = exif_ifd_at + if original.is_some() { 18 } else { 0 };

    // little-endian TIFF header, IFD0 right after it
    let mut tiff = b"II\x2a\x00\x08\x00\x00\x00".to_vec();
    let mut values = Vec::new();
    tiff.extend_from_slice(&ifd0_entries.to_le_bytes());
    if let Some(s) = modified {
        let v = nul_terminated(s);
        entry(&mut tiff, 0x0132, ASCII, v.len() as u32, data_at);
        data_at += v.len() as u32;
        values.push(v);
    }
    if original.is_some() {
        entry(&mut tiff, 0x8769, LONG, 1, exif_ifd_at);
    }
    tiff.extend_from_slice(&0u32.to_le_bytes());
    if let Some(s) = original {
        let v = nul_terminated(s);
        tiff.extend_from_slice(&1u16.to_le_bytes());
        entry(&mut tiff, 0x9003, ASCII, v.len() as u32, data_at);
        tiff.extend_from_slice(&0u32.to_le_bytes());
        values.push(v);
    }
    for v in values {
        tiff.extend(v);
    }

    let mut jpeg = vec![0xFF, 0xD8, 0xFF, 0xE1];
    jpeg.extend_from_slice(&((2 + 6 + tiff.len()) as u16).to_be_bytes());
    jpeg.extend_from_slice(b"Exif\0\0");
    jpeg.extend(tiff);
    jpeg.extend_from_slice(&[0xFF, 0xD9]);
    jpeg
}
