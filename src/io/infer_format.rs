use std::fmt::Display;
use std::fs;
use std::io::{self, prelude::*, BufReader};
use std::path;

use flate2::bufread::GzDecoder;

use super::ana::SECTION_MARKER;
use super::compression::{is_gzipped, is_gzipped_extension};
use super::tokenize::{numeric_row, tokenize_line, LineToken, NumericRow};
use super::utils::decode_line;

/// The number of leading bytes inspected when sniffing a stream
const SNIFF_LENGTH: u64 = 8192;

/// EELS file formats that [`eelsdata`](crate) reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EELSFormat {
    Elv,
    Ana,
    AnaMap,
    Csv,
    RawSpectra,
    TextParameters,
    Unknown,
}

impl Display for EELSFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Given a path, infer the file format and whether or not the file at that path is
/// GZIP compressed.
///
/// The `.ana` extension is shared by the point and map variants, so this reports
/// [`EELSFormat::Ana`] for both. [`infer_format`] reads the file to tell them apart.
pub fn infer_from_path<P: Into<path::PathBuf>>(path: P) -> (EELSFormat, bool) {
    let path: path::PathBuf = path.into();
    let (is_gzipped, path) = is_gzipped_extension(path);
    if let Some(ext) = path.extension() {
        if let Some(ext) = ext.to_ascii_lowercase().to_str() {
            let form = match ext {
                "elv" => EELSFormat::Elv,
                "ana" => EELSFormat::Ana,
                "csv" => EELSFormat::Csv,
                "dat" => EELSFormat::RawSpectra,
                "txt" => EELSFormat::TextParameters,
                _ => EELSFormat::Unknown,
            };
            (form, is_gzipped)
        } else {
            (EELSFormat::Unknown, is_gzipped)
        }
    } else {
        (EELSFormat::Unknown, is_gzipped)
    }
}

fn is_utf16_bom(buf: &[u8]) -> bool {
    buf.starts_with(&[0xff, 0xfe]) || buf.starts_with(&[0xfe, 0xff])
}

/// Classify decoded text by its header keywords
fn infer_from_text(buf: &[u8]) -> EELSFormat {
    let text = decode_line(buf);
    for line in text.lines() {
        match tokenize_line(line) {
            LineToken::KeyValue(kv) => {
                if kv.keyword.starts_with("view fast") {
                    return EELSFormat::Csv;
                } else if kv.keyword.starts_with("dose") {
                    return EELSFormat::Elv;
                } else if kv.keyword.starts_with("Dose") {
                    return EELSFormat::Ana;
                } else if kv.keyword.starts_with("Energy Loss") {
                    return EELSFormat::TextParameters;
                }
            }
            LineToken::Items(items) => {
                let leading = items.first().and_then(|item| item.as_key_value());
                if matches!(leading, Some(kv) if kv.keyword.starts_with("view fast")) {
                    return EELSFormat::Csv;
                }
            }
            LineToken::Empty => {}
        }
    }
    EELSFormat::Unknown
}

/// Whether an `.ana` table holds a map: a section marker or a row with more
/// than one count. Both may appear far from the start of the file.
fn is_map_table<R: BufRead>(mut reader: R) -> io::Result<bool> {
    let mut buffer = Vec::new();
    loop {
        buffer.clear();
        if reader.read_until(b'\n', &mut buffer)? == 0 {
            return Ok(false);
        }
        let line = decode_line(&buffer);
        if line.starts_with(SECTION_MARKER) {
            return Ok(true);
        }
        if matches!(numeric_row(&tokenize_line(&line)), Some(NumericRow::Wide(..))) {
            return Ok(true);
        }
    }
}

/// Given a stream of bytes, infer the file format and whether or not the
/// stream is GZIP compressed. This assumes the stream is seekable.
pub fn infer_from_stream<R: Read + Seek>(stream: &mut R) -> io::Result<(EELSFormat, bool)> {
    let current_pos = stream.stream_position()?;
    let mut buf = Vec::with_capacity(SNIFF_LENGTH as usize);
    stream.by_ref().take(SNIFF_LENGTH).read_to_end(&mut buf)?;
    let is_stream_gzipped = is_gzipped(buf.as_slice());
    if is_stream_gzipped {
        stream.seek(io::SeekFrom::Start(current_pos))?;
        let decoder = GzDecoder::new(BufReader::new(stream.by_ref()));
        let mut decompressed_buf = Vec::new();
        decoder.take(SNIFF_LENGTH).read_to_end(&mut decompressed_buf)?;
        buf = decompressed_buf;
    }
    stream.seek(io::SeekFrom::Start(current_pos))?;

    let mut format = if is_utf16_bom(&buf) {
        EELSFormat::TextParameters
    } else if buf.contains(&0) {
        EELSFormat::RawSpectra
    } else {
        infer_from_text(&buf)
    };

    if format == EELSFormat::Ana {
        let reader = BufReader::new(stream.by_ref());
        let is_map = if is_stream_gzipped {
            is_map_table(BufReader::new(GzDecoder::new(reader)))?
        } else {
            is_map_table(reader)?
        };
        stream.seek(io::SeekFrom::Start(current_pos))?;
        if is_map {
            format = EELSFormat::AnaMap;
        }
    }
    Ok((format, is_stream_gzipped))
}

/// Given a path, infer the file format and whether or not the file at that path is
/// GZIP compressed, using both the file name and by trying to open and read the file
/// header
pub fn infer_format<P: Into<path::PathBuf>>(path: P) -> io::Result<(EELSFormat, bool)> {
    let path: path::PathBuf = path.into();

    let (format, is_gzipped) = infer_from_path(&path);
    match format {
        EELSFormat::Unknown | EELSFormat::Ana => {
            let handle = fs::File::open(path.clone())?;
            let mut stream = BufReader::new(handle);
            let (sniffed, is_gzipped) = infer_from_stream(&mut stream)?;
            match (format, sniffed) {
                (EELSFormat::Ana, EELSFormat::AnaMap) => Ok((EELSFormat::AnaMap, is_gzipped)),
                (EELSFormat::Ana, _) => Ok((EELSFormat::Ana, is_gzipped)),
                _ => Ok((sniffed, is_gzipped)),
            }
        }
        _ => Ok((format, is_gzipped)),
    }
}
