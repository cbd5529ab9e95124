use std::borrow::Cow;
use std::io::{self, prelude::*};
use std::path;

use encoding_rs::{UTF_16LE, WINDOWS_1252};
use log::warn;

/// Decode a single line of instrument text. The instrument software writes
/// in the Windows code page, so bytes that are not valid UTF-8 are decoded as
/// Windows-1252 instead of being replaced.
pub fn decode_line(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (text, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            text
        }
    }
}

/// Read every line of `reader` up front, stripping line terminators.
pub fn read_lines<R: BufRead>(mut reader: R) -> io::Result<Vec<String>> {
    let mut lines = Vec::new();
    let mut buffer: Vec<u8> = Vec::new();
    loop {
        buffer.clear();
        let b = reader.read_until(b'\n', &mut buffer)?;
        if b == 0 {
            break;
        }
        while matches!(buffer.last(), Some(b'\n') | Some(b'\r')) {
            buffer.pop();
        }
        lines.push(decode_line(&buffer).into_owned());
    }
    Ok(lines)
}

/// Decode a UTF-16 document. A byte order mark selects the byte order,
/// otherwise little endian is assumed.
pub fn decode_utf16(bytes: &[u8]) -> String {
    let (text, encoding, had_errors) = UTF_16LE.decode(bytes);
    if had_errors {
        warn!(
            "Malformed sequences replaced while decoding {} text",
            encoding.name()
        );
    }
    text.into_owned()
}

/// Read a UTF-16 document and split it into lines
pub fn read_utf16_lines<R: Read>(mut reader: R) -> io::Result<Vec<String>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let text = decode_utf16(&bytes);
    Ok(text
        .lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect())
}

#[derive(Debug, Clone, Default)]
pub struct FileSource {
    pub source: Option<path::PathBuf>,
}

impl FileSource {
    pub fn from_path<P>(path: P) -> FileSource
    where
        P: Into<path::PathBuf>,
    {
        FileSource {
            source: Some(path.into()),
        }
    }

    /// The text parameter file the instrument writes next to a spectrum,
    /// sharing its stem.
    pub fn sidecar_file_name(&self) -> Option<path::PathBuf> {
        let path = self.source.as_ref()?;
        path.file_name()?;
        Some(path.with_extension("txt"))
    }
}
