use std::borrow::Cow;
use std::fs;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

use crate::error::{LocalizeError, Result};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

fn guess(bytes: &[u8]) -> &'static Encoding {
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Turns raw file contents into text: a UTF-8 BOM is dropped, valid UTF-8
/// is used as is, anything else is decoded with the detected encoding.
pub fn decode<'a>(bytes: &'a [u8], path: &Path) -> Cow<'a, str> {
    let bytes = bytes.strip_prefix(&UTF8_BOM[..]).unwrap_or(bytes);

    if let Ok(text) = std::str::from_utf8(bytes) {
        return Cow::Borrowed(text);
    }

    let encoding = guess(bytes);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(path = %path.display(), encoding = encoding.name(), "input decoded with replacement characters");
    } else {
        debug!(path = %path.display(), encoding = encoding.name(), "input is not UTF-8, decoded");
    }
    text
}

/// Reads a whole text file, whatever encoding the exporting tool picked.
pub fn read_text(path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|source| LocalizeError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(decode(&bytes, path).into_owned())
}
