//! Text encoding detection for option files.
//!
//! Option files written on Windows are frequently not UTF-8. On load the raw
//! bytes are inspected (byte order mark first, then an [`EncodingDetector`]),
//! decoded, and the encoding is remembered so that save writes the same
//! encoding back.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};
use log::{debug, warn};

/// Something that can guess the encoding of a byte sequence.
///
/// Returning `None` means the guess was inconclusive; callers fall back to
/// [`platform_default`].
pub trait EncodingDetector {
    /// Guesses the encoding of `bytes`, which carry no byte order mark.
    fn detect(&self, bytes: &[u8]) -> Option<&'static Encoding>;
}

/// The default detector: valid UTF-8 is UTF-8, everything else is handed to
/// `chardetng`'s statistical guesser.
#[derive(Debug, Default, Clone, Copy)]
pub struct ChardetDetector;

impl EncodingDetector for ChardetDetector {
    fn detect(&self, bytes: &[u8]) -> Option<&'static Encoding> {
        if bytes.is_empty() {
            return None;
        }
        if std::str::from_utf8(bytes).is_ok() {
            return Some(UTF_8);
        }
        let mut guesser = chardetng::EncodingDetector::new();
        guesser.feed(bytes, true);
        let guess = guesser.guess(None, true);
        let (_, had_errors) = guess.decode_without_bom_handling(bytes);
        if had_errors {
            debug!("Statistical guess {} does not decode cleanly", guess.name());
            None
        } else {
            Some(guess)
        }
    }
}

/// A detector that always answers with the same encoding.
#[derive(Debug, Clone, Copy)]
pub struct FixedEncoding(pub &'static Encoding);

impl EncodingDetector for FixedEncoding {
    fn detect(&self, _bytes: &[u8]) -> Option<&'static Encoding> {
        Some(self.0)
    }
}

/// The encoding a file was read with, and whether it carried a byte order mark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding {
    /// The character encoding.
    pub encoding: &'static Encoding,
    /// Whether to emit a byte order mark when writing.
    pub bom: bool,
}

impl TextEncoding {
    /// The encoding used for files that did not exist before.
    pub fn platform() -> Self {
        Self {
            encoding: platform_default(),
            bom: false,
        }
    }

    /// Encoding name as reported by `encoding_rs`.
    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }
}

impl Default for TextEncoding {
    fn default() -> Self {
        Self::platform()
    }
}

/// Encoding assumed when nothing better is known.
pub fn platform_default() -> &'static Encoding {
    if cfg!(windows) {
        WINDOWS_1252
    } else {
        UTF_8
    }
}

/// Decodes `bytes`, returning the text and the encoding that was used.
///
/// Malformed sequences are replaced rather than failing the load.
pub fn decode(bytes: &[u8], detector: &dyn EncodingDetector) -> (String, TextEncoding) {
    if let Some((encoding, bom_len)) = Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        debug!("Byte order mark found, decoding as {}", encoding.name());
        return (
            text.into_owned(),
            TextEncoding {
                encoding,
                bom: true,
            },
        );
    }

    let encoding = detector.detect(bytes).unwrap_or_else(|| {
        if !bytes.is_empty() {
            warn!(
                "Could not detect the file encoding, falling back to {}",
                platform_default().name()
            );
        }
        platform_default()
    });
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        warn!(
            "Some bytes were not valid {} and have been replaced",
            encoding.name()
        );
    }
    (
        text.into_owned(),
        TextEncoding {
            encoding,
            bom: false,
        },
    )
}

/// Encodes `text` with `target`, writing a byte order mark if one was read.
pub fn encode(text: &str, target: &TextEncoding) -> Vec<u8> {
    // encoding_rs only decodes UTF-16, its encoder would emit UTF-8.
    if target.encoding == UTF_16LE || target.encoding == UTF_16BE {
        let little = target.encoding == UTF_16LE;
        let mut out = Vec::with_capacity(text.len() * 2 + 2);
        let units = target.bom.then_some(0xFEFF_u16).into_iter();
        for unit in units.chain(text.encode_utf16()) {
            if little {
                out.extend_from_slice(&unit.to_le_bytes());
            } else {
                out.extend_from_slice(&unit.to_be_bytes());
            }
        }
        return out;
    }

    let (bytes, _, had_unmappable) = target.encoding.encode(text);
    if had_unmappable {
        warn!(
            "Some characters cannot be represented in {} and were written as numeric references",
            target.encoding.name()
        );
    }
    let mut out = Vec::with_capacity(bytes.len() + 3);
    if target.bom && target.encoding == UTF_8 {
        out.extend_from_slice(b"\xEF\xBB\xBF");
    }
    out.extend_from_slice(&bytes);
    out
}
