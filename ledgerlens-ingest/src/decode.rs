//! Turning uploaded bytes into text.
//!
//! Encodings are tried in [`ENCODINGS`] order. A byte order mark pins the
//! encoding; without one, UTF-16 is recognised by its NUL high bytes on ASCII
//! text. Windows-1252 maps every byte, so in practice only an empty upload
//! fails to decode.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

use crate::error::{IngestError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Windows1252,
}

pub const ENCODINGS: [TextEncoding; 4] = [
    TextEncoding::Utf8,
    TextEncoding::Utf16Le,
    TextEncoding::Utf16Be,
    TextEncoding::Windows1252,
];

/// Bytes inspected when guessing BOM-less UTF-16.
const SNIFF_LEN: usize = 512;

impl TextEncoding {
    pub fn encoding(self) -> &'static Encoding {
        match self {
            TextEncoding::Utf8 => UTF_8,
            TextEncoding::Utf16Le => UTF_16LE,
            TextEncoding::Utf16Be => UTF_16BE,
            TextEncoding::Windows1252 => WINDOWS_1252,
        }
    }

    /// `None` when the bytes are not valid in this encoding, or carry a BOM
    /// (or a UTF-16 shape) that belongs to another one.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        let encoding = self.encoding();
        if self == TextEncoding::Windows1252 {
            let (text, _) = encoding.decode_without_bom_handling(bytes);
            return Some(text.into_owned());
        }

        let body = match Encoding::for_bom(bytes) {
            Some((bom, len)) if bom == encoding => &bytes[len..],
            Some(_) => return None,
            None => {
                let sniffed = sniff_utf16(bytes);
                let fits = match self {
                    TextEncoding::Utf8 => sniffed.is_none(),
                    _ => sniffed == Some(encoding),
                };
                if !fits {
                    return None;
                }
                bytes
            }
        };

        encoding
            .decode_without_bom_handling_and_without_replacement(body)
            .map(|text| text.into_owned())
    }
}

/// UTF-16 without a BOM: mostly-ASCII text puts a NUL in every other byte.
fn sniff_utf16(bytes: &[u8]) -> Option<&'static Encoding> {
    let sample = &bytes[..bytes.len().min(SNIFF_LEN) & !1];
    let units = sample.len() / 2;
    if units == 0 {
        return None;
    }

    let (even_nuls, odd_nuls) = sample.chunks_exact(2).fold((0, 0), |(even, odd), pair| {
        (even + usize::from(pair[0] == 0), odd + usize::from(pair[1] == 0))
    });

    if odd_nuls * 2 > units && even_nuls == 0 {
        Some(UTF_16LE)
    } else if even_nuls * 2 > units && odd_nuls == 0 {
        Some(UTF_16BE)
    } else {
        None
    }
}

/// Decode with the first encoding that accepts the bytes. Blank text counts
/// as unreadable.
pub fn decode_text(bytes: &[u8]) -> Result<(String, TextEncoding)> {
    if bytes.is_empty() {
        return Err(IngestError::UnreadableFile("file is empty".to_string()));
    }

    let (text, encoding) = ENCODINGS
        .iter()
        .find_map(|enc| enc.decode(bytes).map(|text| (text, *enc)))
        .ok_or_else(|| IngestError::UnreadableFile("no supported text encoding".to_string()))?;

    if text.trim().is_empty() {
        return Err(IngestError::UnreadableFile("file contains no text".to_string()));
    }
    Ok((text, encoding))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utf16(text: &str, bom: bool, to_bytes: fn(u16) -> [u8; 2]) -> Vec<u8> {
        let mut bytes = Vec::new();
        if bom {
            bytes.extend_from_slice(&to_bytes(0xFEFF));
        }
        for unit in text.encode_utf16() {
            bytes.extend_from_slice(&to_bytes(unit));
        }
        bytes
    }

    #[test]
    fn test_utf8_with_bom() {
        let (text, enc) = decode_text(b"\xEF\xBB\xBFDate,Narration").unwrap();
        assert_eq!(text, "Date,Narration");
        assert_eq!(enc, TextEncoding::Utf8);
    }

    #[test]
    fn test_utf8_multibyte() {
        let (text, enc) = decode_text("Date,Amount\n01/02/2024,₹150".as_bytes()).unwrap();
        assert_eq!(text, "Date,Amount\n01/02/2024,₹150");
        assert_eq!(enc, TextEncoding::Utf8);
    }

    #[test]
    fn test_utf16le_with_bom() {
        let (text, enc) = decode_text(&utf16("Date,₹", true, u16::to_le_bytes)).unwrap();
        assert_eq!(text, "Date,₹");
        assert_eq!(enc, TextEncoding::Utf16Le);
    }

    #[test]
    fn test_utf16be_with_bom() {
        let (text, enc) = decode_text(&utf16("Date,Narration", true, u16::to_be_bytes)).unwrap();
        assert_eq!(text, "Date,Narration");
        assert_eq!(enc, TextEncoding::Utf16Be);
    }

    #[test]
    fn test_utf16_without_bom_is_sniffed() {
        let csv = "Date,Narration,Debit,Credit\n01/02/2024,Coffee Shop,150,\n";

        let (text, enc) = decode_text(&utf16(csv, false, u16::to_le_bytes)).unwrap();
        assert_eq!(text, csv);
        assert_eq!(enc, TextEncoding::Utf16Le);

        let (text, enc) = decode_text(&utf16(csv, false, u16::to_be_bytes)).unwrap();
        assert_eq!(text, csv);
        assert_eq!(enc, TextEncoding::Utf16Be);
    }

    #[test]
    fn test_windows1252_fallback() {
        // 0x80 is the euro sign, 0xE9 is é
        let (text, enc) = decode_text(b"Caf\xE9 \x80 5").unwrap();
        assert_eq!(text, "Café € 5");
        assert_eq!(enc, TextEncoding::Windows1252);
    }

    #[test]
    fn test_empty_and_blank_are_unreadable() {
        assert!(matches!(decode_text(b""), Err(IngestError::UnreadableFile(_))));
        assert!(matches!(decode_text(b" \r\n\n"), Err(IngestError::UnreadableFile(_))));
    }
}
