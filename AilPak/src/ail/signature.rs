//! File signature table for recovering entry extensions
//!
//! AIL archives store entries without names, so extracted files are named
//! after their slot. The first four bytes of each payload, read as a
//! little-endian `u32`, are matched against known magic numbers to restore a
//! file extension.

/// Known magic numbers and the extension they imply, in lookup order.
///
/// Values are the first four file bytes read little-endian. Entries that
/// only fit in the low 16 bits (`BM`) match through the 16-bit fallback.
pub const SIGNATURES: &[(u32, &str)] = &[
    (0x0000_4D42, "bmp"),
    (0x474E_5089, "png"),
    (0xE0FF_D8FF, "jpg"),
    (0x002B_4949, "tif"),
    (0x5350_4B47, "ogg"),
    (0x4646_4952, "wav"),
    (0x5367_674F, "ogg"),
    (0x4D52_4F46, "rm"),
    (0xBA01_0000, "mpg"),
];

fn lookup(signature: u32) -> Option<&'static str> {
    SIGNATURES
        .iter()
        .find(|(magic, _)| *magic == signature)
        .map(|(_, ext)| *ext)
}

/// Detect a file extension from the first four bytes of a file.
///
/// Tries the full 32-bit value first, then only its low 16 bits.
/// Returns `None` when the signature is not recognised.
///
/// # Example
/// ```
/// use ailpak::ail::detect_extension;
///
/// assert_eq!(detect_extension(u32::from_le_bytes(*b"OggS")), Some("ogg"));
/// assert_eq!(detect_extension(u32::from_le_bytes([0x42, 0x4D, 0x36, 0x10])), Some("bmp"));
/// assert_eq!(detect_extension(0xDEAD_BEEF), None);
/// ```
#[must_use]
pub fn detect_extension(signature: u32) -> Option<&'static str> {
    lookup(signature).or_else(|| lookup(signature & 0xFFFF))
}

/// Detect a file extension from a byte prefix.
///
/// Two- and three-byte prefixes are zero-padded, so a two-byte `BM` file
/// still matches through the 16-bit fallback. Shorter prefixes and all-zero
/// signatures are never matched.
#[must_use]
pub fn detect_extension_from_bytes(prefix: &[u8]) -> Option<&'static str> {
    if prefix.len() < 2 {
        return None;
    }
    let mut bytes = [0u8; 4];
    let len = prefix.len().min(bytes.len());
    bytes[..len].copy_from_slice(&prefix[..len]);
    match u32::from_le_bytes(bytes) {
        0 => None,
        signature => detect_extension(signature),
    }
}

/// Reverse lookup: the magic number for an extension.
///
/// Case-insensitive, with or without a leading dot. For extensions with
/// several signatures the first table entry wins.
#[must_use]
pub fn signature_for_extension(extension: &str) -> Option<u32> {
    let extension = extension.trim_start_matches('.');
    SIGNATURES
        .iter()
        .find(|(_, ext)| ext.eq_ignore_ascii_case(extension))
        .map(|(magic, _)| *magic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_matches() {
        assert_eq!(detect_extension_from_bytes(b"\x89PNG\r\n"), Some("png"));
        assert_eq!(detect_extension_from_bytes(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("jpg"));
        assert_eq!(detect_extension_from_bytes(b"RIFF"), Some("wav"));
        assert_eq!(detect_extension_from_bytes(b"OggS"), Some("ogg"));
        assert_eq!(detect_extension_from_bytes(&[0x00, 0x00, 0x01, 0xBA]), Some("mpg"));
    }

    #[test]
    fn test_sixteen_bit_fallback() {
        assert_eq!(detect_extension_from_bytes(b"BM\x8a\x04"), Some("bmp"));
        assert_eq!(detect_extension(0x4D42), Some("bmp"));
    }

    #[test]
    fn test_unknown_signature() {
        assert_eq!(detect_extension_from_bytes(b"TEXT"), None);
        assert_eq!(detect_extension_from_bytes(&[0, 0, 0, 0]), None);
        assert_eq!(detect_extension_from_bytes(b"B"), None);
        assert_eq!(detect_extension_from_bytes(&[0, 0]), None);
    }

    #[test]
    fn test_short_prefixes_are_padded() {
        assert_eq!(detect_extension_from_bytes(b"BM"), Some("bmp"));
        assert_eq!(detect_extension_from_bytes(b"BMx"), Some("bmp"));
        assert_eq!(detect_extension_from_bytes(b"hi"), None);
    }

    #[test]
    fn test_reverse_lookup() {
        assert_eq!(signature_for_extension("bmp"), Some(0x4D42));
        assert_eq!(signature_for_extension(".PNG"), Some(0x474E_5089));
        assert_eq!(signature_for_extension("ogg"), Some(0x5350_4B47));
        assert_eq!(signature_for_extension("txt"), None);
    }
}
