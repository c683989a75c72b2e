//! Slot naming: `basename#NNNNN` tokens on input files and entry names on output

use std::path::Path;

/// Number of digits in a slot token
pub const SLOT_DIGITS: usize = 5;

/// Find the slot index encoded in a file name.
///
/// Looks at the file name without its last extension and returns the first
/// `#` followed by five ASCII digits. Anything after the fifth digit is
/// ignored, so `a#000123` yields slot 12.
///
/// # Example
/// ```
/// use ailpak::ail::parse_slot_index;
///
/// assert_eq!(parse_slot_index("gfx/Gall0#00042.bmp"), Some(42));
/// assert_eq!(parse_slot_index("notes.bin"), None);
/// ```
#[must_use]
pub fn parse_slot_index<P: AsRef<Path>>(path: P) -> Option<u32> {
    let stem = path.as_ref().file_stem()?.to_string_lossy();
    scan_slot_token(stem.as_bytes())
}

fn scan_slot_token(name: &[u8]) -> Option<u32> {
    name.iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'#')
        .find_map(|(i, _)| {
            let digits = name.get(i + 1..i + 1 + SLOT_DIGITS)?;
            digits.iter().all(u8::is_ascii_digit).then(|| {
                digits
                    .iter()
                    .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'))
            })
        })
}

/// Name of an extracted entry: `{base}#{index:05}` plus `.{ext}` if known.
#[must_use]
pub fn entry_name(base: &str, index: u32, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{base}#{index:05}.{ext}"),
        None => format!("{base}#{index:05}"),
    }
}
