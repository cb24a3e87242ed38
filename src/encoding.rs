//! Windows-1252 encoding.
//!
//! Both outputs need it: the standard PDF fonts are set up with
//! WinAnsiEncoding (which is Windows-1252), and the text export targets
//! label-printer software that expects the same codepage.

/// Byte substituted for characters the codepage can't represent.
pub const REPLACEMENT: u8 = b'?';

/// Map one character to its Windows-1252 byte.
///
/// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F block holds
/// the typographic extras (euro sign, smart quotes, dashes). Tab, CR and LF
/// pass through so text files keep their line structure.
pub fn winansi_byte(ch: char) -> Option<u8> {
    let cp = ch as u32;
    if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
        return Some(cp as u8);
    }
    match cp {
        0x09 | 0x0A | 0x0D => Some(cp as u8),
        0x20AC => Some(0x80), // €
        0x201A => Some(0x82), // ‚
        0x0192 => Some(0x83), // ƒ
        0x201E => Some(0x84), // „
        0x2026 => Some(0x85), // …
        0x2020 => Some(0x86), // †
        0x2021 => Some(0x87), // ‡
        0x02C6 => Some(0x88), // ˆ
        0x2030 => Some(0x89), // ‰
        0x0160 => Some(0x8A), // Š
        0x2039 => Some(0x8B), // ‹
        0x0152 => Some(0x8C), // Œ
        0x017D => Some(0x8E), // Ž
        0x2018 => Some(0x91), // left single quote
        0x2019 => Some(0x92), // right single quote
        0x201C => Some(0x93), // left double quote
        0x201D => Some(0x94), // right double quote
        0x2022 => Some(0x95), // •
        0x2013 => Some(0x96), // –
        0x2014 => Some(0x97), // —
        0x02DC => Some(0x98), // ˜
        0x2122 => Some(0x99), // ™
        0x0161 => Some(0x9A), // š
        0x203A => Some(0x9B), // ›
        0x0153 => Some(0x9C), // œ
        0x017E => Some(0x9E), // ž
        0x0178 => Some(0x9F), // Ÿ
        _ => None,
    }
}

/// Encode a whole string, replacing unmappable characters with `?`.
pub fn to_windows_1252(text: &str) -> Vec<u8> {
    text.chars()
        .map(|ch| winansi_byte(ch).unwrap_or(REPLACEMENT))
        .collect()
}
