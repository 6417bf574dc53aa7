//! Helvetica metrics and WinAnsi encoding for the base-14 font.
//!
//! Widths are the AFM advance widths in 1/1000 em for the printable ASCII
//! range. Latin-1 characters above it use the typical lowercase width.

/// Advance widths for U+0020..=U+007E.
const ASCII_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, // space ! " # $ % & '
    333, 333, 389, 584, 278, 333, 278, 278, // ( ) * + , - . /
    556, 556, 556, 556, 556, 556, 556, 556, // 0-7
    556, 556, 278, 278, 584, 584, 584, 556, // 8 9 : ; < = > ?
    1015, 667, 667, 722, 722, 667, 611, 778, // @ A-G
    722, 278, 500, 667, 556, 833, 722, 778, // H-O
    667, 778, 722, 667, 611, 722, 667, 944, // P-W
    667, 667, 611, 278, 278, 278, 469, 556, // X Y Z [ \ ] ^ _
    333, 556, 556, 500, 556, 556, 278, 556, // ` a-g
    556, 222, 222, 500, 222, 833, 556, 556, // h-o
    556, 556, 333, 500, 278, 556, 500, 722, // p-w
    500, 500, 500, 334, 260, 334, 584, // x y z { | } ~
];

const FALLBACK_WIDTH: u16 = 556;

/// Byte substituted for characters WinAnsi cannot represent.
pub const REPLACEMENT: u8 = b'?';

/// Map one character to its WinAnsi byte.
///
/// Printable ASCII and the Latin-1 upper half map to themselves; everything
/// else (controls, CJK, emoji) becomes `?`.
pub fn encode_char(ch: char) -> u8 {
    match ch as u32 {
        code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
        _ => REPLACEMENT,
    }
}

pub fn encode(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

/// Advance width of one encoded byte in 1/1000 em.
pub fn byte_width(byte: u8) -> u16 {
    match byte {
        0x20..=0x7E => ASCII_WIDTHS[(byte - 0x20) as usize],
        0xA0 => ASCII_WIDTHS[0],
        _ => FALLBACK_WIDTH,
    }
}

/// Width of `text` set at `size` points, after encoding.
pub fn text_width(text: &str, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| byte_width(encode_char(c)) as u32).sum();
    units as f32 * size / 1000.0
}
