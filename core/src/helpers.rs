// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Helpers for preview layout and parsing

use crate::engine::Error;

/// Split text into display lines of at most `width` characters
pub fn wrap_lines(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let chars: Vec<char> = text.chars().collect();

    chars
        .chunks(width)
        .map(|c| c.iter().collect::<String>())
        .collect()
}

/// Parse a hexadecimal integer with optional `0x` prefix
pub fn parse_hex_u32(s: &str) -> Result<u32, Error> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    u32::from_str_radix(digits, 16).map_err(|_| Error::InvalidHex(s.to_string()))
}
