use crate::foundation::core::Rgba8;
use crate::foundation::error::{ThumbError, ThumbResult};

/// Parse a hex color string: `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA` (leading `#` optional,
/// case-insensitive).
pub fn parse_hex_color(s: &str) -> ThumbResult<Rgba8> {
    let raw = s.trim();
    let hex = raw.strip_prefix('#').unwrap_or(raw);
    if !hex.is_ascii() {
        return Err(invalid(raw));
    }

    fn nibble(c: u8) -> Option<u8> {
        (c as char).to_digit(16).map(|d| d as u8)
    }

    fn byte(pair: &[u8]) -> Option<u8> {
        Some(nibble(pair[0])? * 16 + nibble(pair[1])?)
    }

    let b = hex.as_bytes();
    let parsed = match b.len() {
        3 | 4 => {
            let mut out = [255u8; 4];
            for (i, &c) in b.iter().enumerate() {
                let n = nibble(c).ok_or_else(|| invalid(raw))?;
                out[i] = n * 17;
            }
            Some(Rgba8 {
                r: out[0],
                g: out[1],
                b: out[2],
                a: out[3],
            })
        }
        6 | 8 => {
            let a = if b.len() == 8 { byte(&b[6..8]) } else { Some(255) };
            match (byte(&b[0..2]), byte(&b[2..4]), byte(&b[4..6]), a) {
                (Some(r), Some(g), Some(bl), Some(a)) => Some(Rgba8 { r, g, b: bl, a }),
                _ => None,
            }
        }
        _ => None,
    };

    parsed.ok_or_else(|| invalid(raw))
}

fn invalid(raw: &str) -> ThumbError {
    ThumbError::validation(format!(
        "color \"{raw}\" must be #RGB, #RGBA, #RRGGBB or #RRGGBBAA"
    ))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/color.rs"]
mod tests;
