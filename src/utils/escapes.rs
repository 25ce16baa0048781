//! Single-pass decoding of backslash escapes in generated text.

/// Decode backslash escape sequences (`\n`, `\t`, `\r`, `\\`, `\"`, `\'`,
/// `\xHH`, `\uXXXX`, `\UXXXXXXXX`) into the characters they stand for.
///
/// Apply this once, at the boundary where the text arrives. Unknown or
/// malformed escapes are kept verbatim, so text without backslashes comes
/// back unchanged.
#[must_use]
pub fn decode_escapes(input: &str) -> String {
    if !input.contains('\\') {
        return input.to_string();
    }

    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c != '\\' || i + 1 >= chars.len() {
            out.push(c);
            i += 1;
            continue;
        }

        let consumed = match chars[i + 1] {
            'n' => Some(('\n', 2)),
            't' => Some(('\t', 2)),
            'r' => Some(('\r', 2)),
            '\\' => Some(('\\', 2)),
            '"' => Some(('"', 2)),
            '\'' => Some(('\'', 2)),
            'x' => hex_char(&chars, i + 2, 2).map(|ch| (ch, 4)),
            'u' => unicode_escape(&chars, i),
            'U' => hex_char(&chars, i + 2, 8).map(|ch| (ch, 10)),
            _ => None,
        };

        match consumed {
            Some((ch, len)) => {
                out.push(ch);
                i += len;
            }
            None => {
                out.push('\\');
                i += 1;
            }
        }
    }

    out
}

fn hex_value(chars: &[char], start: usize, len: usize) -> Option<u32> {
    let digits: String = chars.get(start..start + len)?.iter().collect();
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(&digits, 16).ok()
}

fn hex_char(chars: &[char], start: usize, len: usize) -> Option<char> {
    hex_value(chars, start, len).and_then(char::from_u32)
}

/// `\uXXXX`, combining a following `\uXXXX` low surrogate when present.
fn unicode_escape(chars: &[char], at: usize) -> Option<(char, usize)> {
    let high = hex_value(chars, at + 2, 4)?;
    if (0xD800..0xDC00).contains(&high) {
        let is_pair = chars.get(at + 6) == Some(&'\\') && chars.get(at + 7) == Some(&'u');
        let low = if is_pair {
            hex_value(chars, at + 8, 4)
        } else {
            None
        };
        let low = low.filter(|low| (0xDC00..0xE000).contains(low))?;
        let combined = 0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00);
        return char::from_u32(combined).map(|ch| (ch, 12));
    }
    char::from_u32(high).map(|ch| (ch, 6))
}
