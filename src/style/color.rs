use crossterm::style::Color;

/// Resolve a style color string into a terminal color.
///
/// Accepts `#rrggbb`, `#rgb` and crossterm color names. Names are matched
/// case-insensitively with `-`/space treated as `_` and `gray` spelled as
/// `grey`, so `"Dark Gray"` resolves to `Color::DarkGrey`.
pub fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim();
    if let Some(hex) = value.strip_prefix('#') {
        return parse_hex(hex);
    }

    let name = value
        .to_ascii_lowercase()
        .replace(['-', ' '], "_")
        .replace("gray", "grey");
    Color::try_from(name.as_str()).ok()
}

fn parse_hex(hex: &str) -> Option<Color> {
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        6 => Some(Color::Rgb {
            r: u8::from_str_radix(&hex[0..2], 16).ok()?,
            g: u8::from_str_radix(&hex[2..4], 16).ok()?,
            b: u8::from_str_radix(&hex[4..6], 16).ok()?,
        }),
        3 => {
            let mut channels = [0u8; 3];
            for (slot, digit) in channels.iter_mut().zip(hex.chars()) {
                let v = digit.to_digit(16)? as u8;
                *slot = v * 17;
            }
            Some(Color::Rgb {
                r: channels[0],
                g: channels[1],
                b: channels[2],
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_forms() {
        assert_eq!(
            parse_color("#336699"),
            Some(Color::Rgb {
                r: 0x33,
                g: 0x66,
                b: 0x99
            })
        );
        assert_eq!(
            parse_color("#fff"),
            Some(Color::Rgb {
                r: 255,
                g: 255,
                b: 255
            })
        );
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#zzzzzz"), None);
    }

    #[test]
    fn named_colors() {
        assert_eq!(parse_color("white"), Some(Color::White));
        assert_eq!(parse_color("Dark Gray"), Some(Color::DarkGrey));
        assert_eq!(parse_color("dark-red"), Some(Color::DarkRed));
        assert_eq!(parse_color("no-such-color"), None);
    }
}
