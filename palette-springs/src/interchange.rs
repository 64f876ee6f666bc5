//! Human-readable palette listing.
//!
//! ```text
//! Group 1
//!   Palette 1
//!     HSL(0, 62, 74)  RGB(230, 148, 148)  L=0.376
//! ```
//!
//! Only the `HSL(...)` triples are read back; RGB and luminance are derived
//! again on load.

use std::fmt;

use crate::color::{Color, Rgb};
use crate::error::Error;
use crate::palette::{GROUPS, Palette, SLOTS};

pub fn write(palette: &Palette) -> String {
    Listing(palette).to_string()
}

/// Displays a palette in the listing format.
pub struct Listing<'a>(pub &'a Palette);

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in 0..GROUPS {
            writeln!(f, "Group {}", group + 1)?;

            for slot in 0..SLOTS {
                writeln!(f, "  Palette {}", slot + 1)?;

                for color in self.0.slot(group, slot).unwrap_or_default() {
                    writeln!(f, "    {}", format_color(color))?;
                }
            }
        }

        Ok(())
    }
}

fn format_color(color: &Color) -> String {
    let (h, s, l) = color.hsl();
    let Rgb { r, g, b } = color.rgb();

    format!(
        "HSL({}, {}, {})  RGB({r}, {g}, {b})  L={:.3}",
        h.round(),
        s.round(),
        l.round(),
        color.luminance()
    )
}

/// Reads every `HSL(h, s, l)` triple in `text`, in order.
///
/// Lines without a well-formed triple are skipped; the listing is rejected
/// unless exactly 60 colors come back.
pub fn parse(text: &str) -> Result<Palette, Error> {
    let colors: Vec<Color> = text.lines().filter_map(parse_line).collect();

    Palette::try_from(colors)
}

fn parse_line(line: &str) -> Option<Color> {
    let start = line.find("HSL(")? + "HSL(".len();
    let len = line[start..].find(')')?;

    let mut parts = line[start..start + len]
        .split(',')
        .map(|part| part.trim().parse::<f32>());

    let h = parts.next()?.ok()?;
    let s = parts.next()?.ok()?;
    let l = parts.next()?.ok()?;

    if parts.next().is_some() {
        return None;
    }

    Some(Color::new(h, s, l))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::{GeneratorConfig, PALETTE_LEN, generate};

    #[test]
    fn listing_has_the_expected_shape() {
        let text = write(&generate(&GeneratorConfig::default()));

        assert_eq!(text.lines().filter(|l| l.starts_with("Group ")).count(), GROUPS);
        assert_eq!(
            text.lines().filter(|l| l.starts_with("  Palette ")).count(),
            GROUPS * SLOTS
        );
        assert_eq!(text.matches("HSL(").count(), PALETTE_LEN);
        assert!(text.lines().nth(2).unwrap().contains("L=0."));
    }

    #[test]
    fn listing_displays_like_write() {
        let palette = generate(&GeneratorConfig::default());

        assert_eq!(format!("{}", Listing(&palette)), write(&palette));
    }

    #[test]
    fn color_line_format() {
        let line = format_color(&Color::new(0.0, 0.0, 50.0));
        assert_eq!(line, "HSL(0, 0, 50)  RGB(128, 128, 128)  L=0.216");
    }

    #[test]
    fn written_palette_reads_back() {
        let palette = generate(&GeneratorConfig::default());
        let loaded = parse(&write(&palette)).unwrap();

        assert_eq!(loaded.len(), PALETTE_LEN);

        for (a, b) in palette.iter().zip(loaded.iter()) {
            assert!((a.hue() - b.hue()).abs() <= 0.5 || (a.hue() - b.hue()).abs() >= 359.5);
            assert!((a.saturation() - b.saturation()).abs() <= 0.5);
            assert!((a.lightness() - b.lightness()).abs() <= 0.5);
        }
    }

    #[test]
    fn short_listing_is_missing_colors() {
        let text = write(&generate(&GeneratorConfig::default()));
        let truncated: String = text.lines().take(20).map(|l| format!("{l}\n")).collect();

        match parse(&truncated) {
            Err(Error::MissingColors { found }) => assert!(found < PALETTE_LEN),
            other => panic!("expected missing colors, got {other:?}"),
        }
    }

    #[test]
    fn extra_colors_are_rejected() {
        let mut text = write(&generate(&GeneratorConfig::default()));
        text.push_str("    HSL(10, 10, 10)\n");

        assert!(matches!(parse(&text), Err(Error::ExtraColors { found: 61 })));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        assert_eq!(parse_line("    HSL(1, 2)"), None);
        assert_eq!(parse_line("    HSL(1, x, 3)"), None);
        assert_eq!(parse_line("    HSL(1, 2, 3, 4)"), None);
        assert_eq!(parse_line("  Palette 2"), None);
        assert_eq!(parse_line("HSL(120, 50, 25)"), Some(Color::new(120.0, 50.0, 25.0)));
    }
}
