//! Text measurement and wrapping for the built-in Helvetica faces.
//!
//! Widths are the standard AFM advance widths (1/1000 em) for printable ASCII.
//! Anything outside that range is measured as a digit, which matches the
//! accented Latin letters closely enough for layout.

/// Millimetres per PostScript point.
pub const MM_PER_PT: f32 = 25.4 / 72.0;

const FALLBACK_WIDTH: u16 = 556;

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Face {
    pub size_pt: f32,
    pub bold: bool,
}

impl Face {
    pub const fn regular(size_pt: f32) -> Self {
        Self {
            size_pt,
            bold: false,
        }
    }

    pub const fn bold(size_pt: f32) -> Self {
        Self {
            size_pt,
            bold: true,
        }
    }

    fn advance(&self, ch: char) -> u16 {
        let table = if self.bold { &HELVETICA_BOLD } else { &HELVETICA };
        match ch as u32 {
            code @ 32..=126 => table[(code - 32) as usize],
            _ => FALLBACK_WIDTH,
        }
    }

    /// Rendered width of `text` in millimetres.
    pub fn width_mm(&self, text: &str) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.advance(c))).sum();
        units as f32 / 1000.0 * self.size_pt * MM_PER_PT
    }

    /// Distance between baselines in millimetres.
    pub fn line_height_mm(&self, factor: f32) -> f32 {
        self.size_pt * MM_PER_PT * factor
    }
}

/// Break `text` into lines no wider than `max_width` millimetres.
///
/// Lines break at whitespace where possible; a single word wider than the
/// limit is split between characters. Explicit newlines are kept. Empty text
/// yields one empty line. No character other than the whitespace at a break
/// is dropped.
pub fn wrap_text(text: &str, face: Face, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if face.width_mm(&candidate) <= max_width {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if face.width_mm(word) <= max_width {
                current = word.to_string();
            } else {
                for ch in word.chars() {
                    current.push(ch);
                    if face.width_mm(&current) > max_width && current.chars().count() > 1 {
                        current.pop();
                        lines.push(std::mem::take(&mut current));
                        current.push(ch);
                    }
                }
            }
        }
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: Face = Face::regular(9.0);

    #[test]
    fn measures_ascii_with_afm_widths() {
        // "Hi" = 722 + 222 units at 10pt.
        let w = Face::regular(10.0).width_mm("Hi");
        assert!((w - 0.944 * 10.0 * MM_PER_PT).abs() < 1e-4);
        assert!(Face::bold(10.0).width_mm("Hi") > w);
    }

    #[test]
    fn short_text_stays_on_one_line() {
        assert_eq!(wrap_text("João Silva", BODY, 100.0), vec!["João Silva"]);
        assert_eq!(wrap_text("", BODY, 100.0), vec![""]);
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("alpha beta gamma delta", BODY, BODY.width_mm("gamma delta") + 0.1);
        assert_eq!(lines, vec!["alpha beta", "gamma delta"]);
    }

    #[test]
    fn splits_words_longer_than_the_column() {
        let word = "x".repeat(50);
        let lines = wrap_text(&word, BODY, BODY.width_mm("xxxxxxxxxx") + 0.01);
        assert_eq!(lines.len(), 5);
        assert!(lines.iter().all(|l| l.len() == 10));
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn keeps_explicit_newlines() {
        assert_eq!(wrap_text("a\nb", BODY, 100.0), vec!["a", "b"]);
    }
}
