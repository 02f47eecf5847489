//! Line breaking for the built-in Helvetica family.
//!
//! Widths come from the standard Helvetica and Helvetica-Bold AFM metrics
//! (1/1000 em) over the WinAnsi repertoire the built-in fonts are encoded in.
//! The oblique faces share the upright widths.

use printpdf::BuiltinFont;

use super::markup::{Inline, InlineStyle, Rise};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl Face {
    pub fn styled(self, bold: bool, italic: bool) -> Face {
        let bold = bold || matches!(self, Face::Bold | Face::BoldItalic);
        let italic = italic || matches!(self, Face::Italic | Face::BoldItalic);
        match (bold, italic) {
            (false, false) => Face::Regular,
            (true, false) => Face::Bold,
            (false, true) => Face::Italic,
            (true, true) => Face::BoldItalic,
        }
    }

    pub fn builtin(self) -> BuiltinFont {
        match self {
            Face::Regular => BuiltinFont::Helvetica,
            Face::Bold => BuiltinFont::HelveticaBold,
            Face::Italic => BuiltinFont::HelveticaOblique,
            Face::BoldItalic => BuiltinFont::HelveticaBoldOblique,
        }
    }

    fn is_bold(self) -> bool {
        matches!(self, Face::Bold | Face::BoldItalic)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Style {
    pub face: Face,
    pub size: f32,
    pub leading: f32,
    pub align: Align,
}

pub const TITLE: Style = Style {
    face: Face::Bold,
    size: 18.0,
    leading: 22.0,
    align: Align::Center,
};

pub const BODY: Style = Style {
    face: Face::Regular,
    size: 10.0,
    leading: 12.0,
    align: Align::Left,
};

/// Superscripts and subscripts are set smaller than the surrounding text.
pub const SCRIPT_SCALE: f32 = 0.7;

/// Helvetica advance widths for U+0020..=U+007E.
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // p..~
];

/// Helvetica-Bold advance widths for U+0020..=U+007E.
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 0..?
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // P.._
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // `..o
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // p..~
];

/// Helvetica advance widths for U+00A0..=U+00FF.
const HELVETICA_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333, // nbsp..macron
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611, // degree..questiondown
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // Agrave..Idieresis
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // Eth..germandbls
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278, // agrave..idieresis
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500, // eth..ydieresis
];

/// Helvetica-Bold advance widths for U+00A0..=U+00FF.
const HELVETICA_BOLD_LATIN1: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 280, 556, 333, 737, 370, 556, 584, 333, 737, 333, // nbsp..macron
    400, 584, 333, 333, 333, 611, 556, 278, 333, 333, 365, 556, 834, 834, 834, 611, // degree..questiondown
    722, 722, 722, 722, 722, 722, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278, // Agrave..Idieresis
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611, // Eth..germandbls
    556, 556, 556, 556, 556, 556, 889, 556, 556, 556, 556, 556, 278, 278, 278, 278, // agrave..idieresis
    611, 611, 611, 611, 611, 611, 611, 584, 611, 611, 611, 611, 611, 556, 611, 556, // eth..ydieresis
];

const DEFAULT_WIDTH: u16 = 556;

/// Widths of the WinAnsi characters outside Latin-1 (the 0x80..0x9F slots),
/// as `(regular, bold)`.
fn winansi_extra_width(c: char) -> Option<(u16, u16)> {
    let widths = match c {
        '\u{20ac}' => (556, 556),   // Euro
        '\u{201a}' => (222, 278),   // quotesinglbase
        '\u{0192}' => (556, 556),   // florin
        '\u{201e}' => (333, 500),   // quotedblbase
        '\u{2026}' => (1000, 1000), // ellipsis
        '\u{2020}' => (556, 556),   // dagger
        '\u{2021}' => (556, 556),   // daggerdbl
        '\u{02c6}' => (333, 333),   // circumflex
        '\u{2030}' => (1000, 1000), // perthousand
        '\u{0160}' => (667, 667),   // Scaron
        '\u{2039}' => (333, 333),   // guilsinglleft
        '\u{0152}' => (1000, 1000), // OE
        '\u{017d}' => (611, 611),   // Zcaron
        '\u{2018}' => (222, 278),   // quoteleft
        '\u{2019}' => (222, 278),   // quoteright
        '\u{201c}' => (333, 500),   // quotedblleft
        '\u{201d}' => (333, 500),   // quotedblright
        '\u{2022}' => (350, 350),   // bullet
        '\u{2013}' => (556, 556),   // endash
        '\u{2014}' => (1000, 1000), // emdash
        '\u{02dc}' => (333, 333),   // tilde
        '\u{2122}' => (1000, 1000), // trademark
        '\u{0161}' => (500, 556),   // scaron
        '\u{203a}' => (333, 333),   // guilsinglright
        '\u{0153}' => (944, 944),   // oe
        '\u{017e}' => (500, 500),   // zcaron
        '\u{0178}' => (667, 667),   // Ydieresis
        _ => return None,
    };
    Some(widths)
}

fn char_width(c: char, bold: bool) -> u16 {
    let (ascii, latin1) = if bold {
        (&HELVETICA_BOLD_ASCII, &HELVETICA_BOLD_LATIN1)
    } else {
        (&HELVETICA_ASCII, &HELVETICA_LATIN1)
    };
    match c as u32 {
        code @ 0x20..=0x7e => ascii[(code - 0x20) as usize],
        code @ 0xa0..=0xff => latin1[(code - 0xa0) as usize],
        _ => match winansi_extra_width(c) {
            Some((regular, bold_width)) => if bold { bold_width } else { regular },
            None => DEFAULT_WIDTH,
        },
    }
}

/// Rendered width of `text` in points.
pub fn text_width(text: &str, face: Face, size: f32) -> f32 {
    let bold = face.is_bold();
    let units: u32 = text.chars().map(|c| char_width(c, bold) as u32).sum();
    units as f32 * size / 1000.0
}

/// Maps a character onto the WinAnsi repertoire of the built-in fonts.
pub fn to_winansi(c: char) -> char {
    match c {
        '\u{20}'..='\u{7e}' | '\u{a0}'..='\u{ff}' => c,
        c if winansi_extra_width(c).is_some() => c,
        '\u{2010}'..='\u{2012}' | '\u{2015}' | '\u{2212}' => '-',
        '\u{2032}' => '\'',
        '\u{2033}' => '"',
        c if (c as u32) < 0x20 => ' ',
        _ => '?',
    }
}

fn is_break_space(c: char) -> bool {
    c.is_ascii_whitespace()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub face: Face,
    pub style: InlineStyle,
    pub width: f32,
}

impl Run {
    /// Point size the run is set in, given the block's base size.
    pub fn font_size(&self, size: f32) -> f32 {
        script_size(self.style.rise, size)
    }

    /// Width of the separating space a run may start with.
    pub fn leading_space_width(&self, size: f32) -> f32 {
        let spaces = self.text.len() - self.text.trim_start_matches(' ').len();
        text_width(&self.text[..spaces], self.face, self.font_size(size))
    }

    /// Vertical offset of the run's baseline from the line's baseline.
    pub fn baseline_shift(&self, size: f32) -> f32 {
        match self.style.rise {
            Rise::Baseline => 0.0,
            Rise::Super => size * 0.4,
            Rise::Sub => -size * 0.2,
        }
    }
}

fn script_size(rise: Rise, size: f32) -> f32 {
    match rise {
        Rise::Baseline => size,
        Rise::Super | Rise::Sub => size * SCRIPT_SCALE,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Line {
    pub runs: Vec<Run>,
    pub width: f32,
}

impl Line {
    fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    fn push(&mut self, word: &str, leading_space: bool, face: Face, style: InlineStyle, size: f32) {
        let mut piece = String::with_capacity(word.len() + 1);
        if leading_space {
            piece.push(' ');
        }
        piece.push_str(word);
        let width = text_width(&piece, face, script_size(style.rise, size));

        match self.runs.last_mut() {
            Some(run) if run.face == face && run.style == style => {
                run.text.push_str(&piece);
                run.width += width;
            }
            _ => self.runs.push(Run { text: piece, face, style, width }),
        }
        self.width += width;
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// Greedy line filling. Runs of ASCII whitespace collapse to single spaces
/// and are the only break opportunities, explicit breaks always start a new
/// line, and a word wider than `max_width` is split across lines.
pub fn wrap(inlines: &[Inline], style: &Style, max_width: f32) -> Vec<Line> {
    let mut lines = Vec::new();
    let mut current = Line::default();
    let mut pending_space = false;

    for inline in inlines {
        let span = match inline {
            Inline::Break => {
                lines.push(std::mem::take(&mut current));
                pending_space = false;
                continue;
            }
            Inline::Text(span) => span,
        };

        let face = style.face.styled(span.style.bold, span.style.italic);
        let size = script_size(span.style.rise, style.size);
        let text: String = span.text.chars().map(to_winansi).collect();

        let mut remaining = text.as_str();
        while !remaining.is_empty() {
            let trimmed = remaining.trim_start_matches(is_break_space);
            if trimmed.len() != remaining.len() {
                pending_space = true;
                remaining = trimmed;
                continue;
            }
            let end = remaining.find(is_break_space).unwrap_or(remaining.len());
            let word = &remaining[..end];
            remaining = &remaining[end..];

            let space = pending_space && !current.is_empty();
            let space_width = if space { text_width(" ", face, size) } else { 0.0 };
            let word_width = text_width(word, face, size);

            if !current.is_empty() && current.width + space_width + word_width > max_width {
                lines.push(std::mem::take(&mut current));
            }

            if current.is_empty() && word_width > max_width {
                let mut chunks = split_word(word, face, size, max_width);
                let last = chunks.pop().unwrap_or_default();
                for chunk in chunks {
                    current.push(&chunk, false, face, span.style, style.size);
                    lines.push(std::mem::take(&mut current));
                }
                current.push(&last, false, face, span.style, style.size);
            } else {
                let space = space && !current.is_empty();
                current.push(word, space, face, span.style, style.size);
            }
            pending_space = false;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn split_word(word: &str, face: Face, size: f32, max_width: f32) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut chunk = String::new();
    let mut width = 0.0;

    for c in word.chars() {
        let w = text_width(c.encode_utf8(&mut [0; 4]), face, size);
        if !chunk.is_empty() && width + w > max_width {
            chunks.push(std::mem::take(&mut chunk));
            width = 0.0;
        }
        chunk.push(c);
        width += w;
    }
    chunks.push(chunk);
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::markup::parse;

    fn lines_of(source: &str, max_width: f32) -> Vec<String> {
        let inlines = parse(source).unwrap();
        wrap(&inlines, &BODY, max_width).iter().map(Line::text).collect()
    }

    #[test]
    fn measures_known_widths() {
        // "Hi" = 722 + 222 units regular, 722 + 278 bold
        assert!((text_width("Hi", Face::Regular, 10.0) - 9.44).abs() < 1e-4);
        assert!((text_width("Hi", Face::Bold, 10.0) - 10.0).abs() < 1e-4);
        assert_eq!(text_width("", Face::Regular, 10.0), 0.0);
    }

    #[test]
    fn bold_widths_follow_their_own_metrics() {
        // il: 222 + 222 regular, 278 + 278 bold
        assert!((text_width("il", Face::Regular, 10.0) - 4.44).abs() < 1e-4);
        assert!((text_width("il", Face::Bold, 10.0) - 5.56).abs() < 1e-4);
        // ft: 278 + 278 regular, 333 + 333 bold
        assert!((text_width("ft", Face::BoldItalic, 10.0) - 6.66).abs() < 1e-4);
        // oblique shares the upright widths
        assert_eq!(text_width("Title", Face::Italic, 18.0), text_width("Title", Face::Regular, 18.0));
    }

    #[test]
    fn short_text_fits_on_one_line() {
        assert_eq!(lines_of("Hello   world", 500.0), vec!["Hello world"]);
    }

    #[test]
    fn wraps_at_word_boundaries_within_width() {
        let source = "the quick brown fox jumps over the lazy dog ".repeat(10);
        let inlines = parse(&source).unwrap();
        let lines = wrap(&inlines, &BODY, 120.0);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line.width <= 120.0, "line too wide: {:?}", line.text());
            assert!(!line.text().starts_with(' '));
        }
        let rejoined: Vec<String> = lines.iter().map(Line::text).collect();
        assert_eq!(rejoined.join(" "), source.trim_end());
    }

    #[test]
    fn bold_title_lines_stay_within_the_frame() {
        let source = "Web Scraping Results from https://illustrative.example.com/little/tiny/filler/list ".repeat(3);
        let inlines = parse(&source).unwrap();
        for line in wrap(&inlines, &TITLE, 468.0) {
            let measured: f32 = line.runs.iter().map(|run| text_width(&run.text, Face::Bold, TITLE.size)).sum();
            assert!(measured <= 468.0, "title line too wide: {:?}", line.text());
            assert!((measured - line.width).abs() < 1e-3);
        }
    }

    #[test]
    fn splits_words_wider_than_the_line() {
        let lines = lines_of(&"x".repeat(100), 50.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "x".repeat(100));
    }

    #[test]
    fn explicit_breaks_start_new_lines() {
        assert_eq!(lines_of("one<br/>two", 500.0), vec!["one", "two"]);
        assert_eq!(lines_of("<br/><br/>", 500.0), vec!["", ""]);
    }

    #[test]
    fn non_breaking_spaces_are_kept_and_never_break() {
        assert_eq!(lines_of("a&nbsp;&nbsp;&nbsp;b", 500.0), vec!["a\u{a0}\u{a0}\u{a0}b"]);

        // "10 km" fits only if broken; the nbsp keeps it together
        let lines = lines_of("aaaa 10&nbsp;km", text_width("aaaa 10", Face::Regular, BODY.size) + 0.5);
        assert_eq!(lines, vec!["aaaa", "10\u{a0}km"]);
    }

    #[test]
    fn styled_spans_become_separate_runs() {
        let inlines = parse("plain <b>bold</b> plain").unwrap();
        let lines = wrap(&inlines, &BODY, 500.0);
        assert_eq!(lines.len(), 1);
        let faces: Vec<Face> = lines[0].runs.iter().map(|run| run.face).collect();
        assert_eq!(faces, vec![Face::Regular, Face::Bold, Face::Regular]);
        assert_eq!(lines[0].text(), "plain bold plain");
    }

    #[test]
    fn decorations_split_runs_and_scripts_shrink() {
        let inlines = parse("E = mc<sup>2</sup> <u>under</u>").unwrap();
        let lines = wrap(&inlines, &BODY, 500.0);
        let runs = &lines[0].runs;
        assert_eq!(runs.len(), 3);

        let sup = &runs[1];
        assert_eq!(sup.text, "2");
        assert_eq!(sup.style.rise, Rise::Super);
        assert!((sup.font_size(BODY.size) - 7.0).abs() < 1e-4);
        assert!(sup.baseline_shift(BODY.size) > 0.0);
        assert!((sup.width - text_width("2", Face::Regular, 7.0)).abs() < 1e-4);

        let under = &runs[2];
        assert_eq!(under.text, " under");
        assert!(under.style.underline);
        assert_eq!(under.baseline_shift(BODY.size), 0.0);
        // the separating space is not underlined
        assert!((under.leading_space_width(BODY.size) - 2.78).abs() < 1e-4);
        assert_eq!(runs[0].leading_space_width(BODY.size), 0.0);
    }

    #[test]
    fn title_style_is_bold_throughout() {
        let inlines = parse("Title <i>slanted</i>").unwrap();
        let lines = wrap(&inlines, &TITLE, 500.0);
        let faces: Vec<Face> = lines[0].runs.iter().map(|run| run.face).collect();
        assert_eq!(faces, vec![Face::Bold, Face::BoldItalic]);
    }

    #[test]
    fn keeps_the_winansi_repertoire() {
        assert_eq!(
            lines_of("\u{201c}caf\u{e9}\u{201d} \u{2014} \u{20ac}5 \u{2026} \u{2122}", 500.0),
            vec!["\u{201c}caf\u{e9}\u{201d} \u{2014} \u{20ac}5 \u{2026} \u{2122}"]
        );
        assert_eq!(text_width("\u{2026}", Face::Regular, 10.0), 10.0);
    }

    #[test]
    fn replaces_what_the_fonts_cannot_show() {
        assert_eq!(to_winansi('\u{4e2d}'), '?');
        assert_eq!(to_winansi('\u{2212}'), '-');
        // C1 controls have no glyph and would be dropped by the encoder
        assert_eq!(to_winansi('\u{85}'), '?');
        assert_eq!(to_winansi('\u{9f}'), '?');
        assert_eq!(to_winansi('\u{7f}'), '?');
        assert_eq!(to_winansi('\t'), ' ');
    }
}
