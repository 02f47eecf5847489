//! Renders scraped paragraphs into a PDF document.
//!
//! Paragraph strings may carry a little inline markup (see [`markup`]). All
//! paragraphs are parsed before anything is drawn, so a bad paragraph fails
//! the whole document instead of producing a truncated one.

pub mod layout;
pub mod markup;

use std::str::FromStr;

use printpdf::{
    Color as PdfColor, IndirectFontRef, Line as PdfLine, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use thiserror::Error;

use crate::error::AppError;
use layout::{Align, Face, Line, Style, BODY, TITLE};
use markup::{Color, Inline, MarkupError, Span};

pub const PDF_FILENAME: &str = "web_scraper_results.pdf";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DEFAULT_LABEL: &str = "Unknown Source";

const MARGIN: f32 = 72.0;
const MM_PER_PT: f32 = 25.4 / 72.0;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("paragraph {index}: {source}")]
    Markup {
        index: usize,
        #[source]
        source: MarkupError,
    },

    #[error("{0}")]
    Renderer(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Letter,
    A4,
}

impl PageSize {
    /// Width and height in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.28, 841.89),
        }
    }
}

impl FromStr for PageSize {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "letter" => Ok(PageSize::Letter),
            "a4" => Ok(PageSize::A4),
            other => Err(AppError::ConfigError(format!("Invalid page size: {}", other))),
        }
    }
}

fn mm(pt: f32) -> Mm {
    Mm(pt * MM_PER_PT)
}

fn pdf_color(color: Option<Color>) -> PdfColor {
    let Color { r, g, b } = color.unwrap_or(Color { r: 0, g: 0, b: 0 });
    PdfColor::Rgb(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None))
}

pub fn title_for(label: &str) -> String {
    format!("Web Scraping Results from {}", label)
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    bold_italic: IndirectFontRef,
}

impl Fonts {
    fn load(doc: &PdfDocumentReference) -> Result<Self, PdfError> {
        let load = |face: Face| {
            doc.add_builtin_font(face.builtin())
                .map_err(|e| PdfError::Renderer(e.to_string()))
        };
        Ok(Fonts {
            regular: load(Face::Regular)?,
            bold: load(Face::Bold)?,
            italic: load(Face::Italic)?,
            bold_italic: load(Face::BoldItalic)?,
        })
    }

    fn get(&self, face: Face) -> &IndirectFontRef {
        match face {
            Face::Regular => &self.regular,
            Face::Bold => &self.bold,
            Face::Italic => &self.italic,
            Face::BoldItalic => &self.bold_italic,
        }
    }
}

/// Top-down cursor over a growing sequence of pages.
struct Canvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    fonts: Fonts,
    page_size: PageSize,
    pages: usize,
    // distance from the top edge, in points
    cursor: f32,
}

impl Canvas {
    fn new(title: &str, page_size: PageSize) -> Result<Self, PdfError> {
        let (width, height) = page_size.dimensions();
        let (doc, page, layer) = PdfDocument::new(title, mm(width), mm(height), "Layer 1");
        let fonts = Fonts::load(&doc)?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Canvas {
            doc,
            layer,
            fonts,
            page_size,
            pages: 1,
            cursor: MARGIN,
        })
    }

    fn frame_width(&self) -> f32 {
        self.page_size.dimensions().0 - 2.0 * MARGIN
    }

    fn new_page(&mut self) {
        let (width, height) = self.page_size.dimensions();
        self.pages += 1;
        let (page, layer) = self.doc.add_page(mm(width), mm(height), format!("Layer {}", self.pages));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = MARGIN;
    }

    fn draw_line(&mut self, line: &Line, style: &Style) {
        let (_, height) = self.page_size.dimensions();
        if self.cursor + style.leading > height - MARGIN {
            self.new_page();
        }

        let baseline = height - self.cursor - style.size;
        let mut x = match style.align {
            Align::Left => MARGIN,
            Align::Center => MARGIN + (self.frame_width() - line.width).max(0.0) / 2.0,
        };
        for run in &line.runs {
            let size = run.font_size(style.size);
            let y = baseline + run.baseline_shift(style.size);
            let color = pdf_color(run.style.color);

            self.layer.set_fill_color(color.clone());
            self.layer
                .use_text(run.text.clone(), size, mm(x), mm(y), self.fonts.get(run.face));

            // decorations skip the separating space a run starts with
            let start = x + run.leading_space_width(style.size);
            let end = x + run.width;
            if run.style.underline {
                self.rule(start, end, y - size * 0.15, size, color.clone());
            }
            if run.style.strike {
                self.rule(start, end, y + size * 0.3, size, color);
            }
            x += run.width;
        }
        self.cursor += style.leading;
    }

    fn rule(&self, x0: f32, x1: f32, y: f32, size: f32, color: PdfColor) {
        if x1 <= x0 {
            return;
        }
        self.layer.set_outline_color(color);
        self.layer.set_outline_thickness(size / 15.0);
        self.layer.add_line(PdfLine {
            points: vec![
                (Point::new(mm(x0), mm(y)), false),
                (Point::new(mm(x1), mm(y)), false),
            ],
            is_closed: false,
        });
    }

    fn draw_block(&mut self, inlines: &[Inline], style: &Style) {
        let lines = layout::wrap(inlines, style, self.frame_width());
        for line in &lines {
            self.draw_line(line, style);
        }
    }

    fn skip_lines(&mut self, count: usize, style: &Style) {
        self.cursor += style.leading * count as f32;
    }

    fn finish(self) -> Result<Vec<u8>, PdfError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| PdfError::Renderer(e.to_string()))
    }
}

/// Lays out a title block followed by one block per paragraph, in order, and
/// returns the finished document.
pub fn render_results(label: &str, paragraphs: &[String], page_size: PageSize) -> Result<Vec<u8>, PdfError> {
    let parsed = paragraphs
        .iter()
        .enumerate()
        .map(|(index, paragraph)| {
            markup::parse(paragraph).map_err(|source| PdfError::Markup { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let title = title_for(label);
    // The title is the label verbatim, never markup.
    let title_inlines = [Inline::Text(Span::plain(title.clone()))];

    let mut canvas = Canvas::new(&title, page_size)?;
    canvas.draw_block(&title_inlines, &TITLE);
    canvas.skip_lines(2, &BODY);

    for inlines in &parsed {
        canvas.draw_block(inlines, &BODY);
        canvas.skip_lines(1, &BODY);
    }

    tracing::debug!(paragraphs = paragraphs.len(), pages = canvas.pages, "Rendered PDF");
    canvas.finish()
}

/// Runs [`render_results`] on the blocking pool.
pub async fn render(label: String, paragraphs: Vec<String>, page_size: PageSize) -> Result<Vec<u8>, PdfError> {
    tokio::task::spawn_blocking(move || render_results(&label, &paragraphs, page_size))
        .await
        .map_err(|e| PdfError::Renderer(format!("Render task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_title_and_paragraphs() {
        let paragraphs = vec!["Hello world".to_string(), "Second paragraph".to_string()];
        let bytes = render_results("http://example.com", &paragraphs, PageSize::Letter).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn renders_title_only_document() {
        let bytes = render_results(DEFAULT_LABEL, &[], PageSize::Letter).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn long_input_spills_onto_more_pages() {
        let paragraphs: Vec<String> = (0..200)
            .map(|i| format!("Paragraph {} with <b>some</b> text that goes on for a while. ", i).repeat(3))
            .collect();
        let short = render_results("x", &paragraphs[..1], PageSize::A4).unwrap();
        let long = render_results("x", &paragraphs, PageSize::A4).unwrap();
        assert!(long.starts_with(b"%PDF-"));
        assert!(long.len() > short.len());
    }

    #[test]
    fn label_is_not_parsed_as_markup() {
        let bytes = render_results("https://example.com/?a=1&b=<2>", &[], PageSize::Letter).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn renders_decorated_and_coloured_markup() {
        let paragraphs = vec![
            "<u>underlined words</u> then <strike>struck</strike> text".to_string(),
            "E = mc<super>2</super>, H<sub>2</sub>O and <font color=\"#cc0000\">red</font>".to_string(),
            "<para><link href=\"https://example.com\">link</link> <unichar code=\"0x2022\"/> <img src=\"x.png\"/></para>".to_string(),
            "\u{20ac}5 \u{2026} \u{201c}quoted\u{201d} 10&nbsp;km".to_string(),
        ];
        let bytes = render_results("decorations", &paragraphs, PageSize::Letter).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn malformed_markup_fails_the_document() {
        let paragraphs = vec!["fine".to_string(), "<b>not closed".to_string()];
        let err = render_results("x", &paragraphs, PageSize::Letter).unwrap_err();
        match err {
            PdfError::Markup { index, source } => {
                assert_eq!(index, 1);
                assert_eq!(source, MarkupError::UnclosedTag("b".to_string()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn page_size_parses_case_insensitively() {
        assert_eq!("Letter".parse::<PageSize>().unwrap(), PageSize::Letter);
        assert_eq!(" a4 ".parse::<PageSize>().unwrap(), PageSize::A4);
        assert!("legal".parse::<PageSize>().is_err());
    }

    #[tokio::test]
    async fn render_runs_off_the_async_runtime() {
        let bytes = render("label".to_string(), vec!["body".to_string()], PageSize::Letter)
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
