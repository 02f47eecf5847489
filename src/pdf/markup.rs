//! Inline markup accepted inside PDF paragraphs.
//!
//! A small tag language: `<b>`/`<strong>`, `<i>`/`<em>`, `<u>`, `<strike>`,
//! `<sup>`/`<super>`, `<sub>`, colour via `<font color=..>` (also on `<a>`,
//! `<link>`, `<span>`), `<para>`, the void tags `<br/>`, `<unichar code=../>`
//! and `<img/>`, and the common character entities. Anything else that looks
//! like a tag is an error, so a paragraph either renders the way it was
//! written or not at all.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("unknown tag <{0}>")]
    UnknownTag(String),

    #[error("unclosed tag <{0}>")]
    UnclosedTag(String),

    #[error("unexpected closing tag </{0}>")]
    UnexpectedClose(String),

    #[error("unterminated tag starting at byte {0}")]
    UnterminatedTag(usize),

    #[error("invalid {attribute} {value:?} on <{tag}>")]
    InvalidAttribute {
        tag: String,
        attribute: String,
        value: String,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Rise {
    #[default]
    Baseline,
    Super,
    Sub,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InlineStyle {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strike: bool,
    pub rise: Rise,
    pub color: Option<Color>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub style: InlineStyle,
}

impl Span {
    pub fn plain(text: impl Into<String>) -> Self {
        Span {
            text: text.into(),
            style: InlineStyle::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(Span),
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Effect {
    Bold,
    Italic,
    Underline,
    Strike,
    Super,
    Sub,
    Color(Color),
    Plain,
}

fn effect_of(name: &str, body: &str) -> Result<Effect, MarkupError> {
    match name {
        "b" | "strong" => Ok(Effect::Bold),
        "i" | "em" => Ok(Effect::Italic),
        "u" => Ok(Effect::Underline),
        "strike" | "s" => Ok(Effect::Strike),
        "sup" | "super" => Ok(Effect::Super),
        "sub" => Ok(Effect::Sub),
        "font" | "span" | "a" | "link" => match attribute(body, "color") {
            Some(value) => parse_color(value)
                .map(Effect::Color)
                .ok_or_else(|| invalid(name, "color", value)),
            None => Ok(Effect::Plain),
        },
        "para" => Ok(Effect::Plain),
        _ => Err(MarkupError::UnknownTag(name.to_string())),
    }
}

fn invalid(tag: &str, attribute: &str, value: &str) -> MarkupError {
    MarkupError::InvalidAttribute {
        tag: tag.to_string(),
        attribute: attribute.to_string(),
        value: value.to_string(),
    }
}

/// Value of attribute `key` in a tag body such as `font color="red" size=12`.
/// Quotes are optional; a bare attribute has an empty value.
fn attribute<'a>(body: &'a str, key: &str) -> Option<&'a str> {
    let (_, mut rest) = body.split_once(|c: char| c.is_ascii_whitespace())?;
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            return None;
        }
        let name_end = rest
            .find(|c: char| c == '=' || c.is_ascii_whitespace())
            .unwrap_or(rest.len());
        let name = &rest[..name_end];
        rest = rest[name_end..].trim_start();

        let value = match rest.strip_prefix('=') {
            Some(after) => {
                let after = after.trim_start();
                match after.chars().next() {
                    Some(quote @ ('"' | '\'')) => {
                        let close = after[1..].find(quote).map_or(after.len(), |i| i + 1);
                        rest = after.get(close + 1..).unwrap_or_default();
                        &after[1..close]
                    }
                    _ => {
                        let end = after.find(|c: char| c.is_ascii_whitespace()).unwrap_or(after.len());
                        rest = &after[end..];
                        &after[..end]
                    }
                }
            }
            None => "",
        };

        if name.eq_ignore_ascii_case(key) {
            return Some(value);
        }
    }
}

fn parse_color(value: &str) -> Option<Color> {
    let value = value.trim().to_ascii_lowercase();
    if let Some(hex) = value.strip_prefix('#') {
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(Color {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        });
    }

    let (r, g, b) = match value.as_str() {
        "black" => (0, 0, 0),
        "white" => (255, 255, 255),
        "red" => (255, 0, 0),
        "green" => (0, 128, 0),
        "blue" => (0, 0, 255),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "purple" => (128, 0, 128),
        "gray" | "grey" => (128, 128, 128),
        "darkgray" | "darkgrey" => (169, 169, 169),
        "navy" => (0, 0, 128),
        "maroon" => (128, 0, 0),
        "teal" => (0, 128, 128),
        _ => return None,
    };
    Some(Color { r, g, b })
}

fn parse_code_point(value: &str) -> Option<char> {
    let value = value.trim();
    let code = match value.strip_prefix("0x").or_else(|| value.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => value.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

struct Parser {
    inlines: Vec<Inline>,
    open: Vec<(String, Effect)>,
    buffer: String,
}

impl Parser {
    fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let mut style = InlineStyle::default();
        for (_, effect) in &self.open {
            match *effect {
                Effect::Bold => style.bold = true,
                Effect::Italic => style.italic = true,
                Effect::Underline => style.underline = true,
                Effect::Strike => style.strike = true,
                Effect::Super => style.rise = Rise::Super,
                Effect::Sub => style.rise = Rise::Sub,
                Effect::Color(color) => style.color = Some(color),
                Effect::Plain => {}
            }
        }
        self.inlines.push(Inline::Text(Span {
            text: std::mem::take(&mut self.buffer),
            style,
        }));
    }

    fn tag(&mut self, raw: &str) -> Result<(), MarkupError> {
        let raw = raw.trim();
        let (closing, body) = match raw.strip_prefix('/') {
            Some(rest) => (true, rest.trim_start()),
            None => (false, raw),
        };
        let self_closing = body.ends_with('/');
        let body = body.trim_end_matches('/');
        let name = body
            .split_whitespace()
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        // void elements
        match name.as_str() {
            "br" | "unichar" | "img" if closing => return Err(MarkupError::UnexpectedClose(name.clone())),
            "br" => {
                self.flush();
                self.inlines.push(Inline::Break);
                return Ok(());
            }
            "unichar" => {
                let value = attribute(body, "code").unwrap_or_default();
                let c = parse_code_point(value).ok_or_else(|| invalid(&name, "code", value))?;
                self.buffer.push(c);
                return Ok(());
            }
            "img" => return Ok(()),
            _ => {}
        }

        if closing {
            effect_of(&name, "")?;
            self.flush();
            return match self.open.pop() {
                Some((open_name, _)) if open_name == name => Ok(()),
                _ => Err(MarkupError::UnexpectedClose(name)),
            };
        }

        let effect = effect_of(&name, body)?;
        self.flush();
        if !self_closing {
            self.open.push((name, effect));
        }
        Ok(())
    }
}

/// Parses one paragraph of inline markup into styled spans and line breaks.
pub fn parse(source: &str) -> Result<Vec<Inline>, MarkupError> {
    let mut parser = Parser {
        inlines: Vec::new(),
        open: Vec::new(),
        buffer: String::new(),
    };

    let mut rest = source;
    let mut offset = 0;
    while let Some(c) = rest.chars().next() {
        match c {
            '<' if rest[1..].starts_with(|n: char| n.is_ascii_alphabetic() || n == '/') => {
                let end = rest.find('>').ok_or(MarkupError::UnterminatedTag(offset))?;
                parser.tag(&rest[1..end])?;
                offset += end + 1;
                rest = &rest[end + 1..];
            }
            '&' => {
                let (decoded, consumed) = decode_entity(rest);
                parser.buffer.push_str(&decoded);
                offset += consumed;
                rest = &rest[consumed..];
            }
            _ => {
                parser.buffer.push(c);
                offset += c.len_utf8();
                rest = &rest[c.len_utf8()..];
            }
        }
    }
    parser.flush();

    if let Some((name, _)) = parser.open.pop() {
        return Err(MarkupError::UnclosedTag(name));
    }
    Ok(parser.inlines)
}

/// Decodes the entity at the start of `input` (which begins with `&`).
/// Returns the decoded text and the number of bytes consumed; an unknown or
/// malformed entity is a literal `&`.
fn decode_entity(input: &str) -> (String, usize) {
    let literal = ("&".to_string(), 1);
    let Some(semi) = input[1..].find(';').filter(|semi| *semi <= 10) else {
        return literal;
    };
    let name = &input[1..semi + 1];
    let consumed = semi + 2;

    let decoded = match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => name.strip_prefix('#').and_then(|code| {
            let value = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => code.parse::<u32>().ok(),
            };
            value.and_then(char::from_u32)
        }),
    };

    match decoded {
        Some(c) => (c.to_string(), consumed),
        None => literal,
    }
}
