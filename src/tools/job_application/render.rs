//! Plain-text to PDF layout
//!
//! Each input line becomes a full-width paragraph: A4 page, 10 mm side and top
//! margins, Helvetica 12 pt on a 10 mm line height. Lines wider than the text
//! column wrap at spaces (or mid-word when a single word is too wide), and a new
//! page starts once the next line would cross the 20 mm bottom margin. No markup
//! is interpreted.

use printpdf::{BuiltinFont, Mm, PdfDocument};

use crate::core::{JobToolError, JobToolResult};

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const BOTTOM_MARGIN_MM: f32 = 20.0;
const FONT_SIZE_PT: f32 = 12.0;
const LINE_HEIGHT_MM: f32 = 10.0;
const PT_TO_MM: f32 = 25.4 / 72.0;

/// Helvetica advance widths (1/1000 em) for ASCII 0x20..=0x7E, from the AFM
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];
/// Width assumed for characters outside the table
const DEFAULT_WIDTH: u16 = 556;

/// A rendered PDF
#[derive(Debug, Clone)]
pub struct RenderedPdf {
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

/// Render `text` line by line into a PDF titled `title`
pub fn render_text_pdf(title: &str, text: &str) -> JobToolResult<RenderedPdf> {
    let column_width = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let rows: Vec<String> = text
        .split('\n')
        .map(|line| sanitize(line.trim_end_matches('\r')))
        .flat_map(|line| wrap_line(&line, column_width))
        .collect();

    let (doc, page, layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| JobToolError::Render(format!("Failed to load font: {}", e)))?;

    let mut current_layer = doc.get_page(page).get_layer(layer);
    let mut page_count = 1;
    let mut top = MARGIN_MM;

    for row in rows {
        if top + LINE_HEIGHT_MM > PAGE_HEIGHT_MM - BOTTOM_MARGIN_MM {
            page_count += 1;
            let (page, layer) = doc.add_page(
                Mm(PAGE_WIDTH_MM),
                Mm(PAGE_HEIGHT_MM),
                format!("Page {}, Layer 1", page_count),
            );
            current_layer = doc.get_page(page).get_layer(layer);
            top = MARGIN_MM;
        }

        if !row.is_empty() {
            // Vertically centre the glyphs in the line box; printpdf measures from the bottom
            let baseline = top + LINE_HEIGHT_MM / 2.0 + 0.3 * FONT_SIZE_PT * PT_TO_MM;
            current_layer.use_text(
                row,
                FONT_SIZE_PT,
                Mm(MARGIN_MM),
                Mm(PAGE_HEIGHT_MM - baseline),
                &font,
            );
        }
        top += LINE_HEIGHT_MM;
    }

    let bytes = doc
        .save_to_bytes()
        .map_err(|e| JobToolError::Render(format!("Failed to serialize PDF: {}", e)))?;

    tracing::debug!("Rendered PDF: {} pages, {} bytes", page_count, bytes.len());

    Ok(RenderedPdf { bytes, page_count })
}

/// Width of `text` in millimetres at the body font size
fn text_width_mm(text: &str) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c))).sum();
    units as f32 / 1000.0 * FONT_SIZE_PT * PT_TO_MM
}

fn char_width(c: char) -> u16 {
    match c {
        ' '..='~' => HELVETICA_WIDTHS[c as usize - 0x20],
        _ => DEFAULT_WIDTH,
    }
}

/// Map text onto what the built-in Helvetica encoding can show
fn sanitize(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    for c in line.chars() {
        match c {
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2022}' => out.push('*'),
            '\u{2026}' => out.push_str("..."),
            '\t' => out.push_str("    "),
            ' '..='~' | '\u{A0}'..='\u{FF}' => out.push(c),
            c if c.is_control() => {}
            _ => out.push('?'),
        }
    }
    out
}

/// Break one line into rows that fit `max_width` millimetres.
///
/// Leading spaces stay on the first row so indented items keep their indent.
fn wrap_line(line: &str, max_width: f32) -> Vec<String> {
    if line.trim().is_empty() {
        return vec![String::new()];
    }

    let body = line.trim_start_matches(' ');
    let indent = &line[..line.len() - body.len()];

    let mut rows = Vec::new();
    let mut current = indent.to_string();
    let mut has_words = false;

    for word in body.split(' ') {
        let candidate = if has_words {
            format!("{} {}", current, word)
        } else {
            format!("{}{}", current, word)
        };
        if text_width_mm(&candidate) <= max_width {
            current = candidate;
            has_words = true;
            continue;
        }

        if has_words {
            rows.push(std::mem::take(&mut current));
        }
        has_words = true;

        // The word alone may still be too wide
        for c in word.chars() {
            current.push(c);
            if text_width_mm(&current) > max_width && current.chars().count() > 1 {
                current.pop();
                rows.push(std::mem::replace(&mut current, c.to_string()));
            }
        }
    }

    if !current.is_empty() {
        rows.push(current);
    }
    rows
}
