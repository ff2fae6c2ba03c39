//! PDF rendering of a summary document
//!
//! Text-only layout on US Letter pages with the built-in Helvetica faces.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::summary::{Block, SummaryDocument};
use crate::error::{AppError, AppResult};

const PAGE_WIDTH: f32 = 215.9;
const PAGE_HEIGHT: f32 = 279.4;
const MARGIN_X: f32 = 25.4;
const MARGIN_TOP: f32 = 25.4;
const MARGIN_BOTTOM: f32 = 15.0;
const PT_TO_MM: f32 = 0.3528;

const TITLE_SIZE: f32 = 18.0;
const HEADING_SIZE: f32 = 14.0;
const BODY_SIZE: f32 = 10.0;
const TABLE_SIZE: f32 = 8.0;

/// Width of the label column of a field table
const LABEL_COLUMN: f32 = 50.8;
/// Equipment grid columns, in millimetres
const GRID_COLUMNS: [f32; 6] = [15.0, 38.0, 30.0, 30.0, 30.0, 17.0];

/// Split `text` into lines of at most `max_chars` characters, breaking on spaces
pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word = word.to_string();
        while word.chars().count() > max_chars {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            let head: String = word.chars().take(max_chars).collect();
            word = word.chars().skip(max_chars).collect();
            lines.push(head);
        }

        let needed = current.chars().count() + usize::from(!current.is_empty()) + word.chars().count();
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Characters of Helvetica at `size` that fit in `width_mm`
fn chars_for(width_mm: f32, size: f32) -> usize {
    let average_char_mm = size * PT_TO_MM * 0.5;
    (width_mm / average_char_mm).floor() as usize
}

fn line_height(size: f32) -> f32 {
    size * PT_TO_MM * 1.5
}

struct Writer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl Writer {
    fn new(title: &str) -> AppResult<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Contenido");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Document(format!("Failed to load font: {}", e)))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::Document(format!("Failed to load font: {}", e)))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN_TOP,
            pages: 1,
        })
    }

    fn ensure_room(&mut self, height: f32) {
        if self.y - height < MARGIN_BOTTOM {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Contenido");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN_TOP;
            self.pages += 1;
        }
    }

    fn text_at(&self, text: &str, size: f32, x: f32, bold: bool) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn paragraph(&mut self, text: &str, size: f32, bold: bool, indent: f32) {
        let width = PAGE_WIDTH - 2.0 * MARGIN_X - indent;
        for line in wrap(text, chars_for(width, size)) {
            self.ensure_room(line_height(size));
            self.y -= line_height(size);
            self.text_at(&line, size, MARGIN_X + indent, bold);
        }
    }

    fn fields(&mut self, pairs: &[(String, String)]) {
        let value_width = PAGE_WIDTH - 2.0 * MARGIN_X - LABEL_COLUMN;
        for (label, value) in pairs {
            let labels = wrap(label, chars_for(LABEL_COLUMN - 2.0, BODY_SIZE));
            let values = wrap(value, chars_for(value_width, BODY_SIZE));
            let rows = labels.len().max(values.len());
            for i in 0..rows {
                self.ensure_room(line_height(BODY_SIZE));
                self.y -= line_height(BODY_SIZE);
                if let Some(l) = labels.get(i) {
                    self.text_at(l, BODY_SIZE, MARGIN_X, true);
                }
                if let Some(v) = values.get(i) {
                    self.text_at(v, BODY_SIZE, MARGIN_X + LABEL_COLUMN, false);
                }
            }
            self.y -= 1.5;
        }
    }

    fn grid_row(&mut self, cells: &[String], bold: bool) {
        let wrapped: Vec<Vec<String>> = cells
            .iter()
            .zip(GRID_COLUMNS)
            .map(|(cell, width)| wrap(cell, chars_for(width - 2.0, TABLE_SIZE)))
            .collect();
        let rows = wrapped.iter().map(Vec::len).max().unwrap_or(1);

        for i in 0..rows {
            self.ensure_room(line_height(TABLE_SIZE));
            self.y -= line_height(TABLE_SIZE);
            let mut x = MARGIN_X;
            for (lines, width) in wrapped.iter().zip(GRID_COLUMNS) {
                if let Some(line) = lines.get(i) {
                    self.text_at(line, TABLE_SIZE, x, bold);
                }
                x += width;
            }
        }
        self.y -= 1.0;
    }

    fn block(&mut self, block: &Block) {
        match block {
            Block::Title(text) => {
                self.paragraph(text, TITLE_SIZE, true, 0.0);
                self.y -= 6.0;
            }
            Block::Heading(text) => {
                self.y -= 4.0;
                self.paragraph(text, HEADING_SIZE, true, 0.0);
                self.y -= 2.0;
            }
            Block::Paragraph { text, bold } => self.paragraph(text, BODY_SIZE, *bold, 0.0),
            Block::Bullet(text) => self.paragraph(&format!("- {}", text), BODY_SIZE, false, 4.0),
            Block::Fields(pairs) => self.fields(pairs),
            Block::Table { header, rows } => {
                self.grid_row(header, true);
                for row in rows {
                    self.grid_row(row, false);
                }
            }
            Block::Spacer => self.y -= 6.0,
        }
    }

    fn finish(self) -> AppResult<Vec<u8>> {
        self.doc
            .save_to_bytes()
            .map_err(|e| AppError::Document(format!("Failed to write PDF: {}", e)))
    }
}

/// Render a summary to PDF bytes
pub fn render(summary: &SummaryDocument) -> AppResult<Vec<u8>> {
    let mut writer = Writer::new(&summary.title)?;
    for block in &summary.blocks {
        writer.block(block);
    }
    tracing::debug!(pages = writer.pages, "Summary PDF rendered");
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_breaks_on_spaces() {
        assert_eq!(
            wrap("el equipo no enciende luego de la limpieza", 15),
            vec!["el equipo no", "enciende luego", "de la limpieza"]
        );
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        assert_eq!(wrap("ABCDEFGHIJ KL", 4), vec!["ABCD", "EFGH", "IJ", "KL"]);
    }

    #[test]
    fn test_render_produces_pdf() {
        let summary = SummaryDocument {
            title: "Solicitud ST - OST #1".to_string(),
            blocks: vec![
                Block::Title("Solicitud de Servicio Técnico - Caso #1".to_string()),
                Block::Fields(vec![("CUIT:".to_string(), "30712345678".to_string())]),
            ],
        };
        let bytes = render(&summary).expect("renders");
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_long_document_paginates() {
        let blocks = (0..200)
            .map(|i| Block::Bullet(format!("Falla número {}", i)))
            .collect();
        let summary = SummaryDocument {
            title: "Largo".to_string(),
            blocks,
        };
        let mut writer = Writer::new(&summary.title).expect("writer");
        for block in &summary.blocks {
            writer.block(block);
        }
        assert!(writer.pages > 1);
    }
}
