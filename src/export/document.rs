//! PDF rendering of a whole collection
//!
//! Produces one table: a bold header row followed by one row per record.
//! The table flows onto further pages when it does not fit, repeating the
//! header at the top of each page. Unlike CSV this needs every record up
//! front, so the pipeline buffers the collection before rendering.

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument};
use serde_json::Value;

use crate::record::Record;

/// Points to millimetres
const PT_TO_MM: f32 = 0.3528;
/// Average Helvetica glyph width relative to the font size
const GLYPH_WIDTH: f32 = 0.5;

/// One table column
#[derive(Debug, Clone, PartialEq)]
pub struct TableColumn {
    pub header: String,
    pub field: String,
    pub width_mm: f32,
}

impl TableColumn {
    pub fn new(header: impl Into<String>, field: impl Into<String>, width_mm: f32) -> Self {
        Self {
            header: header.into(),
            field: field.into(),
            width_mm,
        }
    }
}

/// Page geometry and table columns
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub title: String,
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub margin_mm: f32,
    pub font_size: f32,
    pub row_height_mm: f32,
    pub columns: Vec<TableColumn>,
}

impl DocumentLayout {
    /// A4 table of book titles and categories
    pub fn books_table() -> Self {
        Self {
            title: "Books".to_string(),
            page_width_mm: 210.0,
            page_height_mm: 297.0,
            margin_mm: 20.0,
            font_size: 11.0,
            row_height_mm: 7.0,
            columns: vec![
                TableColumn::new("TITLE", "title", 110.0),
                TableColumn::new("CATEGORY", "category", 60.0),
            ],
        }
    }

    /// Data rows fitting under the header on one page
    pub fn rows_per_page(&self) -> usize {
        let usable = self.page_height_mm - 2.0 * self.margin_mm - self.row_height_mm;
        ((usable / self.row_height_mm).floor() as usize).max(1)
    }

    fn max_chars(&self, column: &TableColumn) -> usize {
        let glyph_mm = self.font_size * GLYPH_WIDTH * PT_TO_MM;
        ((column.width_mm / glyph_mm).floor() as usize).max(4)
    }
}

impl Default for DocumentLayout {
    fn default() -> Self {
        Self::books_table()
    }
}

/// Table cells for every record, in column order
pub fn table_rows(layout: &DocumentLayout, records: &[Record]) -> Vec<Vec<String>> {
    records
        .iter()
        .map(|record| {
            layout
                .columns
                .iter()
                .map(|column| cell_text(record.get(&column.field)))
                .collect()
        })
        .collect()
}

/// Render the table into PDF bytes
pub fn render_table(layout: &DocumentLayout, records: &[Record]) -> Result<Vec<u8>, printpdf::Error> {
    let width = Mm(layout.page_width_mm);
    let height = Mm(layout.page_height_mm);

    let (doc, first_page, first_layer) = PdfDocument::new(layout.title.as_str(), width, height, "table");
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let rows = table_rows(layout, records);
    let mut pages = rows.chunks(layout.rows_per_page()).peekable();
    let mut layer = doc.get_page(first_page).get_layer(first_layer);

    // An empty collection still gets a page with the header
    if pages.peek().is_none() {
        draw_row(&layer, layout, &headers(layout), top_row_y(layout), &bold);
    }

    let mut first = true;
    for page_rows in pages {
        if !first {
            let (page, page_layer) = doc.add_page(width, height, "table");
            layer = doc.get_page(page).get_layer(page_layer);
        }
        first = false;

        let mut y = top_row_y(layout);
        draw_row(&layer, layout, &headers(layout), y, &bold);
        for row in page_rows {
            y -= layout.row_height_mm;
            draw_row(&layer, layout, row, y, &regular);
        }
    }

    doc.save_to_bytes()
}

fn headers(layout: &DocumentLayout) -> Vec<String> {
    layout.columns.iter().map(|c| c.header.clone()).collect()
}

fn top_row_y(layout: &DocumentLayout) -> f32 {
    layout.page_height_mm - layout.margin_mm
}

fn draw_row(
    layer: &printpdf::PdfLayerReference,
    layout: &DocumentLayout,
    cells: &[String],
    y: f32,
    font: &IndirectFontRef,
) {
    let mut x = layout.margin_mm;
    for (column, cell) in layout.columns.iter().zip(cells) {
        let text = truncate(cell, layout.max_chars(column));
        layer.use_text(text, layout.font_size, Mm(x), Mm(y), font);
        x += column.width_mm;
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept)
}

fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
