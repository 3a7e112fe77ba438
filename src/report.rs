//! Report Assembler: the journal as one paginated A4 PDF.
//!
//! Layout: title block, note to readers, summary table, a two-chart
//! visualization section, daily notes, and a closing footer page. Built with
//! `printpdf` builtin Helvetica; charts are embedded as raw RGB images.

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use printpdf::path::PaintMode;
use printpdf::*;

use crate::charts::canvas::Canvas;
use crate::charts::{catalog, render_chart, ChartId, Dataset, Presentation};
use crate::db::DatabaseError;
use crate::error::JournalError;
use crate::metrics::{summary_statistics, SummaryRow};
use crate::models::{RecordCollection, Schema};

pub const REPORT_TITLE: &str = "Medical Recovery Report";

pub const NOTE_TO_READERS: [&str; 4] = [
    "This data is subjective and reflects how I felt. This report is a personal and analytical reflection on my time in the Klinikum. \
     It combines information drawn from memory, journals, WhatsApp conversations, and available medical data to trace the patterns of my mental state during recovery.",
    "The intention behind this work is not to diagnose or justify, but to understand \u{2014} to recognize how sleep, medication, thought patterns, and emotional changes interacted across days and weeks.",
    "While I have taken care to ensure the accuracy of data and interpretation, this report remains deeply personal and subjective in nature. \
     Some parts were reconstructed retrospectively and may not perfectly represent medical reality, but they reflect my lived experience as faithfully as possible.",
    "Readers are encouraged to approach this document with empathy and respect, keeping in mind that mental health is complex, non-linear, and often resistant to tidy explanations. \
     What follows is not just data \u{2014} it's the story of a mind learning to make sense of itself.",
];

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN_X: f32 = 20.0;
const TOP: f32 = 277.0;
const BOTTOM: f32 = 20.0;

/// Print charts are 720×420 px; at this density they place at 6in × 3.5in.
const CHART_DPI: f32 = 120.0;
const MM_PER_INCH: f32 = 25.4;

const TITLE_COLOR: (u8, u8, u8) = (0x2c, 0x3e, 0x50);
const HEADING_COLOR: (u8, u8, u8) = (0x37, 0xb2, 0x4d);
const NOTE_COLOR: (u8, u8, u8) = (0x33, 0x33, 0x33);
const FOOTER_COLOR: (u8, u8, u8) = (0x66, 0x66, 0x66);
const TABLE_BODY: (u8, u8, u8) = (0xf5, 0xf5, 0xdc);
const TEXT_BLACK: (u8, u8, u8) = (0, 0, 0);
const TEXT_WHITE: (u8, u8, u8) = (0xf5, 0xf5, 0xf5);

/// `journal_report_YYYYMMDD_HHMMSS.pdf`
pub fn report_filename(generated_at: NaiveDateTime) -> String {
    format!("journal_report_{}.pdf", generated_at.format("%Y%m%d_%H%M%S"))
}

/// Builds the full report. Fails with `NoVisualizableData` when no entry has
/// a parseable date.
pub fn generate_report(
    schema: &Schema,
    records: &RecordCollection,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>, JournalError> {
    let dataset = Dataset::prepare(schema, records).ok_or(JournalError::NoVisualizableData)?;
    let (first, last) = match (dataset.first_date(), dataset.last_date()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(JournalError::NoVisualizableData),
    };

    let (doc, page1, layer1) = PdfDocument::new(REPORT_TITLE, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| JournalError::rendering("PDF font error", e))?;
    let bold = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| JournalError::rendering("PDF font error", e))?;

    {
        let mut page = PageWriter {
            doc: &doc,
            layer: doc.get_page(page1).get_layer(layer1),
            y: Mm(TOP),
            pages: 1,
            font,
            bold,
        };

        // Title block
        page.centered(REPORT_TITLE, 24.0, true, TITLE_COLOR);
        page.advance(14.0);
        page.line(
            &format!("Generated: {}", generated_at.format("%B %d, %Y at %H:%M")),
            10.0,
            false,
            5.0,
        );
        page.line(&format!("Total Entries: {}", dataset.len()), 10.0, false, 5.0);
        page.line(
            &format!("Date Range: {} to {}", first.format("%Y-%m-%d"), last.format("%Y-%m-%d")),
            10.0,
            false,
            5.0,
        );
        page.advance(12.7);

        // Note to readers
        page.line("Note to Readers", 12.0, true, 7.0);
        page.set_color(NOTE_COLOR);
        for paragraph in NOTE_TO_READERS {
            page.paragraph(paragraph, 10.0, Mm(MARGIN_X + 7.0), 88, 4.6);
            page.advance(2.8);
        }
        page.set_color(TEXT_BLACK);
        page.advance(7.6);

        // Summary statistics
        page.heading("Summary Statistics");
        page.summary_table(&summary_statistics(dataset.records(), schema));
        page.new_page();

        // Visualizations
        page.heading("Visualizations");
        page.advance(5.0);
        if let Some(canvas) = print_chart(ChartId::SymptomTrend, &dataset)? {
            page.image(canvas);
            page.advance(5.0);
        }
        if let Some(canvas) = print_chart(ChartId::Sleep, &dataset)? {
            page.image(canvas);
            page.new_page();
        }

        // Daily notes
        page.heading("Daily Notes");
        page.advance(2.5);
        let has_notes = dataset.has_column("notes");
        for (date, record) in dataset.dates().iter().zip(dataset.records().iter()) {
            page.line(&date.format("%B %d, %Y").to_string(), 10.0, true, 5.0);
            let notes = if has_notes { record.text("notes") } else { "No notes".to_string() };
            for text in notes.lines() {
                page.paragraph(text, 10.0, Mm(MARGIN_X), 95, 4.6);
            }
            page.advance(3.8);
        }

        // Footer
        page.new_page();
        page.advance(25.4);
        page.set_color(FOOTER_COLOR);
        page.centered("Generated with care and introspection", 9.0, false, FOOTER_COLOR);
        page.advance(4.5);
        page.centered(
            &format!("Data period: {} - {}", first.format("%B %Y"), last.format("%B %Y")),
            9.0,
            false,
            FOOTER_COLOR,
        );
        page.set_color(TEXT_BLACK);

        tracing::info!(entries = dataset.len(), pages = page.pages, "Assembled report");
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| JournalError::rendering("PDF save error", e))?;
    buf.into_inner()
        .map_err(|e| JournalError::rendering("PDF buffer error", e))
}

/// Renders a catalog chart at print size when its predicate holds.
fn print_chart(id: ChartId, dataset: &Dataset<'_>) -> Result<Option<Canvas>, JournalError> {
    let spec = catalog::spec(id)
        .ok_or_else(|| JournalError::Rendering(format!("{id:?} is not in the chart catalog")))?;
    if !(spec.applies)(dataset) {
        tracing::debug!(chart = spec.title, "Chart omitted from report");
        return Ok(None);
    }
    render_chart(spec, dataset, Presentation::Print).map(Some)
}

/// Writes report bytes into the exports directory, creating it if needed.
pub fn export_report_to_file(
    pdf_bytes: &[u8],
    exports_dir: &Path,
    generated_at: NaiveDateTime,
) -> Result<PathBuf, JournalError> {
    std::fs::create_dir_all(exports_dir).map_err(DatabaseError::from)?;
    let path = exports_dir.join(report_filename(generated_at));
    std::fs::write(&path, pdf_bytes).map_err(DatabaseError::from)?;
    tracing::info!(path = %path.display(), bytes = pdf_bytes.len(), "Report exported");
    Ok(path)
}

// ─── Page writer ───

/// Cursor over the current page; starts a new page when space runs out.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: Mm,
    pages: usize,
    font: IndirectFontRef,
    bold: IndirectFontRef,
}

impl PageWriter<'_> {
    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_W), Mm(PAGE_H), format!("Page {}", self.pages));
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = Mm(TOP);
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.y.0 - needed < BOTTOM {
            self.new_page();
        }
    }

    fn advance(&mut self, mm: f32) {
        self.y -= Mm(mm);
    }

    fn set_color(&self, (r, g, b): (u8, u8, u8)) {
        self.layer.set_fill_color(rgb(r, g, b));
    }

    fn font(&self, bold: bool) -> &IndirectFontRef {
        if bold {
            &self.bold
        } else {
            &self.font
        }
    }

    /// One line of text at the left margin, then moves down.
    fn line(&mut self, text: &str, size: f32, bold: bool, advance: f32) {
        self.ensure_space(advance);
        self.layer
            .use_text(pdf_safe(text), size, Mm(MARGIN_X), self.y, self.font(bold));
        self.advance(advance);
    }

    fn paragraph(&mut self, text: &str, size: f32, x: Mm, max_chars: usize, line_height: f32) {
        for line in wrap_text(&pdf_safe(text), max_chars) {
            self.ensure_space(line_height);
            self.layer.use_text(line, size, x, self.y, &self.font);
            self.advance(line_height);
        }
    }

    fn centered(&mut self, text: &str, size: f32, bold: bool, color: (u8, u8, u8)) {
        self.ensure_space(size * 0.5);
        let text = pdf_safe(text);
        let x = (PAGE_W - text_width_mm(&text, size)) / 2.0;
        self.set_color(color);
        self.layer
            .use_text(text, size, Mm(x.max(MARGIN_X)), self.y, self.font(bold));
        self.set_color(TEXT_BLACK);
    }

    fn heading(&mut self, text: &str) {
        self.ensure_space(20.0);
        self.advance(4.0);
        self.set_color(HEADING_COLOR);
        self.layer
            .use_text(pdf_safe(text), 16.0, Mm(MARGIN_X), self.y, &self.bold);
        self.set_color(TEXT_BLACK);
        self.advance(8.0);
    }

    fn summary_table(&mut self, rows: &[SummaryRow]) {
        const WIDTHS: [f32; 4] = [70.0, 30.0, 30.0, 30.0];
        const HEADER_H: f32 = 10.0;
        const ROW_H: f32 = 7.0;
        let left = (PAGE_W - WIDTHS.iter().sum::<f32>()) / 2.0;

        self.ensure_space(HEADER_H + ROW_H);
        self.table_row(&["Metric", "Average", "Min", "Max"], &WIDTHS, left, HEADER_H, 12.0, true);
        for row in rows {
            self.ensure_space(ROW_H);
            let cells = [
                pdf_safe(&row.label),
                row.mean_display(),
                row.min_display(),
                row.max_display(),
            ];
            let cells: Vec<&str> = cells.iter().map(String::as_str).collect();
            self.table_row(&cells, &WIDTHS, left, ROW_H, 10.0, false);
        }
        self.advance(4.0);
    }

    fn table_row(&mut self, cells: &[&str], widths: &[f32], left: f32, height: f32, size: f32, header: bool) {
        let top = self.y.0;
        let bottom = top - height;
        let right = left + widths.iter().sum::<f32>();

        let (r, g, b) = if header { HEADING_COLOR } else { TABLE_BODY };
        self.layer.set_fill_color(rgb(r, g, b));
        self.layer
            .add_rect(Rect::new(Mm(left), Mm(bottom), Mm(right), Mm(top)).with_mode(PaintMode::Fill));

        self.layer.set_outline_color(rgb(0, 0, 0));
        self.layer.set_outline_thickness(1.0);
        let mut x = left;
        for (cell, width) in cells.iter().zip(widths) {
            self.layer
                .add_rect(Rect::new(Mm(x), Mm(bottom), Mm(x + width), Mm(top)).with_mode(PaintMode::Stroke));
            let text_x = x + (width - text_width_mm(cell, size)) / 2.0;
            self.set_color(if header { TEXT_WHITE } else { TEXT_BLACK });
            self.layer.use_text(
                *cell,
                size,
                Mm(text_x.max(x + 1.0)),
                Mm(bottom + (height - size * 0.3528) / 2.0 + 0.5),
                self.font(header),
            );
            x += width;
        }
        self.set_color(TEXT_BLACK);
        self.y = Mm(bottom);
    }

    /// Places a print chart centred at its physical size.
    fn image(&mut self, canvas: Canvas) {
        let width_mm = canvas.width() as f32 / CHART_DPI * MM_PER_INCH;
        let height_mm = canvas.height() as f32 / CHART_DPI * MM_PER_INCH;
        self.ensure_space(height_mm);

        let image = canvas.into_image();
        let xobject = ImageXObject {
            width: Px(image.width() as usize),
            height: Px(image.height() as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: image.into_raw(),
            image_filter: None,
            smask: None,
            clipping_bbox: None,
        };
        let y = self.y.0 - height_mm;
        Image::from(xobject).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm((PAGE_W - width_mm) / 2.0)),
                translate_y: Some(Mm(y)),
                dpi: Some(CHART_DPI),
                ..Default::default()
            },
        );
        self.y = Mm(y);
    }
}

fn rgb(r: u8, g: u8, b: u8) -> Color {
    Color::Rgb(Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0, None))
}

/// Builtin fonts only cover Latin-1; typographic punctuation is folded to
/// ASCII and anything else becomes '?'.
fn pdf_safe(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2014}' | '\u{2013}' | '\u{2212}' => '-',
            '\u{2018}' | '\u{2019}' => '\'',
            '\u{201C}' | '\u{201D}' => '"',
            '\u{2026}' => '.',
            '\t' => ' ',
            c if (c as u32) < 0x20 => ' ',
            c if (c as u32) <= 0xFF => c,
            _ => '?',
        })
        .collect()
}

/// Approximate Helvetica advance width in millimetres.
fn text_width_mm(text: &str, size: f32) -> f32 {
    let em: f32 = text
        .chars()
        .map(|c| match c {
            'i' | 'j' | 'l' | 'I' | '.' | ',' | '\'' | ':' | ';' | '!' | '|' => 0.25,
            'f' | 't' | 'r' | ' ' | '(' | ')' | '-' => 0.32,
            'm' | 'w' | 'M' | 'W' => 0.83,
            c if c.is_ascii_uppercase() => 0.67,
            c if c.is_ascii_digit() => 0.556,
            _ => 0.52,
        })
        .sum();
    em * size * 0.3528
}

/// Simple word-wrap helper for PDF text rendering.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        if current.chars().count() + word.chars().count() + 1 > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
