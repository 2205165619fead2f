use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Rect, Rgb,
};

use crate::layout::{
    DocumentLayout, PageLayout, PlacedRow, RowKind, CELL_PADDING, LINE_HEIGHT_FACTOR,
    MARGIN_X, PAGE_HEIGHT, PAGE_WIDTH, SUBTITLE_BASELINE, SUBTITLE_FACE, TITLE_BASELINE,
    TITLE_FACE,
};
use crate::PdfExportError;

const NAVY: (u8, u8, u8) = (0, 27, 61);
const SUBTITLE_GREY: (u8, u8, u8) = (100, 100, 100);
const BODY_TEXT: (u8, u8, u8) = (50, 50, 50);
const HEADER_TEXT: (u8, u8, u8) = (255, 255, 255);
const STRIPE: (u8, u8, u8) = (245, 245, 245);
const GRID_LINE: (u8, u8, u8) = (200, 200, 200);
const GRID_LINE_PT: f32 = 0.3;

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(Rgb::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        None,
    ))
}

/// Flip a top-down layout coordinate into PDF user space.
fn y(top: f32) -> Mm {
    Mm(PAGE_HEIGHT - top)
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

pub(crate) fn render(title: &str, layout: &DocumentLayout) -> Result<Vec<u8>, PdfExportError> {
    let (doc, first_page, first_layer) =
        PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = Fonts {
        regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
        bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
    };

    for (idx, page) in layout.pages.iter().enumerate() {
        let (page_ref, layer_ref) = if idx == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), format!("Page {}, Layer 1", idx + 1))
        };
        let layer = doc.get_page(page_ref).get_layer(layer_ref);
        draw_page(&layer, &fonts, page, &layout.column_widths);
    }

    Ok(doc.save_to_bytes()?)
}

fn draw_page(layer: &PdfLayerReference, fonts: &Fonts, page: &PageLayout, widths: &[f32]) {
    if let Some(title) = &page.title {
        layer.set_fill_color(rgb(NAVY));
        layer.use_text(
            title.title.as_str(),
            TITLE_FACE.size_pt,
            Mm(MARGIN_X),
            y(TITLE_BASELINE),
            &fonts.regular,
        );
        layer.set_fill_color(rgb(SUBTITLE_GREY));
        layer.use_text(
            format!("Gerado em: {}", title.generated_at),
            SUBTITLE_FACE.size_pt,
            Mm(MARGIN_X),
            y(SUBTITLE_BASELINE),
            &fonts.regular,
        );
    }

    layer.set_outline_color(rgb(GRID_LINE));
    layer.set_outline_thickness(GRID_LINE_PT);
    for row in &page.rows {
        draw_row(layer, fonts, row, widths);
    }
}

fn draw_row(layer: &PdfLayerReference, fonts: &Fonts, row: &PlacedRow, widths: &[f32]) {
    let face = row.face();
    let (font, text_color, fill) = match row.kind {
        RowKind::Header => (&fonts.bold, HEADER_TEXT, Some(NAVY)),
        RowKind::Body { .. } => (&fonts.regular, BODY_TEXT, row.is_shaded().then_some(STRIPE)),
    };
    let line_height = face.line_height_mm(LINE_HEIGHT_FACTOR);
    let size_mm = face.line_height_mm(1.0);

    let mut left = MARGIN_X;
    for (lines, width) in row.cells.iter().zip(widths) {
        let right = left + width;
        let cell = Rect::new(Mm(left), y(row.bottom()), Mm(right), y(row.top));
        match fill {
            Some(color) => {
                layer.set_fill_color(rgb(color));
                layer.add_rect(cell.with_mode(PaintMode::FillStroke));
            }
            None => layer.add_rect(cell.with_mode(PaintMode::Stroke)),
        }

        // Vertically centre the block of lines inside the cell.
        let block = lines.len() as f32 * line_height;
        let first_top = row.top + (row.height - block) / 2.0;
        layer.set_fill_color(rgb(text_color));
        for (n, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let baseline = first_top + n as f32 * line_height + (line_height + size_mm * 0.7) / 2.0;
            let x = match row.kind {
                RowKind::Header => left + ((width - face.width_mm(line)) / 2.0).max(CELL_PADDING),
                RowKind::Body { .. } => left + CELL_PADDING,
            };
            layer.use_text(line.as_str(), face.size_pt, Mm(x), y(baseline), font);
        }

        left = right;
    }
}
