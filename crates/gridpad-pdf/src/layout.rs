//! Page layout for the PDF report.
//!
//! All coordinates are millimetres measured from the top-left corner of the
//! page. Layout is computed up front so pagination does not depend on the
//! renderer.

use gridpad_model::{row_values, ExportRow};

use crate::metrics::{wrap_text, Face};

pub const PAGE_WIDTH: f32 = 210.0;
pub const PAGE_HEIGHT: f32 = 297.0;
pub const MARGIN_X: f32 = 14.0;
pub const MARGIN_BOTTOM: f32 = 14.0;
/// Baseline of the report title on the first page.
pub const TITLE_BASELINE: f32 = 20.0;
/// Baseline of the "generated at" line on the first page.
pub const SUBTITLE_BASELINE: f32 = 28.0;
/// Where the table starts on every page.
pub const TABLE_TOP: f32 = 35.0;
pub const CELL_PADDING: f32 = 3.0;
pub const LINE_HEIGHT_FACTOR: f32 = 1.15;
/// Narrowest a column is allowed to get while space remains.
pub const MIN_COLUMN_WIDTH: f32 = 16.0;

pub const TITLE_FACE: Face = Face::regular(18.0);
pub const SUBTITLE_FACE: Face = Face::regular(10.0);
pub const HEADER_FACE: Face = Face::bold(10.0);
pub const BODY_FACE: Face = Face::regular(9.0);

#[derive(Debug, Clone, PartialEq)]
pub struct TitleBlock {
    pub title: String,
    pub generated_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    /// A body row; `index` is its position in the dataset.
    Body { index: usize },
}

/// One table row placed on a page.
///
/// A body row too tall for a page is split across pages; every piece keeps
/// the same `index`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedRow {
    pub kind: RowKind,
    pub top: f32,
    pub height: f32,
    /// Wrapped lines for each cell, in column order.
    pub cells: Vec<Vec<String>>,
}

impl PlacedRow {
    /// Alternate body rows get a background fill.
    pub fn is_shaded(&self) -> bool {
        matches!(self.kind, RowKind::Body { index } if index % 2 == 1)
    }

    pub fn face(&self) -> Face {
        match self.kind {
            RowKind::Header => HEADER_FACE,
            RowKind::Body { .. } => BODY_FACE,
        }
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    /// Only the first page carries the title block.
    pub title: Option<TitleBlock>,
    pub rows: Vec<PlacedRow>,
}

impl PageLayout {
    pub fn body_rows(&self) -> impl Iterator<Item = &PlacedRow> {
        self.rows
            .iter()
            .filter(|r| matches!(r.kind, RowKind::Body { .. }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DocumentLayout {
    pub column_widths: Vec<f32>,
    pub pages: Vec<PageLayout>,
}

fn row_height(face: Face, line_count: usize) -> f32 {
    line_count.max(1) as f32 * face.line_height_mm(LINE_HEIGHT_FACTOR) + 2.0 * CELL_PADDING
}

/// Split the printable width between columns.
///
/// Each column's share is proportional to its natural (unwrapped) width, but
/// no column drops below [`MIN_COLUMN_WIDTH`] unless there are so many columns
/// that an even split is narrower than that.
pub fn column_widths(columns: &[String], rows: &[ExportRow]) -> Vec<f32> {
    if columns.is_empty() {
        return Vec::new();
    }

    let available = PAGE_WIDTH - 2.0 * MARGIN_X;
    let floor = MIN_COLUMN_WIDTH.min(available / columns.len() as f32);

    let natural: Vec<f32> = columns
        .iter()
        .map(|name| {
            let widest_body = rows
                .iter()
                .filter_map(|row| row.get(name))
                .map(|value| BODY_FACE.width_mm(value))
                .fold(0.0, f32::max);
            HEADER_FACE.width_mm(name).max(widest_body) + 2.0 * CELL_PADDING
        })
        .collect();

    let mut pinned = vec![false; columns.len()];
    loop {
        let pinned_width: f32 = pinned.iter().filter(|p| **p).count() as f32 * floor;
        let flexible: f32 = natural
            .iter()
            .zip(&pinned)
            .filter(|(_, p)| !**p)
            .map(|(w, _)| *w)
            .sum();
        let remaining = available - pinned_width;

        let widths: Vec<f32> = natural
            .iter()
            .zip(&pinned)
            .map(|(w, p)| {
                if *p {
                    floor
                } else if flexible > 0.0 {
                    remaining * w / flexible
                } else {
                    remaining / pinned.iter().filter(|p| !**p).count() as f32
                }
            })
            .collect();

        let mut changed = false;
        for (idx, width) in widths.iter().enumerate() {
            if !pinned[idx] && *width < floor {
                pinned[idx] = true;
                changed = true;
            }
        }
        if !changed {
            return widths;
        }
    }
}

struct PreparedRow {
    kind: RowKind,
    face: Face,
    cells: Vec<Vec<String>>,
}

impl PreparedRow {
    fn new(kind: RowKind, face: Face, values: &[&str], widths: &[f32]) -> Self {
        let cells = values
            .iter()
            .zip(widths)
            .map(|(value, width)| wrap_text(value, face, width - 2.0 * CELL_PADDING))
            .collect();
        Self { kind, face, cells }
    }

    fn line_count(&self) -> usize {
        self.cells.iter().map(Vec::len).max().unwrap_or(1)
    }

    fn height(&self) -> f32 {
        row_height(self.face, self.line_count())
    }

    fn place(&self, top: f32) -> PlacedRow {
        PlacedRow {
            kind: self.kind,
            top,
            height: self.height(),
            cells: self.cells.clone(),
        }
    }

    /// Split off the first `lines` lines of every cell.
    fn split_off_head(&mut self, lines: usize) -> PreparedRow {
        let head = self
            .cells
            .iter_mut()
            .map(|cell| {
                let rest = cell.split_off(lines.min(cell.len()));
                let head = std::mem::replace(cell, rest);
                if cell.is_empty() {
                    cell.push(String::new());
                }
                head
            })
            .collect();
        PreparedRow {
            kind: self.kind,
            face: self.face,
            cells: head,
        }
    }
}

struct Paginator {
    header: Option<PreparedRow>,
    pages: Vec<PageLayout>,
    current: PageLayout,
    cursor: f32,
}

impl Paginator {
    fn new(title: TitleBlock, header: Option<PreparedRow>) -> Self {
        let mut paginator = Self {
            header,
            pages: Vec::new(),
            current: PageLayout {
                title: Some(title),
                rows: Vec::new(),
            },
            cursor: TABLE_TOP,
        };
        paginator.place_header();
        paginator
    }

    fn place_header(&mut self) {
        if let Some(header) = &self.header {
            let placed = header.place(self.cursor);
            self.cursor = placed.bottom();
            self.current.rows.push(placed);
        }
    }

    fn remaining(&self) -> f32 {
        PAGE_HEIGHT - MARGIN_BOTTOM - self.cursor
    }

    fn page_has_body(&self) -> bool {
        self.current.body_rows().next().is_some()
    }

    fn new_page(&mut self) {
        let finished = std::mem::take(&mut self.current);
        self.pages.push(finished);
        self.cursor = TABLE_TOP;
        self.place_header();
    }

    fn push(&mut self, mut row: PreparedRow) {
        loop {
            if row.height() <= self.remaining() {
                let placed = row.place(self.cursor);
                self.cursor = placed.bottom();
                self.current.rows.push(placed);
                return;
            }

            // Rows that fit on a fresh page move there whole.
            if self.page_has_body() {
                let fresh = PAGE_HEIGHT - MARGIN_BOTTOM - TABLE_TOP
                    - self.header.as_ref().map_or(0.0, PreparedRow::height);
                if row.height() <= fresh {
                    self.new_page();
                    continue;
                }
            }

            // Too tall for any page: fill what is left and carry the rest.
            let line_height = row.face.line_height_mm(LINE_HEIGHT_FACTOR);
            let fits = ((self.remaining() - 2.0 * CELL_PADDING) / line_height).floor();
            // A page with no body rows always takes at least one line.
            let fits = if fits < 1.0 && !self.page_has_body() {
                1
            } else {
                fits.max(0.0) as usize
            };
            if fits >= row.line_count() {
                let placed = row.place(self.cursor);
                self.cursor = placed.bottom();
                self.current.rows.push(placed);
                return;
            }
            if fits > 0 {
                let head = row.split_off_head(fits);
                let placed = head.place(self.cursor);
                self.cursor = placed.bottom();
                self.current.rows.push(placed);
            }
            self.new_page();
        }
    }

    fn finish(mut self) -> Vec<PageLayout> {
        self.pages.push(self.current);
        self.pages
    }
}

/// Lay out the report for `columns`/`rows`.
pub fn layout_document(
    title: &str,
    generated_at: &str,
    columns: &[String],
    rows: &[ExportRow],
) -> DocumentLayout {
    let widths = column_widths(columns, rows);
    let title = TitleBlock {
        title: title.to_string(),
        generated_at: generated_at.to_string(),
    };

    let header = (!columns.is_empty()).then(|| {
        let names: Vec<&str> = columns.iter().map(String::as_str).collect();
        PreparedRow::new(RowKind::Header, HEADER_FACE, &names, &widths)
    });

    let mut paginator = Paginator::new(title, header);
    if !columns.is_empty() {
        for (index, row) in rows.iter().enumerate() {
            let values = row_values(columns, row);
            paginator.push(PreparedRow::new(
                RowKind::Body { index },
                BODY_FACE,
                &values,
                &widths,
            ));
        }
    }

    DocumentLayout {
        column_widths: widths,
        pages: paginator.finish(),
    }
}
