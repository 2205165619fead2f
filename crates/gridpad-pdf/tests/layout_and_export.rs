use gridpad_model::{ExportRow, Table};
use gridpad_pdf::layout::{PAGE_HEIGHT, TABLE_TOP};
use gridpad_pdf::{export_pdf, layout_document, render_pdf, DocumentLayout, RowKind, REPORT_TITLE};
use pretty_assertions::assert_eq;

const STAMP: &str = "01/02/2024, 10:00:00";

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn row(pairs: &[(&str, &str)]) -> ExportRow {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn layout(columns: &[String], rows: &[ExportRow]) -> DocumentLayout {
    layout_document(REPORT_TITLE, STAMP, columns, rows)
}

/// All body text of row `index`, with each cell's pieces rejoined across pages.
fn body_cells(doc: &DocumentLayout, index: usize) -> Vec<Vec<String>> {
    let mut cells: Vec<Vec<String>> = vec![Vec::new(); doc.column_widths.len()];
    for page in &doc.pages {
        for placed in page.body_rows() {
            if placed.kind == (RowKind::Body { index }) {
                for (acc, lines) in cells.iter_mut().zip(&placed.cells) {
                    acc.extend(lines.iter().filter(|l| !l.is_empty()).cloned());
                }
            }
        }
    }
    cells
}

#[test]
fn nome_email_fits_on_one_page() {
    let export = Table::starter().projection();
    let doc = layout(&export.columns, &export.rows);

    assert_eq!(doc.pages.len(), 1);
    let page = &doc.pages[0];
    let title = page.title.as_ref().expect("first page has a title");
    assert_eq!(title.title, "Sistema da Denise - Exportação de Dados");
    assert_eq!(title.generated_at, STAMP);

    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.rows[0].kind, RowKind::Header);
    assert_eq!(
        page.rows[0].cells,
        vec![strings(&["Nome"]), strings(&["Email"])]
    );
    assert_eq!(page.rows[0].top, TABLE_TOP);
    assert_eq!(page.rows[1].kind, RowKind::Body { index: 0 });
    assert_eq!(
        page.rows[1].cells,
        vec![strings(&["João Silva"]), strings(&["joao@exemplo.com"])]
    );
}

#[test]
fn header_repeats_on_every_page() {
    let columns = strings(&["Nome", "Email"]);
    let rows: Vec<ExportRow> = (0..200)
        .map(|i| row(&[("Nome", format!("Pessoa {i}").as_str()), ("Email", "p@exemplo.com")]))
        .collect();
    let doc = layout(&columns, &rows);

    assert!(doc.pages.len() > 1);
    for (n, page) in doc.pages.iter().enumerate() {
        assert_eq!(page.title.is_some(), n == 0);
        assert_eq!(page.rows[0].kind, RowKind::Header);
        assert_eq!(page.rows[0].top, TABLE_TOP);
        for placed in &page.rows {
            assert!(placed.bottom() <= PAGE_HEIGHT - 14.0 + 1e-3);
        }
    }

    let indices: Vec<usize> = doc
        .pages
        .iter()
        .flat_map(|p| p.body_rows())
        .map(|r| match r.kind {
            RowKind::Body { index } => index,
            RowKind::Header => unreachable!(),
        })
        .collect();
    assert_eq!(indices, (0..200).collect::<Vec<_>>());
}

#[test]
fn alternate_rows_are_shaded() {
    let columns = strings(&["A"]);
    let rows = vec![row(&[("A", "1")]), row(&[("A", "2")]), row(&[("A", "3")])];
    let doc = layout(&columns, &rows);
    let shaded: Vec<bool> = doc.pages[0].body_rows().map(|r| r.is_shaded()).collect();
    assert_eq!(shaded, vec![false, true, false]);
}

#[test]
fn zero_rows_lay_out_the_header_only() {
    let doc = layout(&strings(&["A", "B"]), &[]);
    assert_eq!(doc.pages.len(), 1);
    assert_eq!(doc.pages[0].rows.len(), 1);
    assert_eq!(doc.pages[0].rows[0].kind, RowKind::Header);
}

#[test]
fn zero_columns_lay_out_the_title_only() {
    let doc = layout(&[], &[row(&[("A", "ignored")])]);
    assert_eq!(doc.pages.len(), 1);
    assert!(doc.pages[0].title.is_some());
    assert!(doc.pages[0].rows.is_empty());
    assert!(doc.column_widths.is_empty());
}

#[test]
fn sparse_rows_render_missing_values_as_blank() {
    let columns = strings(&["Nome", "Email"]);
    let doc = layout(&columns, &[row(&[("Email", "b@c.d")])]);
    let body = doc.pages[0].body_rows().next().unwrap();
    assert_eq!(body.cells, vec![strings(&[""]), strings(&["b@c.d"])]);
}

#[test]
fn long_text_wraps_without_losing_words() {
    let columns = strings(&["Nome", "Notas"]);
    let words: Vec<String> = (0..120).map(|i| format!("palavra{i}")).collect();
    let text = words.join(" ");
    let doc = layout(&columns, &[row(&[("Nome", "Ana"), ("Notas", text.as_str())])]);

    let cells = body_cells(&doc, 0);
    assert!(cells[1].len() > 1, "text should wrap");
    assert_eq!(cells[1].join(" "), text);
}

#[test]
fn rows_taller_than_a_page_continue_on_the_next() {
    let columns = strings(&["Notas"]);
    let text = (0..600)
        .map(|i| format!("linha{i}"))
        .collect::<Vec<_>>()
        .join("\n");
    let doc = layout(&columns, &[row(&[("Notas", text.as_str())])]);

    assert!(doc.pages.len() > 1);
    for page in &doc.pages {
        assert_eq!(page.rows[0].kind, RowKind::Header);
        assert_eq!(page.body_rows().count(), 1);
    }
    assert_eq!(body_cells(&doc, 0)[0].join("\n"), text);
}

#[test]
fn deleted_column_leaves_no_residue() {
    let mut table = Table::starter();
    table.delete_column("col-2").unwrap();
    let export = table.projection();
    let doc = layout(&export.columns, &export.rows);

    let page = &doc.pages[0];
    assert_eq!(page.rows[0].cells, vec![strings(&["Nome"])]);
    assert!(!page
        .rows
        .iter()
        .flat_map(|r| r.cells.iter().flatten())
        .any(|line| line.contains('@')));
}

#[test]
fn renders_a_pdf_document() {
    let export = Table::starter().projection();
    let bytes = render_pdf(&export.columns, &export.rows, STAMP).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn export_saves_the_named_file() {
    let dir = tempfile::tempdir().unwrap();
    let export = Table::starter().projection();

    let path = export_pdf(&export.columns, &export.rows, dir.path(), " meu-relatorio ").unwrap();

    assert_eq!(path, dir.path().join("meu-relatorio.pdf"));
    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[test]
fn export_into_a_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let err = export_pdf(&[], &[], &missing, "x").unwrap_err();
    assert!(err.to_string().contains("x.pdf"), "{err}");
}
