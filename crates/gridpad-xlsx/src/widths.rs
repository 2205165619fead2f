use gridpad_model::ExportRow;

/// Narrowest column width, in characters.
pub const MIN_COLUMN_WIDTH: f64 = 12.0;
/// Extra characters added to columns wider than the floor.
pub const WIDTH_PADDING: usize = 2;

/// Auto-fit width (in characters) for each column.
///
/// The longest of the header and every cell value decides the width; anything
/// narrower than [`MIN_COLUMN_WIDTH`] is raised to it, anything else gets
/// [`WIDTH_PADDING`] extra characters.
pub fn column_widths(columns: &[String], rows: &[ExportRow]) -> Vec<f64> {
    columns
        .iter()
        .map(|name| {
            let longest = rows
                .iter()
                .filter_map(|row| row.get(name))
                .map(|value| value.chars().count())
                .fold(name.chars().count(), usize::max);
            if (longest as f64) < MIN_COLUMN_WIDTH {
                MIN_COLUMN_WIDTH
            } else {
                (longest + WIDTH_PADDING) as f64
            }
        })
        .collect()
}
