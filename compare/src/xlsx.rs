//! Spreadsheet serialization of [`Report`]s
use mascot::report::{Cell, Report};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatUnderline, Workbook, XlsxError};
use std::path::Path;

/// Write every sheet of `report` into a new workbook at `path`
///
/// The header row is bold, all cells are left aligned, and links are
/// active and blue.
pub fn write<P: AsRef<Path>>(report: &Report<'_>, path: P) -> Result<(), XlsxError> {
    let header = Format::new().set_bold().set_align(FormatAlign::Left);
    let body = Format::new().set_align(FormatAlign::Left);
    let link = Format::new()
        .set_align(FormatAlign::Left)
        .set_font_color(Color::Blue)
        .set_underline(FormatUnderline::Single);

    let mut workbook = Workbook::new();
    for sheet in &report.sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet.name.as_str())?;

        for (col, title) in sheet.header.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, title.as_str(), &header)?;
        }

        for (idx, row) in sheet.rows.iter().enumerate() {
            let r = idx as u32 + 1;
            for (col, cell) in row.iter().enumerate() {
                let c = col as u16;
                match cell {
                    Cell::Text(s) => worksheet.write_string_with_format(r, c, *s, &body)?,
                    Cell::Label(s) => worksheet.write_string_with_format(r, c, s.as_str(), &body)?,
                    Cell::Number(x) => worksheet.write_number_with_format(r, c, *x, &body)?,
                    Cell::Link(url) => worksheet.write_url_with_format(r, c, url.as_str(), &link)?,
                    Cell::Empty => worksheet.write_blank(r, c, &body)?,
                };
            }
        }
        worksheet.autofit();
    }
    workbook.save(path.as_ref())
}
