//! Shared fixtures for integration tests

#![allow(dead_code)]

use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};
use std::path::Path;

/// Booking Date cell contents for a fixture row
pub enum Booked {
    /// Written as a text cell
    Text(&'static str),
    /// Written as a real Excel date cell
    Date(u16, u8, u8),
    Blank,
}

/// Build a booking workbook: `Booking Ref`, `Destination`, `Booking Date`
pub fn bookings_workbook(rows: &[(&str, Booked)]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let sheet = workbook.add_worksheet();

    sheet.write_string(0, 0, "Booking Ref").unwrap();
    sheet.write_string(0, 1, "Destination").unwrap();
    sheet.write_string(0, 2, "Booking Date").unwrap();

    for (idx, (destination, booked)) in rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        sheet.write_string(row, 0, format!("BK-{:03}", idx + 1)).unwrap();
        if !destination.is_empty() {
            sheet.write_string(row, 1, *destination).unwrap();
        }
        match booked {
            Booked::Text(text) => {
                sheet.write_string(row, 2, *text).unwrap();
            }
            Booked::Date(y, m, d) => {
                let date = ExcelDateTime::from_ymd(*y, *m, *d).unwrap();
                sheet
                    .write_datetime_with_format(row, 2, &date, &date_format)
                    .unwrap();
            }
            Booked::Blank => {}
        }
    }

    workbook.save_to_buffer().unwrap()
}

/// Paris and Rome bookings relative to 2024-01-15
///
/// - Paris: 2024-01-10 (5 days), 2024-01-01 (14 days), 2023-11-01 (75 days)
/// - Rome: 2024-01-20 (future)
pub fn paris_rome() -> Vec<u8> {
    bookings_workbook(&[
        ("Paris", Booked::Date(2024, 1, 10)),
        ("Paris", Booked::Text("2024-01-01")),
        ("Paris", Booked::Date(2023, 11, 1)),
        ("Rome", Booked::Date(2024, 1, 20)),
    ])
}

/// A workbook with a single empty worksheet
pub fn empty_workbook() -> Vec<u8> {
    let mut workbook = Workbook::new();
    workbook.add_worksheet();
    workbook.save_to_buffer().unwrap()
}

pub fn write_file(path: &Path, bytes: &[u8]) {
    std::fs::write(path, bytes).unwrap();
}

/// Read the report sheet back as strings (numbers without a fraction)
pub fn read_report(bytes: &[u8], sheet: &str) -> Vec<Vec<String>> {
    use calamine::{open_workbook_auto_from_rs, Data, Reader};

    let mut workbook = open_workbook_auto_from_rs(std::io::Cursor::new(bytes)).unwrap();
    let range = workbook.worksheet_range(sheet).unwrap();
    range
        .rows()
        .map(|cells| {
            cells
                .iter()
                .map(|cell| match cell {
                    Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
                    Data::Int(i) => i.to_string(),
                    other => other.to_string(),
                })
                .collect()
        })
        .collect()
}
