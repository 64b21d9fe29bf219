//! A1 notation helpers.

/// Convert a zero-based column index to its letter form (`0` → `A`, `26` → `AA`).
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8_lossy(&letters).into_owned()
}

/// Quote a worksheet title for use in a range.
///
/// Titles are always quoted; embedded single quotes are doubled.
pub fn quote_sheet(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Range covering a whole worksheet.
pub fn sheet_range(title: &str) -> String {
    quote_sheet(title)
}

/// Range of a single cell, e.g. `'Ingest_Queue'!C7`.
pub fn cell_range(title: &str, column_index: usize, row_position: u32) -> String {
    format!(
        "{}!{}{}",
        quote_sheet(title),
        column_letter(column_index),
        row_position
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letter() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(2), "C");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(51), "AZ");
        assert_eq!(column_letter(52), "BA");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(sheet_range("Ingest_Queue"), "'Ingest_Queue'");
        assert_eq!(cell_range("Ingest_Queue", 1, 2), "'Ingest_Queue'!B2");
        assert_eq!(cell_range("Bob's tab", 0, 10), "'Bob''s tab'!A10");
    }
}
