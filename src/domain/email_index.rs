use std::collections::HashSet;

use thiserror::Error;

use super::sheets::column::Column;

/// Header cell that marks the dedup column. Matched exactly, case-sensitive.
pub const EMAIL_HEADER: &str = "Email";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("could not find an 'Email' column in the worksheet header row")]
pub struct MissingEmailColumn;

/// Locates the email column in the worksheet header row.
pub fn locate_email_column(header: &[String]) -> Result<Column, MissingEmailColumn> {
    header
        .iter()
        .position(|cell| cell == EMAIL_HEADER)
        .map(Column::from_index)
        .ok_or(MissingEmailColumn)
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Builds the case-insensitive dedup set from the email column cells
/// (header excluded by the caller). Empty cells are dropped.
pub fn build_email_index<I, S>(cells: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    cells
        .into_iter()
        .map(|cell| normalize_email(cell.as_ref()))
        .filter(|email| !email.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_locate_email_column() {
        let header = header(&["Lead Date", "Lead Source", "First Name", "Email"]);
        let column = locate_email_column(&header).unwrap();
        assert_eq!(column.to_string(), "D");
    }

    #[test]
    fn test_locate_email_column_missing() {
        let header = header(&["Lead Date", "Lead Source"]);
        assert_eq!(locate_email_column(&header), Err(MissingEmailColumn));
    }

    #[test]
    fn test_locate_email_column_is_case_sensitive() {
        let header = header(&["email", "EMAIL", "E-mail"]);
        assert_eq!(locate_email_column(&header), Err(MissingEmailColumn));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  John@Example.COM "), "john@example.com");
    }

    #[test]
    fn test_build_email_index_drops_empty_cells() {
        let index = build_email_index(["a@b.com", "", "  ", "C@D.com"]);
        assert_eq!(index.len(), 2);
        assert!(index.contains("a@b.com"));
        assert!(index.contains("c@d.com"));
    }
}
