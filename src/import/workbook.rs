//! Reading the first sheet of a workbook into plain string rows.

use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader, Xls, Xlsb, Xlsx};

use crate::error::{DeskError, DeskResult};

/// OLE compound document header (.xls).
const OLE_MAGIC: [u8; 4] = [0xD0, 0xCF, 0x11, 0xE0];
/// ZIP header (.xlsx, .xlsm, .xlsb).
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Rows of the first sheet, each cell rendered as trimmed text.
pub type Rows = Vec<Vec<String>>;

/// Parse workbook bytes off the async runtime.
pub async fn read_bytes(bytes: Vec<u8>) -> DeskResult<Rows> {
    tokio::task::spawn_blocking(move || rows_from_bytes(&bytes))
        .await
        .map_err(|e| DeskError::Internal(format!("Task join error: {e}")))?
}

/// Parse a workbook file off the async runtime.
pub async fn read_path(path: &Path) -> DeskResult<Rows> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let mut workbook = open_workbook_auto(&path)
            .map_err(|e| DeskError::Import(format!("Failed to open spreadsheet: {e}")))?;
        first_sheet(&mut workbook)
    })
    .await
    .map_err(|e| DeskError::Internal(format!("Task join error: {e}")))?
}

fn rows_from_bytes(bytes: &[u8]) -> DeskResult<Rows> {
    if bytes.len() < 4 {
        return Err(DeskError::Import("Empty or truncated workbook".to_string()));
    }
    let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];

    if magic == OLE_MAGIC {
        let mut workbook: Xls<_> = Xls::new(Cursor::new(bytes))
            .map_err(|e| DeskError::Import(format!("Failed to open XLS: {e}")))?;
        return first_sheet(&mut workbook);
    }

    if magic == ZIP_MAGIC {
        if let Ok(mut workbook) = Xlsx::new(Cursor::new(bytes)) {
            return first_sheet(&mut workbook);
        }
        if let Ok(mut workbook) = Xlsb::new(Cursor::new(bytes)) {
            return first_sheet(&mut workbook);
        }
        return Err(DeskError::Import(
            "Failed to parse as XLSX or XLSB format".to_string(),
        ));
    }

    Err(DeskError::Import("Unrecognized spreadsheet format".to_string()))
}

fn first_sheet<RS, R>(workbook: &mut R) -> DeskResult<Rows>
where
    RS: std::io::Read + std::io::Seek,
    R: Reader<RS>,
{
    let name = workbook
        .sheet_names()
        .into_iter()
        .next()
        .ok_or_else(|| DeskError::Import("Workbook has no sheets".to_string()))?;

    let range = workbook
        .worksheet_range(&name)
        .map_err(|e| DeskError::Import(format!("Failed to read sheet '{name}': {e:?}")))?;

    Ok(range_to_rows(&range))
}

fn range_to_rows(range: &Range<Data>) -> Rows {
    range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect()
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                format!("{f:.0}")
            } else {
                format!("{f}")
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{dt}"),
        Data::Error(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_rendering() {
        assert_eq!(cell_to_string(&Data::Float(12.0)), "12");
        assert_eq!(cell_to_string(&Data::Float(2.5)), "2.5");
        assert_eq!(cell_to_string(&Data::String("  فرع  ".into())), "فرع");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_unknown_bytes_rejected() {
        assert!(matches!(rows_from_bytes(b"name,code\n"), Err(DeskError::Import(_))));
        assert!(matches!(rows_from_bytes(b"PK"), Err(DeskError::Import(_))));
    }
}
