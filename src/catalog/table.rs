//! 表形式（CSV / Excel）カタログの読み込み

use crate::error::{PlantPhotoError, Result};
use calamine::{open_workbook_auto, Reader};
use plant_photo_common::CatalogRecord;
use std::path::Path;

/// 必須列の位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Columns {
    id: usize,
    tag_name: usize,
    botanical: usize,
}

impl Columns {
    fn from_header<S: AsRef<str>>(header: &[S]) -> Result<Self> {
        let find = |name: &str| {
            header
                .iter()
                .position(|h| h.as_ref().trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| PlantPhotoError::InvalidCatalog(format!("列 '{}' がありません", name)))
        };

        Ok(Self {
            id: find("id")?,
            tag_name: find("tag_name")?,
            botanical: find("botanical")?,
        })
    }

    /// 1行をレコードに変換（IDが読めない行は None）
    fn record<S: AsRef<str>>(&self, row: &[S]) -> Option<CatalogRecord> {
        let cell = |i: usize| row.get(i).map(|s| s.as_ref().trim()).unwrap_or("");

        let id = parse_id(cell(self.id))?;
        Some(CatalogRecord::new(id, cell(self.tag_name), cell(self.botanical)))
    }
}

/// "12" / "12.0" をIDとして読む
fn parse_id(value: &str) -> Option<i64> {
    if let Ok(id) = value.parse::<i64>() {
        return Some(id);
    }
    let float = value.parse::<f64>().ok()?;
    (float.fract() == 0.0 && float.is_finite()).then_some(float as i64)
}

fn records_from_rows<S: AsRef<str>>(rows: &[Vec<S>]) -> Result<Vec<CatalogRecord>> {
    let Some((header, body)) = rows.split_first() else {
        return Err(PlantPhotoError::InvalidCatalog("ヘッダー行がありません".into()));
    };
    let columns = Columns::from_header(header.as_slice())?;

    let mut records = Vec::new();
    for (line, row) in body.iter().enumerate() {
        if row.iter().all(|c| c.as_ref().trim().is_empty()) {
            continue;
        }
        match columns.record(row.as_slice()) {
            Some(record) => records.push(record),
            // ヘッダーを1行目として数える
            None => log::warn!("IDを読めない行をスキップ: {}行目", line + 2),
        }
    }

    Ok(records)
}

/// CSVカタログを読み込む
pub fn load_csv(path: &Path) -> Result<Vec<CatalogRecord>> {
    let content = std::fs::read_to_string(path)?;
    load_csv_str(&content)
}

/// CSV文字列からカタログを読み込む
pub fn load_csv_str(content: &str) -> Result<Vec<CatalogRecord>> {
    let content = content.trim_start_matches('\u{feff}');
    let rows: Vec<Vec<String>> = csv_records(content)
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| parse_csv_line(line))
        .collect();
    records_from_rows(&rows)
}

/// Excel / ODS の先頭シートを読み込む
pub fn load_spreadsheet(path: &Path) -> Result<Vec<CatalogRecord>> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| PlantPhotoError::InvalidCatalog("シートがありません".into()))??;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell.to_string()).collect())
        .collect();
    records_from_rows(&rows)
}

/// 行に分割（クォート内の改行は行の区切りにしない）
fn csv_records(content: &str) -> Vec<String> {
    let mut records = Vec::new();
    let mut current = String::new();

    for line in content.lines() {
        if !current.is_empty() {
            current.push('\n');
        }
        current.push_str(line);
        if current.matches('"').count() % 2 == 0 {
            records.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        records.push(current);
    }

    records
}

/// CSV行をパース（ダブルクォート対応）
fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut field_start = 0;

    for (i, c) in line.char_indices() {
        if c == '"' {
            in_quotes = !in_quotes;
        } else if c == ',' && !in_quotes {
            fields.push(trim_quotes(&line[field_start..i]));
            field_start = i + c.len_utf8();
        }
    }

    // 最後のフィールド
    fields.push(trim_quotes(&line[field_start..]));

    fields
}

/// 前後のクォートを外し、`""` を `"` に戻す
fn trim_quotes(s: &str) -> String {
    let s = s.trim();
    if s.starts_with('"') && s.ends_with('"') && s.len() >= 2 {
        s[1..s.len() - 1].replace("\"\"", "\"")
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_CSV: &str = r#"tag_name,id,botanical
"April Kiss Camellia",3,"Camellia japonica"
"Edward Goucher Abelia",12,"Abelia x 'Edward Goucher'"
"Pink, White Mix",13.0,
"Broken Row",abc,"Ilex"
"#;

    #[test]
    fn test_load_csv_any_column_order() {
        let records = load_csv_str(TEST_CSV).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0], CatalogRecord::new(3, "April Kiss Camellia", "Camellia japonica"));
        assert_eq!(records[1].botanical, "Abelia x 'Edward Goucher'");
    }

    #[test]
    fn test_load_csv_quoted_comma_and_float_id() {
        let records = load_csv_str(TEST_CSV).unwrap();
        assert_eq!(records[2], CatalogRecord::new(13, "Pink, White Mix", ""));
    }

    #[test]
    fn test_load_csv_missing_column() {
        let result = load_csv_str("id,tag_name\n1,Anise\n");
        assert!(matches!(result, Err(PlantPhotoError::InvalidCatalog(_))));
    }

    #[test]
    fn test_load_csv_empty() {
        assert!(matches!(load_csv_str(""), Err(PlantPhotoError::InvalidCatalog(_))));
    }

    #[test]
    fn test_parse_csv_line() {
        assert_eq!(parse_csv_line(r#"1,"a, b",c"#), vec!["1", "a, b", "c"]);
        assert_eq!(parse_csv_line("1,,"), vec!["1", "", ""]);
    }

    #[test]
    fn test_parse_csv_escaped_quotes() {
        assert_eq!(
            parse_csv_line(r#"5,"Camellia ""April Tryst""","a ""b""""#),
            vec!["5", r#"Camellia "April Tryst""#, r#"a "b""#]
        );
    }

    #[test]
    fn test_load_csv_quoted_newline() {
        let csv = "id,tag_name,botanical\n1,\"Pink\nFrost\",Illicium\n2,Anise,\"Illicium \"\"x\"\"\"\n";
        let records = load_csv_str(csv).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].tag_name, "Pink\nFrost");
        assert_eq!(records[1].botanical, "Illicium \"x\"");
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("7"), Some(7));
        assert_eq!(parse_id("7.0"), Some(7));
        assert_eq!(parse_id("7.5"), None);
        assert_eq!(parse_id(""), None);
    }
}
