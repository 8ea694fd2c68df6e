//! SQLiteカタログの読み込み

use crate::error::{PlantPhotoError, Result};
use plant_photo_common::CatalogRecord;
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

/// テーブル名として使える識別子か確認（SQLに直接埋め込むため）
pub fn validate_identifier(name: &str) -> Result<()> {
    lazy_static::lazy_static! {
        static ref IDENT_RE: regex::Regex = regex::Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
    }
    if IDENT_RE.is_match(name) {
        Ok(())
    } else {
        Err(PlantPhotoError::Config(format!("テーブル名が不正です: {}", name)))
    }
}

/// カタログテーブルを読み取り専用で開いて全件読み込む
pub fn load_records(path: &Path, table: &str) -> Result<Vec<CatalogRecord>> {
    validate_identifier(table)?;

    let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    query_records(&conn, table)
}

pub fn query_records(conn: &Connection, table: &str) -> Result<Vec<CatalogRecord>> {
    validate_identifier(table)?;

    let mut stmt = conn.prepare(&format!("SELECT id, tag_name, botanical FROM {}", table))?;
    let records = stmt
        .query_map([], |row| {
            Ok(CatalogRecord {
                id: row.get(0)?,
                tag_name: row.get::<_, Option<String>>(1)?.unwrap_or_default(),
                botanical: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(records)
}
