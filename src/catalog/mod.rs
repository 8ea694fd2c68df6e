//! カタログ読み込みモジュール
//!
//! 照合に必要な {id, tag_name, botanical} だけを読み込み、照合中は変更しないスナップショットとして渡す。
//!
//! 対応形式:
//! - JSON: レコードの配列
//! - CSV / Excel: `id`, `tag_name`, `botanical` 列を持つ表（列順は任意）
//! - SQLite: `SELECT id, tag_name, botanical FROM <catalog_table>`

pub mod sqlite;
pub mod table;

use crate::config::Config;
use crate::error::{PlantPhotoError, Result};
use plant_photo_common::CatalogRecord;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Csv,
    Spreadsheet,
    Sqlite,
}

impl CatalogFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(CatalogFormat::Json),
            "csv" => Ok(CatalogFormat::Csv),
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(CatalogFormat::Spreadsheet),
            "sqlite" | "sqlite3" | "db" => Ok(CatalogFormat::Sqlite),
            _ => Err(PlantPhotoError::UnsupportedCatalog(path.display().to_string())),
        }
    }
}

/// カタログを読み込む
pub fn load_catalog(path: &Path, config: &Config) -> Result<Vec<CatalogRecord>> {
    if !path.exists() {
        return Err(PlantPhotoError::FileNotFound(path.display().to_string()));
    }

    let records = match CatalogFormat::from_path(path)? {
        CatalogFormat::Json => {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)
                .map_err(|e| PlantPhotoError::InvalidCatalog(format!("JSONパースエラー: {}", e)))?
        }
        CatalogFormat::Csv => table::load_csv(path)?,
        CatalogFormat::Spreadsheet => table::load_spreadsheet(path)?,
        CatalogFormat::Sqlite => sqlite::load_records(path, &config.catalog_table)?,
    };

    warn_duplicate_ids(&records);
    log::debug!("カタログ読み込み: {} 件 ({})", records.len(), path.display());

    Ok(records)
}

fn warn_duplicate_ids(records: &[CatalogRecord]) {
    let mut seen = std::collections::HashSet::new();
    for record in records {
        if !seen.insert(record.id) {
            log::warn!("カタログのIDが重複しています: {}", record.id);
        }
    }
}
