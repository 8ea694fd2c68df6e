//! 照合で使う型定義
//!
//! - CatalogRecord: カタログストアから渡される植物レコード（読み取り専用）
//! - Resolution: 1ファイル分の照合結果
//! - FileEvent: バッチ照合で1ファイルごとに流れるイベント

use crate::partition::Partition;
use crate::policy::MatchDecision;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};

/// カタログの1レコード
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogRecord {
    pub id: i64,

    /// 札名（自由記述）
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tag_name: String,

    /// 学名（自由記述）
    #[serde(default, deserialize_with = "null_as_empty")]
    pub botanical: String,
}

impl CatalogRecord {
    pub fn new(id: i64, tag_name: impl Into<String>, botanical: impl Into<String>) -> Self {
        Self {
            id,
            tag_name: tag_name.into(),
            botanical: botanical.into(),
        }
    }
}

/// DB由来のJSONでは空欄がnullになるため空文字として読む
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// 分類できたファイルの照合結果
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub path: PathBuf,
    pub partition: Partition,
    pub file_key: String,
    pub decision: MatchDecision,
}

/// バッチ照合のイベント
#[derive(Debug, Clone, PartialEq)]
pub enum FileEvent {
    /// フォルダ階層から属名を決められなかった
    Skipped { path: PathBuf, reason: String },
    /// 照合まで完了した
    Resolved(Resolution),
}

impl FileEvent {
    pub fn path(&self) -> &Path {
        match self {
            FileEvent::Skipped { path, .. } => path,
            FileEvent::Resolved(resolution) => &resolution.path,
        }
    }

    pub fn decision(&self) -> Option<&MatchDecision> {
        match self {
            FileEvent::Skipped { .. } => None,
            FileEvent::Resolved(resolution) => Some(&resolution.decision),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_null_fields_load_as_empty() {
        let json = r#"[{"id": 7, "tag_name": null, "botanical": "Ilex vomitoria"}, {"id": 8}]"#;
        let records: Vec<CatalogRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records[0].tag_name, "");
        assert_eq!(records[0].botanical, "Ilex vomitoria");
        assert_eq!(records[1], CatalogRecord::new(8, "", ""));
    }

    #[test]
    fn test_file_event_accessors() {
        let skipped = FileEvent::Skipped {
            path: PathBuf::from("png/loose.png"),
            reason: "属フォルダなし".into(),
        };
        assert_eq!(skipped.path(), Path::new("png/loose.png"));
        assert!(skipped.decision().is_none());
    }
}
