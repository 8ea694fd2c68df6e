//! 照合レポート
//!
//! 1ファイル1エントリで照合結果・リネーム結果を保存する。
//! 曖昧なエントリは `review` コマンドで人が決める。

use crate::error::{PlantPhotoError, Result};
use plant_photo_common::{CatalogRecord, DecisionSummary, FileEvent};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// エントリの照合状態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryOutcome {
    Matched { record_id: i64 },
    Unmatched,
    Ambiguous { record_ids: Vec<i64> },
    /// 属フォルダを判定できなかった
    Skipped { reason: String },
}

impl From<DecisionSummary> for EntryOutcome {
    fn from(summary: DecisionSummary) -> Self {
        match summary {
            DecisionSummary::Matched { record_id } => EntryOutcome::Matched { record_id },
            DecisionSummary::Unmatched => EntryOutcome::Unmatched,
            DecisionSummary::Ambiguous { record_ids } => EntryOutcome::Ambiguous { record_ids },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub path: PathBuf,
    #[serde(default)]
    pub genus: Option<String>,
    #[serde(default)]
    pub cultivar: Option<String>,
    #[serde(default)]
    pub file_key: Option<String>,
    pub outcome: EntryOutcome,
    /// 候補レコード（一致・曖昧のとき）
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub candidates: Vec<CatalogRecord>,
    /// 人が選んだ結果か
    #[serde(default)]
    pub reviewed: bool,
    #[serde(default)]
    pub renamed_to: Option<PathBuf>,
    /// このファイルだけの失敗（他のファイルの処理は続ける）
    #[serde(default)]
    pub error: Option<String>,
}

impl ReportEntry {
    pub fn from_event(event: &FileEvent) -> Self {
        match event {
            FileEvent::Skipped { path, reason } => Self {
                path: path.clone(),
                genus: None,
                cultivar: None,
                file_key: None,
                outcome: EntryOutcome::Skipped {
                    reason: reason.clone(),
                },
                candidates: Vec::new(),
                reviewed: false,
                renamed_to: None,
                error: None,
            },
            FileEvent::Resolved(resolution) => Self {
                path: resolution.path.clone(),
                genus: Some(resolution.partition.genus.clone()),
                cultivar: resolution.partition.cultivar.clone(),
                file_key: Some(resolution.file_key.clone()),
                outcome: resolution.decision.summary().into(),
                candidates: resolution.decision.candidates().to_vec(),
                reviewed: false,
                renamed_to: None,
                error: None,
            },
        }
    }

    /// 一致したレコード（候補が1件に決まっているとき）
    pub fn matched_record(&self) -> Option<&CatalogRecord> {
        match &self.outcome {
            EntryOutcome::Matched { record_id } => {
                self.candidates.iter().find(|r| r.id == *record_id)
            }
            _ => None,
        }
    }

    pub fn is_pending_review(&self) -> bool {
        matches!(self.outcome, EntryOutcome::Ambiguous { .. }) && !self.reviewed
    }
}

/// 集計
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportStats {
    pub total: usize,
    pub matched: usize,
    pub unmatched: usize,
    pub ambiguous: usize,
    pub skipped: usize,
    pub renamed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcileReport {
    /// 作成日時（RFC3339）
    pub generated_at: String,
    pub root: PathBuf,
    pub threshold: f64,
    pub stats: ReportStats,
    pub entries: Vec<ReportEntry>,
}

impl ReconcileReport {
    pub fn new(root: &Path, threshold: f64, events: &[FileEvent]) -> Self {
        let mut report = Self {
            generated_at: chrono::Local::now().to_rfc3339(),
            root: root.to_path_buf(),
            threshold,
            stats: ReportStats::default(),
            entries: events.iter().map(ReportEntry::from_event).collect(),
        };
        report.recompute_stats();
        report
    }

    pub fn recompute_stats(&mut self) {
        let mut stats = ReportStats {
            total: self.entries.len(),
            ..Default::default()
        };

        for entry in &self.entries {
            match entry.outcome {
                EntryOutcome::Matched { .. } => stats.matched += 1,
                EntryOutcome::Unmatched => stats.unmatched += 1,
                EntryOutcome::Ambiguous { .. } => stats.ambiguous += 1,
                EntryOutcome::Skipped { .. } => stats.skipped += 1,
            }
            if entry.renamed_to.is_some() {
                stats.renamed += 1;
            }
            if entry.error.is_some() {
                stats.failed += 1;
            }
        }

        self.stats = stats;
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PlantPhotoError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// 未照合ファイルのパス一覧
    pub fn unmatched_paths(&self) -> Vec<&Path> {
        self.entries
            .iter()
            .filter(|e| e.outcome == EntryOutcome::Unmatched)
            .map(|e| e.path.as_path())
            .collect()
    }

    /// 未照合ファイルのパス一覧をJSON配列で書き出す
    pub fn write_unmatched(&self, path: &Path) -> Result<usize> {
        let paths = self.unmatched_paths();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&paths)?;
        std::fs::write(path, json)?;
        Ok(paths.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use plant_photo_common::{MatchDecision, Partition, Resolution};

    fn resolved(path: &str, decision: MatchDecision) -> FileEvent {
        FileEvent::Resolved(Resolution {
            path: PathBuf::from(path),
            partition: Partition::new("Azalea", None),
            file_key: "key".into(),
            decision,
        })
    }

    fn sample_events() -> Vec<FileEvent> {
        vec![
            resolved("png/Azalea/a.png", MatchDecision::Matched(CatalogRecord::new(1, "A", ""))),
            resolved("png/Azalea/b.png", MatchDecision::Unmatched),
            resolved(
                "png/Azalea/c.png",
                MatchDecision::Ambiguous(vec![
                    CatalogRecord::new(2, "B", ""),
                    CatalogRecord::new(3, "C", ""),
                ]),
            ),
            FileEvent::Skipped {
                path: PathBuf::from("png/d.png"),
                reason: "no genus".into(),
            },
        ]
    }

    #[test]
    fn test_report_stats() {
        let report = ReconcileReport::new(Path::new("png"), 0.7, &sample_events());
        assert_eq!(
            report.stats,
            ReportStats { total: 4, matched: 1, unmatched: 1, ambiguous: 1, skipped: 1, renamed: 0, failed: 0 }
        );
        assert_eq!(report.entries[0].matched_record().map(|r| r.id), Some(1));
        assert!(report.entries[2].is_pending_review());
    }

    #[test]
    fn test_entry_outcome_json() {
        let report = ReconcileReport::new(Path::new("png"), 0.7, &sample_events());
        let json = serde_json::to_value(&report.entries[2]).unwrap();
        assert_eq!(json["outcome"]["status"], "ambiguous");
        assert_eq!(json["outcome"]["record_ids"], serde_json::json!([2, 3]));

        let json = serde_json::to_value(&report.entries[3]).unwrap();
        assert_eq!(json["outcome"]["status"], "skipped");
    }

    #[test]
    fn test_save_load_and_unmatched() {
        let dir = tempfile::tempdir().unwrap();
        let report = ReconcileReport::new(Path::new("png"), 0.7, &sample_events());

        let report_path = dir.path().join("out/report.json");
        report.save(&report_path).unwrap();
        let loaded = ReconcileReport::load(&report_path).unwrap();
        assert_eq!(loaded.entries, report.entries);

        let unmatched_path = dir.path().join("unmatchedImages.json");
        assert_eq!(report.write_unmatched(&unmatched_path).unwrap(), 1);
        let paths: Vec<String> =
            serde_json::from_str(&std::fs::read_to_string(unmatched_path).unwrap()).unwrap();
        assert_eq!(paths, vec!["png/Azalea/b.png".to_string()]);
    }
}
