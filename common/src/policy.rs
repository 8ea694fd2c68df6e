//! 照合ポリシー
//!
//! 候補数だけで結果を分類する。複数候補を自動で1件に絞ることはしない。

use crate::types::CatalogRecord;
use serde::{Deserialize, Serialize};

/// 1ファイルの照合結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchDecision {
    /// 候補なし
    Unmatched,
    /// 候補が1件のみ
    Matched(CatalogRecord),
    /// 候補が複数
    Ambiguous(Vec<CatalogRecord>),
}

impl MatchDecision {
    pub fn from_candidates(mut candidates: Vec<CatalogRecord>) -> Self {
        match candidates.len() {
            0 => MatchDecision::Unmatched,
            1 => MatchDecision::Matched(candidates.remove(0)),
            _ => MatchDecision::Ambiguous(candidates),
        }
    }

    pub fn matched_record(&self) -> Option<&CatalogRecord> {
        match self {
            MatchDecision::Matched(record) => Some(record),
            _ => None,
        }
    }

    pub fn candidates(&self) -> &[CatalogRecord] {
        match self {
            MatchDecision::Unmatched => &[],
            MatchDecision::Matched(record) => std::slice::from_ref(record),
            MatchDecision::Ambiguous(records) => records,
        }
    }

    pub fn summary(&self) -> DecisionSummary {
        match self {
            MatchDecision::Unmatched => DecisionSummary::Unmatched,
            MatchDecision::Matched(record) => DecisionSummary::Matched {
                record_id: record.id,
            },
            MatchDecision::Ambiguous(records) => DecisionSummary::Ambiguous {
                record_ids: records.iter().map(|r| r.id).collect(),
            },
        }
    }
}

/// 照合結果の出力形式
///
/// `{"status":"matched","record_id":12}` / `{"status":"unmatched"}` /
/// `{"status":"ambiguous","record_ids":[3,4]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecisionSummary {
    Matched { record_id: i64 },
    Unmatched,
    Ambiguous { record_ids: Vec<i64> },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> CatalogRecord {
        CatalogRecord::new(id, format!("Plant {}", id), "")
    }

    #[test]
    fn test_zero_candidates_is_unmatched() {
        assert_eq!(MatchDecision::from_candidates(vec![]), MatchDecision::Unmatched);
    }

    #[test]
    fn test_single_candidate_is_matched() {
        let decision = MatchDecision::from_candidates(vec![record(5)]);
        assert_eq!(decision.matched_record().map(|r| r.id), Some(5));
    }

    #[test]
    fn test_multiple_candidates_keep_all_in_order() {
        let decision = MatchDecision::from_candidates(vec![record(9), record(3)]);
        assert!(decision.matched_record().is_none());
        assert_eq!(
            decision.summary(),
            DecisionSummary::Ambiguous { record_ids: vec![9, 3] }
        );
    }

    #[test]
    fn test_policy_is_idempotent() {
        let candidates = vec![record(1), record(2)];
        let first = MatchDecision::from_candidates(candidates.clone());
        let second = MatchDecision::from_candidates(candidates);
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_wire_format() {
        let matched = serde_json::to_string(&MatchDecision::Matched(record(12)).summary()).unwrap();
        assert_eq!(matched, r#"{"status":"matched","record_id":12}"#);

        let unmatched = serde_json::to_string(&DecisionSummary::Unmatched).unwrap();
        assert_eq!(unmatched, r#"{"status":"unmatched"}"#);

        let ambiguous = serde_json::to_string(&DecisionSummary::Ambiguous { record_ids: vec![3, 4] }).unwrap();
        assert_eq!(ambiguous, r#"{"status":"ambiguous","record_ids":[3,4]}"#);
    }
}
