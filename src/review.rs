//! 曖昧な照合結果の対話式レビュー
//!
//! 候補が複数あったファイルについて、候補一覧から人が1件を選ぶ。
//! 選ばれたレコードはリネームと同じ形式で反映し、レポートを書き戻す。

use crate::error::{PlantPhotoError, Result};
use crate::reconcile::rename_entry;
use crate::report::{EntryOutcome, ReconcileReport, ReportEntry};
use dialoguer::Select;
use plant_photo_common::CatalogRecord;
use std::path::Path;

/// レビュー待ちのエントリ番号
pub fn pending_reviews(report: &ReconcileReport) -> Vec<usize> {
    report
        .entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_pending_review())
        .map(|(i, _)| i)
        .collect()
}

/// 対話アクション
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewAction {
    /// 候補を選択（候補内の番号）
    Choose(usize),
    /// このファイルをスキップ
    Skip,
    /// 保存して終了
    Quit,
}

/// 選択を反映
///
/// `apply` が真ならリネームまで行う。リネーム失敗はエントリの `error` に残る。
pub fn apply_choice(entry: &mut ReportEntry, record: &CatalogRecord, apply: bool) {
    entry.outcome = EntryOutcome::Matched {
        record_id: record.id,
    };
    entry.candidates = vec![record.clone()];
    entry.reviewed = true;

    if apply {
        rename_entry(entry);
    }
}

/// 候補の表示ラベル
pub fn candidate_label(record: &CatalogRecord) -> String {
    if record.botanical.is_empty() {
        format!("{}: {}", record.id, record.tag_name)
    } else {
        format!("{}: {} ({})", record.id, record.tag_name, record.botanical)
    }
}

/// 対話式でレビュー
pub fn run_interactive_review(
    report_path: &Path,
    output_path: Option<&Path>,
    apply: bool,
) -> Result<()> {
    let mut report = ReconcileReport::load(report_path)?;

    let pending = pending_reviews(&report);
    if pending.is_empty() {
        println!("✓ レビュー待ちのファイルはありません");
        return Ok(());
    }

    println!("🔍 候補が複数あるファイル: {}件", pending.len());
    println!("---\n");

    for (count, &idx) in pending.iter().enumerate() {
        let entry = &report.entries[idx];
        println!(
            "[{}/{}] {} (キー: {})",
            count + 1,
            pending.len(),
            entry.path.display(),
            entry.file_key.as_deref().unwrap_or("-")
        );

        match prompt_review_action(&entry.candidates)? {
            ReviewAction::Choose(choice) => {
                let record = entry.candidates[choice].clone();
                let entry = &mut report.entries[idx];
                apply_choice(entry, &record, apply);
                match (&entry.renamed_to, &entry.error) {
                    (Some(target), _) => println!("  → {}\n", target.display()),
                    (None, Some(error)) => println!("  ⚠ {}\n", error),
                    (None, None) => println!("  → {} を選択\n", record.id),
                }
            }
            ReviewAction::Skip => {
                println!("  → スキップ\n");
            }
            ReviewAction::Quit => {
                println!("保存して終了します...");
                break;
            }
        }
    }

    report.recompute_stats();
    let output = output_path.unwrap_or(report_path);
    report.save(output)?;

    println!("\n✓ 保存しました: {}", output.display());

    Ok(())
}

/// 候補選択プロンプト
fn prompt_review_action(candidates: &[CatalogRecord]) -> Result<ReviewAction> {
    let mut items: Vec<String> = candidates.iter().map(candidate_label).collect();
    items.push("スキップ".to_string());
    items.push("保存して終了".to_string());

    let selection = Select::new()
        .with_prompt("どのレコードの写真ですか")
        .items(&items)
        .default(0)
        .interact()
        .map_err(|e| PlantPhotoError::Interaction(e.to_string()))?;

    Ok(selection_to_action(selection, candidates.len()))
}

fn selection_to_action(selection: usize, candidate_count: usize) -> ReviewAction {
    if selection < candidate_count {
        ReviewAction::Choose(selection)
    } else if selection == candidate_count {
        ReviewAction::Skip
    } else {
        ReviewAction::Quit
    }
}
