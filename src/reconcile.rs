//! 照合バッチ処理
//!
//! スキャンしたファイルを照合し、一致したファイルを `{id}[{tag_name}].{ext}` にリネームする。
//! 1ファイルの失敗はそのエントリに記録し、残りのファイルの処理を続ける。

use crate::error::{PlantPhotoError, Result};
use crate::report::{ReconcileReport, ReportEntry};
use crate::scanner::ImageFile;
use indicatif::{ProgressBar, ProgressStyle};
use plant_photo_common::{linked_file_name, CatalogRecord, FileEvent, Resolver};
use rayon::prelude::*;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// 照合の実行オプション
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// ファイル単位で並列に照合する
    pub parallel: bool,
    /// 進捗バーを表示する
    pub show_progress: bool,
}

/// ファイル一覧を照合（結果は入力と同じ順序）
pub fn reconcile(
    resolver: &Resolver,
    root: &Path,
    files: &[ImageFile],
    options: ReconcileOptions,
) -> Vec<FileEvent> {
    let progress = if options.show_progress {
        let pb = ProgressBar::new(files.len() as u64);
        pb.set_style(
            ProgressStyle::with_template("  {bar:40.green/white} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        pb
    } else {
        ProgressBar::hidden()
    };

    let events: Vec<FileEvent> = if options.parallel {
        files
            .par_iter()
            .map(|file| {
                let event = resolver.resolve(root, &file.path);
                progress.inc(1);
                event
            })
            .collect()
    } else {
        resolver
            .resolve_all(root, files.iter().map(|f| f.path.as_path()))
            .inspect(|_| progress.inc(1))
            .collect()
    };

    progress.finish_and_clear();
    events
}

/// 照合済みの名前にリネーム
///
/// 既に同じ名前なら何もしない。リネーム先が存在する場合や、札名にパス区切りを含む場合はエラー。
pub fn rename_to_linked(path: &Path, record: &CatalogRecord) -> Result<PathBuf> {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = linked_file_name(record, &ext);

    if Path::new(&name).file_name() != Some(OsStr::new(&name)) {
        return Err(PlantPhotoError::InvalidTargetName(name));
    }

    let target = path.with_file_name(&name);
    if target == path {
        return Ok(target);
    }
    if target.exists() {
        return Err(PlantPhotoError::TargetExists(target.display().to_string()));
    }

    std::fs::rename(path, &target)?;
    Ok(target)
}

/// エントリ1件をリネームし、結果をエントリに記録
///
/// 戻り値はリネームできたかどうか。
pub fn rename_entry(entry: &mut ReportEntry) -> bool {
    if entry.renamed_to.is_some() {
        return false;
    }
    let Some(record) = entry.matched_record().cloned() else {
        return false;
    };

    match rename_to_linked(&entry.path, &record) {
        Ok(target) => {
            log::debug!("リネーム: {} -> {}", entry.path.display(), target.display());
            entry.renamed_to = Some(target);
            entry.error = None;
            true
        }
        Err(e) => {
            log::warn!("リネーム失敗 {}: {}", entry.path.display(), e);
            entry.error = Some(e.to_string());
            false
        }
    }
}

/// 一致したファイルをすべてリネーム（戻り値はリネーム件数）
pub fn apply_renames(report: &mut ReconcileReport) -> usize {
    let renamed = report
        .entries
        .iter_mut()
        .map(rename_entry)
        .filter(|&renamed| renamed)
        .count();
    report.recompute_stats();
    renamed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    #[test]
    fn test_rename_to_linked() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("aprilkiss.png");
        File::create(&source).unwrap();

        let record = CatalogRecord::new(3, "April Kiss Camellia", "Camellia japonica");
        let target = rename_to_linked(&source, &record).unwrap();

        assert_eq!(target, dir.path().join("3[April Kiss Camellia].png"));
        assert!(target.exists());
        assert!(!source.exists());

        // 2回目は同名なので何もしない
        assert_eq!(rename_to_linked(&target, &record).unwrap(), target);
    }

    #[test]
    fn test_rename_refuses_existing_target() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.png");
        File::create(&source).unwrap();
        File::create(dir.path().join("3[Anise].png")).unwrap();

        let record = CatalogRecord::new(3, "Anise", "");
        let result = rename_to_linked(&source, &record);
        assert!(matches!(result, Err(PlantPhotoError::TargetExists(_))));
        assert!(source.exists());
    }

    #[test]
    fn test_rename_refuses_path_separator_in_tag() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("a.png");
        File::create(&source).unwrap();

        let record = CatalogRecord::new(4, "Pink/White", "");
        let result = rename_to_linked(&source, &record);
        assert!(matches!(result, Err(PlantPhotoError::InvalidTargetName(_))));
    }
}
