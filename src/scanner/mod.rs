use crate::error::{PlantPhotoError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub path: PathBuf,
    pub file_name: String,
}

impl ImageFile {
    pub fn new(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Self { path, file_name }
    }
}

/// 画像ルート配下を再帰的にスキャン
///
/// `selected_dirs` が空ならルート全体、指定があればその配下のみ（ルートからの相対パスも可）。
/// 拡張子は大文字小文字を区別しない。
pub fn scan_tree(root: &Path, selected_dirs: &[PathBuf], extensions: &[String]) -> Result<Vec<ImageFile>> {
    if !root.is_dir() {
        return Err(PlantPhotoError::FolderNotFound(root.display().to_string()));
    }

    let targets: Vec<PathBuf> = if selected_dirs.is_empty() {
        vec![root.to_path_buf()]
    } else {
        selected_dirs
            .iter()
            .map(|d| if d.is_absolute() { d.clone() } else { root.join(d) })
            .collect()
    };

    let mut images = Vec::new();

    for target in &targets {
        if !target.is_dir() {
            return Err(PlantPhotoError::FolderNotFound(target.display().to_string()));
        }

        for entry in WalkDir::new(target).into_iter() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("スキャンできないエントリをスキップ: {}", e);
                    continue;
                }
            };

            let path = entry.path();
            if !entry.file_type().is_file() || !has_image_extension(path, extensions) {
                continue;
            }

            images.push(ImageFile::new(path.to_path_buf()));
        }
    }

    // 選択フォルダが重なっていても1回だけ処理する
    images.sort_by(|a, b| a.path.cmp(&b.path));
    images.dedup_by(|a, b| a.path == b.path);

    Ok(images)
}

fn has_image_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    let ext = ext.to_string_lossy();
    extensions
        .iter()
        .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(&ext))
}
