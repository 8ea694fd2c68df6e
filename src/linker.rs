//! 照合済み画像の登録
//!
//! `{id}[{tag_name}].{ext}` 形式のファイルを完了フォルダへ移動し、
//! (カタログID, 保存先パス) の紐付けを記録する。
//! 1ファイルの失敗は記録して次のファイルへ進む。

use crate::catalog::sqlite::validate_identifier;
use crate::error::{PlantPhotoError, Result};
use plant_photo_common::{sanitize_filename, LinkedNamePattern};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 画像とカタログレコードの紐付け
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLink {
    pub catalog_id: i64,
    pub image_path: PathBuf,
}

/// 紐付けの記録先
pub trait LinkSink {
    fn record_link(&mut self, link: &ImageLink) -> Result<()>;

    /// 全件処理後に呼ばれる
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// SQLiteの紐付けテーブルへ記録
pub struct SqliteLinkSink {
    conn: Connection,
    table: String,
}

impl SqliteLinkSink {
    pub fn open(path: &Path, table: &str) -> Result<Self> {
        if !path.exists() {
            return Err(PlantPhotoError::FileNotFound(path.display().to_string()));
        }
        Self::from_connection(Connection::open(path)?, table)
    }

    pub fn from_connection(conn: Connection, table: &str) -> Result<Self> {
        validate_identifier(table)?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {} (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                plantcatalog_id INTEGER NOT NULL,
                image_path      TEXT NOT NULL
            );",
            table
        ))?;
        Ok(Self {
            conn,
            table: table.to_string(),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl LinkSink for SqliteLinkSink {
    fn record_link(&mut self, link: &ImageLink) -> Result<()> {
        self.conn.execute(
            &format!(
                "INSERT INTO {} (plantcatalog_id, image_path) VALUES (?1, ?2)",
                self.table
            ),
            params![link.catalog_id, link.image_path.to_string_lossy().as_ref()],
        )?;
        Ok(())
    }
}

/// JSONファイルへ記録（既存の記録に追記）
pub struct JsonLinkSink {
    path: PathBuf,
    links: Vec<ImageLink>,
}

impl JsonLinkSink {
    pub fn open(path: &Path) -> Result<Self> {
        let links = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            serde_json::from_str(&content)?
        } else {
            Vec::new()
        };
        Ok(Self {
            path: path.to_path_buf(),
            links,
        })
    }

    pub fn links(&self) -> &[ImageLink] {
        &self.links
    }
}

impl LinkSink for JsonLinkSink {
    fn record_link(&mut self, link: &ImageLink) -> Result<()> {
        self.links.push(link.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.links)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkFailure {
    pub path: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, Default)]
pub struct LinkSummary {
    pub linked: Vec<ImageLink>,
    pub failures: Vec<LinkFailure>,
}

/// 照合済み画像を完了フォルダへ移して紐付けを記録
///
/// 完了フォルダ内ではルートからの相対フォルダ構成を保ち、ファイル名は使用禁止文字を除去する。
pub fn link_images(
    root: &Path,
    complete_dir: &Path,
    pattern: &LinkedNamePattern,
    sink: &mut dyn LinkSink,
) -> Result<LinkSummary> {
    if !root.is_dir() {
        return Err(PlantPhotoError::FolderNotFound(root.display().to_string()));
    }

    // 先に一覧を作ってから移動する
    let files: Vec<(PathBuf, Option<i64>)> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.path() != complete_dir)
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::warn!("スキャンできないエントリをスキップ: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            pattern
                .matches_shape(&name)
                .then(|| (e.into_path(), pattern.parse(&name).map(|(id, _)| id)))
        })
        .collect();

    log::debug!("登録対象: {} 件", files.len());

    let mut summary = LinkSummary::default();
    for (path, catalog_id) in files {
        let Some(catalog_id) = catalog_id else {
            summary.failures.push(LinkFailure {
                error: format!("レコードIDを読めません: {}", path.display()),
                path,
            });
            continue;
        };
        match link_one(root, complete_dir, &path, catalog_id, sink) {
            Ok(link) => summary.linked.push(link),
            Err(e) => {
                log::warn!("登録失敗 {}: {}", path.display(), e);
                summary.failures.push(LinkFailure {
                    path,
                    error: e.to_string(),
                });
            }
        }
    }

    sink.finish()?;
    Ok(summary)
}

fn link_one(
    root: &Path,
    complete_dir: &Path,
    path: &Path,
    catalog_id: i64,
    sink: &mut dyn LinkSink,
) -> Result<ImageLink> {
    let relative = path
        .strip_prefix(root)
        .map_err(|_| PlantPhotoError::FileNotFound(path.display().to_string()))?;

    let target_dir = match relative.parent() {
        Some(parent) => complete_dir.join(parent),
        None => complete_dir.to_path_buf(),
    };
    let file_name = path
        .file_name()
        .map(|n| sanitize_filename(&n.to_string_lossy()))
        .unwrap_or_default();
    let target = target_dir.join(file_name);

    if target.exists() {
        return Err(PlantPhotoError::TargetExists(target.display().to_string()));
    }
    std::fs::create_dir_all(&target_dir)?;

    let link = ImageLink {
        catalog_id,
        image_path: target.clone(),
    };
    // 移動できたものだけ記録し、記録に失敗したら元の場所へ戻す
    move_file(path, &target)?;
    if let Err(e) = sink.record_link(&link) {
        if let Err(restore) = move_file(&target, path) {
            log::warn!("元の場所へ戻せません {}: {}", target.display(), restore);
        }
        return Err(e);
    }

    Ok(link)
}

/// 同一デバイスならrename、できなければコピーして削除
///
/// コピー後に元ファイルを消せなければコピーを消して失敗にする（両方に残さない）。
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)?;
    if let Err(e) = std::fs::remove_file(from) {
        let _ = std::fs::remove_file(to);
        return Err(e.into());
    }
    Ok(())
}
