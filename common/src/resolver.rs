//! 候補レコード解決
//!
//! カタログのスナップショットを保持する照合サービス。
//! 属（と必要なら品種）で区画を絞り込んでからキー抽出・類似度判定を行う。
//! 区画外のレコードとはキーを比較しない。

use crate::error::{Error, Result};
use crate::keys::{extract_file_key, extract_record_key};
use crate::partition::classify;
use crate::policy::MatchDecision;
use crate::similarity::{keys_match, DEFAULT_THRESHOLD};
use crate::types::{CatalogRecord, FileEvent, Resolution};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 照合オプション
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolverOptions {
    /// 類似度の閾値（0.0〜1.0）
    pub threshold: f64,
    /// 品種フォルダがある場合に品種名の一致も必須とする属
    pub strict_genera: Vec<String>,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            strict_genera: default_strict_genera(),
        }
    }
}

/// 似た品種が多く、品種フォルダで絞り込む属
pub fn default_strict_genera() -> Vec<String> {
    vec!["Camellia".to_string()]
}

impl ResolverOptions {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(Error::Config(format!(
                "threshold must be within 0.0..=1.0 (got {})",
                self.threshold
            )));
        }
        Ok(())
    }

    fn is_strict(&self, genus: &str) -> bool {
        self.strict_genera
            .iter()
            .any(|g| g.to_lowercase() == genus.to_lowercase())
    }
}

/// 照合サービス
///
/// レコードは構築時に受け取ったものを読み取り専用で使う。
#[derive(Debug, Clone)]
pub struct Resolver {
    records: Vec<CatalogRecord>,
    options: ResolverOptions,
}

impl Resolver {
    pub fn new(records: Vec<CatalogRecord>, options: ResolverOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { records, options })
    }

    pub fn records(&self) -> &[CatalogRecord] {
        &self.records
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// ファイルキーに一致する候補レコードを入力順で返す
    pub fn find_candidates(
        &self,
        file_key: &str,
        genus: &str,
        cultivar: Option<&str>,
    ) -> Vec<CatalogRecord> {
        collect_candidates(&self.records, file_key, genus, cultivar, &self.options)
    }

    /// 1ファイルを照合
    ///
    /// 区画を判定できないファイルは `FileEvent::Skipped` になる。
    pub fn resolve(&self, root: &Path, path: &Path) -> FileEvent {
        let Some(partition) = classify(root, path) else {
            log::warn!("属フォルダを判定できないためスキップ: {}", path.display());
            return FileEvent::Skipped {
                path: path.to_path_buf(),
                reason: "no genus folder under the image root".to_string(),
            };
        };

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let file_key = extract_file_key(&filename, &partition.genus, partition.cultivar.as_deref());

        let candidates =
            self.find_candidates(&file_key, &partition.genus, partition.cultivar.as_deref());
        log::debug!(
            "{}: key={} genus={} cultivar={:?} candidates={}",
            filename,
            file_key,
            partition.genus,
            partition.cultivar,
            candidates.len()
        );

        FileEvent::Resolved(Resolution {
            path: path.to_path_buf(),
            partition,
            file_key,
            decision: MatchDecision::from_candidates(candidates),
        })
    }

    /// ファイル列を遅延評価で照合
    ///
    /// 呼び出すたびに先頭から評価し直す。途中で止めたい場合は読み出しをやめればよい。
    pub fn resolve_all<'a, I>(&'a self, root: &'a Path, paths: I) -> impl Iterator<Item = FileEvent> + 'a
    where
        I: IntoIterator + 'a,
        I::Item: AsRef<Path>,
        I::IntoIter: 'a,
    {
        paths
            .into_iter()
            .map(move |path| self.resolve(root, path.as_ref()))
    }
}

/// 候補レコードを抽出（既定の厳格属を使用）
pub fn find_candidates(
    file_key: &str,
    genus: &str,
    cultivar: Option<&str>,
    records: &[CatalogRecord],
    threshold: f64,
) -> Vec<CatalogRecord> {
    let options = ResolverOptions {
        threshold,
        ..Default::default()
    };
    collect_candidates(records, file_key, genus, cultivar, &options)
}

fn collect_candidates(
    records: &[CatalogRecord],
    file_key: &str,
    genus: &str,
    cultivar: Option<&str>,
    options: &ResolverOptions,
) -> Vec<CatalogRecord> {
    let genus_lower = genus.to_lowercase();
    let cultivar_lower = cultivar
        .filter(|_| options.is_strict(genus))
        .map(str::to_lowercase);

    records
        .iter()
        .filter(|record| in_partition(record, &genus_lower, cultivar_lower.as_deref()))
        .filter(|record| {
            let candidate_key = extract_record_key(record, genus);
            keys_match(&candidate_key, file_key, options.threshold)
        })
        .cloned()
        .collect()
}

/// レコードが区画に属するか（属名、必要なら品種名が札名か学名に含まれる）
fn in_partition(record: &CatalogRecord, genus_lower: &str, cultivar_lower: Option<&str>) -> bool {
    let botanical = record.botanical.to_lowercase();
    let tag_name = record.tag_name.to_lowercase();

    if !botanical.contains(genus_lower) && !tag_name.contains(genus_lower) {
        return false;
    }

    match cultivar_lower {
        Some(cultivar) => botanical.contains(cultivar) || tag_name.contains(cultivar),
        None => true,
    }
}
