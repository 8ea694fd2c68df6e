use crate::error::{PlantPhotoError, Result};
use plant_photo_common::resolver::default_strict_genera;
use plant_photo_common::{ResolverOptions, DEFAULT_THRESHOLD};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// カタログパスを上書きする環境変数
pub const CATALOG_ENV: &str = "PLANT_PHOTO_CATALOG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 類似度の閾値
    pub threshold: f64,
    /// 品種フォルダで絞り込む属
    pub strict_genera: Vec<String>,
    /// 対象とする画像の拡張子
    pub image_extensions: Vec<String>,
    /// 既定のカタログ（json/csv/xlsx/sqlite）
    pub catalog_path: Option<PathBuf>,
    /// SQLiteカタログのテーブル名
    pub catalog_table: String,
    /// 画像紐付けを記録するテーブル名
    pub link_table: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            strict_genera: default_strict_genera(),
            image_extensions: vec!["png".into()],
            catalog_path: None,
            catalog_table: "PlantCatalog".into(),
            link_table: "CatalogImages".into(),
        }
    }
}

impl Config {
    /// 設定ファイルを読み込み、環境変数の指定を反映する
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;

        // 環境変数を優先
        if let Ok(path) = std::env::var(CATALOG_ENV) {
            if !path.trim().is_empty() {
                config.catalog_path = Some(PathBuf::from(path));
            }
        }

        Ok(config)
    }

    /// 設定ファイルの内容のみ（環境変数は反映しない）
    pub fn load_file() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Ok(serde_json::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| PlantPhotoError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("plant-photo").join("config.json"))
    }

    /// 照合オプションを生成（`threshold` はCLI指定があれば優先）
    pub fn resolver_options(&self, threshold: Option<f64>) -> Result<ResolverOptions> {
        let options = ResolverOptions {
            threshold: threshold.unwrap_or(self.threshold),
            strict_genera: self.strict_genera.clone(),
        };
        options.validate()?;
        Ok(options)
    }

    /// カタログのパスを決定（CLI指定 > 環境変数 > 設定ファイル）
    pub fn catalog_source(&self, cli_path: Option<PathBuf>) -> Result<PathBuf> {
        cli_path
            .or_else(|| self.catalog_path.clone())
            .ok_or(PlantPhotoError::MissingCatalog)
    }

    pub fn set_threshold(&mut self, threshold: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(PlantPhotoError::Config(format!(
                "閾値は0.0〜1.0の範囲で指定してください: {}",
                threshold
            )));
        }
        self.threshold = threshold;
        Ok(())
    }

    pub fn add_strict_genus(&mut self, genus: &str) {
        let exists = self
            .strict_genera
            .iter()
            .any(|g| g.eq_ignore_ascii_case(genus));
        if !exists {
            self.strict_genera.push(genus.to_string());
        }
    }
}
