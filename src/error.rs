use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlantPhotoError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("カタログが指定されていません。`plant-photo match --catalog PATH` または `plant-photo config --set-catalog PATH` で設定してください")]
    MissingCatalog,

    #[error("対応していないカタログ形式です: {0}（json/csv/xlsx/sqlite）")]
    UnsupportedCatalog(String),

    #[error("カタログが不正: {0}")]
    InvalidCatalog(String),

    #[error("画像が見つかりません: {0}")]
    NoImagesFound(String),

    #[error("リネーム先が既に存在します: {0}")]
    TargetExists(String),

    #[error("リネーム先のファイル名が不正です: {0}")]
    InvalidTargetName(String),

    #[error("対話入力エラー: {0}")]
    Interaction(String),

    #[error("照合エラー: {0}")]
    Core(#[from] plant_photo_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLiteエラー: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Excel読み込みエラー: {0}")]
    Spreadsheet(#[from] calamine::Error),
}

pub type Result<T> = std::result::Result<T, PlantPhotoError>;
