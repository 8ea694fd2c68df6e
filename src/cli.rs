use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plant-photo")]
#[command(about = "植物カタログと写真ファイルの照合・リネームツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真フォルダをカタログと照合
    Match {
        /// 画像ルート（直下のフォルダ＝属、その下のフォルダ＝品種）
        #[arg(required = true)]
        root: PathBuf,

        /// カタログ（json/csv/xlsx/sqlite）。省略時は設定ファイルか環境変数 PLANT_PHOTO_CATALOG
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// 処理するフォルダ（ルートからの相対パス可、複数指定可）
        #[arg(short, long = "dir")]
        dirs: Vec<PathBuf>,

        /// 類似度の閾値（0.0-1.0、省略時は設定値）
        #[arg(short, long)]
        threshold: Option<f64>,

        /// 一致したファイルを実際にリネームする（省略時はレポートのみ）
        #[arg(long)]
        apply: bool,

        /// ファイル単位で並列に照合
        #[arg(short, long)]
        parallel: bool,

        /// レポートJSONの出力先（デフォルト: ルート/match-report.json）
        #[arg(short, long)]
        report: Option<PathBuf>,

        /// 未照合ファイルのパス一覧（JSON）の出力先
        #[arg(short, long)]
        unmatched: Option<PathBuf>,
    },

    /// 候補が複数あったファイルを対話式で決める
    Review {
        /// レポートJSONファイル
        #[arg(required = true)]
        report: PathBuf,

        /// 出力先（省略時は上書き）
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// 選択したレコードでリネームする
        #[arg(long)]
        apply: bool,
    },

    /// 照合済み画像を完了フォルダへ移し、紐付けを記録
    Link {
        /// 画像ルート
        #[arg(required = true)]
        root: PathBuf,

        /// 移動先の完了フォルダ
        #[arg(short, long)]
        complete_dir: PathBuf,

        /// 紐付けを記録するSQLiteデータベース
        #[arg(long, conflicts_with = "links", required_unless_present = "links")]
        db: Option<PathBuf>,

        /// 紐付けを記録するJSONファイル
        #[arg(long)]
        links: Option<PathBuf>,
    },

    /// 設定を表示/編集
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// 類似度の閾値を設定
        #[arg(long)]
        set_threshold: Option<f64>,

        /// 既定のカタログを設定
        #[arg(long)]
        set_catalog: Option<PathBuf>,

        /// 品種フォルダで絞り込む属を追加
        #[arg(long)]
        add_strict_genus: Option<String>,
    },
}
