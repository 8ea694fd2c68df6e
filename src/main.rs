use clap::Parser;
use plant_photo_match::{catalog, cli, config, error, linker, reconcile, report, review, scanner};
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use plant_photo_common::{LinkedNamePattern, Resolver};
use reconcile::ReconcileOptions;
use report::{EntryOutcome, ReconcileReport};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Match { root, catalog, dirs, threshold, apply, parallel, report, unmatched } => {
            println!("🌿 plant-photo - 写真照合\n");

            // 1. カタログ読み込み
            println!("[1/4] カタログを読み込み中...");
            let catalog_path = config.catalog_source(catalog)?;
            let records = catalog::load_catalog(&catalog_path, &config)?;
            println!("✔ {}件のレコード ({})\n", records.len(), catalog_path.display());

            // 2. 画像スキャン
            println!("[2/4] 写真をスキャン中...");
            let images = scanner::scan_tree(&root, &dirs, &config.image_extensions)?;
            println!("✔ {}枚の写真を検出\n", images.len());

            if images.is_empty() {
                return Err(error::PlantPhotoError::NoImagesFound(root.display().to_string()));
            }

            // 3. 照合
            println!("[3/4] 照合中...{}", if parallel { " (並列)" } else { "" });
            let options = config.resolver_options(threshold)?;
            let threshold = options.threshold;
            let resolver = Resolver::new(records, options)?;
            let events = reconcile::reconcile(
                &resolver,
                &root,
                &images,
                ReconcileOptions { parallel, show_progress: !cli.verbose },
            );
            let mut match_report = ReconcileReport::new(&root, threshold, &events);
            println!("✔ 照合完了\n");

            // 4. リネーム
            if apply {
                println!("[4/4] リネーム中...");
                let renamed = reconcile::apply_renames(&mut match_report);
                println!("✔ {}件をリネーム\n", renamed);
            } else {
                println!("[4/4] ドライラン（--apply でリネーム）\n");
            }

            print_summary(&match_report);

            let report_path = report.unwrap_or_else(|| root.join("match-report.json"));
            match_report.save(&report_path)?;
            println!("✔ レポートを保存: {}", report_path.display());

            if let Some(unmatched_path) = unmatched {
                let count = match_report.write_unmatched(&unmatched_path)?;
                println!("✔ 未照合 {}件を保存: {}", count, unmatched_path.display());
            }

            if match_report.stats.ambiguous > 0 {
                println!(
                    "\n💡 候補が複数のファイルは `plant-photo review {}` で決められます",
                    report_path.display()
                );
            }

            println!("\n✅ 完了");
        }

        Commands::Review { report, output, apply } => {
            println!("🔍 plant-photo - 曖昧な照合のレビュー\n");
            review::run_interactive_review(&report, output.as_deref(), apply)?;
        }

        Commands::Link { root, complete_dir, db, links } => {
            println!("📦 plant-photo - 照合済み画像の登録\n");

            let pattern = LinkedNamePattern::new(config.image_extensions.as_slice())?;
            let mut sink: Box<dyn linker::LinkSink> = match (db, links) {
                (Some(db_path), _) => Box::new(linker::SqliteLinkSink::open(&db_path, &config.link_table)?),
                (None, Some(links_path)) => Box::new(linker::JsonLinkSink::open(&links_path)?),
                (None, None) => {
                    return Err(error::PlantPhotoError::Config("--db か --links を指定してください".into()));
                }
            };

            let summary = linker::link_images(&root, &complete_dir, &pattern, sink.as_mut())?;

            for link in &summary.linked {
                if cli.verbose {
                    println!("  {} -> {}", link.catalog_id, link.image_path.display());
                }
            }
            for failure in &summary.failures {
                println!("  ⚠ {}: {}", failure.path.display(), failure.error);
            }

            println!("✔ {}件を登録（失敗 {}件）", summary.linked.len(), summary.failures.len());
            println!("\n✅ 完了");
        }

        Commands::Config { show, set_threshold, set_catalog, add_strict_genus } => {
            // 環境変数の値を保存しないようファイルから読み直す
            let mut config = Config::load_file()?;
            let mut changed = false;

            if let Some(threshold) = set_threshold {
                config.set_threshold(threshold)?;
                changed = true;
            }

            if let Some(path) = set_catalog {
                config.catalog_path = Some(path);
                changed = true;
            }

            if let Some(genus) = add_strict_genus {
                config.add_strict_genus(&genus);
                changed = true;
            }

            if changed {
                config.save()?;
                println!("✔ 設定を保存しました: {}", Config::config_path()?.display());
            }

            if show || !changed {
                println!("設定:");
                println!("  閾値: {}", config.threshold);
                println!("  品種で絞り込む属: {}", config.strict_genera.join(", "));
                println!("  画像拡張子: {}", config.image_extensions.join(", "));
                println!(
                    "  カタログ: {}",
                    config
                        .catalog_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                println!("  カタログテーブル: {}", config.catalog_table);
                println!("  紐付けテーブル: {}", config.link_table);
            }
        }
    }

    Ok(())
}

fn print_summary(report: &ReconcileReport) {
    let stats = &report.stats;
    println!("結果:");
    println!("  一致: {}", stats.matched);
    println!("  未照合: {}", stats.unmatched);
    println!("  候補複数: {}", stats.ambiguous);
    println!("  スキップ: {}", stats.skipped);
    if stats.failed > 0 {
        println!("  失敗: {}", stats.failed);
    }

    for entry in &report.entries {
        match &entry.outcome {
            EntryOutcome::Ambiguous { record_ids } => {
                log::info!("候補複数 {}: {:?}", entry.path.display(), record_ids);
            }
            EntryOutcome::Unmatched => {
                log::info!(
                    "未照合 {} (キー: {})",
                    entry.path.display(),
                    entry.file_key.as_deref().unwrap_or("-")
                );
            }
            _ => {}
        }
        if let Some(error) = &entry.error {
            println!("  ⚠ {}: {}", entry.path.display(), error);
        }
    }
    println!();
}
