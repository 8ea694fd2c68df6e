//! plant-photo-match
//!
//! 写真フォルダと植物カタログを照合し、照合済みファイルのリネーム・登録を行う。

pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod linker;
pub mod reconcile;
pub mod report;
pub mod review;
pub mod scanner;
