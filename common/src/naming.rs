//! 照合済みファイル名の形式
//!
//! 照合済み画像は `{id}[{tag_name}].{ext}` にリネームされる。
//! 後工程（画像の登録）はこの名前を逆パターンで解析してレコードIDを得るため、
//! 角括弧を含めて一字一句この形式を守る。

use crate::error::{Error, Result};
use crate::types::CatalogRecord;
use regex::{Regex, RegexBuilder};

/// 照合済みファイル名を生成
pub fn linked_file_name(record: &CatalogRecord, ext: &str) -> String {
    format!("{}[{}].{}", record.id, record.tag_name, ext)
}

/// Windowsでファイル名に使えない文字を除去
pub fn sanitize_filename(filename: &str) -> String {
    filename
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'))
        .collect()
}

/// 照合済みファイル名の逆パターン `^(\d+)\[(.+?)\]\.ext$`
#[derive(Debug, Clone)]
pub struct LinkedNamePattern {
    re: Regex,
}

impl LinkedNamePattern {
    /// 対象拡張子（大文字小文字は区別しない）からパターンを構築
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Result<Self> {
        if extensions.is_empty() {
            return Err(Error::Config("no image extensions configured".to_string()));
        }

        let alternatives: Vec<String> = extensions
            .iter()
            .map(|e| regex::escape(e.as_ref().trim_start_matches('.')))
            .collect();
        let pattern = format!(r"^(\d+)\[(.+?)\]\.(?:{})$", alternatives.join("|"));

        let re = RegexBuilder::new(&pattern).case_insensitive(true).build()?;
        Ok(Self { re })
    }

    /// ファイル名から (レコードID, 札名) を取り出す
    ///
    /// 形式は合っていてもIDが i64 に収まらなければ `None`（警告ログを出す）。
    pub fn parse(&self, filename: &str) -> Option<(i64, String)> {
        let caps = self.re.captures(filename)?;
        let id = match caps.get(1)?.as_str().parse() {
            Ok(id) => id,
            Err(e) => {
                log::warn!("レコードIDを読めません ({}): {}", filename, e);
                return None;
            }
        };
        let tag_name = caps.get(2)?.as_str().to_string();
        Some((id, tag_name))
    }

    /// 照合済みファイル名の形をしているか（IDが読めるかは問わない）
    pub fn matches_shape(&self, filename: &str) -> bool {
        self.re.is_match(filename)
    }

    pub fn is_match(&self, filename: &str) -> bool {
        self.parse(filename).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linked_file_name_format() {
        let record = CatalogRecord::new(42, "April Kiss Camellia", "Camellia japonica");
        assert_eq!(linked_file_name(&record, "png"), "42[April Kiss Camellia].png");
    }

    #[test]
    fn test_pattern_parses_linked_name() {
        let pattern = LinkedNamePattern::new(&["png"]).unwrap();
        assert_eq!(
            pattern.parse("42[April Kiss Camellia].png"),
            Some((42, "April Kiss Camellia".to_string()))
        );
        assert_eq!(pattern.parse("7[Anise].PNG"), Some((7, "Anise".to_string())));
    }

    #[test]
    fn test_pattern_round_trips_tag_with_brackets() {
        let pattern = LinkedNamePattern::new(&["png"]).unwrap();
        let record = CatalogRecord::new(3, "Gold [Dwarf] Holly", "");
        let name = linked_file_name(&record, "png");
        assert_eq!(pattern.parse(&name).map(|(id, _)| id), Some(3));
    }

    #[test]
    fn test_pattern_rejects_other_names() {
        let pattern = LinkedNamePattern::new(&["png", ".jpg"]).unwrap();
        assert!(!pattern.is_match("aprilkiss.png"));
        assert!(!pattern.is_match("42[].png"));
        assert!(!pattern.is_match("42[April Kiss].gif"));
        assert!(pattern.is_match("42[April Kiss].jpg"));
    }

    #[test]
    fn test_pattern_id_overflow() {
        let pattern = LinkedNamePattern::new(&["png"]).unwrap();
        let name = "99999999999999999999[Anise].png";
        assert!(pattern.matches_shape(name));
        assert_eq!(pattern.parse(name), None);
        assert!(!pattern.is_match(name));
    }

    #[test]
    fn test_pattern_requires_extensions() {
        let empty: [&str; 0] = [];
        assert!(LinkedNamePattern::new(&empty).is_err());
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("12[Pink/White: \"Mix\"?].png"), "12[PinkWhite Mix].png");
        assert_eq!(sanitize_filename("plain.png"), "plain.png");
    }
}
