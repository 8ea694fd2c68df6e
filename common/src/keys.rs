//! 照合キー抽出
//!
//! カタログレコードとファイル名のそれぞれから、属フォルダの文脈を差し引いた
//! 「品種名らしき部分」を正規化キーとして取り出す。

use crate::normalize::normalize;
use crate::types::CatalogRecord;
use regex::{Regex, RegexBuilder};
use std::path::Path;

/// レコードの照合キーを抽出
///
/// 優先順位:
/// 1. 札名に括弧書きがあればその中身
/// 2. なければ札名から属名を除去（除去して空なら札名全体）
/// 3. 学名の交雑記号 "x" 以降があれば追加キーとして合成
pub fn extract_record_key(record: &CatalogRecord, genus: &str) -> String {
    lazy_static::lazy_static! {
        static ref PAREN_RE: Regex = Regex::new(r"\((.*?)\)").unwrap();
    }

    let tag = record.tag_name.as_str();

    let mut key = match PAREN_RE.captures(tag).and_then(|c| c.get(1)) {
        Some(inner) => normalize(inner.as_str()),
        None => {
            let stripped = remove_genus(tag, genus);
            if stripped.trim().is_empty() {
                normalize(tag)
            } else {
                normalize(&stripped)
            }
        }
    };

    let extra_key = botanical_extra_key(&record.botanical);
    if !extra_key.is_empty() {
        if key.contains(&extra_key) {
            key = extra_key;
        } else {
            key.push_str(&extra_key);
        }
    }

    key
}

/// 札名から属名を大文字小文字を区別せずに取り除く
fn remove_genus(tag: &str, genus: &str) -> String {
    match RegexBuilder::new(&regex::escape(genus))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.replace_all(tag, "").into_owned(),
        Err(e) => {
            log::warn!("属名パターンを構築できません ({}): {}", genus, e);
            tag.to_string()
        }
    }
}

/// 学名の "x" 以降（2番目の区切り）を追加キーにする
///
/// 例: "Illicium x floridanum" -> "floridanum"
fn botanical_extra_key(botanical: &str) -> String {
    let lowered = botanical.to_lowercase();
    match lowered.split('x').nth(1) {
        Some(extra) => {
            let extra = extra.trim().replace(['\'', '"'], "");
            normalize(&extra)
        }
        None => String::new(),
    }
}

/// ファイル名の照合キーを抽出
///
/// 拡張子を除いて正規化し、先頭の属名・品種名を取り除く。
pub fn extract_file_key(filename: &str, genus: &str, cultivar: Option<&str>) -> String {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let mut key = normalize(&stem);

    let genus_norm = normalize(genus);
    if let Some(rest) = key.strip_prefix(genus_norm.as_str()) {
        key = rest.to_string();
    }

    if let Some(cultivar) = cultivar {
        let cultivar_norm = normalize(cultivar);
        if let Some(rest) = key.strip_prefix(cultivar_norm.as_str()) {
            key = rest.to_string();
        }
    }

    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_key_removes_genus() {
        let record = CatalogRecord::new(1, "Florida Sunshine Anise", "Illicium parviflorum");
        assert_eq!(extract_record_key(&record, "Anise"), normalize("Florida Sunshine"));
    }

    #[test]
    fn test_record_key_prefers_parentheses() {
        let record = CatalogRecord::new(2, "BananAppeal Anise (Illicium)", "Illicium parviflorum");
        assert_eq!(extract_record_key(&record, "Anise"), "illicium");
    }

    #[test]
    fn test_record_key_genus_removal_is_case_insensitive() {
        let record = CatalogRecord::new(3, "ANISE Yellow anise", "");
        assert_eq!(extract_record_key(&record, "Anise"), "yellow");
    }

    #[test]
    fn test_record_key_tag_is_only_genus() {
        let record = CatalogRecord::new(4, "Anise", "");
        assert_eq!(extract_record_key(&record, "anise"), "anise");
    }

    #[test]
    fn test_record_key_genus_with_regex_metacharacters() {
        let record = CatalogRecord::new(5, "Pink (Dwarf) Lily", "");
        // 括弧があるため括弧内が優先される
        assert_eq!(extract_record_key(&record, "Lily"), "dwarf");

        let record = CatalogRecord::new(6, "St. John's Wort Gold", "");
        assert_eq!(extract_record_key(&record, "St. John's Wort"), "gold");
    }

    #[test]
    fn test_record_key_appends_botanical_extra() {
        let record = CatalogRecord::new(7, "Pink Frost Anise", "Illicium x floridanum");
        assert_eq!(extract_record_key(&record, "Anise"), "pinkfrostfloridanum");
    }

    #[test]
    fn test_record_key_extra_replaces_when_already_contained() {
        let record = CatalogRecord::new(8, "Edward Goucher Abelia", "Abelia x 'Edward Goucher'");
        assert_eq!(extract_record_key(&record, "Abelia"), "edwardgoucher");
    }

    #[test]
    fn test_file_key_strips_extension_and_genus() {
        assert_eq!(extract_file_key("anisebanapp.png", "Anise", None), "banapp");
        assert_eq!(extract_file_key("Florida Sunshine.PNG", "Anise", None), "floridasunshine");
    }

    #[test]
    fn test_file_key_strips_cultivar_after_genus() {
        assert_eq!(
            extract_file_key("camellia_japonica_april-kiss.png", "Camellia", Some("Japonica")),
            "aprilkiss"
        );
        assert_eq!(
            extract_file_key("japonicaaprilkiss.png", "Camellia", Some("Japonica")),
            "aprilkiss"
        );
    }

    #[test]
    fn test_file_key_keeps_genus_in_middle() {
        assert_eq!(extract_file_key("yellowanise.png", "Anise", None), "yellowanise");
    }
}
