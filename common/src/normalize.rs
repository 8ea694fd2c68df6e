//! 文字列正規化
//!
//! 小文字化して英数字以外（空白・記号・引用符・括弧）をすべて除去する。

/// 比較用キーに正規化する
pub fn normalize(text: &str) -> String {
    text.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_alphanumeric())
        .collect()
}
