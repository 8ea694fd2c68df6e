//! エラー型定義

use thiserror::Error;

/// 照合コアのエラー
#[derive(Error, Debug)]
pub enum Error {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Pattern error: {0}")]
    Regex(#[from] regex::Error),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::LinkedNamePattern;
    use crate::resolver::ResolverOptions;

    #[test]
    fn test_invalid_threshold_is_config_error() {
        let options = ResolverOptions {
            threshold: 2.0,
            ..Default::default()
        };
        let error = options.validate().unwrap_err();
        assert!(matches!(error, Error::Config(_)));
        assert!(error.to_string().starts_with("Config error: threshold"));
    }

    #[test]
    fn test_empty_extensions_is_config_error() {
        let empty: [&str; 0] = [];
        assert!(matches!(LinkedNamePattern::new(&empty), Err(Error::Config(_))));
    }

    #[test]
    fn test_error_from_regex() {
        let regex_error = regex::Regex::new("(").unwrap_err();
        let error: Error = regex_error.into();
        assert!(matches!(error, Error::Regex(_)));
        assert!(error.to_string().contains("Pattern error"));
    }
}
