//! フォルダ階層からの属・品種判定
//!
//! 画像ルート直下のフォルダを属（genus）、その下のフォルダを品種（cultivar）とみなす。
//!
//! ```text
//! png/Anise/aniseyellow.png           -> ("Anise", None)
//! png/Camellia/Japonica/aprilkiss.png -> ("Camellia", Some("Japonica"))
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

/// 照合の区画（属 + 任意の品種）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Partition {
    pub genus: String,
    pub cultivar: Option<String>,
}

impl Partition {
    pub fn new(genus: impl Into<String>, cultivar: Option<&str>) -> Self {
        Self {
            genus: genus.into(),
            cultivar: cultivar.map(str::to_string),
        }
    }
}

/// ファイルパスから区画を判定
///
/// ルートからの相対パスが2要素未満、またはルート外のファイルは `None`。
/// 呼び出し側はそのファイルをスキップとして報告する。
pub fn classify(root: &Path, file_path: &Path) -> Option<Partition> {
    let relative = file_path.strip_prefix(root).ok()?;

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().to_string()),
            Component::CurDir => {}
            // ".." などを含むパスは階層を信用できない
            _ => return None,
        }
    }

    match parts.len() {
        0 | 1 => None,
        2 => Some(Partition {
            genus: parts.swap_remove(0),
            cultivar: None,
        }),
        _ => {
            let mut parts = parts.into_iter();
            let genus = parts.next()?;
            let cultivar = parts.next();
            Some(Partition { genus, cultivar })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_genus_only() {
        let root = Path::new("/data/png");
        let partition = classify(root, Path::new("/data/png/Anise/aniseyellow.png")).unwrap();
        assert_eq!(partition, Partition::new("Anise", None));
    }

    #[test]
    fn test_classify_genus_and_cultivar() {
        let root = Path::new("/data/png");
        let partition =
            classify(root, Path::new("/data/png/Camellia/Japonica/aprilkiss.png")).unwrap();
        assert_eq!(partition, Partition::new("Camellia", Some("Japonica")));
    }

    #[test]
    fn test_classify_deeper_tree_uses_first_two_folders() {
        let root = Path::new("png");
        let partition = classify(root, Path::new("png/Camellia/Japonica/old/x.png")).unwrap();
        assert_eq!(partition.genus, "Camellia");
        assert_eq!(partition.cultivar.as_deref(), Some("Japonica"));
    }

    #[test]
    fn test_classify_file_at_root_is_skipped() {
        let root = Path::new("/data/png");
        assert!(classify(root, Path::new("/data/png/loose.png")).is_none());
    }

    #[test]
    fn test_classify_outside_root_is_skipped() {
        let root = Path::new("/data/png");
        assert!(classify(root, Path::new("/elsewhere/Anise/a.png")).is_none());
    }
}
