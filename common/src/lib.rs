//! Plant Photo Common Library
//!
//! 写真ファイルと植物カタログレコードの照合コア。
//! ファイルの中身やDBには触れず、パス文字列とレコードのみを扱う。

pub mod types;
pub mod error;
pub mod normalize;
pub mod partition;
pub mod keys;
pub mod similarity;
pub mod policy;
pub mod resolver;
pub mod naming;

pub use types::{CatalogRecord, FileEvent, Resolution};
pub use error::{Error, Result};
pub use normalize::normalize;
pub use partition::{classify, Partition};
pub use keys::{extract_file_key, extract_record_key};
pub use similarity::{keys_match, ratio, SequenceMatcher, DEFAULT_THRESHOLD};
pub use policy::{DecisionSummary, MatchDecision};
pub use resolver::{find_candidates, Resolver, ResolverOptions};
pub use naming::{linked_file_name, sanitize_filename, LinkedNamePattern};
