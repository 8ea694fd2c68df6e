//! キー類似度判定
//!
//! 一次判定: 最長一致ブロック法（Ratcliff/Obershelp）による類似度比
//! 二次判定: 英字の連続部分をトークンとしてソートし、完全一致を比較（語順入れ替え対策）

use regex::Regex;
use std::collections::HashMap;

/// 既定の類似度閾値
pub const DEFAULT_THRESHOLD: f64 = 0.7;

/// この長さ以上の系列では頻出要素をジャンク扱いにする
const AUTOJUNK_MIN_LEN: usize = 200;

/// 一致ブロック (aの開始位置, bの開始位置, 長さ)
pub type MatchingBlock = (usize, usize, usize);

/// 最長一致ブロック法による系列比較
#[derive(Debug, Clone)]
pub struct SequenceMatcher {
    a: Vec<char>,
    b: Vec<char>,
    /// b中の文字 -> 出現位置（昇順）
    b2j: HashMap<char, Vec<usize>>,
}

impl SequenceMatcher {
    pub fn new(a: &str, b: &str) -> Self {
        let a: Vec<char> = a.chars().collect();
        let b: Vec<char> = b.chars().collect();

        let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
        for (j, &c) in b.iter().enumerate() {
            b2j.entry(c).or_default().push(j);
        }

        // 長い系列では出現率1%超の要素を索引から外す
        let n = b.len();
        if n >= AUTOJUNK_MIN_LEN {
            let ntest = n / 100 + 1;
            b2j.retain(|_, indices| indices.len() <= ntest);
        }

        Self { a, b, b2j }
    }

    /// a[alo..ahi] と b[blo..bhi] の最長一致ブロックを探す
    fn find_longest_match(&self, alo: usize, ahi: usize, blo: usize, bhi: usize) -> MatchingBlock {
        let (mut besti, mut bestj, mut bestsize) = (alo, blo, 0);

        // j2len[j] = a[i-1]とb[j]で終わる一致の長さ
        let mut j2len: HashMap<usize, usize> = HashMap::new();
        for i in alo..ahi {
            let mut new_j2len: HashMap<usize, usize> = HashMap::new();
            if let Some(indices) = self.b2j.get(&self.a[i]) {
                for &j in indices {
                    if j < blo {
                        continue;
                    }
                    if j >= bhi {
                        break;
                    }
                    let k = j
                        .checked_sub(1)
                        .and_then(|prev| j2len.get(&prev))
                        .copied()
                        .unwrap_or(0)
                        + 1;
                    new_j2len.insert(j, k);
                    if k > bestsize {
                        besti = i + 1 - k;
                        bestj = j + 1 - k;
                        bestsize = k;
                    }
                }
            }
            j2len = new_j2len;
        }

        // 索引から外した頻出要素で一致を左右に伸ばす
        while besti > alo && bestj > blo && self.a[besti - 1] == self.b[bestj - 1] {
            besti -= 1;
            bestj -= 1;
            bestsize += 1;
        }
        while besti + bestsize < ahi
            && bestj + bestsize < bhi
            && self.a[besti + bestsize] == self.b[bestj + bestsize]
        {
            bestsize += 1;
        }

        (besti, bestj, bestsize)
    }

    /// 重ならない一致ブロックの一覧（位置順）
    pub fn matching_blocks(&self) -> Vec<MatchingBlock> {
        let mut queue = vec![(0, self.a.len(), 0, self.b.len())];
        let mut blocks = Vec::new();

        while let Some((alo, ahi, blo, bhi)) = queue.pop() {
            let (i, j, k) = self.find_longest_match(alo, ahi, blo, bhi);
            if k == 0 {
                continue;
            }
            blocks.push((i, j, k));
            if alo < i && blo < j {
                queue.push((alo, i, blo, j));
            }
            if i + k < ahi && j + k < bhi {
                queue.push((i + k, ahi, j + k, bhi));
            }
        }

        blocks.sort_unstable();
        blocks
    }

    /// 類似度比 2*M/T（両方空なら1.0）
    pub fn ratio(&self) -> f64 {
        let total = self.a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matches: usize = self.matching_blocks().iter().map(|&(_, _, k)| k).sum();
        2.0 * matches as f64 / total as f64
    }
}

/// 2つの文字列の類似度比
pub fn ratio(a: &str, b: &str) -> f64 {
    SequenceMatcher::new(a, b).ratio()
}

/// 英字の連続部分をソートしたトークン列
fn sorted_letter_tokens(key: &str) -> Vec<&str> {
    lazy_static::lazy_static! {
        static ref LETTERS_RE: Regex = Regex::new(r"\p{L}+").unwrap();
    }
    let mut tokens: Vec<&str> = LETTERS_RE.find_iter(key).map(|m| m.as_str()).collect();
    tokens.sort_unstable();
    tokens
}

/// 2つのキーが同じ対象を指すか判定
///
/// 類似度比が閾値以上、またはソート済みトークン列が空でなく完全一致すれば一致。
pub fn keys_match(candidate_key: &str, file_key: &str, threshold: f64) -> bool {
    if ratio(candidate_key, file_key) >= threshold {
        return true;
    }

    let candidate_tokens = sorted_letter_tokens(candidate_key);
    !candidate_tokens.is_empty() && candidate_tokens == sorted_letter_tokens(file_key)
}
