// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;

use crate::domain::models::Fingerprint;
use crate::utils::text_processing::turkish_lowercase;

/// 指纹索引
///
/// 保存所有已写入语料的内容指纹，跨数据源、跨运行共享。
/// 启动时由存储层根据已有语料文件重建。
#[derive(Debug, Default)]
pub struct FingerprintIndex {
    seen: HashSet<Fingerprint>,
    case_insensitive: bool,
}

impl FingerprintIndex {
    pub fn new(case_insensitive: bool) -> Self {
        Self {
            seen: HashSet::new(),
            case_insensitive,
        }
    }

    /// 计算规范化文本的指纹
    pub fn fingerprint(&self, text: &str) -> Fingerprint {
        if self.case_insensitive {
            Fingerprint::of(&turkish_lowercase(text))
        } else {
            Fingerprint::of(text)
        }
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen.contains(fingerprint)
    }

    /// 插入指纹，已存在时返回 false
    pub fn insert(&mut self, fingerprint: Fingerprint) -> bool {
        self.seen.insert(fingerprint)
    }

    /// 移除指纹，用于撤销未能落盘的记录
    pub fn remove(&mut self, fingerprint: &Fingerprint) -> bool {
        self.seen.remove(fingerprint)
    }

    /// 计算并插入文本指纹
    pub fn insert_text(&mut self, text: &str) -> bool {
        let fingerprint = self.fingerprint(text);
        self.insert(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_reports_duplicates() {
        let mut index = FingerprintIndex::new(false);
        assert!(index.insert_text("Bugün hava çok güzel"));
        assert!(!index.insert_text("Bugün hava çok güzel"));
        assert!(index.insert_text("bugün hava çok güzel"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_removed_fingerprint_can_be_inserted_again() {
        let mut index = FingerprintIndex::new(false);
        let fingerprint = index.fingerprint("Yarın yağmur yağacak");
        assert!(index.insert(fingerprint));
        assert!(index.remove(&fingerprint));
        assert!(!index.contains(&fingerprint));
        assert!(!index.remove(&fingerprint));
        assert!(index.insert(fingerprint));
    }

    #[test]
    fn test_case_insensitive_uses_turkish_rules() {
        let index = FingerprintIndex::new(true);
        assert_eq!(index.fingerprint("IRMAK"), index.fingerprint("ırmak"));
        assert_eq!(index.fingerprint("İSTANBUL"), index.fingerprint("istanbul"));
        assert_ne!(index.fingerprint("IRMAK"), index.fingerprint("irmak"));
    }
}
