//! ラベル表（クラスインデックス → 名前）
use std::fs;
use std::path::Path;

use tracing::info;

use super::{ClassifierError, Head};
use crate::config::ClassifierConfig;

/// 範囲外のインデックスに対して返す名前
pub const UNKNOWN_LABEL: &str = "Unknown";

/// 1行1クラスのラベル表（行番号 = クラスインデックス）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    names: Vec<String>,
}

impl LabelTable {
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let data = fs::read_to_string(path).map_err(|source| ClassifierError::LabelIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_lines(&data))
    }

    /// 各行の前後空白を除去する。末尾の空行はクラスとして数えない
    pub fn from_lines(data: &str) -> Self {
        let mut names: Vec<String> = data.lines().map(|line| line.trim().to_string()).collect();
        while names.last().is_some_and(|name| name.is_empty()) {
            names.pop();
        }
        Self { names }
    }

    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// インデックスを名前に変換（負数・範囲外は `Unknown`）
    pub fn resolve(&self, index: i64) -> &str {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.get(index))
            .unwrap_or(UNKNOWN_LABEL)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// 4つのヘッドのラベル表（起動時に一度だけ読み込み、以後は読み取り専用）
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    label: LabelTable,
    genus: LabelTable,
    family: LabelTable,
    order: LabelTable,
}

impl LabelSet {
    pub fn new(label: LabelTable, genus: LabelTable, family: LabelTable, order: LabelTable) -> Self {
        Self {
            label,
            genus,
            family,
            order,
        }
    }

    pub fn load(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        let mut set = Self::default();
        for head in Head::ALL {
            let path = config.labels.path(head);
            let table = LabelTable::load(&path)?;
            info!(%head, path = %path.display(), classes = table.len(), "label table loaded");
            *set.table_mut(head) = table;
        }
        Ok(set)
    }

    pub fn table(&self, head: Head) -> &LabelTable {
        match head {
            Head::Label => &self.label,
            Head::Genus => &self.genus,
            Head::Family => &self.family,
            Head::Order => &self.order,
        }
    }

    fn table_mut(&mut self, head: Head) -> &mut LabelTable {
        match head {
            Head::Label => &mut self.label,
            Head::Genus => &mut self.genus,
            Head::Family => &mut self.family,
            Head::Order => &mut self.order,
        }
    }
}
