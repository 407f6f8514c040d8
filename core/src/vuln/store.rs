use super::model::{Severity, Vulnerability};

/// 会话内只追加、按插入顺序保存的漏洞日志
#[derive(Debug, Default, Clone)]
pub struct VulnerabilityLog {
    entries: Vec<Vulnerability>,
}

impl VulnerabilityLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加 `found`，返回新增条数
    pub fn append(&mut self, found: Vec<Vulnerability>) -> usize {
        let added = found.len();
        self.entries.extend(found);
        added
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn all(&self) -> &[Vulnerability] {
        &self.entries
    }

    /// `offset` 之后追加的记录
    pub fn since(&self, offset: usize) -> &[Vulnerability] {
        self.entries.get(offset..).unwrap_or(&[])
    }

    /// 按严重等级排序的视图，同级保持插入顺序
    pub fn sorted_by_severity(&self) -> Vec<&Vulnerability> {
        let mut sorted: Vec<&Vulnerability> = self.entries.iter().collect();
        sorted.sort_by_key(|v| v.severity.rank());
        sorted
    }

    pub fn with_severity(&self, severity: Severity) -> Vec<&Vulnerability> {
        self.entries.iter().filter(|v| v.severity == severity).collect()
    }
}
