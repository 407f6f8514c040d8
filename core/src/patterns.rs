// 工具输出的文本模式，extractor 与 summary 共用

use regex::Regex;
use std::sync::LazyLock;

/// 匹配 `<port>/tcp open`
pub static OPEN_PORT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)/tcp\s+open").unwrap());

/// 匹配 `<port>/tcp open <service>`，比 [`OPEN_PORT`] 更严格
pub static OPEN_SERVICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)/tcp\s+open\s+([A-Za-z0-9_]+)").unwrap());

/// nuclei 输出中的 `[tag]`
pub static BRACKET_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([A-Za-z0-9_]+)\]").unwrap());

/// nikto 发现项的行首标记
pub const NIKTO_MARKER: &str = "+ ";

/// nuclei 无发现时后端返回的原文
pub const NUCLEI_NO_FINDINGS: &str = "Aucune vulnérabilité détectée par Nuclei.";
