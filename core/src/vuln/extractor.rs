// Vulnerability extractor - 把工具原始输出解析成漏洞记录
// 顺序固定: nuclei, nikto, nmap

use super::classifier::{classify_nikto, classify_nuclei};
use super::model::{Severity, ToolSource, Vulnerability};
use crate::patterns::{NIKTO_MARKER, NUCLEI_NO_FINDINGS, OPEN_SERVICE};
use crate::results::shape::{ResultsPayload, SingleTargetResult};

/// 从单个目标的工具输出中抽取漏洞
pub fn extract(target: &str, outputs: &SingleTargetResult) -> Vec<Vulnerability> {
    let mut found = Vec::new();

    if let Some(nuclei) = outputs.nuclei.as_deref() {
        found.extend(extract_nuclei(target, nuclei));
    }
    if let Some(nikto) = outputs.nikto.as_deref() {
        found.extend(extract_nikto(target, nikto));
    }
    if let Some(nmap) = outputs.nmap.as_deref() {
        found.extend(extract_nmap(target, nmap));
    }

    tracing::debug!("Extracted {} vulnerabilities for {}", found.len(), target);
    found
}

/// 按载荷顺序抽取所有目标的漏洞
pub fn extract_payload(payload: &ResultsPayload) -> Vec<Vulnerability> {
    payload
        .targets()
        .into_iter()
        .flat_map(|(target, outputs)| extract(target, outputs))
        .collect()
}

pub fn extract_nuclei(target: &str, output: &str) -> Vec<Vulnerability> {
    if output == NUCLEI_NO_FINDINGS {
        return Vec::new();
    }

    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            Vulnerability::new(target, ToolSource::Nuclei, line.to_string(), classify_nuclei(line))
        })
        .collect()
}

pub fn extract_nikto(target: &str, output: &str) -> Vec<Vulnerability> {
    output
        .lines()
        .filter(|line| line.starts_with(NIKTO_MARKER))
        .map(|line| {
            Vulnerability::new(target, ToolSource::Nikto, line.trim().to_string(), classify_nikto(line))
        })
        .collect()
}

pub fn extract_nmap(target: &str, output: &str) -> Vec<Vulnerability> {
    OPEN_SERVICE
        .find_iter(output)
        .map(|m| {
            Vulnerability::new(
                target,
                ToolSource::Nmap,
                format!("Open port: {}", m.as_str().trim()),
                Severity::Info,
            )
        })
        .collect()
}
