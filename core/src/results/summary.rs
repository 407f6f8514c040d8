// Aggregation - 结果统计与严重等级分布

use serde::{Deserialize, Serialize};

use super::shape::{ResultsPayload, SingleTargetResult};
use crate::patterns::{BRACKET_TAG, NIKTO_MARKER, NUCLEI_NO_FINDINGS, OPEN_PORT, OPEN_SERVICE};
use crate::vuln::model::{Severity, Vulnerability};

/// 展示用统计，与实际抽取的记录数无关
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub open_ports: usize,
    pub services: usize,
    pub vulnerability_count: usize,
}

impl std::ops::AddAssign for Summary {
    fn add_assign(&mut self, other: Self) {
        self.open_ports += other.open_ports;
        self.services += other.services;
        self.vulnerability_count += other.vulnerability_count;
    }
}

fn placeholder(tool: &str) -> String {
    format!("no result from {}", tool)
}

/// 单个目标的统计，缺失的工具输出按占位文本处理
pub fn summarize_target(outputs: &SingleTargetResult) -> Summary {
    let nmap = outputs.nmap.clone().unwrap_or_else(|| placeholder("nmap"));
    let nuclei = outputs.nuclei.clone().unwrap_or_else(|| placeholder("nuclei"));
    let nikto = outputs.nikto.clone().unwrap_or_else(|| placeholder("nikto"));

    let mut vulnerability_count = 0;
    if nuclei != NUCLEI_NO_FINDINGS {
        vulnerability_count += BRACKET_TAG.find_iter(&nuclei).count();
    }
    vulnerability_count += nikto.matches(NIKTO_MARKER).count();

    Summary {
        open_ports: OPEN_PORT.find_iter(&nmap).count(),
        services: OPEN_SERVICE.find_iter(&nmap).count(),
        vulnerability_count,
    }
}

/// 载荷中所有目标的统计之和
pub fn summarize(payload: &ResultsPayload) -> Summary {
    payload
        .targets()
        .into_iter()
        .fold(Summary::default(), |mut total, (_, outputs)| {
            total += summarize_target(outputs);
            total
        })
}

/// 各严重等级计数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
}

impl SeverityCounts {
    pub fn get(&self, severity: Severity) -> usize {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }

    fn bump(&mut self, severity: Severity) {
        match severity {
            Severity::Critical => self.critical += 1,
            Severity::High => self.high += 1,
            Severity::Medium => self.medium += 1,
            Severity::Low => self.low += 1,
            Severity::Info => self.info += 1,
        }
    }

    pub fn total(&self) -> usize {
        Severity::ALL.iter().map(|s| self.get(*s)).sum()
    }

    /// 按等级顺序每级一条
    pub fn bars(&self) -> Vec<SeverityBar> {
        Severity::ALL
            .iter()
            .map(|&severity| {
                let count = self.get(severity);
                SeverityBar {
                    severity,
                    count,
                    width: bar_width(count),
                }
            })
            .collect()
    }
}

pub fn severity_histogram<'a, I>(vulnerabilities: I) -> SeverityCounts
where
    I: IntoIterator<Item = &'a Vulnerability>,
{
    let mut counts = SeverityCounts::default();
    for vuln in vulnerabilities {
        counts.bump(vuln.severity);
    }
    counts
}

/// 条形宽度 (百分比)：空等级为 `0`，否则为 `max(5, count * 10)`
/// 不截断到 100
pub fn bar_width(count: usize) -> usize {
    if count == 0 {
        0
    } else {
        (count * 10).max(5)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityBar {
    pub severity: Severity,
    pub count: usize,
    pub width: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::results::shape::TargetResult;
    use crate::vuln::model::ToolSource;

    fn single(nmap: Option<&str>, nuclei: Option<&str>, nikto: Option<&str>) -> SingleTargetResult {
        SingleTargetResult {
            nmap: nmap.map(String::from),
            nuclei: nuclei.map(String::from),
            nikto: nikto.map(String::from),
        }
    }

    #[test]
    fn direct_scan_summary() {
        let payload = ResultsPayload::Single(single(
            Some("22/tcp open ssh\n80/tcp open http"),
            Some("[high] exposed admin panel"),
            Some("+ XSS possible"),
        ));
        let summary = summarize(&payload);
        assert_eq!(
            summary,
            Summary {
                open_ports: 2,
                services: 2,
                vulnerability_count: 2
            }
        );
        // 纯函数，重复调用结果一致
        assert_eq!(summarize(&payload), summary);
    }

    #[test]
    fn every_word_bracket_tag_counts() {
        // "[cve-1]" 含有连字符，不算标签
        let outputs = single(None, Some("[cve-1] [http] [critical] https://a"), None);
        assert_eq!(summarize_target(&outputs).vulnerability_count, 2);
    }

    #[test]
    fn nuclei_sentinel_is_not_counted() {
        let outputs = single(None, Some(NUCLEI_NO_FINDINGS), Some("+ a\n+ b"));
        assert_eq!(summarize_target(&outputs).vulnerability_count, 2);
    }

    #[test]
    fn missing_outputs_count_zero() {
        assert_eq!(summarize_target(&SingleTargetResult::default()), Summary::default());
    }

    #[test]
    fn services_can_exceed_open_ports() {
        // "open\n80" 被严格模式当成服务名，但宽松模式只看到一个端口
        let outputs = single(Some("22/tcp open\n80/tcp filtered http"), None, None);
        let summary = summarize_target(&outputs);
        assert_eq!(summary.open_ports, 1);
        assert_eq!(summary.services, 1);

        let outputs = single(Some("22/tcp  open\n"), None, None);
        let summary = summarize_target(&outputs);
        assert_eq!(summary.open_ports, 1);
        assert_eq!(summary.services, 0);
    }

    #[test]
    fn multi_target_sums_and_skips_empty_entries() {
        let payload = ResultsPayload::Multi(vec![
            TargetResult {
                target: "a.example.com".into(),
                result: Some(single(Some("22/tcp open ssh"), Some("[low] x"), None)),
            },
            TargetResult {
                target: "b.example.com".into(),
                result: None,
            },
            TargetResult {
                target: "c.example.com".into(),
                result: Some(single(Some("80/tcp open http\n443/tcp open https"), None, Some("+ y"))),
            },
        ]);
        assert_eq!(
            summarize(&payload),
            Summary {
                open_ports: 3,
                services: 3,
                vulnerability_count: 2
            }
        );
    }

    #[test]
    fn empty_histogram_and_bar_widths() {
        let counts = severity_histogram(std::iter::empty());
        assert_eq!(counts, SeverityCounts::default());
        assert_eq!(counts.total(), 0);
        assert!(counts.bars().iter().all(|b| b.width == 0));

        assert_eq!(bar_width(0), 0);
        assert_eq!(bar_width(1), 10);
        assert_eq!(bar_width(12), 120);
    }

    #[test]
    fn histogram_counts_by_level() {
        let vulns = vec![
            Vulnerability::new("a", ToolSource::Nuclei, "x".into(), Severity::High),
            Vulnerability::new("a", ToolSource::Nikto, "y".into(), Severity::High),
            Vulnerability::new("a", ToolSource::Nmap, "z".into(), Severity::Info),
        ];
        let counts = severity_histogram(&vulns);
        assert_eq!(counts.high, 2);
        assert_eq!(counts.info, 1);
        assert_eq!(counts.total(), 3);

        let bars = counts.bars();
        let order: Vec<_> = bars.iter().map(|b| b.severity).collect();
        assert_eq!(order, Severity::ALL.to_vec());
        assert_eq!(bars[1].width, 20);
        assert_eq!(bars[4].width, 10);
    }
}
