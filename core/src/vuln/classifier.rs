// Severity classifier - 严重等级分类
// nuclei 和 nikto 使用两套不同的规则，不要合并

use super::model::Severity;

/// nuclei 标签，按优先级排列
const NUCLEI_TAGS: [(&str, Severity); 5] = [
    ("[critical]", Severity::Critical),
    ("[high]", Severity::High),
    ("[medium]", Severity::Medium),
    ("[low]", Severity::Low),
    ("[info]", Severity::Info),
];

const NIKTO_CRITICAL: [&str; 4] = ["critical", "dangerous", "remote code execution", "sql injection"];
const NIKTO_HIGH: [&str; 4] = ["high", "xss", "cross site", "csrf"];
const NIKTO_LOW: [&str; 3] = ["low", "information disclosure", "missing header"];

/// nuclei 单行的严重等级：按优先级取第一个出现的标签，否则为 `info`
pub fn classify_nuclei(line: &str) -> Severity {
    NUCLEI_TAGS
        .iter()
        .find(|(tag, _)| line.contains(tag))
        .map(|(_, severity)| *severity)
        .unwrap_or(Severity::Info)
}

/// 按关键字判断 nikto `+ ` 行的严重等级，都不匹配时为 `medium`
pub fn classify_nikto(line: &str) -> Severity {
    let text = line.to_lowercase();
    let has_any = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

    if has_any(&NIKTO_CRITICAL) {
        Severity::Critical
    } else if has_any(&NIKTO_HIGH) {
        Severity::High
    } else if has_any(&NIKTO_LOW) {
        Severity::Low
    } else {
        Severity::Medium
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nuclei_single_tag_wins() {
        assert_eq!(classify_nuclei("[CVE-2021-1234] [http] [critical] https://a"), Severity::Critical);
        assert_eq!(classify_nuclei("[tech-detect] [http] [info] https://a"), Severity::Info);
        assert_eq!(classify_nuclei("[exposed-panel] [http] [medium] https://a"), Severity::Medium);
        assert_eq!(classify_nuclei("[weak-cipher] [ssl] [low] a:443"), Severity::Low);
    }

    #[test]
    fn nuclei_without_tag_defaults_to_info() {
        assert_eq!(classify_nuclei("something odd happened"), Severity::Info);
        // 大小写敏感，与后端输出保持一致
        assert_eq!(classify_nuclei("[HIGH] shouting"), Severity::Info);
    }

    #[test]
    fn nuclei_priority_order_breaks_ties() {
        assert_eq!(classify_nuclei("[low] [high] mixed"), Severity::High);
        assert_eq!(classify_nuclei("[info] [critical]"), Severity::Critical);
    }

    #[test]
    fn nikto_critical_beats_xss() {
        assert_eq!(classify_nikto("+ Dangerous XSS vector in /search"), Severity::Critical);
        assert_eq!(classify_nikto("+ /login: SQL Injection possible"), Severity::Critical);
    }

    #[test]
    fn nikto_keyword_tiers() {
        assert_eq!(classify_nikto("+ /index.php: Cross Site Scripting"), Severity::High);
        assert_eq!(classify_nikto("+ CSRF token not found"), Severity::High);
        assert_eq!(classify_nikto("+ Missing header: X-Frame-Options"), Severity::Low);
        assert_eq!(classify_nikto("+ Server: nginx/1.18.0"), Severity::Medium);
    }

    #[test]
    fn nikto_keywords_match_inside_words() {
        // "highlight" 含有 "high"，这是沿用下来的宽松匹配
        assert_eq!(classify_nikto("+ Retrieved highlight.js"), Severity::High);
        assert_eq!(classify_nikto("+ allowed methods"), Severity::Low);
    }
}
