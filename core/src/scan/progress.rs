// 进度文本 -> 百分比
// 只是展示用的粗略估计，匹配不上就不动

use super::ScanKind;

const DIRECT_STEPS: [(&str, u8); 3] = [("(1/3)", 33), ("(2/3)", 66), ("(3/3)", 90)];
const FULL_STEPS: [(&str, u8); 3] = [("1/", 10), ("2/", 20), ("3/", 30)];
const FULL_TARGET_SPAN: u8 = 30;
const DISCOVERY_PERCENT: u8 = 50;

/// 由进度文本推出的百分比，无法识别时返回 `None`
///
/// 完整扫描的格式为 `"<target>: <step>/<total>"`，取第一个匹配的步骤标记，
/// 目标必须在 `targets` 中
pub fn interpret(kind: ScanKind, targets: &[String], text: &str) -> Option<u8> {
    match kind {
        ScanKind::Direct => DIRECT_STEPS
            .iter()
            .find(|(marker, _)| text.contains(marker))
            .map(|(_, percent)| *percent),
        ScanKind::Full => {
            let (_, base) = FULL_STEPS.iter().find(|(marker, _)| text.contains(marker))?;
            let target = text.split(':').next().unwrap_or_default().trim();
            let index = targets.iter().position(|t| t == target)?;
            let offset = (index as u32) * FULL_TARGET_SPAN as u32;
            Some((*base as u32 + offset).min(100) as u8)
        }
        ScanKind::SubdomainDiscovery => Some(DISCOVERY_PERCENT),
    }
}

/// 记录单个任务的进度，只增不减
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    kind: ScanKind,
    targets: Vec<String>,
    percent: u8,
}

impl ProgressTracker {
    pub fn new(kind: ScanKind, targets: Vec<String>) -> Self {
        Self {
            kind,
            targets,
            percent: 0,
        }
    }

    pub fn percent(&self) -> u8 {
        self.percent
    }

    /// `text` 推进了进度时返回新的百分比
    pub fn observe(&mut self, text: &str) -> Option<u8> {
        let percent = interpret(self.kind, &self.targets, text)?;
        if percent > self.percent {
            self.percent = percent;
            Some(percent)
        } else {
            None
        }
    }

    pub fn complete(&mut self) -> u8 {
        self.percent = 100;
        self.percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn direct_steps() {
        assert_eq!(interpret(ScanKind::Direct, &[], "Exécution de Nmap (1/3)..."), Some(33));
        assert_eq!(interpret(ScanKind::Direct, &[], "Exécution de Nuclei (2/3)..."), Some(66));
        assert_eq!(interpret(ScanKind::Direct, &[], "Exécution de Nikto (3/3)..."), Some(90));
        assert_eq!(interpret(ScanKind::Direct, &[], "warming up"), None);
    }

    #[test]
    fn full_steps_offset_by_target_position() {
        let list = targets(&["a.example.com", "b.example.com", "c.example.com"]);
        assert_eq!(interpret(ScanKind::Full, &list, "a.example.com: 1/3"), Some(10));
        assert_eq!(interpret(ScanKind::Full, &list, "b.example.com: 2/3"), Some(50));
        assert_eq!(interpret(ScanKind::Full, &list, "c.example.com: 3/3"), Some(90));
    }

    #[test]
    fn full_step_first_textual_match_wins() {
        let list = targets(&["a.example.com"]);
        // "2/3" 中没有 "1/"，但 "(1/3)" 有，所以按第 1 步计算
        assert_eq!(interpret(ScanKind::Full, &list, "a.example.com: 2/3 (1/3)"), Some(10));
    }

    #[test]
    fn full_unknown_target_is_ignored() {
        let list = targets(&["a.example.com"]);
        assert_eq!(interpret(ScanKind::Full, &list, "z.example.com: 1/3"), None);
        assert_eq!(interpret(ScanKind::Full, &list, "a.example.com: starting"), None);
    }

    #[test]
    fn discovery_is_fixed_half() {
        assert_eq!(interpret(ScanKind::SubdomainDiscovery, &[], "anything"), Some(50));
    }

    #[test]
    fn tracker_is_monotonic() {
        let mut tracker = ProgressTracker::new(ScanKind::Direct, vec!["a".into()]);
        assert_eq!(tracker.observe("Nuclei (2/3)"), Some(66));
        assert_eq!(tracker.observe("Nmap (1/3)"), None);
        assert_eq!(tracker.observe("garbage"), None);
        assert_eq!(tracker.percent(), 66);
        assert_eq!(tracker.observe("Nikto (3/3)"), Some(90));
        assert_eq!(tracker.complete(), 100);
    }
}
