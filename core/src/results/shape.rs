use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 单目标载荷使用的目标名
pub const PRIMARY_TARGET: &str = "primary domain";

/// 单个目标的三种工具输出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SingleTargetResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nmap: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nuclei: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nikto: Option<String>,
}

impl SingleTargetResult {
    /// 读取 JSON 对象中的工具字段；缺失、null、非文本和空字段都视为没有输出
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| {
            value
                .get(name)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        Self {
            nmap: field("nmap"),
            nuclei: field("nuclei"),
            nikto: field("nikto"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nmap.is_none() && self.nuclei.is_none() && self.nikto.is_none()
    }
}

/// 多目标载荷中的一项，后端给出的不是对象时 `result` 为 `None`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetResult {
    pub target: String,
    pub result: Option<SingleTargetResult>,
}

/// 结果载荷：单目标或多目标，由 [`detect`] 一次性决定
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "targets", rename_all = "lowercase")]
pub enum ResultsPayload {
    Single(SingleTargetResult),
    Multi(Vec<TargetResult>),
}

/// 形状检测结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Single,
    Multi(Vec<String>),
}

fn is_structured(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

/// 只要有一个顶层值是对象或数组就判定为多目标
///
/// 工具字段本身是结构化数据的单目标载荷也会被判为多目标
pub fn detect(value: &Value) -> Shape {
    match value {
        Value::Object(map) if map.values().any(is_structured) => {
            Shape::Multi(map.keys().cloned().collect())
        }
        _ => Shape::Single,
    }
}

impl ResultsPayload {
    pub fn from_value(value: &Value) -> Self {
        match detect(value) {
            Shape::Single => ResultsPayload::Single(SingleTargetResult::from_value(value)),
            Shape::Multi(keys) => ResultsPayload::Multi(
                keys.into_iter()
                    .map(|target| {
                        let result = value
                            .get(&target)
                            .filter(|v| v.is_object())
                            .map(SingleTargetResult::from_value);
                        TargetResult { target, result }
                    })
                    .collect(),
            ),
        }
    }

    pub fn shape(&self) -> Shape {
        match self {
            ResultsPayload::Single(_) => Shape::Single,
            ResultsPayload::Multi(entries) => {
                Shape::Multi(entries.iter().map(|e| e.target.clone()).collect())
            }
        }
    }

    /// `(目标名, 工具输出)` 列表，跳过没有对象的多目标项
    pub fn targets(&self) -> Vec<(&str, &SingleTargetResult)> {
        match self {
            ResultsPayload::Single(result) => vec![(PRIMARY_TARGET, result)],
            ResultsPayload::Multi(entries) => entries
                .iter()
                .filter_map(|e| e.result.as_ref().map(|r| (e.target.as_str(), r)))
                .collect(),
        }
    }
}
