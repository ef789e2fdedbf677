//! 模型回复规整：从原始文本得到 NormalizedResult
//!
//! 两段式解码：
//! 1. `extract_fenced` 取出第一个 ``` 代码块（优先 ```json），否则原文；
//! 2. `decode_strict` 严格解析 JSON 对象并补齐默认字段；
//! 3. 解析失败时，对话模式走 `fallback`（整段文本作为回复），评估模式直接报错。
//!
//! 无论哪条路径，`voice_response` 最后都经过 `sanitize_voice`。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// 回复来源：对话轮次或一次性评估
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Conversation,
    Evaluation,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    #[error("{0}")]
    MalformedProviderResponse(String),
}

/// 规整后的模型回复
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedResult {
    /// 展示给用户的文本
    pub text_response: String,
    /// 语音播报文本：仅 ASCII、无 markdown 标记、空白已折叠
    pub voice_response: String,
    /// 面试是否结束
    pub end: bool,
    /// 仅评估结果携带
    #[serde(flatten)]
    pub evaluation: Option<EvaluationScores>,
    /// 对话模式下模型额外返回的字段，原样透传
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 评估模式的评分字段
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationScores {
    #[serde(deserialize_with = "text_or_list")]
    pub strengths: String,
    #[serde(deserialize_with = "text_or_list")]
    pub weaknesses: String,
    #[serde(deserialize_with = "lenient_number")]
    pub score: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub communication_score: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub technical_score: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub confidence_score: Option<f64>,
    #[serde(deserialize_with = "lenient_number")]
    pub behavior_score: Option<f64>,
    #[serde(deserialize_with = "text_or_list")]
    pub overall_impression: String,
    #[serde(deserialize_with = "text_or_list")]
    pub recommendations: String,
    #[serde(deserialize_with = "lenient_bool")]
    pub selected: Option<bool>,
}

/// 文本字段：字符串、字符串数组（按行拼接）或 null
fn text_or_list<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrList {
        Text(String),
        List(Vec<String>),
    }

    Ok(match Option::<TextOrList>::deserialize(deserializer)? {
        Some(TextOrList::Text(s)) => s,
        Some(TextOrList::List(items)) => items.join("\n"),
        None => String::new(),
    })
}

/// 布尔字段：true/false、"true"/"yes"/"false"/"no"、1/0；无法识别时视为未给出
fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Bool(b)) => Some(b),
        Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        Some(Value::Number(n)) => n.as_f64().map(|x| x != 0.0),
        _ => None,
    })
}

/// 分数字段：数字或数字字符串（模型偶尔会给分数加引号）
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid score: {s}"))),
        None => Ok(None),
    }
}

/// 规整入口
pub fn normalize(raw: &str, mode: Mode) -> Result<NormalizedResult, NormalizeError> {
    let extracted = extract_fenced(raw);
    match decode_strict(extracted, mode) {
        Ok(result) => Ok(result),
        Err(e) => match mode {
            Mode::Conversation => {
                tracing::debug!("conversation reply is not a JSON object, using plain text: {}", e);
                Ok(fallback(extracted))
            }
            Mode::Evaluation => {
                tracing::error!("evaluation reply does not match the scoring schema: {}", e);
                Err(e)
            }
        },
    }
}

/// 取第一个代码块内部；```json 优先于无标签的 ```
pub fn extract_fenced(raw: &str) -> &str {
    const JSON_FENCE: &str = "```json";
    const FENCE: &str = "```";

    let inner = if let Some(start) = raw.find(JSON_FENCE) {
        &raw[start + JSON_FENCE.len()..]
    } else if let Some(start) = raw.find(FENCE) {
        &raw[start + FENCE.len()..]
    } else {
        return raw;
    };

    inner.find(FENCE).map(|end| &inner[..end]).unwrap_or(inner).trim()
}

/// 严格解析：必须是 JSON 对象
pub fn decode_strict(text: &str, mode: Mode) -> Result<NormalizedResult, NormalizeError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| NormalizeError::MalformedProviderResponse(e.to_string()))?;
    let Value::Object(mut obj) = value else {
        return Err(NormalizeError::MalformedProviderResponse(
            "reply is not a JSON object".to_string(),
        ));
    };

    let text_response = match (take_text(&mut obj, "text_response"), mode) {
        (Some(t), _) => t,
        (None, Mode::Conversation) => text.to_string(),
        (None, Mode::Evaluation) => String::new(),
    };
    let voice_response =
        take_text(&mut obj, "voice_response").unwrap_or_else(|| text_response.clone());
    let end_flag = obj.remove("end").map(|v| truthy(&v));

    let result = match mode {
        Mode::Conversation => NormalizedResult {
            voice_response: sanitize_voice(&voice_response),
            text_response,
            end: end_flag.unwrap_or(false),
            evaluation: None,
            extra: obj,
        },
        Mode::Evaluation => {
            let scores: EvaluationScores = serde_json::from_value(Value::Object(obj))
                .map_err(|e| NormalizeError::MalformedProviderResponse(e.to_string()))?;
            NormalizedResult {
                voice_response: sanitize_voice(&voice_response),
                text_response,
                end: true,
                evaluation: Some(scores),
                extra: Map::new(),
            }
        }
    };
    Ok(result)
}

/// 对话模式兜底：整段文本作为回复，面试不结束
pub fn fallback(text: &str) -> NormalizedResult {
    NormalizedResult {
        text_response: text.to_string(),
        voice_response: sanitize_voice(text),
        end: false,
        evaluation: None,
        extra: Map::new(),
    }
}

/// 去非 ASCII、去 `* # _ \``、折叠空白
pub fn sanitize_voice(text: &str) -> String {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii() && !matches!(c, '*' | '#' | '_' | '`'))
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn take_text(obj: &mut Map<String, Value>, key: &str) -> Option<String> {
    match obj.remove(key)? {
        Value::Null => None,
        Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::String(s) => s.trim().eq_ignore_ascii_case("true"),
        _ => false,
    }
}
