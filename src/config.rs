//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `VIVA__*` 覆盖（双下划线表示嵌套，如 `VIVA__LLM__CONVERSATION__MODEL=...`）。
//! 最后兼容部署时使用的裸变量名：`PORT`、`ANTHROPIC_API_KEY`、`GEMINI_API_KEY`、`ELEVEN_KEYS`、
//! `ELEVEN_VOICE_MALE`、`ELEVEN_VOICE_FEMALE`、`FIREBASE_API_KEY`，仅在对应配置项为空时生效。

use std::path::PathBuf;

use serde::Deserialize;

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_VOICE_MALE: &str = "pNInz6obpgDQGcFmaJgB";
const DEFAULT_VOICE_FEMALE: &str = "21m00Tcm4TlvDq8ikWAM";

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSection,
    pub llm: LlmSection,
    pub tts: TtsSection,
    pub auth: AuthSection,
}

/// [server] 段：监听地址与 CORS 白名单
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub host: String,
    /// 未配置时依次取 `PORT`、默认 5000
    pub port: Option<u16>,
    /// 允许跨域调用 /api/* 的来源
    pub allowed_origins: Vec<String>,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: None,
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl ServerSection {
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "https://eightfoldai-chat.netlify.app".into(),
        "http://localhost:3000".into(),
        "http://127.0.0.1:3000".into(),
    ]
}

/// [llm] 段：对话模型与评估模型分开配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LlmSection {
    pub conversation: ConversationLlmSection,
    pub evaluation: EvaluationLlmSection,
}

/// [llm.conversation] 段：Anthropic Messages API
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConversationLlmSection {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub api_version: String,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ConversationLlmSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.anthropic.com".to_string(),
            model: "claude-sonnet-4-20250514".to_string(),
            api_version: "2023-06-01".to_string(),
            max_tokens: 2000,
            timeout_secs: 45,
        }
    }
}

/// [llm.evaluation] 段：Gemini generateContent
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvaluationLlmSection {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for EvaluationLlmSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: 60,
        }
    }
}

/// [tts] 段：ElevenLabs 语音合成，keys 轮询使用
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TtsSection {
    pub keys: Vec<String>,
    pub base_url: String,
    pub model_id: String,
    /// 未配置时依次取 `ELEVEN_VOICE_MALE`、内置默认音色
    pub voice_male: Option<String>,
    pub voice_female: Option<String>,
    pub stability: f32,
    pub similarity_boost: f32,
    pub timeout_secs: u64,
}

impl Default for TtsSection {
    fn default() -> Self {
        Self {
            keys: Vec::new(),
            base_url: "https://api.elevenlabs.io".to_string(),
            model_id: "eleven_flash_v2".to_string(),
            voice_male: None,
            voice_female: None,
            stability: 0.4,
            similarity_boost: 0.8,
            timeout_secs: 30,
        }
    }
}

impl TtsSection {
    pub fn voice_male(&self) -> &str {
        self.voice_male.as_deref().unwrap_or(DEFAULT_VOICE_MALE)
    }

    pub fn voice_female(&self) -> &str {
        self.voice_female.as_deref().unwrap_or(DEFAULT_VOICE_FEMALE)
    }
}

/// [auth] 段：Firebase Web API Key（用于校验 ID Token）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthSection {
    pub firebase_api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            firebase_api_key: None,
            base_url: "https://identitytoolkit.googleapis.com".to_string(),
            timeout_secs: 10,
        }
    }
}

/// 从 config 目录加载配置，环境变量 VIVA__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 叠加环境变量 VIVA__*（双下划线表示嵌套键）
/// 4. 兼容裸环境变量（见模块文档）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("VIVA")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    let mut cfg: AppConfig = c.try_deserialize()?;
    apply_legacy_env(&mut cfg, |name| std::env::var(name).ok());
    Ok(cfg)
}

/// 用裸环境变量补齐未配置的项；`lookup` 便于测试注入
pub fn apply_legacy_env<F>(cfg: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if cfg.server.port.is_none() {
        cfg.server.port = non_empty("PORT").and_then(|p| p.trim().parse::<u16>().ok());
    }
    if cfg.llm.conversation.api_key.is_none() {
        cfg.llm.conversation.api_key = non_empty("ANTHROPIC_API_KEY");
    }
    if cfg.llm.evaluation.api_key.is_none() {
        cfg.llm.evaluation.api_key = non_empty("GEMINI_API_KEY");
    }
    if cfg.tts.keys.is_empty() {
        if let Some(keys) = non_empty("ELEVEN_KEYS") {
            cfg.tts.keys = parse_key_list(&keys);
        }
    }
    if cfg.tts.voice_male.is_none() {
        cfg.tts.voice_male = non_empty("ELEVEN_VOICE_MALE");
    }
    if cfg.tts.voice_female.is_none() {
        cfg.tts.voice_female = non_empty("ELEVEN_VOICE_FEMALE");
    }
    if cfg.auth.firebase_api_key.is_none() {
        cfg.auth.firebase_api_key = non_empty("FIREBASE_API_KEY");
    }
}

/// 逗号分隔的 key 列表，去空白、去空项
pub fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.server.port(), 5000);
        assert_eq!(cfg.tts.voice_male(), "pNInz6obpgDQGcFmaJgB");
        assert_eq!(cfg.server.allowed_origins.len(), 3);
        assert_eq!(cfg.llm.conversation.max_tokens, 2000);
        assert_eq!(cfg.llm.conversation.timeout_secs, 45);
        assert_eq!(cfg.llm.evaluation.timeout_secs, 60);
        assert_eq!(cfg.tts.timeout_secs, 30);
        assert!(cfg.tts.keys.is_empty());
    }

    #[test]
    fn test_parse_key_list() {
        assert_eq!(parse_key_list(" a, ,b ,c"), vec!["a", "b", "c"]);
        assert!(parse_key_list(" , ").is_empty());
    }

    #[test]
    fn test_legacy_env_fills_missing_values() {
        let env: HashMap<&str, &str> = [
            ("PORT", "8081"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("GEMINI_API_KEY", "gm"),
            ("ELEVEN_KEYS", "k1,k2"),
            ("ELEVEN_VOICE_FEMALE", "voice-f"),
        ]
        .into_iter()
        .collect();
        let mut cfg = AppConfig::default();
        apply_legacy_env(&mut cfg, |n| env.get(n).map(|v| v.to_string()));

        assert_eq!(cfg.server.port(), 8081);
        assert_eq!(cfg.llm.conversation.api_key.as_deref(), Some("sk-ant"));
        assert_eq!(cfg.llm.evaluation.api_key.as_deref(), Some("gm"));
        assert_eq!(cfg.tts.keys, vec!["k1", "k2"]);
        assert_eq!(cfg.tts.voice_female(), "voice-f");
        assert!(cfg.auth.firebase_api_key.is_none());
    }

    #[test]
    fn test_legacy_env_does_not_override_configured_keys() {
        let mut cfg = AppConfig::default();
        cfg.llm.conversation.api_key = Some("from-file".into());
        cfg.tts.keys = vec!["file-key".into()];
        apply_legacy_env(&mut cfg, |n| match n {
            "ANTHROPIC_API_KEY" => Some("from-env".into()),
            "ELEVEN_KEYS" => Some("env-key".into()),
            _ => None,
        });
        assert_eq!(cfg.llm.conversation.api_key.as_deref(), Some("from-file"));
        assert_eq!(cfg.tts.keys, vec!["file-key"]);
    }

    #[test]
    fn test_legacy_env_does_not_override_configured_port_or_voice() {
        let mut cfg = AppConfig::default();
        cfg.server.port = Some(7000);
        cfg.tts.voice_male = Some("file-voice".into());
        apply_legacy_env(&mut cfg, |n| match n {
            "PORT" => Some("8081".into()),
            "ELEVEN_VOICE_MALE" => Some("env-voice".into()),
            "ELEVEN_VOICE_FEMALE" => Some("env-voice-f".into()),
            _ => None,
        });
        assert_eq!(cfg.server.port(), 7000);
        assert_eq!(cfg.tts.voice_male(), "file-voice");
        assert_eq!(cfg.tts.voice_female(), "env-voice-f");
    }

    #[test]
    fn test_unparsable_port_keeps_default() {
        let mut cfg = AppConfig::default();
        apply_legacy_env(&mut cfg, |n| (n == "PORT").then(|| "eighty".to_string()));
        assert_eq!(cfg.server.port(), 5000);
    }

    #[test]
    fn test_load_from_explicit_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[server]
port = 7000
allowed_origins = ["http://example.test"]

[llm.conversation]
model = "claude-test"

[tts]
keys = ["x", "y"]
"#
        )
        .unwrap();

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.llm.conversation.model, "claude-test");
        assert_eq!(cfg.llm.conversation.max_tokens, 2000);
        // 文件中的端口优先于 PORT
        assert_eq!(cfg.server.port(), 7000);
        assert_eq!(cfg.server.allowed_origins, vec!["http://example.test"]);
        assert_eq!(cfg.tts.keys, vec!["x", "y"]);
    }
}
