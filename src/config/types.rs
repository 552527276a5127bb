//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;

use crate::infrastructure::http::ApiClientConfig;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 商品 API 配置
    #[serde(default)]
    pub api: ApiConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 商品 API 配置
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// API 基础 URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// 访问令牌（Bearer）
    #[serde(default)]
    pub auth_token: Option<String>,

    /// 是否拆包 `{errno, error, data}` 响应信封
    #[serde(default = "default_unwrap_envelope")]
    pub unwrap_envelope: bool,

    /// User-Agent
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:3000/api".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_unwrap_envelope() -> bool {
    true
}

fn default_user_agent() -> String {
    format!("shopfront/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            auth_token: None,
            unwrap_envelope: default_unwrap_envelope(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// 转换为 HTTP 客户端配置
    pub fn client_config(&self) -> ApiClientConfig {
        ApiClientConfig {
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
            unwrap_envelope: self.unwrap_envelope,
            user_agent: self.user_agent.clone(),
        }
    }

    /// 打码后的令牌（用于日志）
    pub fn masked_token(&self) -> String {
        match &self.auth_token {
            None => "<none>".to_string(),
            Some(token) if token.chars().count() <= 4 => "****".to_string(),
            Some(token) => {
                let skip = token.chars().count() - 4;
                format!("****{}", token.chars().skip(skip).collect::<String>())
            }
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
