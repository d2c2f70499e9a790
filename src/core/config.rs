use config::{builder::DefaultState, Config as ConfigLoader, ConfigBuilder, ConfigError, Environment};
use dotenvy::dotenv;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    /// Postgres 连接串（敏感信息）
    #[serde(alias = "DATABASE_URL")]
    pub database_url: SecretString,

    /// Redis 连接串（敏感信息）
    #[serde(alias = "REDIS_URL")]
    pub redis_url: SecretString,

    /// Access Token 签名密钥（敏感信息）
    #[serde(alias = "ACCESS_TOKEN_SECRET")]
    pub access_token_secret: SecretString,

    /// Access Token 有效期（秒）
    #[serde(alias = "ACCESS_TOKEN_EXPIRES_IN")]
    pub access_token_expires_in: i64,

    /// Refresh Token 签名密钥（敏感信息），必须与 Access 密钥不同
    #[serde(alias = "REFRESH_TOKEN_SECRET")]
    pub refresh_token_secret: SecretString,

    /// Refresh Token 有效期（秒）
    #[serde(alias = "REFRESH_TOKEN_EXPIRES_IN")]
    pub refresh_token_expires_in: i64,

    /// refreshToken Cookie 有效期（天）
    #[serde(alias = "JWT_COOKIE_EXPIRES_IN")]
    pub jwt_cookie_expires_in: i64,

    #[serde(default = "default_port", alias = "SERVER_PORT")]
    pub server_port: u16,

    #[serde(default = "default_host", alias = "SERVER_HOST")]
    pub server_host: String,

    #[serde(default = "default_log", alias = "RUST_LOG")]
    pub rust_log: String,

    #[serde(default = "default_log_dir", alias = "LOG_DIR")]
    pub log_dir: String,

    /// 响应缓存的有效时长（毫秒）
    #[serde(default = "default_cache_duration", alias = "CACHE_DURATION_MS")]
    pub cache_duration_ms: u64,
}

impl Config {
    /// 加载配置：
    /// - 支持 `.env`
    /// - 优先从环境变量加载
    /// - 令牌相关的五项配置没有默认值，缺失时直接返回错误（启动即失败）
    pub fn new() -> Result<Self, ConfigError> {
        dotenv().ok();

        // 注意：Environment::default() 会把 `FOO__BAR=baz` 映射到 `foo.bar=baz`
        // 并且 try_parsing(true) 会把 "3000" 解析成数字等类型。
        let builder = ConfigLoader::builder().add_source(Environment::default().try_parsing(true));
        Self::load(builder)
    }

    pub fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let access = self.access_token_secret.expose_secret();
        let refresh = self.refresh_token_secret.expose_secret();

        if access.is_empty() || refresh.is_empty() {
            return Err(ConfigError::Message("token secrets must not be empty".to_string()));
        }
        // 两种令牌共用一个密钥时，签名层面就无法区分类型
        if access == refresh {
            return Err(ConfigError::Message(
                "ACCESS_TOKEN_SECRET and REFRESH_TOKEN_SECRET must differ".to_string(),
            ));
        }
        if self.access_token_expires_in <= 0
            || self.refresh_token_expires_in <= 0
            || self.jwt_cookie_expires_in <= 0
        {
            return Err(ConfigError::Message("token expiry values must be positive".to_string()));
        }
        Ok(())
    }
}

// --- 默认值函数 ---
fn default_port() -> u16 {
    5000
}
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_log() -> String {
    "info".to_string()
}
fn default_log_dir() -> String {
    "logs".to_string()
}
fn default_cache_duration() -> u64 {
    5 * 60 * 1000
} // 5 minutes
