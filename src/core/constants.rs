// ==========================================
// Redis Key 前缀定义
// ==========================================

/// 用户 Refresh Token 集合前缀：`refresh_tokens:user:{user_id}` 是一个 Redis SET，
/// 每次登录 SADD，轮换/登出时 SREM。
pub const REDIS_PREFIX_REFRESH: &str = "refresh_tokens:user:";

// ==========================================
// HTTP 约定
// ==========================================

/// 保存 Refresh Token 的 Cookie 名称（httpOnly，前端脚本不可读）。
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// 反向代理透传的协议头，用于判断原始请求是否走 TLS。
pub const FORWARDED_PROTO_HEADER: &str = "x-forwarded-proto";

// ==========================================
// 业务逻辑常量
// ==========================================

/// 响应缓存最多保留的条目数，超出后淘汰最早插入的 key。
pub const CACHE_MAX_ENTRIES: usize = 100;

// ==========================================
// 前端路由（角色守卫的重定向目标）
// ==========================================

pub const LOGIN_PATH: &str = "/login";

pub const HOME_PATH: &str = "/";

pub const ADMIN_PATH_PREFIX: &str = "/admin";
