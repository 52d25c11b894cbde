//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use http::Method;

use crate::AppError;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// 公开路由判断 (无需令牌)
///
/// - `POST /api/auth/login`, `POST /api/auth/register`
/// - `POST /api/payments/webhook` (签名校验代替令牌)
/// - `GET /api/restaurants`
/// - `GET /api/restaurants/{id}`, `/{id}/seats`, `/{id}/availability`
///
/// `{id}` 必须是数字，`/api/restaurants/my/store` 等路径仍需认证。
pub fn is_public_route(method: &Method, path: &str) -> bool {
    if *method == Method::POST {
        return matches!(
            path,
            "/api/auth/login" | "/api/auth/register" | "/api/payments/webhook"
        );
    }
    if *method != Method::GET {
        return false;
    }
    if path == "/api/restaurants" {
        return true;
    }
    let Some(rest) = path.strip_prefix("/api/restaurants/") else {
        return false;
    };
    let mut segments = rest.split('/');
    let id_is_numeric = segments
        .next()
        .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()));
    id_is_numeric
        && matches!(
            (segments.next(), segments.next()),
            (None, _) | (Some("seats"), None) | (Some("availability"), None)
        )
}

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (`/health` 等)
/// - [`is_public_route`] 列出的公开接口
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 Unauthorized |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 InvalidToken |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public_route(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let user = authenticate(&state.jwt_service, req.headers(), req.uri())?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// 解析 `Authorization: Bearer <token>` 并验证，失败时记录安全日志
pub(crate) fn authenticate(
    jwt_service: &JwtService,
    headers: &http::HeaderMap,
    uri: &http::Uri,
) -> Result<CurrentUser, AppError> {
    let Some(header) = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        security_log!("WARN", "auth_missing", uri = uri.path());
        return Err(AppError::unauthorized());
    };
    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    jwt_service
        .validate_token(token)
        .and_then(CurrentUser::try_from)
        .map_err(|e| {
            security_log!("WARN", "auth_failed", error = e.to_string(), uri = uri.path());
            match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            }
        })
}

/// 权限检查中间件 - 要求特定权限
///
/// # 用法
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/api/restaurants/{id}/seats", post(handler::add_seat))
///     .layer(middleware::from_fn(require_permission(permissions::SEATS_MANAGE)));
/// ```
///
/// # 错误
///
/// 无权限返回 403 Forbidden
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req
                .extensions()
                .get::<CurrentUser>()
                .ok_or(AppError::unauthorized())?;

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id,
                    role = user.role.as_str(),
                    required_permission = permission
                );
                return Err(AppError::forbidden(format!(
                    "Permission denied: {}",
                    permission
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

/// 管理员中间件 - 要求管理员角色
///
/// 非管理员返回 403 Forbidden
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::unauthorized())?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id,
            role = user.role.as_str()
        );
        return Err(AppError::new(shared::ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_routes() {
        assert!(is_public_route(&Method::POST, "/api/auth/login"));
        assert!(is_public_route(&Method::POST, "/api/auth/register"));
        assert!(is_public_route(&Method::POST, "/api/payments/webhook"));
        assert!(is_public_route(&Method::GET, "/api/restaurants"));
        assert!(is_public_route(&Method::GET, "/api/restaurants/123"));
        assert!(is_public_route(&Method::GET, "/api/restaurants/123/seats"));
        assert!(is_public_route(&Method::GET, "/api/restaurants/123/availability"));
    }

    #[test]
    fn test_protected_routes() {
        assert!(!is_public_route(&Method::GET, "/api/auth/me"));
        assert!(!is_public_route(&Method::GET, "/api/restaurants/my/store"));
        assert!(!is_public_route(&Method::GET, "/api/restaurants/123/sales"));
        assert!(!is_public_route(&Method::POST, "/api/restaurants"));
        assert!(!is_public_route(&Method::POST, "/api/restaurants/123/seats"));
        assert!(!is_public_route(&Method::PUT, "/api/restaurants/123"));
        assert!(!is_public_route(&Method::GET, "/api/restaurants/123/seats/9"));
        assert!(!is_public_route(&Method::GET, "/api/reservations/my"));
        assert!(!is_public_route(&Method::POST, "/api/payments/confirm"));
        assert!(!is_public_route(&Method::GET, "/api/payments/webhook"));
    }
}
