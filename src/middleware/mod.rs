/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (認証 filter + 認可 policy), http, cors, security_headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
