use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../../../static/index.html");

/// 前端页面
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}
