use axum::response::{Html, IntoResponse};

const INDEX_PAGE: &str = include_str!("../../assets/index.html");

pub async fn index() -> impl IntoResponse {
    Html(INDEX_PAGE)
}
