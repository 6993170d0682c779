//! 静态页面

use axum::response::Html;

pub const LOGIN: &str = include_str!("../../../templates/login.html");
pub const USER: &str = include_str!("../../../templates/user.html");
pub const OPTION: &str = include_str!("../../../templates/option.html");
pub const INDEX: &str = include_str!("../../../templates/index.html");

pub async fn login() -> Html<&'static str> {
    Html(LOGIN)
}

pub async fn user() -> Html<&'static str> {
    Html(USER)
}

pub async fn option() -> Html<&'static str> {
    Html(OPTION)
}

pub async fn index() -> Html<&'static str> {
    Html(INDEX)
}
