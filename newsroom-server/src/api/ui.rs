//! UI serving routes
//!
//! Static pages compiled into the binary. They talk to the JSON routes.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../ui/index.html");
const NEWS_ANALYSIS_HTML: &str = include_str!("../ui/news_analysis.html");
const CHATBOT_HTML: &str = include_str!("../ui/chatbot.html");

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /user/news-analysis
pub async fn serve_news_analysis() -> Html<&'static str> {
    Html(NEWS_ANALYSIS_HTML)
}

/// GET /user/chatbot
pub async fn serve_chatbot() -> Html<&'static str> {
    Html(CHATBOT_HTML)
}
