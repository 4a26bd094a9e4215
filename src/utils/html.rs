// src/utils/html.rs

/// Sanitizes display-only HTML (question text) with ammonia.
///
/// Safe formatting tags such as <b> or <code> survive; <script>, <iframe> and
/// event-handler attributes are stripped, script content included.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
