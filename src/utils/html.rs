use ammonia;

/// Clean material content using the ammonia library.
///
/// Safe formatting tags (like <b>, <p>, <ul>) survive; <script>, <iframe>
/// and event-handler attributes are stripped. Plain text passes through
/// with HTML special characters left for the client to escape.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}
