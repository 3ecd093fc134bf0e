//! Sanitizzazione del testo prima della persistenza
//!
//! - testo semplice (subject, nome ospite): nessun tag HTML
//! - rich text (body): markup ammesso, ma senza script, stili, handler `on*` e URL `javascript:`

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SCRIPT_BLOCK: Regex =
        Regex::new(r"(?is)<\s*(script|style)\b[^>]*>.*?<\s*/\s*(script|style)\s*>").unwrap();
    static ref DANGLING_SCRIPT: Regex = Regex::new(r"(?i)<\s*/?\s*(script|style)\b[^>]*>").unwrap();
    static ref EVENT_HANDLER: Regex =
        Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).unwrap();
    static ref JAVASCRIPT_URL: Regex = Regex::new(r"(?i)javascript\s*:").unwrap();
    // un tag inizia con un nome, `/` o `!`: un `<` isolato nel testo resta
    static ref ANY_TAG: Regex = Regex::new(r"<(?:/?[A-Za-z]|!)[^>]*>").unwrap();
    static ref CONTROL_CHARS: Regex = Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]").unwrap();
}

pub fn sanitize_plain_text(input: &str) -> String {
    let without_scripts = SCRIPT_BLOCK.replace_all(input, "");
    let without_tags = ANY_TAG.replace_all(&without_scripts, "");
    CONTROL_CHARS
        .replace_all(&without_tags, "")
        .trim()
        .to_string()
}

pub fn sanitize_rich_text(input: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(input, "");
    let text = DANGLING_SCRIPT.replace_all(&text, "");
    let text = EVENT_HANDLER.replace_all(&text, "");
    let text = JAVASCRIPT_URL.replace_all(&text, "");
    CONTROL_CHARS.replace_all(&text, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_strips_markup() {
        assert_eq!(sanitize_plain_text("  <b>Hi</b> there "), "Hi there");
        assert_eq!(sanitize_plain_text("<script>alert(1)</script>Hey"), "Hey");
        assert_eq!(sanitize_plain_text("<i></i>"), "");
        assert_eq!(sanitize_plain_text("Hi<!-- note --> <br/>all"), "Hi all");
    }

    #[test]
    fn test_plain_text_keeps_comparisons() {
        assert_eq!(sanitize_plain_text("1 < 2 and 3 > 2"), "1 < 2 and 3 > 2");
        assert_eq!(sanitize_plain_text("<3 > 2"), "<3 > 2");
        assert_eq!(sanitize_plain_text("a <= b"), "a <= b");
    }

    #[test]
    fn test_rich_text_keeps_safe_markup() {
        assert_eq!(
            sanitize_rich_text("<p onclick=\"steal()\">Hello <b>world</b></p>"),
            "<p>Hello <b>world</b></p>"
        );
        assert_eq!(
            sanitize_rich_text("<a href=\"javascript:alert(1)\">x</a><script>bad()</script>"),
            "<a href=\"alert(1)\">x</a>"
        );
    }
}
