//! HTML escaping for server-rendered pages.

/// Escapes text for safe interpolation into HTML element content and
/// double- or single-quoted attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

/// Percent-encodes a value for use inside a query string.
pub fn encode_query_value(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' | b'/' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_plain_text_unchanged() {
        assert_eq!(escape("Main Street 12"), "Main Street 12");
    }

    #[test]
    fn test_escape_markup() {
        assert_eq!(
            escape(r#"<script>alert("x")</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
    }

    #[test]
    fn test_escape_ampersand_and_quote() {
        assert_eq!(escape("Tom & Jerry's"), "Tom &amp; Jerry&#x27;s");
    }

    #[test]
    fn test_escape_unicode_passthrough() {
        assert_eq!(escape("Łódź, ul. Piotrkowska"), "Łódź, ul. Piotrkowska");
    }

    #[test]
    fn test_encode_query_value() {
        assert_eq!(encode_query_value("/properties/1"), "/properties/1");
        assert_eq!(encode_query_value("/a b?c=d"), "/a%20b%3Fc%3Dd");
    }
}
