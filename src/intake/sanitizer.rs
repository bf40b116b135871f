//! HTML sanitization for free-text submission fields.
//!
//! Two modes: a full strip for identity and contact fields, and a restricted
//! allow-list for long-form rich text (cover letters, job descriptions).
//! Both are pure functions over the input string. `<script>` and `<style>`
//! element content is always discarded, not just the tags.

/// Tags allowed through [`sanitize_rich_text`], attributes always removed.
const ALLOWED_TAGS: &[&str] = &["b", "i", "em", "strong", "p", "ul", "ol", "li", "br"];

/// Remove every HTML tag, keeping only text content.
pub fn strip_html(input: &str) -> String {
    sanitize(input, &[])
}

/// Keep a small formatting allow-list and drop everything else.
pub fn sanitize_rich_text(input: &str) -> String {
    sanitize(input, ALLOWED_TAGS)
}

fn sanitize(input: &str, allowed: &[&str]) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(open) = rest.find('<') {
        let (text, tail) = rest.split_at(open);
        out.push_str(text);

        match parse_tag(tail) {
            Some(tag) => {
                if tag.name == "script" || tag.name == "style" {
                    if !tag.closing {
                        // Skip everything up to the matching close tag.
                        rest = skip_element_content(&tail[tag.consumed..], &tag.name);
                        continue;
                    }
                } else if allowed.contains(&tag.name.as_str()) {
                    out.push('<');
                    if tag.closing {
                        out.push('/');
                    }
                    out.push_str(&tag.name);
                    if tag.self_closing {
                        out.push_str(" /");
                    }
                    out.push('>');
                }
                rest = &tail[tag.consumed..];
            }
            None => {
                // Not a tag, emit the '<' literally.
                out.push('<');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

struct ParsedTag {
    name: String,
    closing: bool,
    self_closing: bool,
    consumed: usize,
}

/// Parse `<name ...>` or `</name ...>` at the start of `input` (which begins
/// with '<'). Returns `None` when the text is not a plausible tag.
fn parse_tag(input: &str) -> Option<ParsedTag> {
    let bytes = input.as_bytes();
    let mut pos = 1;

    let closing = bytes.get(pos) == Some(&b'/');
    if closing {
        pos += 1;
    }

    let name_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_alphanumeric() {
        pos += 1;
    }
    if pos == name_start {
        return None;
    }
    let name = input[name_start..pos].to_ascii_lowercase();

    let close = input[pos..].find('>')?;
    let inner_end = pos + close;
    let self_closing = input[pos..inner_end].trim_end().ends_with('/');

    Some(ParsedTag {
        name,
        closing,
        self_closing,
        consumed: inner_end + 1,
    })
}

/// Drop text until after `</name>`; unterminated elements swallow the rest.
fn skip_element_content<'a>(input: &'a str, name: &str) -> &'a str {
    let lower = input.to_ascii_lowercase();
    let needle = format!("</{name}");
    match lower.find(&needle) {
        Some(at) => match input[at..].find('>') {
            Some(close) => &input[at + close + 1..],
            None => "",
        },
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_simple_formatting() {
        assert_eq!(strip_html("<b>Bob</b>"), "Bob");
        assert_eq!(strip_html("plain text"), "plain text");
        assert_eq!(strip_html("<p>one</p><p>two</p>"), "onetwo");
    }

    #[test]
    fn strip_drops_script_content() {
        assert_eq!(strip_html("<script>alert(1)</script>Bob"), "Bob");
        assert_eq!(strip_html("<style>body{}</style>ok"), "ok");
    }

    #[test]
    fn rich_text_keeps_allowed_tags_only() {
        assert_eq!(
            sanitize_rich_text("<script>x</script><p>ok</p>"),
            "<p>ok</p>"
        );
        assert_eq!(
            sanitize_rich_text("<div><b>bold</b> text</div>"),
            "<b>bold</b> text"
        );
        assert_eq!(
            sanitize_rich_text("<ul><li>one</li></ul>"),
            "<ul><li>one</li></ul>"
        );
    }

    #[test]
    fn rich_text_strips_attributes() {
        assert_eq!(
            sanitize_rich_text("<p onclick=\"evil()\">hi</p>"),
            "<p>hi</p>"
        );
        assert_eq!(sanitize_rich_text("<B CLASS=x>hi</B>"), "<b>hi</b>");
    }

    #[test]
    fn keeps_self_closing_breaks() {
        assert_eq!(sanitize_rich_text("line<br/>next"), "line<br />next");
    }

    #[test]
    fn stray_angle_bracket_is_literal() {
        assert_eq!(strip_html("1 < 2"), "1 < 2");
        assert_eq!(sanitize_rich_text("a < b <i>c</i>"), "a < b <i>c</i>");
    }

    #[test]
    fn unterminated_script_swallows_remainder() {
        assert_eq!(strip_html("before<script>var x = 1;"), "before");
    }
}
