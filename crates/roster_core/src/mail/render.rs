//! Placeholder substitution for message bodies.
//!
//! Recognized tokens are `{{Full Name}}` and `{{Email}}`, with optional
//! whitespace inside the braces. Substitution is single-pass: inserted
//! values are never re-scanned, and every other `{{...}}` is left verbatim.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(Full Name|Email)\s*\}\}").expect("valid placeholder regex"));

/// Values substituted into one recipient's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
}

/// Renders `body` for one recipient.
pub fn render_body(body: &str, context: RenderContext<'_>) -> String {
    PLACEHOLDER_RE
        .replace_all(body, |caps: &Captures<'_>| match &caps[1] {
            "Full Name" => context.full_name.to_string(),
            _ => context.email.to_string(),
        })
        .into_owned()
}

/// Returns whether `body` still contains a recognized token.
pub fn has_placeholders(body: &str) -> bool {
    PLACEHOLDER_RE.is_match(body)
}

#[cfg(test)]
mod tests {
    use super::{has_placeholders, render_body, RenderContext};

    const MARIA: RenderContext<'static> = RenderContext {
        full_name: "Maria Santos",
        email: "m.santos@x.org",
    };

    #[test]
    fn replaces_both_tokens_with_whitespace_tolerance() {
        let rendered = render_body("Hi {{ Full Name }}, reply to {{Email}}.", MARIA);
        assert_eq!(rendered, "Hi Maria Santos, reply to m.santos@x.org.");
    }

    #[test]
    fn leaves_unknown_placeholders_untouched() {
        let body = "Dear {{First Name}}, {{ email }} and {Full Name} stay.";
        assert_eq!(render_body(body, MARIA), body);
    }

    #[test]
    fn substituted_values_are_not_rescanned() {
        let context = RenderContext {
            full_name: "{{Email}}",
            email: "a@b.org",
        };
        assert_eq!(render_body("{{Full Name}}", context), "{{Email}}");
    }

    #[test]
    fn rendering_is_idempotent_without_tokens_in_values() {
        let once = render_body("Hi {{Full Name}} <{{Email}}>", MARIA);
        assert!(!has_placeholders(&once));
        assert_eq!(render_body(&once, MARIA), once);
    }

    #[test]
    fn dollar_signs_in_values_are_literal() {
        let context = RenderContext {
            full_name: "$1 Club",
            email: "x@y.org",
        };
        assert_eq!(render_body("{{Full Name}}!", context), "$1 Club!");
    }
}
