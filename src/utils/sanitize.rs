//! Text normalization applied to caller-supplied free text before it is
//! validated or stored.

/// Characters deleted outright after escaping and trimming.
const STRIPPED: &[char] = &['<', '>', '"', '\'', '%', ';', '(', ')', '&', '+'];

/// Normalize untrusted text in three fixed stages: HTML-escape, trim
/// surrounding whitespace, then delete every character in [`STRIPPED`].
///
/// The final stage also removes the `&` and `;` the escape stage introduced,
/// so `<` ends up as `lt` rather than `&lt;`. The function is total and is
/// not idempotent; callers must apply it exactly once.
pub fn sanitize(text: &str) -> String {
    let escaped = escape_html(text);
    escaped
        .trim()
        .chars()
        .filter(|c| !STRIPPED.contains(c))
        .collect()
}

/// True iff `text` is one or more ASCII digits. `"0"` is accepted.
pub fn is_valid_identifier(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit())
}

/// Escape the five HTML-significant characters using numeric entities for
/// quotes (`&#39;`, `&#34;`), which the strip stage reduces to `#39`/`#34`.
fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&#39;"),
            '"' => escaped.push_str("&#34;"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    // Characterization: these pin the literal escape-trim-strip behavior,
    // including entity remnants such as `lt` and `amp`.
    #[test]
    fn sanitize_characterization() {
        let cases = [
            (
                "script tag",
                "<script>alert('XSS')</script>Hello",
                "ltscriptgtalert#39XSS#39lt/scriptgtHello",
            ),
            (
                "sql injection attempt",
                "'; DROP TABLE books; --",
                "#39 DROP TABLE books --",
            ),
            ("surrounding whitespace", "   Normal Book Title   ", "Normal Book Title"),
            ("ampersand and parens", "Book & Author (2024)", "Book amp Author 2024"),
            ("bold markup", "  <b>Dune</b>  ", "ltbgtDunelt/bgt"),
            ("double quotes", "\"Quoted\"", "#34Quoted#34"),
            ("percent and plus", "100% C++", "100 C"),
            ("empty", "", ""),
            ("only whitespace", "   ", ""),
        ];

        for (name, input, expected) in cases {
            assert_eq!(sanitize(input), expected, "case: {name}");
        }
    }

    #[test]
    fn plain_text_is_untouched() {
        assert_eq!(sanitize("Herbert"), "Herbert");
        assert_eq!(sanitize("Ursula K. Le Guin"), "Ursula K. Le Guin");
        assert_eq!(sanitize("Cien años de soledad"), "Cien años de soledad");
    }

    #[test]
    fn output_never_contains_stripped_characters() {
        let inputs = [
            "<>\"'%;()&+",
            "a&b;c(d)e+f%g",
            "&amp;&lt;&#39;",
            "  'single' \"double\"  ",
            "<<<>>>",
        ];

        for input in inputs {
            let output = sanitize(input);
            assert!(
                !output.contains(STRIPPED),
                "{input:?} sanitized to {output:?}"
            );
        }
    }

    #[test]
    fn trim_happens_before_strip() {
        // The strip stage can expose whitespace that the trim stage already passed.
        assert_eq!(sanitize("; x"), " x");
        assert_eq!(sanitize("  ;  "), "");
    }

    #[test]
    fn sanitize_is_not_idempotent() {
        let once = sanitize("; x");
        assert_eq!(once, " x");
        assert_eq!(sanitize(&once), "x");
    }

    #[test]
    fn valid_identifiers() {
        for id in ["0", "1", "123", "0042", "4294967296"] {
            assert!(is_valid_identifier(id), "{id:?} should be valid");
        }
    }

    #[test]
    fn invalid_identifiers() {
        for id in ["", "-1", "+1", "12a", "abc", " 1", "1 ", "1.5", "١٢"] {
            assert!(!is_valid_identifier(id), "{id:?} should be invalid");
        }
    }
}
