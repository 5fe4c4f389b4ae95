//! Cleanup for text lifted out of rendered documentation.
//!
//! Both cleaners are idempotent: running them on their own output is a
//! no-op, so already-normalized snapshot data can pass through them again.

/// Copy-to-clipboard glyph rendered next to item headers.
const COPY_GLYPH: &str = "\u{2398}";

/// The same glyph after a UTF-8 / Windows-1252 round trip.
const COPY_GLYPH_MOJIBAKE: &str = "\u{e2}\u{17d}\u{2dc}";

/// Marker that introduces notable-trait popups after a signature.
const NOTABLE_TRAIT_MARKER: char = '\u{24d8}';

/// Clean a documentation string.
///
/// Drops the copy glyph, maps non-breaking spaces to spaces, pads `=` with
/// spaces (keeping `==` together), collapses space runs and drops every
/// trailing `", "`.
pub fn clean_text(text: &str) -> String {
    // Stripping a separator can leave a bare `=` at the end, so repeat.
    let mut cleaned = clean_pass(text);
    loop {
        let next = clean_pass(&cleaned);
        if next == cleaned {
            return cleaned;
        }
        cleaned = next;
    }
}

fn clean_pass(text: &str) -> String {
    let text = text
        .replace(COPY_GLYPH_MOJIBAKE, "")
        .replace(COPY_GLYPH, "")
        .replace('\u{a0}', " ")
        .replace('=', " = ");

    let mut cleaned = collapse_spaces(&text).replace("= =", "==");
    while cleaned.ends_with(", ") {
        cleaned.truncate(cleaned.len() - 2);
    }
    cleaned
}

/// Clean an item signature.
///
/// Everything after the notable-trait marker is discarded. `pub ` and
/// `default ` carry no API meaning for the comparison and are removed.
pub fn clean_signature(signature: &str) -> String {
    let head = signature
        .split(NOTABLE_TRAIT_MARKER)
        .next()
        .unwrap_or_default();

    // Padding `=` can expose a new token, so strip until nothing changes.
    let mut cleaned = clean_text(head);
    loop {
        let stripped = cleaned.replace("pub ", "").replace("default ", "");
        if stripped == cleaned {
            return cleaned;
        }
        cleaned = clean_text(&stripped);
    }
}

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_space = false;
    for c in text.chars() {
        if c == ' ' {
            if !previous_space {
                out.push(c);
            }
            previous_space = true;
        } else {
            out.push(c);
            previous_space = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_text_collapses_spaces() {
        assert_eq!(clean_text("fn  foo(   x: u8)"), "fn foo( x: u8)");
    }

    #[test]
    fn test_clean_text_nbsp_and_glyph() {
        assert_eq!(clean_text("fn\u{a0}foo()\u{2398}"), "fn foo()");
        assert_eq!(clean_text("fn foo()\u{e2}\u{17d}\u{2dc}"), "fn foo()");
    }

    #[test]
    fn test_clean_text_equals() {
        assert_eq!(clean_text("Iterator<Item=u8>"), "Iterator<Item = u8>");
        assert_eq!(clean_text("a == b"), "a == b");
        assert_eq!(clean_text("a==b"), "a == b");
    }

    #[test]
    fn test_clean_text_trailing_separator() {
        assert_eq!(clean_text("T: Clone, "), "T: Clone");
        assert_eq!(clean_text("a, , "), "a");
        assert_eq!(clean_text(&clean_text("a, , ")), "a");
        assert_eq!(clean_text("x =, "), "x = ");
    }

    #[test]
    fn test_clean_signature() {
        assert_eq!(
            clean_signature("pub fn iter(&self) -> Iter<'_, T>\u{24d8}Notable traits"),
            "fn iter(&self) -> Iter<'_, T>"
        );
        assert_eq!(clean_signature("default fn next(&mut self)"), "fn next(&mut self)");
    }

    proptest! {
        #[test]
        fn clean_text_is_idempotent(s in "[ a-z=,<>\u{a0}]{0,24}(, ){0,3}") {
            let once = clean_text(&s);
            prop_assert_eq!(clean_text(&once), once);
        }

        #[test]
        fn clean_signature_is_idempotent(s in "(pub |default )?fn [a-z]{1,6}\\( ?[a-z=]{0,6}\\)") {
            let once = clean_signature(&s);
            prop_assert_eq!(clean_signature(&once), once);
        }
    }
}
