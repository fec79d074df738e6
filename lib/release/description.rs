use std::sync::LazyLock;

use regex::Regex;

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<]+?>").expect("html tag pattern should be valid"));

static HEADING_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#{1,6}\s?").expect("heading pattern should be valid"));

/**
    Turns a release changelog into plain text suitable for a manifest description.

    Rules are applied in order:

    1. If `marker` is present, everything up to and including its first
       occurrence is dropped, and the remainder is trimmed.
    2. HTML tags are removed.
    3. Markdown heading markers (`#` through `######`, plus one whitespace
       character) are removed wherever they appear.
    4. Bold markers (`**`) are removed.
    5. Hyphens become bullets (`•`).
    6. Backticks become straight double quotes.

    Never fails, any input produces some output.
*/
#[must_use]
pub fn normalize_description(raw: &str, marker: Option<&str>) -> String {
    let text = match marker.and_then(|m| raw.split_once(m)) {
        Some((_, after)) => after.trim(),
        None => raw,
    };

    let text = HTML_TAG.replace_all(text, "");
    let text = HEADING_MARKER.replace_all(&text, "");

    text.replace("**", "")
        .replace('-', "•")
        .replace('`', "\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_bullet_and_backticks() {
        assert_eq!(
            normalize_description("## Title\n- item `x`", None),
            "Title\n• item \"x\""
        );
    }

    #[test]
    fn marker_drops_preamble() {
        let raw = "Build info here\nYTLitePlus Release Information\n\n**Changes**\n<br>- Fixed";
        assert_eq!(
            normalize_description(raw, Some("YTLitePlus Release Information")),
            "Changes\n• Fixed"
        );
    }

    #[test]
    fn marker_absent_keeps_everything() {
        let raw = "  **Changes**  ";
        assert_eq!(
            normalize_description(raw, Some("YTLitePlus Release Information")),
            "  Changes  "
        );
    }

    #[test]
    fn marker_is_removed_before_tags() {
        // Trimming happens right after the marker split, so whitespace
        // uncovered by removing a closing tag is kept
        let raw = "<h2>App Release Information</h2>\nBody";
        assert_eq!(
            normalize_description(raw, Some("App Release Information")),
            "\nBody"
        );
    }

    #[test]
    fn strips_html_tags() {
        assert_eq!(
            normalize_description("<details><summary>Log</summary>ok</details>", None),
            "Logok"
        );
    }

    #[test]
    fn strips_heading_markers_anywhere() {
        assert_eq!(normalize_description("####### Deep", None), "Deep");
        assert_eq!(normalize_description("###\nNext", None), "Next");
        assert_eq!(normalize_description("issue #12", None), "issue 12");
    }

    #[test]
    fn handles_empty_and_plain_input() {
        assert_eq!(normalize_description("", None), "");
        assert_eq!(normalize_description("plain", Some("marker")), "plain");
        assert_eq!(normalize_description("a < b", None), "a < b");
    }
}
