use once_cell::sync::Lazy;
use regex::Regex;

use crate::po;

// A msgid line immediately followed by a msgstr line. Non-greedy capture
// keeps the match on the msgid's own line; the empty header msgid never
// matches because the capture requires at least one character.
static MSGID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"msgid "(.+?)"\r?\nmsgstr"#).expect("msgid regex"));

/// Extracts the ordered source strings from a gettext template.
///
/// Every captured literal is decoded to its logical string; duplicates
/// are preserved positionally because the sequence position is the
/// global index space for the whole translation run.
pub fn extract_source_strings(content: &str) -> Vec<String> {
    MSGID_RE
        .captures_iter(content)
        .map(|captures| po::unescape(&captures[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::extract_source_strings;

    const TEMPLATE: &str = r#"# Sample template
msgid ""
msgstr ""
"Project-Id-Version: Demo\n"
"Content-Type: text/plain; charset=UTF-8\n"

msgid "Hello"
msgstr ""

msgid "World"
msgstr ""
"#;

    #[test]
    fn extracts_in_document_order() {
        assert_eq!(extract_source_strings(TEMPLATE), vec!["Hello", "World"]);
    }

    #[test]
    fn header_msgid_is_excluded() {
        let strings = extract_source_strings(TEMPLATE);
        assert!(!strings.iter().any(String::is_empty));
    }

    #[test]
    fn duplicates_are_preserved_positionally() {
        let content = "msgid \"Save\"\nmsgstr \"\"\n\nmsgid \"Open\"\nmsgstr \"\"\n\nmsgid \"Save\"\nmsgstr \"\"\n";
        assert_eq!(extract_source_strings(content), vec!["Save", "Open", "Save"]);
    }

    #[test]
    fn escaped_literals_are_decoded() {
        let content = "msgid \"a \\\"quoted\\\" word\"\nmsgstr \"\"\n";
        assert_eq!(
            extract_source_strings(content),
            vec![r#"a "quoted" word"#]
        );
    }

    #[test]
    fn msgid_without_following_msgstr_is_ignored() {
        let content = "msgid \"Dangling\"\n\nmsgid \"Kept\"\nmsgstr \"\"\n";
        assert_eq!(extract_source_strings(content), vec!["Kept"]);
    }

    #[test]
    fn windows_line_endings_are_accepted() {
        let content = "msgid \"Hello\"\r\nmsgstr \"\"\r\n";
        assert_eq!(extract_source_strings(content), vec!["Hello"]);
    }
}
