use crate::protocol::GlobalTranslationMap;

/// Header fields for one generated catalog. Creation and revision dates
/// are intentionally the same value.
#[derive(Debug, Clone)]
pub struct PoMetadata {
    pub project_id_version: String,
    pub language: String,
    pub timestamp: String,
}

/// Serializes a translated catalog to gettext PO text: the header block,
/// then one `msgid`/`msgstr` pair per source string in original order,
/// blank-line separated.
///
/// Callers must pass a `translations` map that already covers every
/// source index (see `protocol::finalize`); sources and translations are
/// paired positionally.
pub fn serialize(
    metadata: &PoMetadata,
    sources: &[String],
    translations: &GlobalTranslationMap,
) -> String {
    let mut output = String::new();
    output.push_str("msgid \"\"\n");
    output.push_str("msgstr \"\"\n");
    output.push_str(&format!(
        "\"Project-Id-Version: {}\\n\"\n",
        metadata.project_id_version
    ));
    output.push_str(&format!(
        "\"POT-Creation-Date: {}\\n\"\n",
        metadata.timestamp
    ));
    output.push_str(&format!(
        "\"PO-Revision-Date: {}\\n\"\n",
        metadata.timestamp
    ));
    output.push_str(&format!("\"Language: {}\\n\"\n", metadata.language));
    output.push_str("\"MIME-Version: 1.0\\n\"\n");
    output.push_str("\"Content-Type: text/plain; charset=UTF-8\\n\"\n");
    output.push_str("\"Content-Transfer-Encoding: 8bit\\n\"\n");
    output.push('\n');

    for (source, translation) in sources.iter().zip(translations.values()) {
        output.push_str(&format!("msgid \"{}\"\n", escape(source)));
        output.push_str(&format!("msgstr \"{}\"\n", escape(translation)));
        output.push('\n');
    }

    output
}

/// Escapes a logical string into the gettext PO string-literal grammar.
pub(crate) fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            '\r' => escaped.push_str("\\r"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Inverse of `escape`: decodes a PO string literal's body. Unknown
/// escapes keep the escaped character, matching gettext's tolerance.
pub(crate) fn unescape(literal: &str) -> String {
    let mut decoded = String::with_capacity(literal.len());
    let mut chars = literal.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            decoded.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => decoded.push('\n'),
            Some('t') => decoded.push('\t'),
            Some('r') => decoded.push('\r'),
            Some(other) => decoded.push(other),
            None => decoded.push('\\'),
        }
    }
    decoded
}

#[cfg(test)]
mod tests {
    use super::{escape, serialize, unescape, PoMetadata};
    use crate::protocol::GlobalTranslationMap;

    fn metadata() -> PoMetadata {
        PoMetadata {
            project_id_version: "Plugin Translation".to_string(),
            language: "fr".to_string(),
            timestamp: "2024-03-01T12:00:00Z".to_string(),
        }
    }

    #[test]
    fn escape_covers_the_po_literal_grammar() {
        assert_eq!(escape(r#"say "hi""#), r#"say \"hi\""#);
        assert_eq!(escape("a\\b"), "a\\\\b");
        assert_eq!(escape("line one\nline two"), "line one\\nline two");
        assert_eq!(escape("tab\there"), "tab\\there");
    }

    #[test]
    fn unescape_inverts_escape() {
        for text in ["plain", "say \"hi\"", "a\\b", "one\ntwo", "tab\there"] {
            assert_eq!(unescape(&escape(text)), text);
        }
    }

    #[test]
    fn serializes_header_then_pairs_in_order() {
        let sources = vec!["Hello".to_string(), "World".to_string()];
        let translations: GlobalTranslationMap = [(0, "Bonjour".to_string()), (1, "Monde".to_string())]
            .into_iter()
            .collect();
        let output = serialize(&metadata(), &sources, &translations);

        insta::assert_snapshot!(output, @r#"
        msgid ""
        msgstr ""
        "Project-Id-Version: Plugin Translation\n"
        "POT-Creation-Date: 2024-03-01T12:00:00Z\n"
        "PO-Revision-Date: 2024-03-01T12:00:00Z\n"
        "Language: fr\n"
        "MIME-Version: 1.0\n"
        "Content-Type: text/plain; charset=UTF-8\n"
        "Content-Transfer-Encoding: 8bit\n"

        msgid "Hello"
        msgstr "Bonjour"

        msgid "World"
        msgstr "Monde"
        "#);
    }

    #[test]
    fn embedded_quotes_are_escaped_in_both_fields() {
        let sources = vec![r#"a "quoted" word"#.to_string()];
        let translations: GlobalTranslationMap =
            [(0, r#"un mot "cité""#.to_string())].into_iter().collect();
        let output = serialize(&metadata(), &sources, &translations);
        assert!(output.contains(r#"msgid "a \"quoted\" word""#));
        assert!(output.contains(r#"msgstr "un mot \"cité\"""#));
    }
}
