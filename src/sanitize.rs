// src/sanitize.rs
//! Display-safe text for untrusted feed fields.

/// Decode any HTML entities, then escape markup-significant characters.
///
/// Upstream sources deliver entity-encoded text (`&amp;`, `&#8217;`), so the
/// literal string is recovered first and only then escaped for insertion into
/// the document. The output never contains a raw `<`, `>`, `"` or `'`, and
/// every `&` in it starts an entity.
pub fn sanitize(text: &str) -> String {
    let decoded = html_escape::decode_html_entities(text);
    html_escape::encode_quoted_attribute(&decoded).into_owned()
}

/// Same as [`sanitize`] but for optional fields; `None` becomes `""`.
pub fn sanitize_opt(text: Option<&str>) -> String {
    text.map(sanitize).unwrap_or_default()
}
