//! Display titles of folders.

use std::borrow::Cow;

/// Entities the folder editor encodes when storing a title.
const ENTITIES: [(&str, &str); 5] = [
    ("&lt;", "<"),
    ("&gt;", ">"),
    ("&quot;", "\""),
    ("&#039;", "'"),
    ("&amp;", "&"),
];

/// Decodes the HTML entities stored in folder titles.
///
/// Decoding is single-level: `&amp;lt;` becomes `&lt;`, not `<`.
pub fn decode_entities(raw: &str) -> Cow<'_, str> {
    if !raw.contains('&') {
        return Cow::Borrowed(raw);
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match ENTITIES.iter().find(|(entity, _)| tail.starts_with(entity)) {
            Some((entity, ch)) => {
                out.push_str(ch);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Whether a stored title names the user's personal root folder.
///
/// Personal root folders are created at the top level with the owner's
/// numeric id as title.
pub fn is_personal_root(title: &str, nlevel: i32, user_id: i64) -> bool {
    nlevel == 1 && title.trim().parse::<i64>().is_ok_and(|id| id == user_id)
}
