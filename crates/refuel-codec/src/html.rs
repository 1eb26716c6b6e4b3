//! Strip the HTML the CRM's note editor wraps around plain text.

use std::sync::LazyLock;

use regex::Regex;

static LINE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"(?i)<br\s*/?>|</p\s*>").expect("line-break pattern is valid")
});

static TAG: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Entities the editor is known to emit. `&amp;` is replaced last so that
/// `&amp;quot;` decodes to `&quot;` and not to `"`.
const ENTITIES: &[(&str, &str)] = &[
  ("&nbsp;", " "),
  ("&quot;", "\""),
  ("&#34;", "\""),
  ("&#39;", "'"),
  ("&lt;", "<"),
  ("&gt;", ">"),
  ("&amp;", "&"),
];

/// `<br>` and `</p>` become newlines, every other tag is dropped, common
/// entities are unescaped.
pub(crate) fn unwrap(text: &str) -> String {
  let text = LINE_BREAK.replace_all(text, "\n");
  let text = TAG.replace_all(&text, "");
  let mut out = text.into_owned();
  for (entity, replacement) in ENTITIES {
    if out.contains(entity) {
      out = out.replace(entity, replacement);
    }
  }
  out.trim().to_owned()
}
