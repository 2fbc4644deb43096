//! Tokenized scanning of rendered HTML.
//!
//! Not a full HTML parser. Markup is split into tags, comments, declarations
//! and text with exact byte offsets, so the anchor pass can rewrite headings
//! without re-serializing the rest of the document.
use std::ops::Range;

use crate::types::HeadingSpan;

/// Elements whose content is raw text and must not be tokenized as markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TokenKind<'a> {
  StartTag {
    name:         String,
    attrs:        &'a str,
    /// Offset of `attrs` in the source.
    attrs_at:     usize,
    self_closing: bool,
  },
  EndTag {
    name: String,
  },
  Comment,
  Declaration,
  Text,
  RawText,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Token<'a> {
  pub kind:  TokenKind<'a>,
  pub range: Range<usize>,
}

/// Left-to-right tokenizer over a markup string.
pub(crate) struct Lexer<'a> {
  src:          &'a str,
  pos:          usize,
  raw_text_end: Option<String>,
}

impl<'a> Lexer<'a> {
  pub(crate) const fn new(src: &'a str) -> Self {
    Self {
      src,
      pos: 0,
      raw_text_end: None,
    }
  }

  fn text_until_next_tag(&self, from: usize) -> usize {
    self.src[from..]
      .find('<')
      .map_or(self.src.len(), |i| from + i)
  }

  fn lex_markup(&self, start: usize) -> Option<Token<'a>> {
    let src = self.src;
    let rest = &src[start..];

    if let Some(body) = rest.strip_prefix("<!--") {
      let end = body.find("-->").map_or(src.len(), |i| start + 4 + i + 3);
      return Some(Token {
        kind:  TokenKind::Comment,
        range: start..end,
      });
    }

    if rest.starts_with("<!") || rest.starts_with("<?") {
      let end = rest.find('>').map_or(src.len(), |i| start + i + 1);
      return Some(Token {
        kind:  TokenKind::Declaration,
        range: start..end,
      });
    }

    let (is_end, name_start) = if rest.starts_with("</") {
      (true, 2)
    } else {
      (false, 1)
    };
    let bytes = rest.as_bytes();
    if !bytes.get(name_start)?.is_ascii_alphabetic() {
      return None;
    }
    let name_len = bytes[name_start..]
      .iter()
      .take_while(|b| b.is_ascii_alphanumeric() || **b == b'-')
      .count();
    let after_name = name_start + name_len;
    match bytes.get(after_name) {
      Some(b'>' | b'/') => {},
      Some(b) if b.is_ascii_whitespace() => {},
      _ => return None,
    }

    let close = find_tag_close(bytes, after_name)?;
    let name = rest[name_start..after_name].to_ascii_lowercase();
    let range = start..start + close + 1;

    let kind = if is_end {
      TokenKind::EndTag { name }
    } else {
      let attrs = &src[start + after_name..start + close];
      TokenKind::StartTag {
        name,
        attrs,
        attrs_at: start + after_name,
        self_closing: attrs.trim_end().ends_with('/'),
      }
    };

    Some(Token { kind, range })
  }
}

impl<'a> Iterator for Lexer<'a> {
  type Item = Token<'a>;

  fn next(&mut self) -> Option<Token<'a>> {
    let start = self.pos;
    if start >= self.src.len() {
      return None;
    }

    if let Some(name) = self.raw_text_end.take() {
      let end = find_end_tag(self.src, start, &name).unwrap_or(self.src.len());
      if end > start {
        self.pos = end;
        return Some(Token {
          kind:  TokenKind::RawText,
          range: start..end,
        });
      }
    }

    if self.src.as_bytes()[start] != b'<' {
      let end = self.text_until_next_tag(start);
      self.pos = end;
      return Some(Token {
        kind:  TokenKind::Text,
        range: start..end,
      });
    }

    // A `<` that does not open a well-formed tag is plain text.
    let token = self.lex_markup(start).unwrap_or_else(|| {
      Token {
        kind:  TokenKind::Text,
        range: start..self.text_until_next_tag(start + 1),
      }
    });

    if let TokenKind::StartTag {
      name,
      self_closing: false,
      ..
    } = &token.kind
      && RAW_TEXT_ELEMENTS.contains(&name.as_str())
    {
      self.raw_text_end = Some(name.clone());
    }

    self.pos = token.range.end;
    Some(token)
  }
}

/// Find the `>` that closes a tag, skipping over quoted attribute values.
fn find_tag_close(bytes: &[u8], from: usize) -> Option<usize> {
  let mut i = from;
  while i < bytes.len() {
    match bytes[i] {
      b'>' => return Some(i),
      quote @ (b'"' | b'\'') => {
        let closing = bytes[i + 1..].iter().position(|b| *b == quote)?;
        i += closing + 2;
        continue;
      },
      _ => {},
    }
    i += 1;
  }
  None
}

/// Byte offset of the next `</name` end tag at or after `from`, ignoring
/// ASCII case.
fn find_end_tag(src: &str, from: usize, name: &str) -> Option<usize> {
  src[from..].match_indices("</").find_map(|(i, _)| {
    let at = from + i;
    let candidate = src.get(at + 2..at + 2 + name.len())?;
    let delimiter = src.as_bytes().get(at + 2 + name.len()).copied();
    let terminated = matches!(delimiter, None | Some(b'>' | b'/'))
      || delimiter.is_some_and(|b| b.is_ascii_whitespace());
    (candidate.eq_ignore_ascii_case(name) && terminated).then_some(at)
  })
}

/// One attribute of a start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Attribute {
  /// Lowercased name.
  pub name:  String,
  /// Entity-decoded value, `None` for a bare attribute.
  pub value: Option<String>,
  /// Name through value, quotes included, relative to the attribute section.
  pub range: Range<usize>,
}

/// Parse the attribute section of a start tag.
pub(crate) fn parse_attributes(attrs: &str) -> Vec<Attribute> {
  let bytes = attrs.as_bytes();
  let mut out = Vec::new();
  let mut i = 0;

  while i < bytes.len() {
    while i < bytes.len() && (bytes[i].is_ascii_whitespace() || bytes[i] == b'/')
    {
      i += 1;
    }
    let name_start = i;
    while i < bytes.len()
      && !bytes[i].is_ascii_whitespace()
      && !matches!(bytes[i], b'=' | b'/' | b'>')
    {
      i += 1;
    }
    if name_start == i {
      break;
    }
    let name = attrs[name_start..i].to_ascii_lowercase();
    let name_end = i;

    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
      i += 1;
    }
    if bytes.get(i) != Some(&b'=') {
      out.push(Attribute {
        name,
        value: None,
        range: name_start..name_end,
      });
      continue;
    }
    i += 1;
    while i < bytes.len() && bytes[i].is_ascii_whitespace() {
      i += 1;
    }

    let value = match bytes.get(i) {
      Some(&quote @ (b'"' | b'\'')) => {
        let value_start = i + 1;
        let value_end = bytes[value_start..]
          .iter()
          .position(|b| *b == quote)
          .map_or(bytes.len(), |p| value_start + p);
        i = (value_end + 1).min(bytes.len());
        &attrs[value_start..value_end]
      },
      _ => {
        let value_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() {
          i += 1;
        }
        &attrs[value_start..i]
      },
    };
    out.push(Attribute {
      name,
      value: Some(html_escape::decode_html_entities(value).into_owned()),
      range: name_start..i,
    });
  }

  out
}

/// Map a tag name to a heading level.
pub(crate) fn heading_level(name: &str) -> Option<u8> {
  match name {
    "h1" => Some(1),
    "h2" => Some(2),
    "h3" => Some(3),
    "h4" => Some(4),
    "h5" => Some(5),
    "h6" => Some(6),
    _ => None,
  }
}

/// A heading element located in markup, before anchors are assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawHeading {
  pub level:       u8,
  pub span:        HeadingSpan,
  pub existing_id: Option<String>,
}

/// A heading start tag waiting for its end tag.
struct OpenHeading {
  level:          u8,
  name:           String,
  start_tag:      Range<usize>,
  attributes_end: usize,
  id_attribute:   Option<Range<usize>>,
  existing_id:    Option<String>,
}

/// Locate every terminated `h1`..`h6` element in document order.
///
/// A heading start tag that is never closed by a matching end tag is
/// dropped, as is one interrupted by another heading start tag. A trailing
/// `/` on the start tag is ignored, as browsers do for non-void elements.
pub(crate) fn scan_headings(html: &str) -> Vec<RawHeading> {
  let mut headings = Vec::new();
  let mut open: Option<OpenHeading> = None;

  for token in Lexer::new(html) {
    match token.kind {
      TokenKind::StartTag {
        name,
        attrs,
        attrs_at,
        ..
      } => {
        let Some(level) = heading_level(&name) else {
          continue;
        };
        if let Some(stale) = &open {
          log::debug!("Discarding unterminated <{}> heading", stale.name);
        }
        let attributes = parse_attributes(attrs);
        let id = attributes.iter().find(|attr| attr.name == "id");
        open = Some(OpenHeading {
          level,
          name,
          start_tag: token.range,
          attributes_end: attrs_at
            + attributes.last().map_or(0, |attr| attr.range.end),
          id_attribute: id
            .map(|attr| attrs_at + attr.range.start..attrs_at + attr.range.end),
          existing_id: id
            .and_then(|attr| attr.value.clone())
            .filter(|value| !value.trim().is_empty()),
        });
      },
      TokenKind::EndTag { name } => {
        let closes_open = open.as_ref().is_some_and(|heading| heading.name == name);
        if closes_open && let Some(heading) = open.take() {
          headings.push(RawHeading {
            level:       heading.level,
            span:        HeadingSpan {
              content:        heading.start_tag.end..token.range.start,
              start_tag:      heading.start_tag,
              end_tag:        token.range,
              attributes_end: heading.attributes_end,
              id_attribute:   heading.id_attribute,
            },
            existing_id: heading.existing_id,
          });
        }
      },
      _ => {},
    }
  }

  headings
}

/// Offset of the first token that is not whitespace, a comment or a
/// declaration.
pub(crate) fn first_significant_offset(html: &str) -> Option<usize> {
  Lexer::new(html).find_map(|token| {
    match token.kind {
      TokenKind::Comment | TokenKind::Declaration => None,
      TokenKind::Text if html[token.range.clone()].trim().is_empty() => None,
      _ => Some(token.range.start),
    }
  })
}

/// Strip tags from an inline markup fragment, decode entities and collapse
/// whitespace.
pub(crate) fn plain_text(fragment: &str) -> String {
  let mut text = String::with_capacity(fragment.len());
  for token in Lexer::new(fragment) {
    if token.kind == TokenKind::Text {
      text.push_str(&fragment[token.range]);
    }
  }
  html_escape::decode_html_entities(&text)
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn test_lexer_roundtrips_offsets() {
    let html = r#"<!DOCTYPE html><p class="a>b">x &amp; y</p><!-- c --><br/>"#;
    let tokens: Vec<_> = Lexer::new(html).collect();
    let rebuilt: String =
      tokens.iter().map(|t| &html[t.range.clone()]).collect();
    assert_eq!(rebuilt, html);
    assert_eq!(tokens[0].kind, TokenKind::Declaration);
    assert!(matches!(&tokens[1].kind, TokenKind::StartTag { name, .. } if name == "p"));
    assert_eq!(&html[tokens[1].range.clone()], r#"<p class="a>b">"#);
    assert_eq!(tokens[4].kind, TokenKind::Comment);
    assert!(matches!(
      &tokens[5].kind,
      TokenKind::StartTag { self_closing: true, .. }
    ));
  }

  #[test]
  fn test_lone_angle_bracket_is_text() {
    let html = "a < b <h1>T</h1>";
    let headings = scan_headings(html);
    assert_eq!(headings.len(), 1);
    assert_eq!(&html[headings[0].span.content.clone()], "T");
  }

  #[test]
  fn test_script_content_is_not_scanned() {
    let html = "<script>var s = '<h1>fake</h1>';</script><h2>Real</h2>";
    let headings = scan_headings(html);
    assert_eq!(headings.len(), 1);
    assert_eq!(headings[0].level, 2);
  }

  #[test]
  fn test_comment_headings_are_ignored() {
    let html = "<!-- <h1>old</h1> --><h1>new</h1>";
    let headings = scan_headings(html);
    assert_eq!(headings.len(), 1);
    assert_eq!(&html[headings[0].span.content.clone()], "new");
  }

  #[test]
  fn test_unterminated_heading_is_dropped() {
    let html = "<h1>broken<h2>ok</h2>";
    let headings = scan_headings(html);
    assert_eq!(headings.len(), 1);
    assert_eq!(headings[0].level, 2);
  }

  #[test]
  fn test_existing_id_detected() {
    let html = r#"<h2 class="x" ID='custom'>T</h2><h3 id="">E</h3><h4 id>F</h4>"#;
    let headings = scan_headings(html);
    assert_eq!(headings[0].existing_id.as_deref(), Some("custom"));
    assert_eq!(headings[1].existing_id, None);
    let blank = headings[1].span.id_attribute.clone().unwrap();
    assert_eq!(&html[blank], r#"id="""#);
    let bare = headings[2].span.id_attribute.clone().unwrap();
    assert_eq!(&html[bare], "id");
  }

  #[test]
  fn test_attributes_end() {
    let html = r#"<h1>A</h1><h2 class="x" >B</h2><h3 class="y"/>C</h3><h4 data-x=a/>D</h4>"#;
    let ends: Vec<&str> = scan_headings(html)
      .iter()
      .map(|h| &html[h.span.start_tag.start..h.span.attributes_end])
      .collect();
    assert_eq!(ends, vec![
      "<h1",
      r#"<h2 class="x""#,
      r#"<h3 class="y""#,
      "<h4 data-x=a/",
    ]);
  }

  #[test]
  fn test_parse_attributes() {
    let src = r#" class="a b" hidden data-x=1 title='q&amp;a'"#;
    let attrs = parse_attributes(src);
    let pairs: Vec<_> = attrs
      .iter()
      .map(|attr| (attr.name.as_str(), attr.value.as_deref()))
      .collect();
    assert_eq!(pairs, vec![
      ("class", Some("a b")),
      ("hidden", None),
      ("data-x", Some("1")),
      ("title", Some("q&a")),
    ]);
    let spans: Vec<&str> = attrs.iter().map(|attr| &src[attr.range.clone()]).collect();
    assert_eq!(spans, vec![r#"class="a b""#, "hidden", "data-x=1", "title='q&amp;a'"]);
  }

  #[test]
  fn test_plain_text_strips_nested_markup() {
    assert_eq!(
      plain_text("Use <code>nix</code> &amp; <em>more <b>stuff</b></em>"),
      "Use nix & more stuff"
    );
    assert_eq!(plain_text("  spaced\n  out  "), "spaced out");
  }

  #[test]
  fn test_first_significant_offset() {
    assert_eq!(first_significant_offset("\n <!-- x -->\n<h1>T</h1>"), Some(13));
    assert_eq!(first_significant_offset("  "), None);
    assert_eq!(first_significant_offset("text"), Some(0));
  }
}
