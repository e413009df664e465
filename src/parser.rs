//! Turns template source text into the `Element` tree the renderer walks.
//! Tag *boundaries* are found by a hand-written scanner rather than by
//! `pest` alone, because Mustache delimiters can change at runtime
//! (`{{=<% %>=}}`) and a single statically-generated PEG grammar can't
//! express "match whatever the currently active open/close markers are."
//! `pest` is still used for the part that *is* static: validating and
//! splitting the dotted path (or partial name) found inside a tag.

use pest::Parser;
use pest_derive::Parser;

use crate::delimiters::Delimiters;
use crate::element::{Element, Escape};
use crate::error::{Error, ParseError};
use crate::path::Path;

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct TagContentParser;

/// Parses `template` into the top-level `Element` sequence, starting with
/// the default `{{ }}` delimiters.
pub fn parse(template: &str) -> Result<Vec<Element>, Error> {
    parse_with_delimiters(template, Delimiters::default())
}

/// Parses `template` into the top-level `Element` sequence, starting with
/// `delimiters` rather than the default `{{ }}` pair. A lambda re-parsing a
/// section's `inner_text` needs this: the active delimiters at the call
/// site must carry into the re-parse.
pub fn parse_with_delimiters(template: &str, delimiters: Delimiters) -> Result<Vec<Element>, Error> {
    let tags = scan(template, delimiters)?;
    let elements = build_tree(template, &tags)?;
    Ok(merge_static_text(elements))
}

/// Combines adjacent `StaticText` elements produced across tag boundaries
/// that contribute no output themselves (comments, standalone whitespace).
fn merge_static_text(elements: Vec<Element>) -> Vec<Element> {
    let mut merged: Vec<Element> = Vec::with_capacity(elements.len());
    for element in elements {
        let element = match element {
            Element::Section {
                path,
                children,
                inner_text,
                delimiters,
            } => Element::Section {
                path,
                children: merge_static_text(children),
                inner_text,
                delimiters,
            },
            Element::InvertedSection { path, children } => Element::InvertedSection {
                path,
                children: merge_static_text(children),
            },
            other => other,
        };

        match (merged.last_mut(), &element) {
            (Some(Element::StaticText(prev)), Element::StaticText(next)) => {
                prev.push_str(next);
            }
            _ => merged.push(element),
        }
    }
    merged
}

#[derive(Debug)]
enum TagKind {
    Variable(Path),
    Html(Path),
    SectionOpen(Path),
    InvertedOpen(Path),
    SectionClose(Path),
    Partial(String),
    Comment,
    DelimChange(Delimiters),
}

#[derive(Debug)]
struct Tag {
    kind: TagKind,
    tag_start: usize,
    tag_end: usize,
    /// Delimiters in effect when this tag was recognized (i.e. before a
    /// `DelimChange` tag's own effect takes hold).
    delimiters: Delimiters,
    /// `Some((line_start, after_end))` when this tag sits alone on its line
    /// (the standalone-line rule); `None` for tags that never qualify
    /// (interpolation) or that failed the whitespace check.
    standalone: Option<(usize, usize)>,
}

fn is_standalone_kind(kind: &TagKind) -> bool {
    matches!(
        kind,
        TagKind::SectionOpen(_)
            | TagKind::InvertedOpen(_)
            | TagKind::SectionClose(_)
            | TagKind::Partial(_)
            | TagKind::Comment
            | TagKind::DelimChange(_)
    )
}

fn scan(template: &str, mut delims: Delimiters) -> Result<Vec<Tag>, Error> {
    let mut tags = Vec::new();
    let mut pos = 0usize;

    while let Some(rel) = template[pos..].find(delims.open.as_str()) {
        let tag_start = pos + rel;
        let after_open = tag_start + delims.open.len();

        // Triple-mustache unescaped interpolation is only recognized with
        // the default curly-brace delimiters, matching upstream Mustache.
        if delims.open == "{{" && template[after_open..].starts_with('{') {
            let rel_close = template[after_open..].find("}}}").ok_or_else(|| {
                unterminated(tag_start)
            })?;
            let content_start = after_open + 1;
            let content_end = after_open + rel_close;
            let tag_end = content_end + "}}}".len();
            let path = parse_path(template[content_start..content_end].trim(), tag_start)?;

            tags.push(Tag {
                kind: TagKind::Html(path),
                tag_start,
                tag_end,
                delimiters: delims.clone(),
                standalone: None,
            });
            pos = tag_end;
            continue;
        }

        let rel_close = template[after_open..]
            .find(delims.close.as_str())
            .ok_or_else(|| unterminated(tag_start))?;
        let content = &template[after_open..after_open + rel_close];
        let tag_end = after_open + rel_close + delims.close.len();

        let kind = classify(content, tag_start)?;

        let tag_delimiters = delims.clone();
        if let TagKind::DelimChange(ref new_delims) = kind {
            log::debug!("delimiters changed to {}", new_delims);
            delims = new_delims.clone();
        }

        let standalone = if is_standalone_kind(&kind) {
            standalone_bounds(template, tag_start, tag_end)
        } else {
            None
        };

        tags.push(Tag {
            kind,
            tag_start,
            tag_end,
            delimiters: tag_delimiters,
            standalone,
        });
        pos = tag_end;
    }

    Ok(tags)
}

fn unterminated(tag_start: usize) -> Error {
    Error::Parse(ParseError::UnexpectedToken(format!(
        "unterminated tag starting at byte {}",
        tag_start
    )))
}

fn classify(content: &str, tag_start: usize) -> Result<TagKind, Error> {
    let mut chars = content.chars();
    match chars.next() {
        Some('#') => Ok(TagKind::SectionOpen(parse_path(rest(content).trim(), tag_start)?)),
        Some('^') => Ok(TagKind::InvertedOpen(parse_path(rest(content).trim(), tag_start)?)),
        Some('/') => Ok(TagKind::SectionClose(parse_path(rest(content).trim(), tag_start)?)),
        Some('>') => Ok(TagKind::Partial(parse_partial_id(rest(content).trim(), tag_start)?)),
        Some('!') => Ok(TagKind::Comment),
        Some('&') => Ok(TagKind::Html(parse_path(rest(content).trim(), tag_start)?)),
        Some('=') if content.len() >= 2 && content.ends_with('=') => {
            let inner = content[1..content.len() - 1].trim();
            let mut parts = inner.split_whitespace();
            let open = parts.next().ok_or_else(|| bad_delimiters(tag_start))?;
            let close = parts.next().ok_or_else(|| bad_delimiters(tag_start))?;
            if parts.next().is_some() {
                return Err(bad_delimiters(tag_start));
            }
            Ok(TagKind::DelimChange(Delimiters::new(open, close)))
        }
        _ => Ok(TagKind::Variable(parse_path(content.trim(), tag_start)?)),
    }
}

fn rest(content: &str) -> &str {
    &content[1..]
}

fn bad_delimiters(tag_start: usize) -> Error {
    Error::Parse(ParseError::UnexpectedToken(format!(
        "invalid delimiter tag at byte {}, expected `{{{{=open close=}}}}`",
        tag_start
    )))
}

fn parse_path(text: &str, tag_start: usize) -> Result<Path, Error> {
    let mut parsed = TagContentParser::parse(Rule::path, text).map_err(|e| {
        Error::Parse(ParseError::UnexpectedToken(format!(
            "invalid path `{}` at byte {}: {}",
            text, tag_start, e
        )))
    })?;
    let pair = parsed.next().expect("path rule always produces one pair");
    let mut inner = pair.into_inner().peekable();
    if let Some(first) = inner.peek() {
        if first.as_rule() == Rule::dot {
            return Ok(Path::dot());
        }
    }
    let keys: Vec<String> = inner
        .filter(|p| p.as_rule() == Rule::identifier)
        .map(|p| p.as_str().to_string())
        .collect();
    Ok(Path::new(keys))
}

fn parse_partial_id(text: &str, tag_start: usize) -> Result<String, Error> {
    TagContentParser::parse(Rule::partial_id, text).map_err(|e| {
        Error::Parse(ParseError::UnexpectedToken(format!(
            "invalid partial name `{}` at byte {}: {}",
            text, tag_start, e
        )))
    })?;
    Ok(text.to_string())
}

/// If `[tag_start, tag_end)` sits alone on its source line (only horizontal
/// whitespace before it since the last newline, and only horizontal
/// whitespace after it up to the next newline or end of input), returns the
/// `(line_start, after_newline)` bounds the standalone-line rule should trim
/// away. Otherwise returns `None`.
fn standalone_bounds(src: &str, tag_start: usize, tag_end: usize) -> Option<(usize, usize)> {
    fn is_hspace(b: u8) -> bool {
        b == b' ' || b == b'\t' || b == b'\r'
    }

    let before = &src[..tag_start];
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    if !before.as_bytes()[line_start..].iter().all(|&b| is_hspace(b)) {
        return None;
    }

    let after = &src[tag_end..];
    let mut iter = after.char_indices();
    loop {
        match iter.next() {
            Some((_, ' ')) | Some((_, '\t')) | Some((_, '\r')) => continue,
            Some((i, '\n')) => return Some((line_start, tag_end + i + 1)),
            Some(_) => return None,
            None => return Some((line_start, src.len())),
        }
    }
}

struct OpenSection {
    path: Path,
    delimiters: Delimiters,
    children: Vec<Element>,
    inverted: bool,
    inner_start: usize,
}

fn build_tree(template: &str, tags: &[Tag]) -> Result<Vec<Element>, Error> {
    let mut stack: Vec<OpenSection> = Vec::new();
    let mut root: Vec<Element> = Vec::new();
    let mut cursor = 0usize;

    for tag in tags {
        let (text_end, next_cursor) = match tag.standalone {
            Some((line_start, after_end)) => (line_start.max(cursor), after_end),
            None => (tag.tag_start, tag.tag_end),
        };

        {
            let text = &template[cursor..text_end];
            if !text.is_empty() {
                let children = current_children(&mut stack, &mut root);
                children.push(Element::StaticText(text.to_string()));
            }
        }

        match &tag.kind {
            TagKind::Variable(path) => {
                let children = current_children(&mut stack, &mut root);
                children.push(Element::Interpolation {
                    path: path.clone(),
                    escape: Escape::Escaped,
                });
            }
            TagKind::Html(path) => {
                let children = current_children(&mut stack, &mut root);
                children.push(Element::Interpolation {
                    path: path.clone(),
                    escape: Escape::Unescaped,
                });
            }
            TagKind::SectionOpen(path) => {
                stack.push(OpenSection {
                    path: path.clone(),
                    delimiters: tag.delimiters.clone(),
                    children: Vec::new(),
                    inverted: false,
                    inner_start: tag.tag_end,
                });
            }
            TagKind::InvertedOpen(path) => {
                stack.push(OpenSection {
                    path: path.clone(),
                    delimiters: tag.delimiters.clone(),
                    children: Vec::new(),
                    inverted: true,
                    inner_start: tag.tag_end,
                });
            }
            TagKind::SectionClose(path) => {
                let open = stack
                    .pop()
                    .ok_or_else(|| Error::Parse(ParseError::UnmatchedClose(path.clone())))?;
                if open.path != *path {
                    return Err(Error::Parse(ParseError::InvalidSection(
                        open.path,
                        path.clone(),
                    )));
                }
                let inner_text = template[open.inner_start..tag.tag_start].to_string();
                let element = if open.inverted {
                    Element::InvertedSection {
                        path: open.path,
                        children: open.children,
                    }
                } else {
                    Element::Section {
                        path: open.path,
                        children: open.children,
                        inner_text,
                        delimiters: open.delimiters,
                    }
                };
                let children = current_children(&mut stack, &mut root);
                children.push(element);
            }
            TagKind::Partial(name) => {
                let indent = tag
                    .standalone
                    .map(|(line_start, _)| template[line_start..tag.tag_start].to_string())
                    .unwrap_or_default();
                let children = current_children(&mut stack, &mut root);
                children.push(Element::Partial {
                    name: name.clone(),
                    indent,
                });
            }
            TagKind::Comment => {}
            TagKind::DelimChange(_) => {}
        }

        cursor = next_cursor;
    }

    if let Some(open) = stack.pop() {
        return Err(Error::Parse(ParseError::UnclosedSection(open.path)));
    }

    let tail = &template[cursor..];
    if !tail.is_empty() {
        root.push(Element::StaticText(tail.to_string()));
    }

    Ok(root)
}

fn current_children<'a>(
    stack: &'a mut [OpenSection],
    root: &'a mut Vec<Element>,
) -> &'a mut Vec<Element> {
    match stack.last_mut() {
        Some(open) => &mut open.children,
        None => root,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(template: &str) -> Vec<Element> {
        parse(template).unwrap_or_else(|e| panic!("parse failed: {}", e))
    }

    #[test]
    fn static_text_only() {
        let elements = parse_ok("hello world");
        assert_eq!(vec![Element::StaticText("hello world".into())], elements);
    }

    #[test]
    fn escaped_and_unescaped_interpolation() {
        let elements = parse_ok("{{a}}{{{b}}}{{&c}}");
        assert_eq!(
            vec![
                Element::Interpolation {
                    path: Path::new(vec!["a".into()]),
                    escape: Escape::Escaped,
                },
                Element::Interpolation {
                    path: Path::new(vec!["b".into()]),
                    escape: Escape::Unescaped,
                },
                Element::Interpolation {
                    path: Path::new(vec!["c".into()]),
                    escape: Escape::Unescaped,
                },
            ],
            elements
        );
    }

    #[test]
    fn dotted_path() {
        let elements = parse_ok("{{a.b.c}}");
        match &elements[0] {
            Element::Interpolation { path, .. } => {
                assert_eq!(vec!["a", "b", "c"], path.components());
            }
            other => panic!("unexpected element: {:?}", other),
        }
    }

    #[test]
    fn section_roundtrip() {
        let elements = parse_ok("{{#list}}({{.}}){{/list}}");
        match &elements[0] {
            Element::Section {
                path,
                children,
                inner_text,
                ..
            } => {
                assert_eq!(vec!["list"], path.components());
                assert_eq!("({{.}})", inner_text);
                assert_eq!(3, children.len());
            }
            other => panic!("unexpected element: {:?}", other),
        }
    }

    #[test]
    fn mismatched_close_is_an_error() {
        let err = parse("{{#one}}test{{/two}}").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::InvalidSection(_, _))));
    }

    #[test]
    fn unmatched_close_is_an_error() {
        let err = parse("{{/one}}").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::UnmatchedClose(_))));
    }

    #[test]
    fn unclosed_section_is_an_error() {
        let err = parse("{{#one}}").unwrap_err();
        assert!(matches!(err, Error::Parse(ParseError::UnclosedSection(_))));
    }

    #[test]
    fn delimiter_change() {
        let elements = parse_ok("{{=<% %>=}}(<%text%>)");
        assert_eq!(
            vec![
                Element::StaticText("(".into()),
                Element::Interpolation {
                    path: Path::new(vec!["text".into()]),
                    escape: Escape::Escaped,
                },
                Element::StaticText(")".into()),
            ],
            elements
        );
    }

    #[test]
    fn standalone_section_elides_its_line() {
        let elements = parse_ok("before\n{{#a}}\ninner\n{{/a}}\nafter");
        assert_eq!(
            vec![
                Element::StaticText("before\n".into()),
                Element::Section {
                    path: Path::new(vec!["a".into()]),
                    children: vec![Element::StaticText("inner\n".into())],
                    inner_text: "\ninner\n".into(),
                    delimiters: Delimiters::default(),
                },
                Element::StaticText("after".into()),
            ],
            elements
        );
    }

    #[test]
    fn standalone_partial_captures_indent() {
        let elements = parse_ok("  {{>include}}\n");
        assert_eq!(
            vec![Element::Partial {
                name: "include".into(),
                indent: "  ".into(),
            }],
            elements
        );
    }

    #[test]
    fn non_standalone_partial_has_no_indent() {
        let elements = parse_ok("x {{>include}} y");
        assert_eq!(
            vec![
                Element::StaticText("x ".into()),
                Element::Partial {
                    name: "include".into(),
                    indent: String::new(),
                },
                Element::StaticText(" y".into()),
            ],
            elements
        );
    }

    #[test]
    fn comment_is_dropped() {
        let elements = parse_ok("a{{! nothing to see }}b");
        assert_eq!(vec![Element::StaticText("ab".into())], elements);
    }

    #[test]
    fn standalone_comment_elides_line() {
        let elements = parse_ok("a\n{{! nothing to see }}\nb");
        assert_eq!(vec![Element::StaticText("a\nb".into())], elements);
    }
}
