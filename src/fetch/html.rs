// Naive markup helpers tailored to the public profile page layout.
// Tag and attribute names are matched case-insensitively on ASCII.

use std::collections::BTreeMap;

use crate::badge::RawBadge;

/// What a profile page yields before classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedProfile {
    pub name: Option<String>,
    pub badges: Vec<RawBadge>,
    pub stats: BTreeMap<String, String>,
}

pub fn parse_profile(html: &str) -> ParsedProfile {
    let lc = to_lowercase_fast(html);

    let name = find_tags_with_class(html, &lc, "h1", "ql-display-small")
        .first()
        .map(|&(_, open_end)| element_text(html, &lc, "h1", open_end))
        .filter(|name| !name.is_empty());

    let badge_starts: Vec<usize> = find_tags_with_class(html, &lc, "div", "profile-badge")
        .into_iter()
        .map(|(start, _)| start)
        .collect();

    let badges = badge_starts
        .iter()
        .enumerate()
        .filter_map(|(index, &start)| {
            let end = badge_starts.get(index + 1).copied().unwrap_or(html.len());
            parse_badge(&html[start..end])
        })
        .collect();

    let hero_end = badge_starts.first().copied().unwrap_or(html.len());
    let stats = find_tags_with_class(html, &lc, "div", "public-profile__hero")
        .first()
        .map(|&(start, _)| parse_stats(&html[start..hero_end.max(start)]))
        .unwrap_or_default();

    ParsedProfile {
        name,
        badges,
        stats,
    }
}

/// One badge container up to the next one. Containers without a title are skipped.
fn parse_badge(segment: &str) -> Option<RawBadge> {
    let lc = to_lowercase_fast(segment);

    let name = first_text(segment, &lc, "span", "ql-title-medium")
        .or_else(|| first_text(segment, &lc, "div", "ql-title"))?;

    let mut badge = RawBadge::new(name);
    badge.date = first_text(segment, &lc, "div", "ql-caption");
    badge.image_url = lc
        .find("<img")
        .and_then(|start| open_tag(segment, start))
        .and_then(|tag| attr_value(tag, "src"))
        .map(|src| normalize_entities(&src));
    Some(badge)
}

/// Pairs `ql-headline-6` labels with `ql-subhead-1` values, in page order
fn parse_stats(section: &str) -> BTreeMap<String, String> {
    let lc = to_lowercase_fast(section);
    let texts = |class: &str| -> Vec<String> {
        find_tags_with_class(section, &lc, "div", class)
            .into_iter()
            .map(|(_, open_end)| element_text(section, &lc, "div", open_end))
            .collect()
    };

    texts("ql-headline-6")
        .into_iter()
        .zip(texts("ql-subhead-1"))
        .collect()
}

fn first_text(s: &str, lc: &str, tag: &str, class: &str) -> Option<String> {
    find_tags_with_class(s, lc, tag, class)
        .first()
        .map(|&(_, open_end)| element_text(s, lc, tag, open_end))
        .filter(|text| !text.is_empty())
}

/// Start offset and end-of-open-tag offset of every `<tag ...>` whose class
/// attribute lists `class` as one of its tokens.
fn find_tags_with_class(s: &str, lc: &str, tag: &str, class: &str) -> Vec<(usize, usize)> {
    let open_pat = format!("<{}", tag);
    let mut found = Vec::new();
    let mut from = 0;

    while let Some(rel) = lc.get(from..).and_then(|rest| rest.find(&open_pat)) {
        let start = from + rel;
        from = start + open_pat.len();

        // Reject longer tag names sharing the prefix, e.g. <h1 vs <h10
        let boundary = lc[from..].chars().next();
        if !matches!(boundary, Some(c) if c.is_whitespace() || c == '>' || c == '/') {
            continue;
        }

        let Some(tag_text) = open_tag(s, start) else {
            break;
        };
        let has_class = attr_value(tag_text, "class")
            .map(|value| value.split_whitespace().any(|token| token == class))
            .unwrap_or(false);
        if has_class {
            found.push((start, start + tag_text.len()));
        }
    }

    found
}

/// The full opening tag starting at `start`, including the closing `>`
fn open_tag(s: &str, start: usize) -> Option<&str> {
    let end = s[start..].find('>')? + start + 1;
    Some(&s[start..end])
}

/// Value of `name="..."`, `name='...'` or `name=bare` inside an opening tag
fn attr_value(tag: &str, name: &str) -> Option<String> {
    let lc = to_lowercase_fast(tag);
    let pattern = format!("{}=", name);
    let mut from = 0;

    while let Some(rel) = lc[from..].find(&pattern) {
        let idx = from + rel;
        from = idx + pattern.len();

        // Must be a whole attribute name, not the tail of e.g. data-src
        let preceded_ok = lc[..idx]
            .chars()
            .next_back()
            .map(|c| c.is_whitespace())
            .unwrap_or(false);
        if !preceded_ok {
            continue;
        }

        let rest = &tag[from..];
        let value = match rest.chars().next() {
            Some(quote @ ('"' | '\'')) => {
                let inner = &rest[1..];
                &inner[..inner.find(quote)?]
            }
            _ => {
                let end = rest
                    .find(|c: char| c.is_whitespace() || c == '>')
                    .unwrap_or(rest.len());
                &rest[..end]
            }
        };
        return Some(value.to_string());
    }

    None
}

/// Text content between the opening tag ending at `open_end` and the next `</tag`
fn element_text(s: &str, lc: &str, tag: &str, open_end: usize) -> String {
    let close_pat = format!("</{}", tag);
    let close = lc[open_end..]
        .find(&close_pat)
        .map(|rel| open_end + rel)
        .unwrap_or(s.len());
    normalize_entities(&strip_tags(&s[open_end..close]))
}

/// Remove all HTML tags `<...>` from the string, then collapse whitespace.
pub fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;
    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    normalize_ws(&out)
}

/// Minimal entity decoding for the entities the page actually uses
pub fn normalize_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Collapse sequences of whitespace into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space {
                out.push(' ');
                prev_space = true;
            }
        } else {
            out.push(ch);
            prev_space = false;
        }
    }
    out.trim().to_string()
}

/// ASCII-only lowercasing, so byte offsets line up with the original text.
pub fn to_lowercase_fast(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect()
}
