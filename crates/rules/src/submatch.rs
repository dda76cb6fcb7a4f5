//! Expansion of `%0`–`%9` placeholders from regular-expression submatches.
//!
//! A location constraint that selects resources by pattern can refer to the
//! pattern's capture groups inside its rules: with `rsc_pattern: "^ip-(.*)$"`
//! an expression attribute of `%1-weight` becomes `10.0.0.1-weight` for the
//! resource `ip-10.0.0.1`.

use std::borrow::Cow;
use std::ops::Range;

use regex::Captures;

/// Byte span of each capture group in the matched string; `None` for a
/// group that did not participate in the match.
pub type Submatches = [Option<Range<usize>>];

/// Collect the capture group spans of a regex match.
pub fn capture_spans(captures: &Captures<'_>) -> Vec<Option<Range<usize>>> {
    captures.iter().map(|group| group.map(|m| m.range())).collect()
}

/// Expand every `%N` in `template` with capture group `N` of `matched`.
///
/// A placeholder whose group is out of range, did not participate, or
/// matched the empty string expands to nothing. Returns `None` when there
/// is nothing to expand: an empty template or one without any `%N`
/// sequence. Any `%N` sequence produces `Some`, even if every referenced
/// group is missing.
pub fn replace_submatches(template: &str, matched: &str, submatches: &Submatches) -> Option<String> {
    if template.is_empty() {
        return None;
    }

    let bytes = template.as_bytes();
    let mut expansion = String::with_capacity(template.len());
    let mut expanded = false;
    let mut literal_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let is_placeholder = bytes[i] == b'%' && bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
        if !is_placeholder {
            i += 1;
            continue;
        }

        expansion.push_str(&template[literal_start..i]);
        let group = usize::from(bytes[i + 1] - b'0');
        if let Some(text) = submatch_text(matched, submatches, group) {
            expansion.push_str(text);
        }
        expanded = true;
        i += 2;
        literal_start = i;
    }

    if !expanded {
        return None;
    }
    expansion.push_str(&template[literal_start..]);
    Some(expansion)
}

/// Like [`replace_submatches`], but borrows `template` when nothing was
/// expanded.
pub fn expand_submatches<'a>(template: &'a str, matched: &str, submatches: &Submatches) -> Cow<'a, str> {
    match replace_submatches(template, matched, submatches) {
        Some(expanded) => Cow::Owned(expanded),
        None => Cow::Borrowed(template),
    }
}

fn submatch_text<'m>(matched: &'m str, submatches: &Submatches, group: usize) -> Option<&'m str> {
    let span = submatches.get(group)?.as_ref()?;
    if span.end <= span.start {
        return None;
    }
    matched.get(span.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn spans(re: &str, text: &str) -> Vec<Option<Range<usize>>> {
        let re = Regex::new(re).unwrap();
        capture_spans(&re.captures(text).unwrap())
    }

    #[test]
    fn template_without_placeholders_is_not_expanded() {
        let subs = spans("^(a)(b)$", "ab");
        assert_eq!(replace_submatches("plain text", "ab", &subs), None);
        assert_eq!(replace_submatches("100%", "ab", &subs), None);
        assert_eq!(replace_submatches("%x%", "ab", &subs), None);
        assert!(matches!(expand_submatches("plain text", "ab", &subs), Cow::Borrowed("plain text")));
    }

    #[test]
    fn empty_template_is_not_expanded() {
        assert_eq!(replace_submatches("", "abc", &[Some(0..3)]), None);
    }

    #[test]
    fn unmatched_group_is_dropped() {
        let subs = spans("^(abc)(x)?$", "abc");
        assert_eq!(subs.len(), 3);
        assert_eq!(replace_submatches("%1-%2", "abc", &subs).as_deref(), Some("abc-"));
    }

    #[test]
    fn group_zero_is_the_whole_match() {
        let subs = spans("ip-([0-9.]+)", "rsc ip-10.0.0.1");
        assert_eq!(
            replace_submatches("[%0] %1", "rsc ip-10.0.0.1", &subs).as_deref(),
            Some("[ip-10.0.0.1] 10.0.0.1")
        );
    }

    #[test]
    fn out_of_range_and_empty_groups_expand_to_nothing() {
        let subs = spans("^(a*)b$", "b");
        assert_eq!(replace_submatches("<%1><%7>", "b", &subs).as_deref(), Some("<><>"));
    }

    #[test]
    fn only_placeholders_referencing_missing_groups_still_expand() {
        assert_eq!(replace_submatches("%9", "abc", &[Some(0..3)]).as_deref(), Some(""));
    }

    #[test]
    fn literal_text_and_non_ascii_are_preserved() {
        let subs = spans("^node-(.+)$", "node-ñ1");
        assert_eq!(
            expand_to_string("größe %1 50%", "node-ñ1", &subs),
            "größe ñ1 50%"
        );
    }

    fn expand_to_string(template: &str, matched: &str, subs: &Submatches) -> String {
        expand_submatches(template, matched, subs).into_owned()
    }

    #[test]
    fn expand_returns_owned_when_expanded() {
        let subs = spans("^db-(\\d+)$", "db-42");
        let expanded = expand_submatches("weight-%1", "db-42", &subs);
        assert!(matches!(expanded, Cow::Owned(_)));
        assert_eq!(expanded, "weight-42");
    }
}
