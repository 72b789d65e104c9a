//! Brace-delimited RTF groups.
//!
//! RTF nests groups with `{` and `}`; a group whose first token is a control
//! word is written `{\name ...}`. Balanced nesting is not a regular language,
//! so groups are located by walking the bytes with a depth counter rather
//! than with a single regular expression.
//!
//! ```ignore
//! use wordpaste_core::rtf::{GroupName, find_groups};
//!
//! let rtf = r"{\rtf1\some\control\words{\group content}{\group content}{\whatever {\subgroup content}}}";
//! let name = GroupName::pattern("(group|whatever)")?;
//! let groups = find_groups(rtf, &name);
//! assert_eq!(groups[2].content, r"{\whatever {\subgroup content}}");
//! ```

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::error::{PasteError, Result};

/// Leading control word of a group, e.g. `pict` in `{\pict\pngblip ...}`.
static GROUP_NAME: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\{\\(\w+)").unwrap());

/// Run of control words opening a group.
static LEADING_CONTROL_WORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\{(\\[\w-]+\s*)+").unwrap());

/// Content glued to the closing brace of a preceding subgroup.
static SUBGROUP_TAIL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\}([^{\s]+)").unwrap());

/// A contiguous `{\name ...}` region of the source text.
///
/// `content` is exactly `source[start..end]`; `end` is one past the closing
/// brace, so both offsets can be used directly as slice bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Group<'a> {
    pub start: usize,
    pub end: usize,
    pub content: &'a str,
}

/// Which groups to match, by the control word following `{\`.
#[derive(Debug, Clone)]
pub enum GroupName {
    /// Regular-expression fragment matched right after `{\`, such as
    /// `pict` or `(?:header|footer)[lrf]?`.
    Pattern(Regex),
    /// Any group whose name does not start with the given prefix.
    Except(String),
}

impl GroupName {
    /// Compile a name pattern.
    pub fn pattern(fragment: &str) -> Result<Self> {
        let re = Regex::new(&format!(r"\{{\\(?:{fragment})"))?;
        Ok(GroupName::Pattern(re))
    }

    /// Match every group except those named with `prefix`.
    pub fn except(prefix: &str) -> Self {
        GroupName::Except(prefix.to_string())
    }

    /// Offset of the next `{\` that opens a matching group at or after `from`.
    fn find_opening(&self, text: &str, from: usize) -> Option<usize> {
        if from > text.len() {
            return None;
        }
        match self {
            GroupName::Pattern(re) => re.find_at(text, from).map(|m| m.start()),
            GroupName::Except(prefix) => text[from..]
                .match_indices("{\\")
                .map(|(pos, _)| from + pos)
                .find(|&pos| !text[pos + 2..].starts_with(prefix.as_str())),
        }
    }
}

fn non_whitespace(bytes: &[u8], index: usize, forward: bool) -> Option<u8> {
    if forward {
        bytes
            .get(index + 1..)?
            .iter()
            .copied()
            .find(|b| !b.is_ascii_whitespace())
    } else {
        bytes[..index]
            .iter()
            .rev()
            .copied()
            .find(|b| !b.is_ascii_whitespace())
    }
}

/// `{` that opens a group: not escaped, and followed by a control word.
fn is_group_start(bytes: &[u8], index: usize) -> bool {
    bytes[index] == b'{'
        && non_whitespace(bytes, index, false) != Some(b'\\')
        && non_whitespace(bytes, index, true) == Some(b'\\')
}

/// `}` that closes a group: not escaped.
fn is_group_end(bytes: &[u8], index: usize) -> bool {
    bytes[index] == b'}' && non_whitespace(bytes, index, false) != Some(b'\\')
}

/// Find the next group matching `name`, starting the search at `from`.
///
/// Matches whose opening brace is escaped (`\{\name`) are skipped. A group
/// that is still open when the text runs out yields
/// [`PasteError::UnterminatedGroup`].
pub fn try_find_group<'a>(text: &'a str, name: &GroupName, from: usize) -> Result<Option<Group<'a>>> {
    let bytes = text.as_bytes();
    let mut search = from;

    while let Some(start) = name.find_opening(text, search) {
        if !is_group_start(bytes, start) {
            search = start + 1;
            continue;
        }

        let mut depth = 0usize;
        let mut index = start;
        while index < bytes.len() {
            if is_group_start(bytes, index) {
                depth += 1;
            } else if depth > 0 && is_group_end(bytes, index) {
                depth -= 1;
            }
            index += 1;
            if depth == 0 {
                return Ok(Some(Group {
                    start,
                    end: index,
                    content: &text[start..index],
                }));
            }
        }

        return Err(PasteError::UnterminatedGroup { offset: start });
    }

    Ok(None)
}

/// Like [`try_find_group`], but an unterminated group counts as not found.
pub fn find_group<'a>(text: &'a str, name: &GroupName, from: usize) -> Option<Group<'a>> {
    match try_find_group(text, name, from) {
        Ok(group) => group,
        Err(e) => {
            warn!(error = %e, "ignoring malformed RTF group");
            None
        }
    }
}

/// Lazy walk over consecutive groups; each step resumes after the previous
/// group's end, so groups nested in an already returned group are skipped.
#[derive(Debug)]
pub struct Groups<'a, 'n> {
    text: &'a str,
    name: &'n GroupName,
    next: usize,
}

impl<'a, 'n> Groups<'a, 'n> {
    pub fn new(text: &'a str, name: &'n GroupName) -> Self {
        Self { text, name, next: 0 }
    }
}

impl<'a> Iterator for Groups<'a, '_> {
    type Item = Group<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let group = find_group(self.text, self.name, self.next)?;
        self.next = group.end;
        Some(group)
    }
}

/// All top-level groups matching `name`, in document order.
pub fn find_groups<'a>(text: &'a str, name: &GroupName) -> Vec<Group<'a>> {
    Groups::new(text, name).collect()
}

/// Remove every group matching `name`.
///
/// Removal shifts all following offsets, so the search restarts from the
/// beginning after each splice.
pub fn remove_groups(text: &str, name: &GroupName) -> String {
    let mut out = text.to_string();
    loop {
        let Some((start, end)) = find_group(&out, name, 0).map(|g| (g.start, g.end)) else {
            break;
        };
        out.replace_range(start..end, "");
    }
    out
}

/// Name of a group: the control word right after its opening brace.
pub fn group_name(group: &str) -> Option<&str> {
    GROUP_NAME
        .captures(group)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Text content of a group, without its control words and subgroups.
///
/// ```ignore
/// let content = extract_group_content(r"{\group{\subgroup subgroupcontent} group content}");
/// assert_eq!(content, "group content");
/// ```
pub fn extract_group_content(group: &str) -> String {
    // Content may follow the last subgroup without a separating space.
    let spaced = SUBGROUP_TAIL.replace_all(group, "} ${1}");
    let without_subgroups = match group_name(group) {
        Some(name) => remove_groups(&spaced, &GroupName::except(name)),
        None => spaced.into_owned(),
    };
    let content = LEADING_CONTROL_WORDS.replace(&without_subgroups, "");
    let content = content.trim();
    content.strip_suffix('}').unwrap_or(content).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r"{\rtf1\some\control\words{\group content}{\group content}{\whatever {\subgroup content}}}";

    #[test]
    fn test_find_group_offsets() {
        let name = GroupName::pattern("(group|whatever)").unwrap();
        let first = find_group(SAMPLE, &name, 0).unwrap();
        assert_eq!(first.start, 25);
        assert_eq!(first.end, 41);
        assert_eq!(first.content, r"{\group content}");

        let last = find_group(SAMPLE, &name, 50).unwrap();
        assert_eq!(last.start, 57);
        assert_eq!(last.end, 88);
        assert_eq!(last.content, r"{\whatever {\subgroup content}}");
    }

    #[test]
    fn test_escaped_braces_are_content() {
        let text = r"{\rtf1{\field a \{ b \} c}}";
        let name = GroupName::pattern("field").unwrap();
        let group = find_group(text, &name, 0).unwrap();
        assert_eq!(group.content, r"{\field a \{ b \} c}");
    }

    #[test]
    fn test_whitespace_between_brace_and_control_word() {
        let text = "{\\rtf1{\\outer { \\inner x}}}";
        let name = GroupName::pattern("outer").unwrap();
        let group = find_group(text, &name, 0).unwrap();
        assert_eq!(group.content, "{\\outer { \\inner x}}");
    }

    #[test]
    fn test_escaped_opening_is_skipped() {
        let text = r"\{\pict x}{\pict y}";
        let name = GroupName::pattern("pict").unwrap();
        let group = find_group(text, &name, 0).unwrap();
        assert_eq!(group.content, r"{\pict y}");
    }

    #[test]
    fn test_unterminated_group() {
        let text = r"{\rtf1{\pict\pngblip 0011";
        let name = GroupName::pattern("pict").unwrap();
        let err = try_find_group(text, &name, 0).unwrap_err();
        assert!(matches!(err, PasteError::UnterminatedGroup { offset: 6 }));
        assert!(find_group(text, &name, 0).is_none());
    }

    #[test]
    fn test_except_skips_prefix() {
        let text = r"{\pict{\*\blipuid 1}{\pictsub x}}";
        let name = GroupName::except("pict");
        let group = find_group(text, &name, 0).unwrap();
        assert_eq!(group.content, r"{\*\blipuid 1}");
    }

    #[test]
    fn test_start_past_end() {
        let name = GroupName::pattern("group").unwrap();
        assert!(find_group(SAMPLE, &name, SAMPLE.len() + 10).is_none());
    }

    #[test]
    fn test_group_name() {
        assert_eq!(group_name(r"{\pict\pngblip 00}"), Some("pict"));
        assert_eq!(group_name(r"{\*\blipuid 00}"), None);
        assert_eq!(group_name("plain"), None);
    }
}
