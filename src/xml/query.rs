//! Tree queries: pre-order traversal and namespace-tolerant tag matching.

/// The minimal view of an XML element that queries need.
pub trait Element: Sized {
    /// Tag name, possibly decorated as `{uri}local` or `prefix:local`.
    fn tag(&self) -> &str;

    /// Attribute value by exact name.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Child elements in document order.
    fn children(&self) -> &[Self];
}

/// Depth-first pre-order iterator over an element and all its descendants.
///
/// The root is yielded first, then each child subtree in document order.
pub struct Descendants<'a, E> {
    stack: Vec<&'a E>,
}

impl<'a, E: Element> Iterator for Descendants<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<&'a E> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

/// Iterate over `root` and its descendants in depth-first pre-order.
pub fn descendants<E: Element>(root: &E) -> Descendants<'_, E> {
    Descendants { stack: vec![root] }
}

/// First element in pre-order (root included) satisfying `predicate`.
pub fn find_first<'a, E: Element>(root: &'a E, mut predicate: impl FnMut(&E) -> bool) -> Option<&'a E> {
    descendants(root).find(|&node| predicate(node))
}

/// Strip namespace decoration from a tag (`{uri}body` or `xhtml:body` -> `body`).
pub fn local_name(tag: &str) -> &str {
    let tag = match tag.strip_prefix('{') {
        Some(rest) => rest.split_once('}').map(|(_, local)| local).unwrap_or(tag),
        None => tag,
    };
    tag.rsplit(':').next().unwrap_or(tag)
}

/// Case-insensitive whole-word match of `word` within the local part of `tag`.
///
/// Word boundaries follow the usual regex `\b` rule: the characters around
/// the match must not be alphanumeric or `_`.
pub fn tag_matches_word(tag: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    let haystack = local_name(tag).to_lowercase();
    let needle = word.to_lowercase();

    haystack.match_indices(needle.as_str()).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

/// Case-insensitive substring match within the local part of `tag`.
pub fn tag_contains(tag: &str, needle: &str) -> bool {
    local_name(tag)
        .to_lowercase()
        .contains(&needle.to_lowercase())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
