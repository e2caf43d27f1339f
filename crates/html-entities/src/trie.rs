//! A compact prefix trie over named character reference strings.
//!
//! The root dispatches in O(1) by direct character offset; every other level is
//! a small sorted array searched linearly. Binary search would also work, but
//! these fan-outs are small enough — almost always under a dozen children —
//! that a linear scan wins on cache behavior.

/// A single node in the trie. Stored in a flat arena (`EntityTrie::nodes`) and
/// referenced by index rather than pointer, so the whole trie is one contiguous
/// allocation with no `Rc`/`Box` cycles.
struct TrieNode {
    /// Replacement text if the prefix consumed to reach this node is itself a
    /// complete, valid named reference.
    resolved: Option<&'static str>,
    /// True when the matched prefix's last character is `;`.
    ends_with_semicolon: bool,
    /// Sorted `(char, child index)` pairs.
    children: Vec<(char, u32)>,
}

impl TrieNode {
    fn empty() -> Self {
        Self {
            resolved: None,
            ends_with_semicolon: false,
            children: Vec::new(),
        }
    }

    fn child(&self, c: char) -> Option<u32> {
        self.children
            .binary_search_by_key(&c, |&(ch, _)| ch)
            .ok()
            .map(|i| self.children[i].1)
    }
}

pub(crate) const ROOT: u32 = 0;

/// An immutable, frozen-after-construction prefix trie.
pub(crate) struct EntityTrie {
    nodes: Vec<TrieNode>,
}

/// A match produced while walking the trie.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrieMatch {
    pub replacement: &'static str,
    pub ends_with_semicolon: bool,
    /// Number of characters consumed from the trie root to reach this match.
    pub length: usize,
}

impl EntityTrie {
    /// Builds the trie from a table of `(name, replacement)` pairs. `name` excludes
    /// the leading `&`; it may or may not end in `;`.
    pub(crate) fn build(entries: &[(&'static str, &'static str)]) -> Self {
        let mut trie = EntityTrie {
            nodes: vec![TrieNode::empty()],
        };
        for &(name, replacement) in entries {
            trie.insert(name, replacement);
        }
        trie
    }

    fn insert(&mut self, name: &str, replacement: &'static str) {
        let mut current = ROOT;
        for c in name.chars() {
            current = match self.nodes[current as usize].child(c) {
                Some(child) => child,
                None => {
                    let new_index = self.nodes.len() as u32;
                    self.nodes.push(TrieNode::empty());
                    let children = &mut self.nodes[current as usize].children;
                    let pos = children.partition_point(|&(ch, _)| ch < c);
                    children.insert(pos, (c, new_index));
                    new_index
                }
            };
        }
        let node = &mut self.nodes[current as usize];
        node.resolved = Some(replacement);
        node.ends_with_semicolon = name.ends_with(';');
    }

    /// Steps one character from `node`, returning the child node id if one matched.
    pub(crate) fn step(&self, node: u32, c: char) -> Option<u32> {
        self.nodes[node as usize].child(c)
    }

    pub(crate) fn resolved_at(&self, node: u32) -> Option<(&'static str, bool)> {
        let n = &self.nodes[node as usize];
        n.resolved.map(|r| (r, n.ends_with_semicolon))
    }

    /// True when no match can ever extend past this node — only reachable for
    /// semicolon-terminated entries, since `;` always ends a named reference.
    pub(crate) fn is_end_node(&self, node: u32) -> bool {
        let n = &self.nodes[node as usize];
        n.ends_with_semicolon && n.children.is_empty()
    }

    /// One-shot longest-match lookup over a string, preferring the longest
    /// semicolon-terminated match, falling back to the longest legacy match.
    pub(crate) fn lookup(&self, name: &str) -> Option<TrieMatch> {
        let mut node = ROOT;
        let mut best_semicolon: Option<(usize, &'static str)> = None;
        let mut best_legacy: Option<(usize, &'static str)> = None;
        for (i, c) in name.chars().enumerate() {
            match self.step(node, c) {
                Some(next) => {
                    node = next;
                    if let Some((replacement, ends_with_semicolon)) = self.resolved_at(node) {
                        let length = i + 1;
                        if ends_with_semicolon {
                            best_semicolon = Some((length, replacement));
                        } else {
                            best_legacy = Some((length, replacement));
                        }
                    }
                    if self.is_end_node(node) {
                        break;
                    }
                }
                None => break,
            }
        }
        best_semicolon
            .map(|(length, replacement)| TrieMatch {
                replacement,
                ends_with_semicolon: true,
                length,
            })
            .or_else(|| {
                best_legacy.map(|(length, replacement)| TrieMatch {
                    replacement,
                    ends_with_semicolon: false,
                    length,
                })
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EntityTrie {
        EntityTrie::build(&[
            ("lt", "<"),
            ("lt;", "<"),
            ("not", "\u{00AC}"),
            ("notin;", "\u{2209}"),
            ("amp", "&"),
            ("amp;", "&"),
        ])
    }

    #[test]
    fn prefers_longest_semicolon_match() {
        let trie = sample();
        let m = trie.lookup("lt;").unwrap();
        assert_eq!(m.replacement, "<");
        assert!(m.ends_with_semicolon);
        assert_eq!(m.length, 3);
    }

    #[test]
    fn falls_back_to_legacy_match() {
        let trie = sample();
        let m = trie.lookup("lt something").unwrap();
        assert_eq!(m.replacement, "<");
        assert!(!m.ends_with_semicolon);
        assert_eq!(m.length, 2);
    }

    #[test]
    fn surfaces_last_match_past_legacy_prefix() {
        // "&notin" should resolve as "&not" + "in" left over, since "notin" (no
        // semicolon) is not itself a valid entity.
        let trie = sample();
        let m = trie.lookup("notin").unwrap();
        assert_eq!(m.replacement, "\u{00AC}");
        assert_eq!(m.length, 3);
    }
}
