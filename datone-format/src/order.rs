//! The sibling order entries are emitted in.
//!
//! Files sort ahead of every directory. Within each group, names are split on their
//! first `.` into stem and extension. A stem ending in `-ai`, `-old` or `-tmp`
//! (case-insensitive) sorts before one that doesn't, then stems and extensions
//! are compared character by character with `_` placed right after `z`.

use std::cmp::Ordering;

use crate::node::Node;

pub const BUZZWORDS: [&str; 3] = ["ai", "old", "tmp"];

#[inline]
pub fn is_buzzword(name: &str) -> bool {
    BUZZWORDS.contains(&name)
}

fn rank(node: &Node) -> u8 {
    match node {
        Node::File(_) => 0,
        Node::Directory(_) => 1,
    }
}

pub fn compare(a: &Node, b: &Node) -> Ordering {
    rank(a)
        .cmp(&rank(b))
        .then_with(|| compare_names(a.name(), b.name()))
}

fn split(name: &str) -> (&str, &str) {
    name.split_once('.').unwrap_or((name, ""))
}

fn has_buzz_suffix(stem: &str) -> bool {
    stem.to_lowercase()
        .rsplit_once('-')
        .map_or(false, |(_, tail)| is_buzzword(tail))
}

#[inline]
fn key(c: char) -> u64 {
    match c {
        '_' => 'z' as u64 * 2 + 1,
        c => c as u64 * 2,
    }
}

fn compare_keys(a: &str, b: &str) -> Ordering {
    a.chars().map(key).cmp(b.chars().map(key))
}

pub fn compare_names(a: &str, b: &str) -> Ordering {
    let (a_stem, a_ext) = split(a);
    let (b_stem, b_ext) = split(b);

    match (has_buzz_suffix(a_stem), has_buzz_suffix(b_stem)) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }

    compare_keys(a_stem, b_stem)
        .then_with(|| compare_keys(a_ext, b_ext))
        // "a" and "a." split identically
        .then_with(|| a.cmp(b))
}
