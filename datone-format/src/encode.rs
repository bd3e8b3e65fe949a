//! Flattens a directory tree into the entry table.
//!
//! Entries are emitted depth-first in sibling order. Index 0 is the unnamed
//! root, whose blob index is the last index of the table. Files take blob
//! indices `0, -1, -2, ...` in emission order.

use crate::decode::MAX_DEPTH;
use crate::error::StructuralError;
use crate::game::Game;
use crate::node::{Directory, Node};
use crate::path::DatPath;
use crate::record::Entry;

/// The tables produced by one encode pass. `names[i]` belongs to
/// `entries[i]`; `leaves[k]` is the file whose bytes go in blob `k`.
#[derive(Debug, Default)]
pub struct EncodedTable {
    pub entries: Vec<Entry>,
    pub names: Vec<String>,
    pub leaves: Vec<DatPath>,
}

/// Running state of one directory level.
#[derive(Debug, Clone, Copy)]
struct Level {
    /// Index of the last entry emitted so far.
    end: i32,
    first_child: i32,
    next_blob: i32,
    only_files: bool,
}

struct Encoder {
    game: Game,
    out: EncodedTable,
}

fn to_i16(value: i32, count: usize) -> Result<i16, StructuralError> {
    i16::try_from(value).map_err(|_| StructuralError::TooManyEntries { count })
}

/// Children in emission order. Directories with no files below them have no
/// way to be represented and are dropped.
fn emitted_children(dir: &Directory) -> Vec<&Node> {
    dir.sorted_children()
        .into_iter()
        .filter(|child| match child {
            Node::File(_) => true,
            Node::Directory(sub) => {
                let keep = sub.has_files();
                if !keep {
                    tracing::debug!(name = sub.name(), "skipping directory without files");
                }
                keep
            }
        })
        .collect()
}

impl Encoder {
    fn walk(
        &mut self,
        dir: &Directory,
        prefix: Option<&DatPath>,
        start: i32,
        next_blob: i32,
        depth: usize,
    ) -> Result<Level, StructuralError> {
        if depth > MAX_DEPTH {
            return Err(StructuralError::TooDeep { depth: MAX_DEPTH });
        }

        let children = emitted_children(dir);
        let first_dir = children.iter().position(|c| c.is_dir());

        let mut level = Level {
            end: start,
            first_child: 0,
            next_blob,
            only_files: first_dir.is_none(),
        };

        for (i, child) in children.iter().enumerate() {
            let path = match prefix {
                Some(prefix) => DatPath(format!("{}/{}", prefix.as_str(), child.name())),
                None => DatPath(child.name().to_string()),
            };

            let slot = self.out.entries.len();
            self.out.entries.push(Entry::default());
            self.out.names.push(child.name().to_string());

            let entry = match child {
                Node::File(_) => {
                    let blob_index = i16::try_from(level.next_blob).map_err(|_| {
                        StructuralError::TooManyBlobs {
                            count: self.out.leaves.len() + 1,
                        }
                    })?;
                    level.next_blob -= 1;
                    self.out.leaves.push(path);

                    let node_index = if i > 0 {
                        level.end += 1;
                        level.end - 1
                    } else {
                        level.end += 1;
                        level.first_child = level.end;
                        0
                    };

                    Entry {
                        blob_index,
                        node_index: to_i16(node_index, slot + 1)?,
                        name: 0,
                    }
                }
                Node::Directory(sub) => {
                    let inner =
                        self.walk(sub, Some(&path), level.end + 1, level.next_blob, depth + 1)?;
                    level.next_blob = inner.next_blob;

                    let blob_index = if inner.only_files {
                        inner.end
                    } else {
                        inner.first_child
                    };

                    let node_index = if i == 0 {
                        0
                    } else if self.game.links_to_cursor(child.name(), first_dir == Some(i)) {
                        level.end
                    } else {
                        level.first_child
                    };

                    level.first_child = level.end + 1;
                    level.end = inner.end;

                    let count = self.out.entries.len();
                    Entry {
                        blob_index: to_i16(blob_index, count)?,
                        node_index: to_i16(node_index, count)?,
                        name: 0,
                    }
                }
            };
            self.out.entries[slot] = entry;
        }

        Ok(level)
    }
}

/// Flattens `root` into entries, names and the blob order.
pub fn encode(root: &Directory, game: Game) -> Result<EncodedTable, StructuralError> {
    let mut encoder = Encoder {
        game,
        out: EncodedTable {
            entries: vec![Entry::default()],
            names: vec![String::new()],
            leaves: vec![],
        },
    };

    let level = encoder.walk(root, None, 0, 0, 0)?;
    let count = encoder.out.entries.len();
    encoder.out.entries[0].blob_index = to_i16(level.end, count)?;

    tracing::debug!(
        entries = count,
        blobs = encoder.out.leaves.len(),
        %game,
        "encoded tree"
    );

    Ok(encoder.out)
}
