use std::collections::hash_map;
use std::collections::HashMap;
use std::fmt;

use crate::error::TreeError;
use crate::order;
use crate::path::DatPath;
use crate::payload::Payload;
use crate::record::BlobInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

impl NodeKind {
    fn as_str(self) -> &'static str {
        match self {
            NodeKind::File => "file",
            NodeKind::Directory => "directory",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Node {
    File(FileNode),
    Directory(Directory),
}

#[derive(Debug, Clone, Default)]
pub struct Directory {
    pub(crate) name: String,
    pub(crate) children: HashMap<String, Node>,
}

#[derive(Debug, Clone)]
pub struct FileNode {
    pub(crate) name: String,
    pub(crate) blob_index: Option<i16>,
    pub(crate) payload: Payload,
    pub(crate) info: Option<BlobInfo>,
}

impl Node {
    fn new(name: &str, kind: NodeKind) -> Node {
        match kind {
            NodeKind::File => Node::File(FileNode::new(name, Payload::default())),
            NodeKind::Directory => Node::Directory(Directory::new(name)),
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        match self {
            Node::File(file) => &file.name,
            Node::Directory(dir) => &dir.name,
        }
    }

    #[inline(always)]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::File(_) => NodeKind::File,
            Node::Directory(_) => NodeKind::Directory,
        }
    }

    #[inline(always)]
    pub fn is_dir(&self) -> bool {
        matches!(self, Node::Directory(_))
    }

    #[inline(always)]
    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(file) => Some(file),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn as_file_mut(&mut self) -> Option<&mut FileNode> {
        match self {
            Node::File(file) => Some(file),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn as_directory(&self) -> Option<&Directory> {
        match self {
            Node::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    #[inline(always)]
    pub fn as_directory_mut(&mut self) -> Option<&mut Directory> {
        match self {
            Node::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    fn set_name(&mut self, name: &str) {
        match self {
            Node::File(file) => file.name = name.to_string(),
            Node::Directory(dir) => dir.name = name.to_string(),
        }
    }
}

impl FileNode {
    pub fn new(name: &str, payload: Payload) -> FileNode {
        FileNode {
            name: name.to_string(),
            blob_index: None,
            payload,
            info: None,
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set once the file has been read from or written to an archive.
    #[inline(always)]
    pub fn blob_index(&self) -> Option<i16> {
        self.blob_index
    }

    #[inline(always)]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    #[inline(always)]
    pub fn info(&self) -> Option<&BlobInfo> {
        self.info.as_ref()
    }

    /// Replaces the file's bytes. The blob facts no longer apply.
    pub fn set_payload(&mut self, payload: Payload) {
        self.payload = payload;
        self.info = None;
    }
}

impl Directory {
    pub fn new(name: &str) -> Directory {
        Directory {
            name: name.to_string(),
            children: HashMap::new(),
        }
    }

    #[inline(always)]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    #[inline(always)]
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Whether any file exists somewhere below this directory.
    pub fn has_files(&self) -> bool {
        self.children.values().any(|child| match child {
            Node::File(_) => true,
            Node::Directory(dir) => dir.has_files(),
        })
    }

    pub fn sorted_children(&self) -> Vec<&Node> {
        let mut children = self.children.values().collect::<Vec<_>>();
        children.sort_by(|a, b| order::compare(a, b));
        children
    }

    /// Walks to the parent directory of `path`, creating missing directories.
    fn parent_mut_or_create(&mut self, path: &DatPath) -> Result<&mut Directory, TreeError> {
        let mut current = self;
        let depth = path.depth();

        for (i, part) in path.iter().take(depth).enumerate() {
            let node = current
                .children
                .entry(part.to_string())
                .or_insert_with(|| Node::Directory(Directory::new(part)));

            match node {
                Node::Directory(dir) => current = dir,
                Node::File(_) => {
                    return Err(TreeError::KindConflict {
                        path: path.prefix(i + 1),
                        found: NodeKind::File.as_str(),
                    })
                }
            }
        }

        Ok(current)
    }

    /// Resolves an existing directory. `None` is this directory.
    fn dir_mut(&mut self, path: Option<&DatPath>) -> Result<&mut Directory, TreeError> {
        let path = match path {
            Some(path) => path,
            None => return Ok(self),
        };

        match self.lookup_mut(path) {
            Some(Node::Directory(dir)) => Ok(dir),
            Some(Node::File(_)) => Err(TreeError::NotADirectory { path: path.clone() }),
            None => Err(TreeError::NotFound { path: path.clone() }),
        }
    }

    /// Finds or creates the node at `path`, creating intermediate directories.
    ///
    /// A component that already exists with the other kind is an error; the
    /// existing node is left untouched. New files start with an empty payload.
    pub fn insert(&mut self, path: &DatPath, kind: NodeKind) -> Result<&mut Node, TreeError> {
        let parent = self.parent_mut_or_create(path)?;
        let name = path.filename();

        match parent.children.entry(name.to_string()) {
            hash_map::Entry::Occupied(entry) => {
                let found = entry.get().kind();
                if found != kind {
                    return Err(TreeError::KindConflict {
                        path: path.clone(),
                        found: found.as_str(),
                    });
                }
                Ok(entry.into_mut())
            }
            hash_map::Entry::Vacant(entry) => Ok(entry.insert(Node::new(name, kind))),
        }
    }

    /// Inserts a file, or replaces the payload of an existing one.
    pub fn insert_file(
        &mut self,
        path: &DatPath,
        payload: Payload,
    ) -> Result<&mut FileNode, TreeError> {
        match self.insert(path, NodeKind::File)? {
            Node::File(file) => {
                file.set_payload(payload);
                Ok(file)
            }
            Node::Directory(_) => Err(TreeError::KindConflict {
                path: path.clone(),
                found: NodeKind::Directory.as_str(),
            }),
        }
    }

    pub fn insert_dir(&mut self, path: &DatPath) -> Result<&mut Directory, TreeError> {
        match self.insert(path, NodeKind::Directory)? {
            Node::Directory(dir) => Ok(dir),
            Node::File(_) => Err(TreeError::KindConflict {
                path: path.clone(),
                found: NodeKind::File.as_str(),
            }),
        }
    }

    pub fn lookup(&self, path: &DatPath) -> Option<&Node> {
        let mut parts = path.iter();
        let mut node = self.children.get(parts.next()?)?;
        for part in parts {
            node = node.as_directory()?.children.get(part)?;
        }
        Some(node)
    }

    pub fn lookup_mut(&mut self, path: &DatPath) -> Option<&mut Node> {
        let mut parts = path.iter();
        let mut node = self.children.get_mut(parts.next()?)?;
        for part in parts {
            node = node.as_directory_mut()?.children.get_mut(part)?;
        }
        Some(node)
    }

    /// Detaches the node at `path`. A non-empty directory is only removed
    /// when `recursive` is set.
    pub fn remove(&mut self, path: &DatPath, recursive: bool) -> Result<Node, TreeError> {
        let parent = self.dir_mut(path.parent().as_ref())?;
        let name = path.filename();

        match parent.children.get(name) {
            None => return Err(TreeError::NotFound { path: path.clone() }),
            Some(Node::Directory(dir)) if !recursive && !dir.is_empty() => {
                return Err(TreeError::DirectoryNotEmpty { path: path.clone() })
            }
            Some(_) => {}
        }

        parent
            .children
            .remove(name)
            .ok_or_else(|| TreeError::NotFound { path: path.clone() })
    }

    /// Moves the node at `from` to `to`, subtree included. The destination's
    /// parent must already exist.
    pub fn rename(&mut self, from: &DatPath, to: &DatPath, replace: bool) -> Result<(), TreeError> {
        if from == to {
            return match self.lookup(from) {
                Some(_) => Ok(()),
                None => Err(TreeError::NotFound { path: from.clone() }),
            };
        }

        if to.starts_with(from) {
            return Err(TreeError::InvalidMove {
                from: from.clone(),
                to: to.clone(),
            });
        }

        if self.lookup(from).is_none() {
            return Err(TreeError::NotFound { path: from.clone() });
        }

        let dest = self.dir_mut(to.parent().as_ref())?;
        match dest.children.get(to.filename()) {
            Some(_) if !replace => return Err(TreeError::AlreadyExists { path: to.clone() }),
            Some(Node::Directory(dir)) if !dir.is_empty() => {
                return Err(TreeError::DirectoryNotEmpty { path: to.clone() })
            }
            _ => {}
        }

        let mut node = self.remove(from, true)?;
        node.set_name(to.filename());

        let dest = self.dir_mut(to.parent().as_ref())?;
        dest.children.insert(to.filename().to_string(), node);
        Ok(())
    }

    /// Every file below this directory, paths relative to it, in emission order.
    pub fn files(&self) -> Vec<(DatPath, &FileNode)> {
        let mut out = vec![];
        self.collect_files(None, &mut out);
        out
    }

    fn collect_files<'a>(
        &'a self,
        prefix: Option<&DatPath>,
        out: &mut Vec<(DatPath, &'a FileNode)>,
    ) {
        for child in self.sorted_children() {
            let path = match prefix {
                Some(prefix) => DatPath(format!("{}/{}", prefix.as_str(), child.name())),
                None => DatPath(child.name().to_string()),
            };
            match child {
                Node::File(file) => out.push((path, file)),
                Node::Directory(dir) => dir.collect_files(Some(&path), out),
            }
        }
    }

    pub fn display_tree(&self) -> TreeDisplay<'_> {
        TreeDisplay { root: self }
    }
}

/// Renders a directory as a box-drawing tree, one node per line.
pub struct TreeDisplay<'a> {
    root: &'a Directory,
}

impl TreeDisplay<'_> {
    fn write_level(
        f: &mut fmt::Formatter<'_>,
        dir: &Directory,
        indent: &mut String,
    ) -> fmt::Result {
        let children = dir.sorted_children();
        let count = children.len();

        for (i, child) in children.into_iter().enumerate() {
            let last = i + 1 == count;
            writeln!(
                f,
                "{}{}{}",
                indent,
                if last { "└── " } else { "├── " },
                child.name()
            )?;

            if let Node::Directory(sub) = child {
                let len = indent.len();
                indent.push_str(if last { "    " } else { "│   " });
                Self::write_level(f, sub, indent)?;
                indent.truncate(len);
            }
        }
        Ok(())
    }
}

impl fmt::Display for TreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.root.name.is_empty() {
            writeln!(f, "{}", self.root.name)?;
        }
        Self::write_level(f, self.root, &mut String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> DatPath {
        DatPath::new(s).unwrap()
    }

    fn tree() -> Directory {
        let mut root = Directory::default();
        root.insert_file(&p("chars/hero.ghg"), Payload::Memory(b"hero".to_vec()))
            .unwrap();
        root.insert_file(&p("chars/ai/hero.ai"), Payload::Memory(b"ai".to_vec()))
            .unwrap();
        root.insert_file(&p("readme.txt"), Payload::Memory(b"hi".to_vec()))
            .unwrap();
        root
    }

    #[test]
    fn insert_creates_parents() {
        let root = tree();
        assert!(root.lookup(&p("chars")).unwrap().is_dir());
        assert!(root.lookup(&p("chars/ai")).unwrap().is_dir());
        assert_eq!(
            root.lookup(&p("chars/ai/hero.ai"))
                .and_then(Node::as_file)
                .unwrap()
                .payload(),
            &Payload::Memory(b"ai".to_vec())
        );
        assert!(root.lookup(&p("Chars")).is_none());
    }

    #[test]
    fn insert_existing_returns_it() {
        let mut root = tree();
        let node = root.insert(&p("chars"), NodeKind::Directory).unwrap();
        assert_eq!(node.as_directory().unwrap().len(), 2);

        let file = root
            .insert_file(&p("readme.txt"), Payload::Memory(b"new".to_vec()))
            .unwrap();
        assert_eq!(file.payload(), &Payload::Memory(b"new".to_vec()));
    }

    #[test]
    fn kind_conflicts_are_errors() {
        let mut root = tree();
        assert!(matches!(
            root.insert(&p("readme.txt/x"), NodeKind::File),
            Err(TreeError::KindConflict { found: "file", .. })
        ));
        assert!(matches!(
            root.insert_dir(&p("readme.txt")),
            Err(TreeError::KindConflict { found: "file", .. })
        ));
        assert!(matches!(
            root.insert_file(&p("chars"), Payload::default()),
            Err(TreeError::KindConflict {
                found: "directory",
                ..
            })
        ));
    }

    #[test]
    fn remove() {
        let mut root = tree();
        assert!(matches!(
            root.remove(&p("chars"), false),
            Err(TreeError::DirectoryNotEmpty { .. })
        ));
        assert!(matches!(
            root.remove(&p("missing"), false),
            Err(TreeError::NotFound { .. })
        ));
        root.remove(&p("chars/hero.ghg"), false).unwrap();
        let removed = root.remove(&p("chars"), true).unwrap();
        assert_eq!(removed.name(), "chars");
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn rename_moves_subtree() {
        let mut root = tree();
        root.insert_dir(&p("backup")).unwrap();
        root.rename(&p("chars"), &p("backup/people"), false).unwrap();

        assert!(root.lookup(&p("chars")).is_none());
        let moved = root.lookup(&p("backup/people/ai/hero.ai")).unwrap();
        assert_eq!(moved.name(), "hero.ai");
        assert_eq!(root.lookup(&p("backup/people")).unwrap().name(), "people");
    }

    #[test]
    fn rename_checks_destination() {
        let mut root = tree();
        root.insert_file(&p("other.txt"), Payload::default()).unwrap();

        assert!(matches!(
            root.rename(&p("other.txt"), &p("readme.txt"), false),
            Err(TreeError::AlreadyExists { .. })
        ));
        assert!(matches!(
            root.rename(&p("other.txt"), &p("nowhere/readme.txt"), false),
            Err(TreeError::NotFound { .. })
        ));
        assert!(matches!(
            root.rename(&p("chars"), &p("chars/ai/chars"), false),
            Err(TreeError::InvalidMove { .. })
        ));

        root.rename(&p("other.txt"), &p("readme.txt"), true).unwrap();
        assert_eq!(
            root.lookup(&p("readme.txt"))
                .and_then(Node::as_file)
                .unwrap()
                .payload(),
            &Payload::default()
        );
        assert!(root.lookup(&p("other.txt")).is_none());
    }

    #[test]
    fn files_in_order() {
        let root = tree();
        let paths = root
            .files()
            .into_iter()
            .map(|(path, _)| path.to_string())
            .collect::<Vec<_>>();
        let sep = crate::path::PATH_PLATFORM_SEP;
        assert_eq!(
            paths,
            vec![
                "readme.txt".to_string(),
                format!("chars{sep}hero.ghg"),
                format!("chars{sep}ai{sep}hero.ai"),
            ]
        );
    }

    #[test]
    fn display() {
        let root = tree();
        let rendered = root.display_tree().to_string();
        assert_eq!(
            rendered,
            "├── readme.txt\n└── chars\n    ├── hero.ghg\n    └── ai\n        └── hero.ai\n"
        );
    }
}
