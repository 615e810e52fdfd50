use crate::gather::CandidatePath;
use crate::reader;
use log;
use std::path::{Component, PathBuf};

pub const STRUCTURE_HEADER: &str = "## Directory Structure";

pub fn count_prefix(char_count: usize) -> String {
    format!("[{} chars] ", char_count)
}

/// The summary section: header, one line per path, then a blank line.
///
/// Every input path gets a line. With counts enabled, an unreadable file is
/// listed as `[0 chars]`.
pub fn render_structure(paths: &[CandidatePath], with_char_counts: bool) -> String {
    let mut out = String::new();
    out.push_str(STRUCTURE_HEADER);
    out.push('\n');
    for candidate in paths {
        if with_char_counts {
            out.push_str(&count_prefix(reader::char_count_or_zero(&candidate.absolute)));
        }
        out.push_str(&candidate.display());
        out.push('\n');
    }
    out.push('\n');
    out
}

#[derive(Debug, Clone)]
struct TreeNode {
    name: String,
    children: Vec<TreeNode>,
}

impl TreeNode {
    fn is_dir(&self) -> bool {
        !self.children.is_empty()
    }
}

/// Indented tree of repository paths, two spaces per level, directories
/// suffixed with `/`. Entries deeper than `depth` are elided; `0` means no limit.
pub fn render_tree(paths: &[PathBuf], depth: usize) -> String {
    log::debug!("Building tree from {} paths (depth {})...", paths.len(), depth);
    let mut roots: Vec<TreeNode> = Vec::new();
    for path in paths {
        let components: Vec<String> = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        insert_node(&mut roots, &components);
    }

    let mut out = String::new();
    write_level(&mut out, &roots, 1, depth);
    // Drop the final newline so callers can embed the tree like other git output.
    out.truncate(out.trim_end().len());
    out
}

fn insert_node(level: &mut Vec<TreeNode>, components: &[String]) {
    let Some((name, rest)) = components.split_first() else {
        return;
    };
    let index = match level.binary_search_by(|node| node.name.cmp(name)) {
        Ok(index) => index,
        Err(insertion_point) => {
            level.insert(
                insertion_point,
                TreeNode {
                    name: name.clone(),
                    children: Vec::new(),
                },
            );
            insertion_point
        }
    };
    insert_node(&mut level[index].children, rest);
}

fn write_level(out: &mut String, nodes: &[TreeNode], level: usize, depth: usize) {
    for node in nodes {
        out.push_str(&"  ".repeat(level - 1));
        out.push_str(&node.name);
        if node.is_dir() {
            out.push('/');
        }
        out.push('\n');
        if depth == 0 || level < depth {
            write_level(out, &node.children, level + 1, depth);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn structure_lists_every_path_with_counts() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "hello").unwrap();
        let candidates = vec![
            CandidatePath::tracked(dir.path(), PathBuf::from("a.txt")),
            CandidatePath::tracked(dir.path(), PathBuf::from("vanished.txt")),
        ];
        assert_eq!(
            render_structure(&candidates, true),
            "## Directory Structure\n[5 chars] a.txt\n[0 chars] vanished.txt\n\n"
        );
        assert_eq!(
            render_structure(&candidates, false),
            "## Directory Structure\na.txt\nvanished.txt\n\n"
        );
    }

    #[test]
    fn empty_structure_is_header_and_blank_line() {
        assert_eq!(render_structure(&[], false), "## Directory Structure\n\n");
    }

    #[test]
    fn tree_sorts_and_nests() {
        let tree = render_tree(&paths(&["src/main.rs", "Cargo.toml", "src/lib/mod.rs"]), 0);
        assert_eq!(tree, "Cargo.toml\nsrc/\n  lib/\n    mod.rs\n  main.rs");
    }

    #[test]
    fn tree_respects_depth() {
        let tree = render_tree(&paths(&["a/b/c/d.txt", "top.txt"]), 2);
        assert_eq!(tree, "a/\n  b/\ntop.txt");
    }
}
