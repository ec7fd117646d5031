//! Header outline and table-of-contents anchors.
//!
//! Anchors are derived, never stored: the n-th header of a document (counting
//! in document order, descending into sections and table cells) is `toc-n`.
//! Formatters that number headers while they walk the document arrive at the
//! same anchors as [`Document::outline`].

use super::nodes::{Block, Document, Inline};

/// Anchor of the header at zero-based position `index` in document order.
pub fn header_anchor(index: usize) -> String {
    format!("toc-{}", index + 1)
}

#[derive(Debug, Clone, PartialEq)]
pub struct OutlineEntry {
    pub level: u8,
    pub anchor: String,
    pub content: Vec<Inline>,
}

/// An outline entry together with the deeper entries that follow it.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlineNode {
    pub entry: OutlineEntry,
    pub children: Vec<OutlineNode>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outline {
    pub entries: Vec<OutlineEntry>,
}

impl Document {
    /// Every header of the document, in document order.
    pub fn outline(&self) -> Outline {
        let mut entries = Vec::new();
        collect(&self.blocks, &mut entries);
        Outline { entries }
    }
}

fn collect(blocks: &[Block], entries: &mut Vec<OutlineEntry>) {
    for block in blocks {
        match block {
            Block::Header(header) => {
                let anchor = header_anchor(entries.len());
                entries.push(OutlineEntry {
                    level: header.level,
                    anchor,
                    content: header.content.clone(),
                });
            }
            Block::Section(section) => collect(&section.blocks, entries),
            Block::Table(table) => {
                for cell in table.rows.iter().flat_map(|row| row.cells.iter()) {
                    collect(&cell.content, entries);
                }
            }
            _ => {}
        }
    }
}

impl Outline {
    /// Entries up to `levels`, nested under the closest shallower entry.
    pub fn nested(&self, levels: u8) -> Vec<OutlineNode> {
        let mut roots = Vec::new();
        let mut stack: Vec<OutlineNode> = Vec::new();

        for entry in self.entries.iter().filter(|e| e.level <= levels) {
            while stack
                .last()
                .is_some_and(|top| top.entry.level >= entry.level)
            {
                if let Some(done) = stack.pop() {
                    attach(&mut stack, &mut roots, done);
                }
            }
            stack.push(OutlineNode {
                entry: entry.clone(),
                children: Vec::new(),
            });
        }
        while let Some(done) = stack.pop() {
            attach(&mut stack, &mut roots, done);
        }
        roots
    }
}

fn attach(stack: &mut [OutlineNode], roots: &mut Vec<OutlineNode>, node: OutlineNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => roots.push(node),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Header, Section};

    fn header(level: usize, text: &str) -> Block {
        Block::Header(Header::new(level, vec![Inline::run(text)]))
    }

    #[test]
    fn anchors_follow_document_order() {
        let doc = Document::with_blocks(vec![
            header(1, "A"),
            Block::Section(Section {
                class: "note".to_string(),
                blocks: vec![header(2, "B")],
            }),
            header(2, "C"),
        ]);
        let anchors: Vec<_> = doc
            .outline()
            .entries
            .into_iter()
            .map(|e| e.anchor)
            .collect();
        assert_eq!(anchors, vec!["toc-1", "toc-2", "toc-3"]);
    }

    #[test]
    fn nested_outline_respects_level_bound() {
        let doc = Document::with_blocks(vec![
            header(1, "A"),
            header(2, "A.1"),
            header(3, "A.1.a"),
            header(2, "A.2"),
            header(1, "B"),
        ]);
        let tree = doc.outline().nested(2);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].children.len(), 2);
        assert!(tree[0].children[0].children.is_empty());
        assert_eq!(tree[1].entry.anchor, "toc-5");
    }
}
