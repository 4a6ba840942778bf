use html5ever::QualName;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub mod dom_tree {
    use super::*;

    pub type Handle = Rc<RefCell<Node>>;

    #[derive(Debug)]
    pub struct Node {
        pub data: NodeData,
        pub parent: Option<Weak<RefCell<Node>>>,
        pub children: Vec<Handle>,
    }

    #[derive(Debug, Clone)]
    pub enum NodeData {
        DocumentRoot,
        Element(ElementNode),
        Text,
        Comment,
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        pub tag: String,
        pub qual_name: QualName,
        /// Attributes in source order, keyed by local name.
        pub attributes: Vec<(String, String)>,
    }

    #[derive(Debug)]
    pub struct Document {
        pub root: Handle,
    }

    impl Node {
        pub fn new(data: NodeData) -> Handle {
            Rc::new(RefCell::new(Node {
                data,
                parent: None,
                children: Vec::new(),
            }))
        }

        pub fn as_element(&self) -> Option<&ElementNode> {
            match &self.data {
                NodeData::Element(elem) => Some(elem),
                _ => None,
            }
        }
    }

    /// Tears the subtree down level by level so deep documents do not exhaust the stack.
    impl Drop for Node {
        fn drop(&mut self) {
            let mut pending = std::mem::take(&mut self.children);
            while let Some(child) = pending.pop() {
                if let Ok(cell) = Rc::try_unwrap(child) {
                    let mut node = cell.into_inner();
                    pending.append(&mut node.children);
                }
            }
        }
    }

    impl ElementNode {
        pub fn new(qual_name: QualName, attributes: Vec<(String, String)>) -> Self {
            ElementNode {
                tag: qual_name.local.to_string(),
                qual_name,
                attributes,
            }
        }

        pub fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }

        /// Whitespace-separated tokens of the `class` attribute; empty tokens are skipped.
        pub fn class_tokens(&self) -> impl Iterator<Item = &str> {
            self.attribute("class")
                .into_iter()
                .flat_map(|value| value.split_whitespace())
        }
    }

    pub fn new_document() -> Document {
        Document {
            root: Node::new(NodeData::DocumentRoot),
        }
    }

    /// Appends `child` to `parent`, detaching it from any previous parent first.
    pub fn append_child(parent: &Handle, child: Handle) {
        detach(&child);
        child.borrow_mut().parent = Some(Rc::downgrade(parent));
        parent.borrow_mut().children.push(child);
    }

    /// Inserts `child` right before `sibling` in the sibling's parent.
    pub fn insert_before(sibling: &Handle, child: Handle) {
        let parent = match sibling.borrow().parent.as_ref().and_then(Weak::upgrade) {
            Some(parent) => parent,
            None => return,
        };
        detach(&child);
        let mut parent_node = parent.borrow_mut();
        let index = parent_node
            .children
            .iter()
            .position(|c| Rc::ptr_eq(c, sibling))
            .unwrap_or(parent_node.children.len());
        child.borrow_mut().parent = Some(Rc::downgrade(&parent));
        parent_node.children.insert(index, child);
    }

    /// Removes `node` from its parent's child list.
    pub fn detach(node: &Handle) {
        let parent = node.borrow_mut().parent.take().and_then(|weak| weak.upgrade());
        if let Some(parent) = parent {
            parent
                .borrow_mut()
                .children
                .retain(|c| !Rc::ptr_eq(c, node));
        }
    }

    /// Moves every child of `node` to the end of `new_parent`.
    pub fn reparent_children(node: &Handle, new_parent: &Handle) {
        let children = std::mem::take(&mut node.borrow_mut().children);
        for child in children {
            child.borrow_mut().parent = Some(Rc::downgrade(new_parent));
            new_parent.borrow_mut().children.push(child);
        }
    }

    /// Depth-first pre-order walk over every element below `node`.
    ///
    /// Uses an explicit stack, so nesting depth is bounded by memory rather
    /// than by the thread's stack size.
    pub fn for_each_element<F: FnMut(&ElementNode)>(node: &Handle, visit: &mut F) {
        let mut stack = vec![node.clone()];
        while let Some(current) = stack.pop() {
            let current_ref = current.borrow();
            if let NodeData::Element(elem) = &current_ref.data {
                visit(elem);
            }
            stack.extend(current_ref.children.iter().rev().cloned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::dom_tree::*;
    use html5ever::{LocalName, Namespace, QualName};

    fn element(tag: &str, class: Option<&str>) -> Handle {
        let qual_name = QualName::new(
            None,
            Namespace::from("http://www.w3.org/1999/xhtml"),
            LocalName::from(tag),
        );
        let attributes = class
            .map(|c| vec![("class".to_string(), c.to_string())])
            .unwrap_or_default();
        Node::new(NodeData::Element(ElementNode::new(qual_name, attributes)))
    }

    fn tags(node: &Handle) -> Vec<String> {
        let mut out = Vec::new();
        for_each_element(node, &mut |elem| out.push(elem.tag.clone()));
        out
    }

    #[test]
    fn test_class_tokens_skip_empty() {
        let div = element("div", Some("  a \t b\n\nc  "));
        let node = div.borrow();
        let tokens: Vec<_> = node.as_element().unwrap().class_tokens().collect();
        assert_eq!(tokens, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_before_and_detach() {
        let doc = new_document();
        let body = element("body", None);
        append_child(&doc.root, body.clone());
        let p = element("p", None);
        append_child(&body, p.clone());
        insert_before(&p, element("table", None));
        assert_eq!(tags(&doc.root), vec!["body", "table", "p"]);

        detach(&p);
        assert_eq!(tags(&doc.root), vec!["body", "table"]);
    }

    #[test]
    fn test_reparent_children() {
        let from = element("div", None);
        let to = element("section", None);
        append_child(&from, element("span", None));
        append_child(&from, element("em", None));
        reparent_children(&from, &to);
        assert!(from.borrow().children.is_empty());
        assert_eq!(tags(&to), vec!["section", "span", "em"]);
    }

    #[test]
    fn test_walk_keeps_document_order() {
        let root = element("body", None);
        let outer = element("div", None);
        append_child(&outer, element("h1", None));
        append_child(&outer, element("p", None));
        append_child(&root, outer);
        append_child(&root, element("footer", None));
        assert_eq!(tags(&root), vec!["body", "div", "h1", "p", "footer"]);
    }

    #[test]
    fn test_deep_chain_walks_and_drops() {
        let depth = 200_000;
        let doc = new_document();
        let mut parent = doc.root.clone();
        for _ in 0..depth {
            let child = element("div", Some("x"));
            append_child(&parent, child.clone());
            parent = child;
        }
        drop(parent);

        let mut visited = 0usize;
        for_each_element(&doc.root, &mut |_| visited += 1);
        assert_eq!(visited, depth);
        drop(doc);
    }
}
