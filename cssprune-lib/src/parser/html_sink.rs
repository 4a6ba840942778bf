//! This module contains the html5ever `TreeSink` that turns HTML into the
//! DOM tree defined in `crate::dom::dom_tree`.
//!
//! html5ever applies the HTML5 error-recovery rules, so any input produces a
//! tree. Recoverable errors are recorded on the side and handed back with the
//! document for callers that want to be strict about them.

use crate::dom::dom_tree::{self, Handle, Node, NodeData};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tokenizer::TokenizerOpts;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{
    interface::{ElemName, ElementFlags, NodeOrText, QuirksMode, TreeSink},
    Attribute, LocalName, Namespace, ParseOpts, QualName,
};
use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

/// A parsed document plus the recoverable errors html5ever reported on the way.
#[derive(Debug)]
pub struct ParsedHtml {
    pub document: dom_tree::Document,
    /// Errors raised from the root element onwards. Complaints about the
    /// prologue, such as a missing `<!DOCTYPE>`, are not included.
    pub errors: Vec<Cow<'static, str>>,
}

/// Creates a DOM tree from the provided HTML content.
///
/// # Arguments
///
/// * `html_content` - A string slice containing the HTML to parse.
///
/// # Returns
///
/// A [`ParsedHtml`] holding the document and the recoverable errors html5ever
/// reported. Parsing itself never fails.
pub fn create_dom_tree(html_content: &str) -> ParsedHtml {
    let tree_sink = CssPruneTreeSink::new();
    let opts = ParseOpts {
        tokenizer: TokenizerOpts {
            exact_errors: true,
            ..Default::default()
        },
        tree_builder: TreeBuilderOpts {
            exact_errors: true,
            ..Default::default()
        },
    };
    html5ever::parse_document(tree_sink, opts).one(html_content)
}

/// Builds the DOM while html5ever drives the tree construction.
pub struct CssPruneTreeSink {
    document: dom_tree::Document,
    errors: RefCell<Vec<Cow<'static, str>>>,
    root_created: Cell<bool>,
}

impl CssPruneTreeSink {
    pub fn new() -> Self {
        Self {
            document: dom_tree::new_document(),
            errors: RefCell::new(Vec::new()),
            root_created: Cell::new(false),
        }
    }

    fn into_node(child: NodeOrText<Handle>) -> Handle {
        match child {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(_) => Node::new(NodeData::Text),
        }
    }
}

impl Default for CssPruneTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
pub struct SinkElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for SinkElemName {
    fn local_name(&self) -> &LocalName {
        &self.local
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }
}

impl TreeSink for CssPruneTreeSink {
    type Handle = Handle;
    type Output = ParsedHtml;
    type ElemName<'a>
        = SinkElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        ParsedHtml {
            document: self.document,
            errors: self.errors.into_inner(),
        }
    }

    /// Errors before the root element concern the doctype and are only logged.
    fn parse_error(&self, msg: Cow<'static, str>) {
        if !self.root_created.get() {
            log::trace!("ignoring HTML prologue error: {}", msg);
            return;
        }
        log::debug!("HTML parse error: {}", msg);
        self.errors.borrow_mut().push(msg);
    }

    fn get_document(&self) -> Self::Handle {
        self.document.root.clone()
    }

    /// html5ever only asks for names of element handles; anything else gets an empty name.
    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        match target.borrow().as_element() {
            Some(elem) => SinkElemName {
                ns: elem.qual_name.ns.clone(),
                local: elem.qual_name.local.clone(),
            },
            None => SinkElemName {
                ns: Namespace::from(""),
                local: LocalName::from(""),
            },
        }
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<Attribute>,
        _flags: ElementFlags,
    ) -> Self::Handle {
        self.root_created.set(true);
        let attributes = attrs
            .into_iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect::<Vec<_>>();
        Node::new(NodeData::Element(dom_tree::ElementNode::new(
            name, attributes,
        )))
    }

    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        Node::new(NodeData::Comment)
    }

    fn create_pi(&self, _target: StrTendril, _data: StrTendril) -> Self::Handle {
        Node::new(NodeData::Comment)
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        dom_tree::append_child(parent, Self::into_node(child));
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        let has_parent = element
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some();
        if has_parent {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        _name: StrTendril,
        _public_id: StrTendril,
        _system_id: StrTendril,
    ) {
    }

    /// Template contents live directly under the template element so their classes are seen.
    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, _mode: QuirksMode) {}

    fn append_before_sibling(&self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>) {
        dom_tree::insert_before(sibling, Self::into_node(child));
    }

    /// Merges attributes of a repeated `<html>` or `<body>` tag into the existing element.
    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<Attribute>) {
        let mut target_node = target.borrow_mut();
        if let NodeData::Element(elem) = &mut target_node.data {
            for attr in attrs {
                let key = attr.name.local.to_string();
                if !elem.attributes.iter().any(|(k, _)| k == &key) {
                    elem.attributes.push((key, attr.value.to_string()));
                }
            }
        }
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        dom_tree::detach(target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        dom_tree::reparent_children(node, new_parent);
    }
}
