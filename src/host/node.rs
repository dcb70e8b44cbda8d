use std::cell::RefCell;
use std::rc::{Rc, Weak};

use super::error::HostError;
use super::value::{HostObject, ObjectKind, ObjectRef};

/// A node in a rendered-document tree.
pub struct NodeData {
    node_name: String,
    local_name: Option<String>,
    outer_html: Option<String>,
    element: bool,
    parent: RefCell<Weak<HostObject>>,
    children: RefCell<Vec<ObjectRef>>,
}

impl NodeData {
    fn new(
        node_name: String,
        local_name: Option<String>,
        outer_html: Option<String>,
        element: bool,
    ) -> Self {
        Self {
            node_name,
            local_name,
            outer_html,
            element,
            parent: RefCell::new(Weak::new()),
            children: RefCell::new(Vec::new()),
        }
    }

    pub fn node_name(&self) -> &str {
        &self.node_name
    }

    /// Tag name for elements; `None` for text, comment and document nodes.
    pub fn local_name(&self) -> Option<&str> {
        self.local_name.as_deref()
    }

    pub fn outer_html(&self) -> Option<&str> {
        self.outer_html.as_deref()
    }

    pub fn is_element(&self) -> bool {
        self.element
    }

    pub fn parent(&self) -> Option<ObjectRef> {
        self.parent.borrow().upgrade()
    }

    pub fn children(&self) -> Vec<ObjectRef> {
        self.children.borrow().clone()
    }
}

impl HostObject {
    /// Element node. `outer_html` is the rendered markup, if the host has any.
    pub fn element(tag: &str, outer_html: Option<&str>) -> ObjectRef {
        let data = NodeData::new(
            tag.to_uppercase(),
            Some(tag.to_string()),
            outer_html.map(str::to_string),
            true,
        );
        HostObject::builder("HTMLElement", ObjectKind::Node(data)).build()
    }

    pub fn text_node() -> ObjectRef {
        let data = NodeData::new("#text".to_string(), None, None, false);
        HostObject::builder("Text", ObjectKind::Node(data)).build()
    }

    pub fn comment_node() -> ObjectRef {
        let data = NodeData::new("#comment".to_string(), None, None, false);
        HostObject::builder("Comment", ObjectKind::Node(data)).build()
    }

    pub fn document() -> ObjectRef {
        let data = NodeData::new("#document".to_string(), None, None, false);
        HostObject::builder("HTMLDocument", ObjectKind::Node(data)).build()
    }

    /// The parent node, but only when it is an element.
    pub fn parent_element(&self) -> Option<ObjectRef> {
        self.node()?
            .parent()
            .filter(|parent| parent.node().is_some_and(NodeData::is_element))
    }
}

/// Attach `child` as the last child of `parent`, detaching it from any previous parent.
pub fn append_child(parent: &ObjectRef, child: &ObjectRef) -> Result<(), HostError> {
    let parent_node = parent.node().ok_or(HostError::NotANode)?;
    let child_node = child.node().ok_or(HostError::NotANode)?;

    if let Some(previous) = child_node.parent() {
        if let Some(previous_node) = previous.node() {
            previous_node
                .children
                .borrow_mut()
                .retain(|c| !Rc::ptr_eq(c, child));
        }
    }

    *child_node.parent.borrow_mut() = Rc::downgrade(parent);
    parent_node.children.borrow_mut().push(Rc::clone(child));
    Ok(())
}
