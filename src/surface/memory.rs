//! In-memory document tree implementing [`Surface`]
//!
//! Elements live in an arena keyed by [`NodeId`]; detached elements stay in the
//! arena so stale handles keep resolving, the same way a removed DOM node stays
//! valid for as long as script holds a reference to it.
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use scraper::Html;
use tracing::debug;

use super::{NodeId, Surface, SurfaceError, SurfaceResult, DISMISS_ATTRIBUTE, DISMISS_PARENT};

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    id: Option<String>,
    class: Option<String>,
    attributes: BTreeMap<String, String>,
    inner_html: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            class: None,
            attributes: BTreeMap::new(),
            inner_html: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Headless surface holding a `<body>` and everything appended below it
#[derive(Debug, Clone)]
pub struct MemorySurface {
    nodes: HashMap<NodeId, Element>,
    body: NodeId,
    next_id: u64,
}

impl Default for MemorySurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySurface {
    /// Create an empty document with only a body element
    pub fn new() -> Self {
        let body = NodeId::new(0);
        let mut nodes = HashMap::new();
        nodes.insert(body, Element::new("body"));
        Self {
            nodes,
            body,
            next_id: 1,
        }
    }

    fn element(&self, node: NodeId) -> SurfaceResult<&Element> {
        self.nodes.get(&node).ok_or(SurfaceError::NodeNotFound(node))
    }

    fn element_mut(&mut self, node: NodeId) -> SurfaceResult<&mut Element> {
        self.nodes
            .get_mut(&node)
            .ok_or(SurfaceError::NodeNotFound(node))
    }

    fn detach(&mut self, node: NodeId) -> SurfaceResult<()> {
        let parent = self.element_mut(node)?.parent.take();
        if let Some(parent) = parent {
            self.element_mut(parent)?.children.retain(|child| *child != node);
        }
        Ok(())
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Number of elements held by the arena, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Tag name of an element
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).map(|e| e.tag.as_str())
    }

    /// The element's class attribute
    pub fn class_name(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).and_then(|e| e.class.as_deref())
    }

    /// The element's id attribute
    pub fn id_of(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).and_then(|e| e.id.as_deref())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes
            .get(&node)
            .and_then(|e| e.attributes.get(name))
            .map(String::as_str)
    }

    /// Raw markup last assigned through [`Surface::set_inner_html`]
    pub fn inner_html(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(&node).and_then(|e| e.inner_html.as_deref())
    }

    /// Whether the class list contains `class`
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.class_name(node)
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// First descendant (depth first, document order) carrying `class`
    pub fn find_by_class(&self, root: NodeId, class: &str) -> Option<NodeId> {
        let element = self.nodes.get(&root)?;
        for child in &element.children {
            if self.has_class(*child, class) {
                return Some(*child);
            }
            if let Some(found) = self.find_by_class(*child, class) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of the element's markup and child elements
    pub fn text_content(&self, node: NodeId) -> SurfaceResult<String> {
        let element = self.element(node)?;
        let mut text = String::new();
        if let Some(markup) = &element.inner_html {
            let fragment = Html::parse_fragment(markup);
            text.extend(fragment.root_element().text());
        }
        for child in &element.children {
            text.push_str(&self.text_content(*child)?);
        }
        Ok(text)
    }

    /// Serialize the element and its subtree
    pub fn outer_html(&self, node: NodeId) -> SurfaceResult<String> {
        let mut out = String::new();
        self.write_html(node, &mut out)?;
        Ok(out)
    }

    /// Serialize the whole document body
    pub fn to_html(&self) -> String {
        self.outer_html(self.body).unwrap_or_default()
    }

    fn write_html(&self, node: NodeId, out: &mut String) -> SurfaceResult<()> {
        let element = self.element(node)?;
        let _ = write!(out, "<{}", element.tag);
        if let Some(id) = &element.id {
            let _ = write!(out, " id=\"{}\"", escape_attribute(id));
        }
        if let Some(class) = &element.class {
            let _ = write!(out, " class=\"{}\"", escape_attribute(class));
        }
        for (name, value) in &element.attributes {
            let _ = write!(out, " {}=\"{}\"", name, escape_attribute(value));
        }
        out.push('>');
        if let Some(markup) = &element.inner_html {
            out.push_str(markup);
        }
        for child in &element.children {
            self.write_html(*child, out)?;
        }
        let _ = write!(out, "</{}>", element.tag);
        Ok(())
    }
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

impl Surface for MemorySurface {
    fn body(&self) -> NodeId {
        self.body
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        let node = NodeId::new(self.next_id);
        self.next_id += 1;
        self.nodes.insert(node, Element::new(tag));
        node
    }

    fn set_id(&mut self, node: NodeId, id: &str) -> SurfaceResult<()> {
        self.element_mut(node)?.id = Some(id.to_string());
        Ok(())
    }

    fn set_class(&mut self, node: NodeId, class: &str) -> SurfaceResult<()> {
        self.element_mut(node)?.class = Some(class.to_string());
        Ok(())
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> SurfaceResult<()> {
        let element = self.element_mut(node)?;
        match name {
            "id" => element.id = Some(value.to_string()),
            "class" => element.class = Some(value.to_string()),
            _ => {
                element
                    .attributes
                    .insert(name.to_ascii_lowercase(), value.to_string());
            }
        }
        Ok(())
    }

    fn set_inner_html(&mut self, node: NodeId, markup: &str) -> SurfaceResult<()> {
        let children = std::mem::take(&mut self.element_mut(node)?.children);
        for child in children {
            self.element_mut(child)?.parent = None;
        }
        self.element_mut(node)?.inner_html = Some(markup.to_string());
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> SurfaceResult<()> {
        self.element(parent)?;
        self.element(child)?;
        if child == self.body || self.is_ancestor(child, parent) {
            return Err(SurfaceError::HierarchyRequest { parent, child });
        }
        self.detach(child)?;
        self.element_mut(child)?.parent = Some(parent);
        self.element_mut(parent)?.children.push(child);
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> SurfaceResult<()> {
        self.detach(node)
    }

    fn release(&mut self, node: NodeId) -> SurfaceResult<()> {
        if node == self.body || !self.nodes.contains_key(&node) {
            return Ok(());
        }
        self.detach(node)?;

        let mut stack = vec![node];
        while let Some(n) = stack.pop() {
            if let Some(element) = self.nodes.remove(&n) {
                stack.extend(element.children);
            }
        }
        Ok(())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(&node).and_then(|e| e.parent)
    }

    fn children(&self, node: NodeId) -> SurfaceResult<Vec<NodeId>> {
        Ok(self.element(node)?.children.clone())
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        let mut stack = vec![self.body];
        while let Some(node) = stack.pop() {
            let element = self.nodes.get(&node)?;
            if element.id.as_deref() == Some(id) {
                return Some(node);
            }
            stack.extend(element.children.iter().rev().copied());
        }
        None
    }

    fn click(&mut self, node: NodeId) -> SurfaceResult<bool> {
        self.element(node)?;
        let mut current = Some(node);
        while let Some(n) = current {
            if self.attribute(n, DISMISS_ATTRIBUTE) == Some(DISMISS_PARENT) {
                return match self.parent(n) {
                    Some(target) => {
                        debug!("Click on {} dismissed {}", node, target);
                        self.detach(target)?;
                        Ok(true)
                    }
                    None => Ok(false),
                };
            }
            current = self.parent(n);
        }
        Ok(false)
    }
}
