//! Namespace-aware element tree.

/// A child of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// A nested element.
    Element(Element),
    /// Character data.
    Text(String),
}

/// An attribute of an [`Element`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Namespace URI, `None` for plain attributes.
    pub namespace: Option<String>,
    /// Local name.
    pub name: String,
    /// Unescaped value.
    pub value: String,
}

/// An XML element with its namespace resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an empty element in the given namespace.
    pub fn new(namespace: &str, name: &str) -> Self {
        Self {
            namespace: Some(namespace.to_string()),
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates an element that belongs to no namespace.
    pub fn unqualified(name: &str) -> Self {
        Self {
            namespace: None,
            name: name.to_string(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Returns the namespace URI.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns the local name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this element has the given namespace and local name.
    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace.as_deref() == Some(namespace) && self.name == name
    }

    /// Returns all attributes.
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Returns the value of a plain (non-namespaced) attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.namespace.is_none() && a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Sets a plain attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|a| a.namespace.is_none() && a.name == name)
        {
            Some(existing) => existing.value = value,
            None => self.attributes.push(Attribute {
                namespace: None,
                name: name.to_string(),
                value,
            }),
        }
        self
    }

    /// Removes a plain attribute.
    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes
            .retain(|a| !(a.namespace.is_none() && a.name == name));
    }

    /// Adds an attribute exactly as given (used by the parser).
    pub(crate) fn push_attribute(&mut self, attribute: Attribute) {
        self.attributes.push(attribute);
    }

    /// Returns all child nodes.
    pub fn nodes(&self) -> &[Node] {
        &self.children
    }

    /// Appends a raw child node.
    pub(crate) fn push_node(&mut self, node: Node) {
        self.children.push(node);
    }

    /// Iterates over child elements.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Iterates over child elements with the given name.
    pub fn children_named<'a>(
        &'a self,
        namespace: &'a str,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children().filter(move |e| e.is(namespace, name))
    }

    /// Returns the first child element with the given name.
    pub fn child(&self, namespace: &str, name: &str) -> Option<&Element> {
        self.children().find(|e| e.is(namespace, name))
    }

    /// Returns the first child element with the given name, mutably.
    pub fn child_mut(&mut self, namespace: &str, name: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|n| match n {
            Node::Element(e) if e.is(namespace, name) => Some(e),
            _ => None,
        })
    }

    /// Appends a child element.
    pub fn push_child(&mut self, child: Element) -> &mut Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Runs `edit` on the first child with the given name, creating the
    /// child at the end if there is none.
    pub fn edit_child<R>(
        &mut self,
        namespace: &str,
        name: &str,
        edit: impl FnOnce(&mut Element) -> R,
    ) -> R {
        match self.child_mut(namespace, name) {
            Some(existing) => edit(existing),
            None => {
                let mut created = Element::new(namespace, name);
                let result = edit(&mut created);
                self.children.push(Node::Element(created));
                result
            }
        }
    }

    /// Removes every child element with the given name; returns how many went.
    pub fn remove_children(&mut self, namespace: &str, name: &str) -> usize {
        let before = self.children.len();
        self.children.retain(|n| match n {
            Node::Element(e) => !e.is(namespace, name),
            Node::Text(_) => true,
        });
        before - self.children.len()
    }

    /// Returns the concatenated character data of this element.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Replaces the content of this element with a single text node.
    pub fn set_text(&mut self, text: impl Into<String>) -> &mut Self {
        self.children.clear();
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Returns the text of the first child with the given name.
    pub fn child_text(&self, namespace: &str, name: &str) -> Option<String> {
        self.child(namespace, name).map(Element::text)
    }

    /// Sets the text of the first child with the given name, creating it if needed.
    pub fn set_child_text(&mut self, namespace: &str, name: &str, text: impl Into<String>) {
        self.edit_child(namespace, name, |child| {
            child.set_text(text);
        });
    }

    /// Returns the `value` attribute of the first child with the given name.
    ///
    /// `gd:` and `gCal:` extension elements carry their payload this way.
    pub fn child_value(&self, namespace: &str, name: &str) -> Option<&str> {
        self.child(namespace, name).and_then(|e| e.attribute("value"))
    }

    /// Sets the `value` attribute of the first child with the given name.
    pub fn set_child_value(&mut self, namespace: &str, name: &str, value: impl Into<String>) {
        self.edit_child(namespace, name, |child| {
            child.set_attribute("value", value);
        });
    }

    /// Drops whitespace-only text between child elements.
    ///
    /// Leaf text is left exactly as it was read.
    pub(crate) fn drop_layout_whitespace(&mut self) {
        if self.children().next().is_none() {
            return;
        }
        self.children.retain(|n| match n {
            Node::Text(t) => !t.trim().is_empty(),
            Node::Element(_) => true,
        });
    }

    /// Visits this element and all its descendants, depth first.
    pub(crate) fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a Element)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }
}
