//! Weighted call-tree node

use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::HashMap;

/// One frame in the call tree and the number of samples that passed through it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    name: String,
    value: u64,
    children: HashMap<String, Node>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: 0,
            children: HashMap::new(),
        }
    }

    /// Descend into the child called `name`, creating it if absent, and
    /// count one more sample through it
    pub fn child_by_name(&mut self, name: &str) -> &mut Node {
        let node = self
            .children
            .entry(name.to_string())
            .or_insert_with(|| Node::new(name));
        node.value += 1;
        node
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> u64 {
        self.value
    }

    #[must_use]
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children.get(name)
    }

    /// Children ordered by ascending weight (ties by name)
    #[must_use]
    pub fn children(&self) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.children.values().collect();
        nodes.sort_by(|a, b| a.value.cmp(&b.value).then_with(|| a.name.cmp(&b.name)));
        nodes
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("Node", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("value", &self.value)?;
        state.serialize_field("children", &self.children())?;
        state.end()
    }
}
