// src/model/node.rs

//! Tree nodes of the test hierarchy.
//!
//! The tree is a plain ownership tree: every container owns its children in a
//! name-keyed map. Nodes know their own dotted path, which is how the owning
//! [`Project`](super::Project) addresses them; there are no back-pointers.

use std::collections::BTreeMap;

use crate::events::Event;
use crate::model::status::TestResult;

/// Which level of the hierarchy a node lives at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Project,
    Module,
    Case,
    Method,
}

/// Hierarchy-level event names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeEventKind {
    /// A node was created by `confirm_exists`.
    New,
    /// A node flipped from inactive to active.
    Active,
    /// A node flipped from active to inactive.
    Inactive,
    /// A method received a new result.
    StatusUpdate,
}

/// Event published by the project when a node changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeEvent {
    pub kind: NodeEventKind,
    pub node: NodeKind,
    /// Dotted path of the node; empty for the project itself.
    pub path: String,
}

impl Event for NodeEvent {
    type Kind = NodeEventKind;

    fn kind(&self) -> NodeEventKind {
        self.kind
    }
}

impl NodeEvent {
    pub(crate) fn new(kind: NodeEventKind, node: NodeKind, path: &str) -> Self {
        Self {
            kind,
            node,
            path: path.to_string(),
        }
    }
}

/// Join a parent path and a child name.
pub(crate) fn child_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

/// A single test method (leaf).
#[derive(Debug, Clone)]
pub struct TestMethod {
    pub name: String,
    pub path: String,
    pub description: String,
    pub(crate) active: bool,
    pub(crate) result: Option<TestResult>,
    pub(crate) timestamp: Option<u64>,
}

impl TestMethod {
    pub(crate) fn new(name: &str, parent_path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: child_path(parent_path, name),
            description: String::new(),
            active: true,
            result: None,
            timestamp: None,
        }
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn result(&self) -> Option<&TestResult> {
        self.result.as_ref()
    }

    /// Refresh pass in which this method was last confirmed.
    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }
}

/// A module or test case: a named container of further nodes.
#[derive(Debug, Clone)]
pub struct TestContainer {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    pub(crate) active: bool,
    pub(crate) timestamp: Option<u64>,
    pub(crate) children: BTreeMap<String, TestNode>,
}

impl TestContainer {
    pub(crate) fn new(name: &str, parent_path: &str, kind: NodeKind) -> Self {
        Self {
            name: name.to_string(),
            path: child_path(parent_path, name),
            kind,
            active: true,
            timestamp: None,
            children: BTreeMap::new(),
        }
    }

    pub fn active(&self) -> bool {
        self.active
    }

    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }

    pub fn children(&self) -> impl Iterator<Item = &TestNode> {
        self.children.values()
    }

    pub fn child(&self, name: &str) -> Option<&TestNode> {
        self.children.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Recompute the aggregate active flag from the children.
    ///
    /// A container without children keeps whatever flag it was last given.
    pub(crate) fn update_active(&mut self, events: &mut Vec<NodeEvent>) {
        if self.children.is_empty() {
            return;
        }
        let any_active = self.children.values().any(TestNode::active);
        if any_active != self.active {
            self.active = any_active;
            events.push(NodeEvent::new(
                activity_event(any_active),
                self.kind,
                &self.path,
            ));
        }
    }
}

/// Any node below the project.
#[derive(Debug, Clone)]
pub enum TestNode {
    Container(TestContainer),
    Method(TestMethod),
}

impl TestNode {
    pub fn name(&self) -> &str {
        match self {
            TestNode::Container(c) => &c.name,
            TestNode::Method(m) => &m.name,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            TestNode::Container(c) => &c.path,
            TestNode::Method(m) => &m.path,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            TestNode::Container(c) => c.kind,
            TestNode::Method(_) => NodeKind::Method,
        }
    }

    pub fn active(&self) -> bool {
        match self {
            TestNode::Container(c) => c.active,
            TestNode::Method(m) => m.active,
        }
    }

    pub fn timestamp(&self) -> Option<u64> {
        match self {
            TestNode::Container(c) => c.timestamp,
            TestNode::Method(m) => m.timestamp,
        }
    }

    pub(crate) fn stamp(&mut self, timestamp: u64) {
        match self {
            TestNode::Container(c) => c.timestamp = Some(timestamp),
            TestNode::Method(m) => m.timestamp = Some(timestamp),
        }
    }

    pub fn as_method(&self) -> Option<&TestMethod> {
        match self {
            TestNode::Method(m) => Some(m),
            TestNode::Container(_) => None,
        }
    }

    /// Set the active flag on this node and every descendant.
    pub(crate) fn set_active(&mut self, active: bool, events: &mut Vec<NodeEvent>) {
        match self {
            TestNode::Method(m) => {
                if m.active != active {
                    m.active = active;
                    events.push(NodeEvent::new(activity_event(active), NodeKind::Method, &m.path));
                }
            }
            TestNode::Container(c) => {
                for child in c.children.values_mut() {
                    child.set_active(active, events);
                }
                if c.children.is_empty() {
                    if c.active != active {
                        c.active = active;
                        events.push(NodeEvent::new(activity_event(active), c.kind, &c.path));
                    }
                } else {
                    c.update_active(events);
                }
            }
        }
    }

    /// True when this node contains at least one method and every method
    /// beneath it is active.
    pub(crate) fn fully_active(&self) -> bool {
        match self {
            TestNode::Method(m) => m.active,
            TestNode::Container(c) => {
                !c.children.is_empty() && c.children.values().all(TestNode::fully_active)
            }
        }
    }

    pub(crate) fn collect_methods<'a>(&'a self, out: &mut Vec<&'a TestMethod>) {
        match self {
            TestNode::Method(m) => out.push(m),
            TestNode::Container(c) => {
                for child in c.children.values() {
                    child.collect_methods(out);
                }
            }
        }
    }
}

pub(crate) fn activity_event(active: bool) -> NodeEventKind {
    if active {
        NodeEventKind::Active
    } else {
        NodeEventKind::Inactive
    }
}
