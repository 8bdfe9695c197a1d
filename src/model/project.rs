// src/model/project.rs

//! The project root: owner of the test tree and its event registry.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, trace};

use crate::config::ExecutorSection;
use crate::errors::{PipetestError, Result};
use crate::events::EventRegistry;
use crate::model::node::{
    activity_event, NodeEvent, NodeEventKind, NodeKind, TestContainer, TestMethod, TestNode,
};
use crate::model::status::TestResult;

/// Root of the test hierarchy.
///
/// All mutation goes through the project so that node events can be
/// published on its registry once the tree has settled.
#[derive(Debug)]
pub struct Project {
    executor: ExecutorSection,
    active: bool,
    children: BTreeMap<String, TestNode>,
    events: EventRegistry<NodeEvent>,
}

impl Project {
    pub fn new(executor: ExecutorSection) -> Self {
        Self {
            executor,
            active: true,
            children: BTreeMap::new(),
            events: EventRegistry::new(),
        }
    }

    pub fn events_mut(&mut self) -> &mut EventRegistry<NodeEvent> {
        &mut self.events
    }

    pub fn executor(&self) -> &ExecutorSection {
        &self.executor
    }

    /// Aggregate active flag of the whole project.
    pub fn active(&self) -> bool {
        self.active
    }

    /// Build the argument vector that launches the executor.
    ///
    /// The first element is the program. Labels are appended as trailing
    /// positional arguments; an empty label list means "run everything".
    pub fn execute_commandline(&self, labels: &[String], testdir: &Path) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.executor.args.len() + labels.len() + 3);
        argv.push(self.executor.program.clone());
        argv.extend(self.executor.args.iter().cloned());
        argv.push(self.executor.testdir_flag.clone());
        argv.push(testdir.display().to_string());
        argv.extend(labels.iter().cloned());
        argv
    }

    /// Look up a node by dotted path.
    pub fn find(&self, path: &str) -> Option<&TestNode> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.children.get(first)?;
        for segment in segments {
            node = match node {
                TestNode::Container(c) => c.children.get(segment)?,
                TestNode::Method(_) => return None,
            };
        }
        Some(node)
    }

    pub fn method(&self, path: &str) -> Option<&TestMethod> {
        self.find(path).and_then(TestNode::as_method)
    }

    fn method_mut(&mut self, path: &str) -> Option<&mut TestMethod> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.children.get_mut(first)?;
        for segment in segments {
            node = match node {
                TestNode::Container(c) => c.children.get_mut(segment)?,
                TestNode::Method(_) => return None,
            };
        }
        match node {
            TestNode::Method(m) => Some(m),
            TestNode::Container(_) => None,
        }
    }

    /// Top-level nodes (modules, or cases for two-segment paths).
    pub fn children(&self) -> impl Iterator<Item = &TestNode> {
        self.children.values()
    }

    /// Every method in the tree, in path order.
    pub fn methods(&self) -> Vec<&TestMethod> {
        let mut out = Vec::new();
        for child in self.children.values() {
            child.collect_methods(&mut out);
        }
        out
    }

    pub fn active_test_count(&self) -> usize {
        self.methods().iter().filter(|m| m.active()).count()
    }

    /// Labels that select exactly the active methods.
    ///
    /// Returns `None` when nothing is active, `Some(vec![])` when everything
    /// is active (run the whole suite), and otherwise the shortest labels:
    /// a fully active container is named once instead of per method.
    pub fn active_labels(&self) -> Option<Vec<String>> {
        if self.active_test_count() == 0 {
            return None;
        }
        if self.children.values().all(TestNode::fully_active) {
            return Some(Vec::new());
        }
        let mut labels = Vec::new();
        for child in self.children.values() {
            collect_labels(child, &mut labels);
        }
        Some(labels)
    }

    /// Return the method at `path`, creating it and any missing ancestors.
    ///
    /// Paths need at least two segments (`Case.method`); segments before the
    /// case are modules. When a `timestamp` is given, every node along the
    /// path is stamped with it so a later [`purge`](Self::purge) keeps it.
    pub fn confirm_exists(&mut self, path: &str, timestamp: Option<u64>) -> Result<&TestMethod> {
        let segments: Vec<&str> = path.split('.').collect();
        if segments.len() < 2 || segments.iter().any(|s| s.is_empty()) {
            return Err(PipetestError::InvalidTestPath(path.to_string()));
        }

        let mut events = Vec::new();
        confirm_in(&mut self.children, "", &segments, timestamp, path, &mut events)?;
        self.update_active(&mut events);
        self.publish(events);

        self.method(path)
            .ok_or_else(|| PipetestError::TestNotFound(path.to_string()))
    }

    /// Confirm every path under one refresh timestamp, then drop anything
    /// that was not confirmed.
    pub fn refresh<I, S>(&mut self, paths: I, timestamp: u64) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            self.confirm_exists(path.as_ref(), Some(timestamp))?;
        }
        self.purge(timestamp);
        Ok(())
    }

    /// Remove every node not stamped with `timestamp`, then any container
    /// left empty by the sweep.
    pub fn purge(&mut self, timestamp: u64) {
        let mut events = Vec::new();
        purge_in(&mut self.children, timestamp, &mut events);
        self.update_active(&mut events);
        self.publish(events);
    }

    /// Set the active flag of the node at `path`.
    ///
    /// The change cascades to every descendant, and every ancestor's
    /// aggregate flag is recomputed.
    pub fn set_active(&mut self, path: &str, active: bool) -> Result<()> {
        let segments: Vec<&str> = path.split('.').collect();
        let mut events = Vec::new();
        set_active_in(&mut self.children, &segments, active, &mut events)
            .ok_or_else(|| PipetestError::TestNotFound(path.to_string()))?;
        self.update_active(&mut events);
        self.publish(events);
        Ok(())
    }

    /// Set the active flag of every node in the project.
    pub fn set_all_active(&mut self, active: bool) {
        let mut events = Vec::new();
        for child in self.children.values_mut() {
            child.set_active(active, &mut events);
        }
        if self.children.is_empty() && self.active != active {
            self.active = active;
            events.push(NodeEvent::new(activity_event(active), NodeKind::Project, ""));
        }
        self.update_active(&mut events);
        self.publish(events);
    }

    /// Store the latest result of a method and announce it.
    pub fn record_result(
        &mut self,
        path: &str,
        description: Option<String>,
        result: TestResult,
    ) -> Result<()> {
        let method = self
            .method_mut(path)
            .ok_or_else(|| PipetestError::TestNotFound(path.to_string()))?;
        if let Some(description) = description {
            method.description = description;
        }
        debug!(test = %path, status = %result.status, duration = result.duration, "recorded result");
        method.result = Some(result);

        let event = NodeEvent::new(NodeEventKind::StatusUpdate, NodeKind::Method, path);
        self.events.emit(&event);
        Ok(())
    }

    fn update_active(&mut self, events: &mut Vec<NodeEvent>) {
        if self.children.is_empty() {
            return;
        }
        let any_active = self.children.values().any(TestNode::active);
        if any_active != self.active {
            self.active = any_active;
            events.push(NodeEvent::new(activity_event(any_active), NodeKind::Project, ""));
        }
    }

    fn publish(&mut self, events: Vec<NodeEvent>) {
        for event in &events {
            trace!(kind = ?event.kind, node = ?event.node, path = %event.path, "node event");
            self.events.emit(event);
        }
    }
}

fn confirm_in(
    children: &mut BTreeMap<String, TestNode>,
    parent_path: &str,
    segments: &[&str],
    timestamp: Option<u64>,
    full_path: &str,
    events: &mut Vec<NodeEvent>,
) -> Result<()> {
    let name = segments[0];
    let kind = match segments.len() {
        1 => NodeKind::Method,
        2 => NodeKind::Case,
        _ => NodeKind::Module,
    };

    let node = children.entry(name.to_string()).or_insert_with(|| {
        let node = match kind {
            NodeKind::Method => TestNode::Method(TestMethod::new(name, parent_path)),
            _ => TestNode::Container(TestContainer::new(name, parent_path, kind)),
        };
        events.push(NodeEvent::new(NodeEventKind::New, kind, node.path()));
        node
    });

    if node.kind() != kind {
        return Err(PipetestError::InvalidTestPath(format!(
            "{full_path}: '{}' is already a {:?}, not a {:?}",
            node.path(),
            node.kind(),
            kind
        )));
    }

    if let Some(ts) = timestamp {
        node.stamp(ts);
    }

    if let TestNode::Container(c) = node {
        confirm_in(&mut c.children, &c.path, &segments[1..], timestamp, full_path, events)?;
        c.update_active(events);
    }
    Ok(())
}

fn purge_in(children: &mut BTreeMap<String, TestNode>, timestamp: u64, events: &mut Vec<NodeEvent>) {
    children.retain(|_, node| {
        if node.timestamp() != Some(timestamp) {
            debug!(path = %node.path(), "purging stale node");
            return false;
        }
        match node {
            TestNode::Method(_) => true,
            TestNode::Container(c) => {
                purge_in(&mut c.children, timestamp, events);
                c.update_active(events);
                !c.children.is_empty()
            }
        }
    });
}

fn set_active_in(
    children: &mut BTreeMap<String, TestNode>,
    segments: &[&str],
    active: bool,
    events: &mut Vec<NodeEvent>,
) -> Option<()> {
    let node = children.get_mut(segments[0])?;
    if segments.len() == 1 {
        node.set_active(active, events);
        return Some(());
    }
    match node {
        TestNode::Container(c) => {
            set_active_in(&mut c.children, &segments[1..], active, events)?;
            c.update_active(events);
            Some(())
        }
        TestNode::Method(_) => None,
    }
}

fn collect_labels(node: &TestNode, labels: &mut Vec<String>) {
    if node.fully_active() {
        labels.push(node.path().to_string());
        return;
    }
    if let TestNode::Container(c) = node {
        for child in c.children.values() {
            collect_labels(child, labels);
        }
    }
}
