//! Declarative transitions.
//!
//! Scheduling a transition records target values on each node; nothing is
//! interpolated here. The host plays them back with [`Node::settle`].

use std::fmt;

use super::{Node, Selection};
use crate::types::DataPoint;

/// One scheduled phase of a named transition on a single node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScheduledTransition {
    pub name: String,
    /// 0 for the first phase; chained successors count up
    pub phase: usize,
    pub attrs: Vec<(String, String)>,
    pub styles: Vec<(String, String)>,
}

impl ScheduledTransition {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        self.styles.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

/// A named transition phase over a group of nodes.
#[derive(Debug, Clone)]
pub struct Transition {
    nodes: Vec<Node>,
    name: String,
    phase: usize,
}

impl Transition {
    pub(super) fn schedule(nodes: Vec<Node>, name: &str) -> Self {
        let t = Transition {
            nodes,
            name: name.to_string(),
            phase: 0,
        };
        t.push_phase();
        crate::log::debug!(name, nodes = t.nodes.len(), "transition scheduled");
        t
    }

    fn push_phase(&self) {
        for node in &self.nodes {
            node.transitions_mut().push(ScheduledTransition {
                name: self.name.clone(),
                phase: self.phase,
                ..Default::default()
            });
        }
    }

    fn record(&self, node: &Node, apply: impl FnOnce(&mut ScheduledTransition)) {
        let mut transitions = node.transitions_mut();
        if let Some(t) = transitions
            .iter_mut()
            .rev()
            .find(|t| t.name == self.name && t.phase == self.phase)
        {
            apply(t);
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> usize {
        self.phase
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn attr(self, name: &str, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        for node in &self.nodes {
            self.record(node, |t| super::upsert(&mut t.attrs, name, value.clone()));
        }
        self
    }

    pub fn attr_with<V: fmt::Display>(self, name: &str, f: impl Fn(&DataPoint) -> V) -> Self {
        for node in &self.nodes {
            if let Some(d) = node.datum() {
                let value = f(&d).to_string();
                self.record(node, |t| super::upsert(&mut t.attrs, name, value));
            }
        }
        self
    }

    pub fn style(self, name: &str, value: impl fmt::Display) -> Self {
        let value = value.to_string();
        for node in &self.nodes {
            self.record(node, |t| super::upsert(&mut t.styles, name, value.clone()));
        }
        self
    }

    pub fn style_with<V: fmt::Display>(self, name: &str, f: impl Fn(&DataPoint) -> V) -> Self {
        for node in &self.nodes {
            if let Some(d) = node.datum() {
                let value = f(&d).to_string();
                self.record(node, |t| super::upsert(&mut t.styles, name, value));
            }
        }
        self
    }

    /// Chain a successor phase under the same name, starting when this one ends.
    pub fn transition(self) -> Transition {
        let next = Transition {
            nodes: self.nodes,
            name: self.name,
            phase: self.phase + 1,
        };
        next.push_phase();
        next
    }

    /// The nodes this transition runs on, as a plain selection.
    pub fn selection(&self) -> Selection {
        Selection::from(self.nodes.clone())
    }
}

/// Result of a point update: either applied immediately or left animating.
#[derive(Debug, Clone)]
pub enum Staged {
    Immediate(Selection),
    Animated(Transition),
}

impl Staged {
    pub fn is_animated(&self) -> bool {
        matches!(self, Staged::Animated(_))
    }

    pub fn nodes(&self) -> &[Node] {
        match self {
            Staged::Immediate(sel) => sel.nodes(),
            Staged::Animated(t) => t.nodes(),
        }
    }

    pub fn transition_name(&self) -> Option<&str> {
        match self {
            Staged::Immediate(_) => None,
            Staged::Animated(t) => Some(t.name()),
        }
    }

    pub fn style_with<V: fmt::Display>(self, name: &str, f: impl Fn(&DataPoint) -> V) -> Self {
        match self {
            Staged::Immediate(sel) => Staged::Immediate(sel.style_with(name, f)),
            Staged::Animated(t) => Staged::Animated(t.style_with(name, f)),
        }
    }

    pub fn attr_with<V: fmt::Display>(self, name: &str, f: impl Fn(&DataPoint) -> V) -> Self {
        match self {
            Staged::Immediate(sel) => Staged::Immediate(sel.attr_with(name, f)),
            Staged::Animated(t) => Staged::Animated(t.attr_with(name, f)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64) -> Node {
        let n = Node::new("circle");
        n.set_datum(DataPoint::new("data1", 0, x, 1.0));
        n
    }

    #[test]
    fn scheduling_records_targets_without_applying() {
        let n = point(3.0);
        n.set_attr("cx", "0");
        Selection::from(n.clone()).transition("t1").attr_with("cx", |d| d.x);

        assert_eq!(n.attr("cx").as_deref(), Some("0"));
        let ts = n.transitions();
        assert_eq!(ts.len(), 1);
        assert_eq!(ts[0].name, "t1");
        assert_eq!(ts[0].attr("cx"), Some("3"));
    }

    #[test]
    fn chained_phase_shares_name() {
        let n = point(1.0);
        let t = Selection::from(n.clone())
            .transition("move")
            .attr("cy", 4)
            .transition()
            .style("opacity", "0.5");

        assert_eq!(t.phase(), 1);
        let ts = n.transitions();
        assert_eq!(ts.len(), 2);
        assert!(ts.iter().all(|t| t.name == "move"));
        assert_eq!(ts[0].attr("cy"), Some("4"));
        assert_eq!(ts[1].style("opacity"), Some("0.5"));
    }

    #[test]
    fn settle_applies_phases_in_order() {
        let n = point(1.0);
        Selection::from(n.clone())
            .transition("a")
            .attr("r", 2)
            .transition()
            .attr("r", 5);
        n.settle();
        assert_eq!(n.attr("r").as_deref(), Some("5"));
        assert!(n.transitions().is_empty());
    }

    #[test]
    fn staged_styles_land_on_last_phase() {
        let n = point(1.0);
        let t = Selection::from(n.clone()).transition("a").transition();
        let staged = Staged::Animated(t).style_with("fill", |_| "red");
        assert!(staged.is_animated());
        assert_eq!(staged.transition_name(), Some("a"));
        let ts = n.transitions();
        assert_eq!(ts[0].style("fill"), None);
        assert_eq!(ts[1].style("fill"), Some("red"));
    }

    #[test]
    fn empty_selection_transition_is_harmless() {
        let t = Selection::empty().transition("x").attr("cx", 1);
        assert!(t.nodes().is_empty());
    }
}
