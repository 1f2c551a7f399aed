//! Hierarchical loop tree.
//!
//! Segments in a transaction are grouped into loops keyed by a level code:
//! the HL level code (`20`, `21`, `22`, ...) for hierarchical transaction
//! sets, or the opening segment identifier (`LX`, `CLP`, `SVC`) for sets
//! that declare loops positionally. The parent/child relation is a lookup
//! relation maintained by the assembler; nodes never hold back-pointers.

use crate::Segment;

/// How a loop's level code was resolved against the hierarchy schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LoopTag {
    /// The level code is declared in the transaction's hierarchy schema.
    Known,
    /// The level code is not in the schema. The loop is preserved as an
    /// opaque node so trading-partner extensions parse without failure.
    Unrecognized,
}

/// A node in the assembled loop tree.
///
/// Every level is uniformly a repeated sequence: a level that happens to
/// occur once is still one element of its parent's `loops` list, so
/// consumers always iterate and never index a fixed position.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoopNode {
    level: String,
    tag: LoopTag,
    segments: Vec<Segment>,
    loops: Vec<LoopNode>,
}

impl LoopNode {
    /// Creates an empty loop with the given level code.
    pub fn new<S: Into<String>>(level: S, tag: LoopTag) -> Self {
        Self {
            level: level.into(),
            tag,
            segments: Vec::new(),
            loops: Vec::new(),
        }
    }

    /// Creates the synthetic root loop of a transaction.
    ///
    /// The root carries the empty level code and holds segments that appear
    /// before any loop trigger (BHT, BPR, transaction-level TRN).
    pub fn root() -> Self {
        Self::new("", LoopTag::Known)
    }

    /// Returns the level code of this loop.
    pub fn level(&self) -> &str {
        &self.level
    }

    /// Returns how this loop's level code resolved against the schema.
    pub fn tag(&self) -> LoopTag {
        self.tag
    }

    /// Returns true if this is the synthetic transaction root.
    pub fn is_root(&self) -> bool {
        self.level.is_empty()
    }

    /// Appends a segment to this loop.
    pub fn push_segment(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    /// Appends a child loop to this loop.
    pub fn push_loop(&mut self, child: LoopNode) {
        self.loops.push(child);
    }

    /// Returns the segments attached directly to this loop, in order.
    ///
    /// For a loop opened by a trigger segment (HL, LX, CLP, ...) the trigger
    /// is the first segment.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the direct child loops, in order.
    pub fn loops(&self) -> &[LoopNode] {
        &self.loops
    }

    /// Returns the first directly-attached segment with the given
    /// identifier.
    pub fn first_segment(&self, id: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.id() == id)
    }

    /// Returns all directly-attached segments with the given identifier.
    pub fn segments_with_id<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a Segment> {
        self.segments.iter().filter(move |s| s.id() == id)
    }

    /// Collects all descendant loops (including self) with the given level
    /// code, in document order.
    ///
    /// Lookups are always by level code rather than tree position, so
    /// unexpected intermediate levels inserted by a trading partner do not
    /// break consumers.
    pub fn find_loops<'a>(&'a self, level: &str) -> Vec<&'a LoopNode> {
        let mut found = Vec::new();
        self.collect_loops(level, &mut found);
        found
    }

    fn collect_loops<'a>(&'a self, level: &str, found: &mut Vec<&'a LoopNode>) {
        if self.level == level {
            found.push(self);
        }
        for child in &self.loops {
            child.collect_loops(level, found);
        }
    }

    /// Counts all segments in this loop and its descendants.
    pub fn segment_count(&self) -> usize {
        self.segments.len() + self.loops.iter().map(LoopNode::segment_count).sum::<usize>()
    }
}
