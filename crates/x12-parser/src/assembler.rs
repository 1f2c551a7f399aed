//! Hierarchical loop assembler.
//!
//! Groups a transaction's segments into a loop tree. Hierarchy is declared
//! inline in the stream: HL segments carry a level code (HL03) for the
//! hierarchical transaction sets, while the 835 opens loops positionally
//! with LX/CLP/SVC segments. Which segments open loops, and which levels
//! may parent which, is supplied per transaction family as a
//! [`HierarchySchema`] rather than hard-coded.

use x12_types::{LoopNode, LoopTag, Segment, Transaction, TransactionKind, well_known};

use crate::types::{X12Error, X12Result};

/// How a loop at a given level is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopTrigger {
    /// Opened by an `HL` segment whose level code (HL03) equals the rule's
    /// code.
    HlLevel,
    /// Opened by a segment whose identifier equals the rule's code.
    SegmentId,
}

/// One level of a transaction family's hierarchy.
#[derive(Debug, Clone)]
pub struct LevelRule {
    code: String,
    parents: Vec<String>,
    trigger: LoopTrigger,
    root: bool,
}

impl LevelRule {
    /// Creates a rule for a level that requires one of the given parents.
    pub fn child<S: Into<String>>(code: S, trigger: LoopTrigger, parents: &[&str]) -> Self {
        Self {
            code: code.into(),
            parents: parents.iter().map(|p| p.to_string()).collect(),
            trigger,
            root: false,
        }
    }

    /// Creates a rule for a level that may open at the transaction root.
    pub fn root<S: Into<String>>(code: S, trigger: LoopTrigger) -> Self {
        Self {
            code: code.into(),
            parents: Vec::new(),
            trigger,
            root: true,
        }
    }

    /// Marks this level as also legal at the transaction root.
    ///
    /// Useful for levels that are nested in some trading-partner dialects
    /// and top-level in others.
    pub fn or_root(mut self) -> Self {
        self.root = true;
        self
    }
}

/// Ordered set of level rules for one transaction family.
#[derive(Debug, Clone, Default)]
pub struct HierarchySchema {
    rules: Vec<LevelRule>,
}

impl HierarchySchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rule. Partner dialects extend a built-in schema by adding
    /// rules rather than by branching assembler logic.
    pub fn with_rule(mut self, rule: LevelRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Schema for the 277 claim status hierarchy, shared by the 277CA
    /// acknowledgment family.
    ///
    /// Information source (20) roots the tree; receiver (21) nests under
    /// it; provider (19) is optional, so subscriber (22) accepts either as
    /// parent; dependent (23) nests under subscriber.
    pub fn claim_status() -> Self {
        use well_known::{
            LEVEL_DEPENDENT, LEVEL_INFORMATION_RECEIVER, LEVEL_INFORMATION_SOURCE, LEVEL_PROVIDER,
            LEVEL_SUBSCRIBER,
        };
        Self::new()
            .with_rule(LevelRule::root(LEVEL_INFORMATION_SOURCE, LoopTrigger::HlLevel))
            .with_rule(LevelRule::child(
                LEVEL_INFORMATION_RECEIVER,
                LoopTrigger::HlLevel,
                &[LEVEL_INFORMATION_SOURCE],
            ))
            .with_rule(LevelRule::child(
                LEVEL_PROVIDER,
                LoopTrigger::HlLevel,
                &[LEVEL_INFORMATION_RECEIVER],
            ))
            .with_rule(LevelRule::child(
                LEVEL_SUBSCRIBER,
                LoopTrigger::HlLevel,
                &[LEVEL_PROVIDER, LEVEL_INFORMATION_RECEIVER],
            ))
            .with_rule(LevelRule::child(
                LEVEL_DEPENDENT,
                LoopTrigger::HlLevel,
                &[LEVEL_SUBSCRIBER],
            ))
    }

    /// Schema for the 835 payment hierarchy.
    ///
    /// The 835 has no HL segments: N1 identification loops and LX claim
    /// groups open at the root, CLP claim payments nest under LX, and SVC
    /// service lines nest under CLP.
    pub fn payment() -> Self {
        Self::new()
            .with_rule(LevelRule::root("N1", LoopTrigger::SegmentId))
            .with_rule(LevelRule::root("LX", LoopTrigger::SegmentId))
            .with_rule(LevelRule::child("CLP", LoopTrigger::SegmentId, &["LX"]).or_root())
            .with_rule(LevelRule::child("SVC", LoopTrigger::SegmentId, &["CLP"]))
    }

    /// Returns the built-in schema for a transaction family.
    pub fn for_kind(kind: TransactionKind) -> Self {
        match kind {
            TransactionKind::ClaimStatus | TransactionKind::Acknowledgment => Self::claim_status(),
            TransactionKind::Payment => Self::payment(),
        }
    }

    fn rule_for(&self, code: &str, trigger: LoopTrigger) -> Option<&LevelRule> {
        self.rules
            .iter()
            .find(|r| r.trigger == trigger && r.code == code)
    }

    /// Resolves the level code a segment would open a loop for, if any.
    fn trigger_level<'a>(&self, segment: &'a Segment) -> Option<(&'a str, LoopTrigger)> {
        if segment.id() == "HL" {
            // HL03 is the level code; HL always opens a loop, recognized
            // or not.
            return Some((segment.element_or_empty(3), LoopTrigger::HlLevel));
        }
        self.rule_for(segment.id(), LoopTrigger::SegmentId)
            .map(|_| (segment.id(), LoopTrigger::SegmentId))
    }
}

/// Assembles segment sequences into loop trees per a hierarchy schema.
#[derive(Debug, Clone)]
pub struct LoopAssembler {
    schema: HierarchySchema,
}

impl LoopAssembler {
    /// Creates an assembler for the given schema.
    pub fn new(schema: HierarchySchema) -> Self {
        Self { schema }
    }

    /// Creates an assembler with the built-in schema for a family.
    pub fn for_kind(kind: TransactionKind) -> Self {
        Self::new(HierarchySchema::for_kind(kind))
    }

    /// Builds a [`Transaction`] from its ST segment, body segments, and SE
    /// segment.
    ///
    /// `group_version` supplies the GS08 implementation version used when
    /// ST03 is absent; `component_separator` is the ISA16 character
    /// carried onto the transaction for composite-element splitting.
    ///
    /// # Errors
    /// Returns [`X12Error::OrphanLoop`] when a schema-known, non-root
    /// level finds none of its legal parents open. Unknown level codes
    /// never fail: they become loops tagged [`LoopTag::Unrecognized`]
    /// under the innermost open loop.
    pub fn assemble(
        &self,
        kind: TransactionKind,
        st: &Segment,
        body: &[Segment],
        se: Option<&Segment>,
        group_version: Option<&str>,
        component_separator: char,
    ) -> X12Result<Transaction> {
        let mut root = LoopNode::root();
        // Innermost-last stack of open loops.
        let mut stack: Vec<LoopNode> = Vec::new();

        for segment in body {
            match self.schema.trigger_level(segment) {
                Some((level, trigger)) => {
                    self.open_loop(&mut root, &mut stack, segment, level, trigger)?;
                }
                None => match stack.last_mut() {
                    Some(open) => open.push_segment(segment.clone()),
                    None => root.push_segment(segment.clone()),
                },
            }
        }

        close_through(&mut root, &mut stack, 0);

        let declared_segment_count = se
            .and_then(|se| se.element(1))
            .and_then(|v| v.parse::<usize>().ok());

        Ok(Transaction {
            kind,
            control_number: st.element_or_empty(2).to_string(),
            version: st
                .element(3)
                .or(group_version)
                .unwrap_or(family_default_version(kind))
                .to_string(),
            root,
            segment_count: body.len() + 2,
            declared_segment_count,
            trailer_control_number: se
                .and_then(|se| se.element(2))
                .map(str::to_string),
            component_separator,
        })
    }

    fn open_loop(
        &self,
        root: &mut LoopNode,
        stack: &mut Vec<LoopNode>,
        segment: &Segment,
        level: &str,
        trigger: LoopTrigger,
    ) -> X12Result<()> {
        let rule = self.schema.rule_for(level, trigger);

        let (tag, open_at) = match rule {
            None => {
                // Forward compatibility: unknown levels nest under the
                // innermost open loop as opaque nodes.
                (LoopTag::Unrecognized, stack.len())
            }
            Some(rule) => {
                let parent_depth = stack
                    .iter()
                    .rposition(|open| rule.parents.iter().any(|p| p == open.level()))
                    .map(|idx| idx + 1);
                match parent_depth {
                    Some(depth) => (LoopTag::Known, depth),
                    None if rule.root => (LoopTag::Known, 0),
                    None => {
                        return Err(X12Error::OrphanLoop {
                            level: level.to_string(),
                            expected_parents: rule.parents.join(", "),
                        });
                    }
                }
            }
        };

        close_through(root, stack, open_at);

        let mut node = LoopNode::new(level, tag);
        node.push_segment(segment.clone());
        stack.push(node);
        Ok(())
    }
}

/// Pops open loops until the stack is `depth` deep, attaching each popped
/// loop to its parent.
fn close_through(root: &mut LoopNode, stack: &mut Vec<LoopNode>, depth: usize) {
    while stack.len() > depth {
        let Some(closed) = stack.pop() else { break };
        match stack.last_mut() {
            Some(parent) => parent.push_loop(closed),
            None => root.push_loop(closed),
        }
    }
}

fn family_default_version(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::ClaimStatus => well_known::VERSION_CLAIM_STATUS,
        TransactionKind::Acknowledgment => well_known::VERSION_ACKNOWLEDGMENT,
        TransactionKind::Payment => well_known::VERSION_PAYMENT,
    }
}
