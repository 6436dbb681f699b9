//! Control scopes and the nesting stack.

use xfer_isa::{Pc, PcDelta, pc_delta};

/// Kind of an open control scope.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeKind {
    Block,
    Loop,
    /// `if` with no `else` seen yet; its own entry still awaits a delta.
    IfNoElse,
    /// `if` whose `else` has been seen at `else_pc`.
    IfWithElse { else_pc: Pc },
}

/// Where a branch to a scope's label lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LabelTarget {
    /// Loop labels: the `loop` opcode itself, known immediately.
    Backward(Pc),
    /// Block and `if` labels: one past the matching `end`, known at the closer.
    Forward,
}

/// One open nested region.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlScope {
    pub kind: ScopeKind,
    /// Offset of the opening instruction.
    pub start_pc: Pc,
    /// Offsets waiting for this scope's exit address, in registration order.
    pub pending: Vec<Pc>,
}

impl ControlScope {
    #[must_use]
    pub const fn new(kind: ScopeKind, start_pc: Pc) -> Self {
        Self {
            kind,
            start_pc,
            pending: Vec::new(),
        }
    }

    /// Where branches naming this scope land.
    #[must_use]
    pub const fn label_target(&self) -> LabelTarget {
        match self.kind {
            ScopeKind::Loop => LabelTarget::Backward(self.start_pc),
            ScopeKind::Block | ScopeKind::IfNoElse | ScopeKind::IfWithElse { .. } => {
                LabelTarget::Forward
            }
        }
    }

    /// Offset of the matching `else`, if one was seen.
    #[must_use]
    pub const fn else_pc(&self) -> Option<Pc> {
        match self.kind {
            ScopeKind::IfWithElse { else_pc } => Some(else_pc),
            _ => None,
        }
    }

    /// Deltas that close this scope at the `end` located at `end_pc`.
    ///
    /// A no-`else` `if` lands on its `end`; every pending offset lands one
    /// past it.
    pub fn close(self, end_pc: Pc) -> impl Iterator<Item = (Pc, PcDelta)> {
        let exit = end_pc + 1;
        let entry = (self.kind == ScopeKind::IfNoElse)
            .then(|| (self.start_pc, pc_delta(self.start_pc, end_pc)));
        entry.into_iter().chain(
            self.pending
                .into_iter()
                .map(move |pc| (pc, pc_delta(pc, exit))),
        )
    }
}

/// LIFO stack of open scopes. Depth 0 is the innermost scope.
#[derive(Clone, Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<ControlScope>,
    high_water: usize,
}

impl ScopeStack {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            scopes: Vec::new(),
            high_water: 0,
        }
    }

    pub fn push(&mut self, scope: ControlScope) {
        self.scopes.push(scope);
        self.high_water = self.high_water.max(self.scopes.len());
    }

    pub fn pop(&mut self) -> Option<ControlScope> {
        self.scopes.pop()
    }

    /// Innermost open scope.
    pub fn top_mut(&mut self) -> Option<&mut ControlScope> {
        self.scopes.last_mut()
    }

    /// Scope `depth` positions below the top.
    pub fn get_mut(&mut self, depth: usize) -> Option<&mut ControlScope> {
        let index = self.scopes.len().checked_sub(depth)?.checked_sub(1)?;
        self.scopes.get_mut(index)
    }

    /// Number of open scopes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.scopes.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Deepest nesting reached so far.
    #[must_use]
    pub const fn high_water(&self) -> usize {
        self.high_water
    }
}
