//! The flow tracker walk.
//!
//! One tracker instance performs exactly one forward traversal of one
//! function body and is then discarded. Call handling happens on node
//! entry; variable, postfix, switch-clause, yield, labeled, if, assignment
//! and return propagation happen after a node's children have been visited.

use super::{FlowState, SinkEvent, SinkKind};
use crate::uast::{DeclId, DeclKind, NodeId, NodeKind, UastTree};
use std::collections::HashSet;
use tracing::trace;

/// Kotlin scoping functions whose lambda body keeps operating on the
/// receiver value
const SCOPING_FUNCTIONS: [&str; 5] = ["apply", "run", "with", "also", "let"];

/// Containing class of the Kotlin stdlib scope functions; `also`/`apply`
/// return their receiver even though their declared return type says
/// otherwise
const KOTLIN_STDLIB_SCOPE_CONTAINER: &str = "kotlin.StandardKt__StandardKt";

/// Result of one traversal: the final tracking state plus every sink the
/// tracked value reached, in traversal order.
#[derive(Debug)]
pub struct FlowReport {
    pub state: FlowState,
    pub events: Vec<SinkEvent>,
}

impl FlowReport {
    pub fn events_of(&self, kind: SinkKind) -> impl Iterator<Item = &SinkEvent> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// True when the value left the analyzed scope (returned, stored into
    /// a field, or handed to another call as an argument)
    pub fn escaped(&self) -> bool {
        self.events.iter().any(|e| {
            matches!(
                e.kind,
                SinkKind::Returns | SinkKind::Field | SinkKind::Argument
            )
        })
    }

    /// Calls that consumed the tracked value as their receiver
    pub fn receiver_calls(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.events_of(SinkKind::Receiver).filter_map(|e| e.call)
    }
}

/// Tracks where a seeded value flows within a single subtree.
///
/// Seeds are the acquisition expressions (and optionally the declarations
/// already known to hold the value). Sink consumption is reported as
/// [`SinkEvent`]s rather than callbacks; callers fold the event list.
pub struct FlowTracker<'a> {
    tree: &'a UastTree,
    state: FlowState,
    /// Original instance seeds; the acquisition call itself never fires
    /// the receiver sink
    seeds: HashSet<NodeId>,
    /// Domain-specific methods known to return their receiver
    self_returning: HashSet<String>,
}

impl<'a> FlowTracker<'a> {
    pub fn new(tree: &'a UastTree, seeds: &[NodeId]) -> Self {
        let mut state = FlowState::new();
        let mut seed_set = HashSet::new();
        for &seed in seeds {
            seed_set.insert(seed);
            state.instances.insert(seed);
            // A seeded call selected through a qualified wrapper also seeds
            // the wrapper, so matching on the outer expression succeeds
            if matches!(tree.kind(seed), NodeKind::Call { .. }) {
                let qualified = tree.qualified_parent_or_self(seed);
                if qualified != seed {
                    state.instances.insert(qualified);
                }
            }
        }
        Self {
            tree,
            state,
            seeds: seed_set,
            self_returning: HashSet::new(),
        }
    }

    /// Seed declarations already known to alias the tracked value
    pub fn with_references(mut self, references: &[DeclId]) -> Self {
        self.state.references.extend(references.iter().copied());
        self
    }

    /// Extend the self-return heuristic with known fluent APIs
    /// (e.g. `FragmentTransaction.add`, `SharedPreferences.Editor.putString`)
    pub fn with_self_returning<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.self_returning.extend(names.into_iter().map(Into::into));
        self
    }

    /// Walk the subtree rooted at `root` and report every sink the tracked
    /// value reached
    pub fn analyze(mut self, root: NodeId) -> FlowReport {
        let mut events = Vec::new();
        self.walk(root, &mut events);
        trace!(
            instances = self.state.instances.len(),
            references = self.state.references.len(),
            events = events.len(),
            "flow walk finished"
        );
        FlowReport {
            state: self.state,
            events,
        }
    }

    fn walk(&mut self, id: NodeId, events: &mut Vec<SinkEvent>) {
        if matches!(self.tree.kind(id), NodeKind::Call { .. }) {
            self.visit_call(id, events);
        }
        for child in self.tree.kind(id).children() {
            self.walk(child, events);
        }
        self.leave(id, events);
    }

    fn leave(&mut self, id: NodeId, events: &mut Vec<SinkEvent>) {
        match self.tree.kind(id).clone() {
            NodeKind::LocalVariable { decl, initializer } => {
                self.after_variable(decl, initializer)
            }
            NodeKind::Postfix { operand, op } => {
                if op == crate::uast::PostfixOp::NotNull
                    && self.state.instances.contains(&operand)
                {
                    // The assertion does not change the value's identity
                    self.state.instances.insert(id);
                }
            }
            NodeKind::SwitchClause { body, block_body } => {
                self.after_switch_clause(id, &body, block_body)
            }
            NodeKind::Yield { value } => {
                if let Some(value) = value {
                    if self.state.instances.contains(&value) {
                        self.state.instances.insert(id);
                    }
                }
            }
            NodeKind::Labeled { expression, .. } => {
                if self.state.instances.contains(&expression) {
                    self.state.instances.insert(id);
                }
            }
            NodeKind::If {
                then_branch,
                else_branch,
                expression,
                ..
            } => self.after_if(id, then_branch, else_branch, expression),
            NodeKind::Binary {
                lhs,
                rhs,
                assignment,
            } => self.after_assignment(lhs, rhs, assignment, events),
            NodeKind::Return { value, .. } => self.after_return(id, value, events),
            _ => {}
        }
    }

    // ------------------------------------------------------------------
    // Call expressions
    // ------------------------------------------------------------------

    fn visit_call(&mut self, node: NodeId, events: &mut Vec<SinkEvent>) {
        let NodeKind::Call {
            name,
            receiver,
            args,
        } = self.tree.kind(node).clone()
        else {
            return;
        };

        let mut matched = false;
        if let Some(receiver) = receiver {
            if self.state.instances.contains(&receiver) {
                matched = true;
            } else if let Some(resolved) = self.tree.try_resolve(receiver) {
                if self.is_tracked_reference(resolved) {
                    matched = true;
                }
            }
        } else {
            // Implicit receiver: a call directly inside the lambda of a
            // scoping function still operates on the tracked value. The
            // lambda may sit one, two, or (through an implicit return
            // wrapper) three parents up.
            let lambda = self
                .tree
                .ancestor_within(node, 3, |k| matches!(k, NodeKind::Lambda { .. }));
            let in_scoping_lambda = lambda
                .and_then(|l| self.tree.parent(l))
                .map(|p| self.is_scoping_function_call(p))
                .unwrap_or(false);
            if in_scoping_lambda {
                if self.state.instances.contains(&node) {
                    matched = true;
                }
            } else if name == "with" && args.len() == 2 {
                // with(tracked) { ... } forward-seeds the lambda body,
                // independent of whether this call itself matches
                if self.state.instances.contains(&args[0])
                    && matches!(self.tree.kind(args[1]), NodeKind::Lambda { .. })
                {
                    self.seed_lambda_body(args[1]);
                }
            }
        }

        if matched {
            if !self.seeds.contains(&node) {
                events.push(SinkEvent {
                    kind: SinkKind::Receiver,
                    node,
                    call: Some(node),
                });
            }
            if self.returns_self(node, &name) {
                self.state.instances.insert(node);
                if let Some(parent) = self.qualified_wrapper(node) {
                    self.state.instances.insert(parent);
                    // Track the next selector too so a chained call further
                    // down (x.a().b().c()) still matches
                    if let Some(grandparent) = self.tree.parent(parent) {
                        if let NodeKind::Qualified { selector, .. } =
                            self.tree.kind(grandparent)
                        {
                            self.state.instances.insert(*selector);
                        }
                    }
                }
            }
            if SCOPING_FUNCTIONS.contains(&name.as_str()) {
                if let Some(&last) = args.last() {
                    if matches!(self.tree.kind(last), NodeKind::Lambda { .. }) {
                        self.seed_lambda_body(last);
                    }
                }
            }
        }

        // Argument sinks. An instance match reports and keeps scanning; a
        // reference match reports and stops. The asymmetry is deliberate
        // and mirrored by the hook-count tests.
        for &arg in &args {
            if self.state.instances.contains(&arg) {
                events.push(SinkEvent {
                    kind: SinkKind::Argument,
                    node: arg,
                    call: Some(node),
                });
            } else if self.tree.is_reference(arg) {
                if let Some(resolved) = self.tree.try_resolve(arg) {
                    if self.is_tracked_reference(resolved) {
                        events.push(SinkEvent {
                            kind: SinkKind::Argument,
                            node: arg,
                            call: Some(node),
                        });
                        break;
                    }
                }
            }
        }
    }

    /// Seed a scoping-function lambda body: the body itself, plus every
    /// top-level statement (or the operand of a return among them)
    fn seed_lambda_body(&mut self, lambda: NodeId) {
        let NodeKind::Lambda { body } = self.tree.kind(lambda) else {
            return;
        };
        let body = *body;
        self.state.instances.insert(body);
        if let NodeKind::Block { statements } = self.tree.kind(body) {
            for &statement in statements {
                if let NodeKind::Return { value, .. } = self.tree.kind(statement) {
                    if let Some(value) = value {
                        self.state.instances.insert(*value);
                    }
                } else {
                    self.state.instances.insert(statement);
                }
            }
        }
        trace!(?lambda, "seeded scoping-function lambda body");
    }

    fn is_scoping_function_call(&self, node: NodeId) -> bool {
        match self.tree.kind(node) {
            NodeKind::Call { name, .. } => SCOPING_FUNCTIONS.contains(&name.as_str()),
            _ => false,
        }
    }

    /// Guess whether a call returns its own receiver, so that fluent
    /// chains like foo().bar().baz() keep tracking the foo instance.
    fn returns_self(&self, node: NodeId, name: &str) -> bool {
        if self.self_returning.contains(name) {
            return true;
        }
        if let Some(target) = self.tree.target(node) {
            if let (Some(container), Some(return_type)) =
                (&target.container, &target.return_type)
            {
                if container == return_type {
                    return true;
                }
            }
            // The stdlib scope functions return "this" but are not
            // nominally typed as returning the containing class
            return (name == "also" || name == "apply")
                && target.container.as_deref() == Some(KOTLIN_STDLIB_SCOPE_CONTAINER);
        }
        // Unresolved call: keep tracking through also/apply, which return
        // their receiver by language convention
        name == "also" || name == "apply"
    }

    /// The qualified expression selecting `node`, if any
    fn qualified_wrapper(&self, node: NodeId) -> Option<NodeId> {
        let parent = self.tree.parent(node)?;
        match self.tree.kind(parent) {
            NodeKind::Qualified { selector, .. } if *selector == node => Some(parent),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Post-child propagation
    // ------------------------------------------------------------------

    fn after_variable(&mut self, decl: DeclId, initializer: Option<NodeId>) {
        let Some(initializer) = initializer else {
            return;
        };
        if self.state.instances.contains(&initializer) {
            self.add_variable_reference(decl);
        } else if self.tree.is_reference(initializer) {
            if let Some(resolved) = self.tree.try_resolve(initializer) {
                if self.is_tracked_reference(resolved) {
                    self.add_variable_reference(decl);
                }
            }
        }
    }

    fn after_switch_clause(&mut self, clause: NodeId, body: &[NodeId], block_body: bool) {
        if !block_body {
            return;
        }
        for statement in body {
            if self.state.instances.contains(statement) {
                if let Some(switch) = self
                    .tree
                    .enclosing(clause, |k| matches!(k, NodeKind::Switch { .. }))
                {
                    self.state.instances.insert(switch);
                    break;
                }
            }
        }
    }

    fn after_if(
        &mut self,
        node: NodeId,
        then_branch: Option<NodeId>,
        else_branch: Option<NodeId>,
        expression: bool,
    ) {
        // A statement-only conditional produces no value to track
        if !expression {
            return;
        }

        // Elvis: the desugared check-if sits under the wrapper; when the
        // "then" side is a name bound to a tracked variable, the wrapper
        // itself carries the value
        if let Some(parent) = self.tree.parent(node) {
            if matches!(self.tree.kind(parent), NodeKind::Elvis { .. }) {
                if let Some(then) = then_branch {
                    if self.tree.is_reference(then) {
                        if let Some(resolved) = self.tree.try_resolve(then) {
                            if self.is_tracked_reference(resolved) {
                                self.state.instances.insert(parent);
                            }
                        }
                    }
                }
            }
        }

        let then_tracked =
            then_branch.is_some_and(|b| self.state.instances.contains(&b));
        let else_tracked =
            else_branch.is_some_and(|b| self.state.instances.contains(&b));
        if then_tracked || else_tracked {
            self.state.instances.insert(node);
        } else {
            // Only the trailing statement of a branch block carries the
            // branch's value
            for branch in [then_branch, else_branch].into_iter().flatten() {
                if let NodeKind::Block { statements } = self.tree.kind(branch) {
                    if let Some(last) = statements.last() {
                        if self.state.instances.contains(last) {
                            self.state.instances.insert(node);
                        }
                    }
                }
            }
        }
    }

    fn after_assignment(
        &mut self,
        lhs: NodeId,
        rhs: NodeId,
        assignment: bool,
        events: &mut Vec<SinkEvent>,
    ) {
        if !assignment {
            return;
        }

        // Reassignment used to clear the left-hand side out of the
        // reference set, but deciding that the new value is genuinely
        // unrelated proved too imprecise (database cursor reassignment
        // regressions), so the set only grows.
        let clear_lhs = false;

        if self.state.instances.contains(&rhs) {
            self.record_assignment(lhs, rhs, events);
        } else if self.tree.is_reference(rhs) {
            if let Some(resolved) = self.tree.try_resolve(rhs) {
                if self.is_tracked_reference(resolved) {
                    self.record_assignment(lhs, rhs, events);
                }
            }
        }

        if clear_lhs {
            if let Some(resolved) = self.tree.try_resolve(lhs) {
                self.state.references.remove(&resolved);
            }
        }
    }

    fn record_assignment(&mut self, lhs: NodeId, rhs: NodeId, events: &mut Vec<SinkEvent>) {
        let Some(resolved) = self.tree.try_resolve(lhs) else {
            return;
        };
        match self.tree.decl(resolved).kind {
            DeclKind::Local | DeclKind::Parameter => self.add_variable_reference(resolved),
            // Field stores are sinks, not aliases: the tracker cannot
            // safely follow field reads across call boundaries
            DeclKind::Field => events.push(SinkEvent {
                kind: SinkKind::Field,
                node: rhs,
                call: None,
            }),
        }
    }

    fn after_return(
        &mut self,
        node: NodeId,
        value: Option<NodeId>,
        events: &mut Vec<SinkEvent>,
    ) {
        let Some(value) = value else {
            return;
        };
        let escaped = self.state.instances.contains(&value)
            || (self.tree.is_reference(value)
                && self
                    .tree
                    .try_resolve(value)
                    .is_some_and(|d| self.is_tracked_reference(d)));
        if escaped {
            events.push(SinkEvent {
                kind: SinkKind::Returns,
                node,
                call: None,
            });
        }
    }

    // ------------------------------------------------------------------
    // Reference bookkeeping
    // ------------------------------------------------------------------

    /// Record the declaration under every handle the front end exposes
    /// for it
    fn add_variable_reference(&mut self, decl: DeclId) {
        self.state.references.insert(decl);
        if let Some(alt) = self.tree.decl(decl).alt {
            self.state.references.insert(alt);
        }
    }

    fn is_tracked_reference(&self, decl: DeclId) -> bool {
        if self.state.references.contains(&decl) {
            return true;
        }
        self.tree
            .decl(decl)
            .alt
            .is_some_and(|alt| self.state.references.contains(&alt))
    }
}

/// Returns the variable that directly receives the result of `call`, if
/// any.
///
/// With `allow_chained_calls`, skips past intermediate fluent calls, so
/// `var x = prefs.edit().putString(k, v)` resolves to `x`. Skips the
/// synthetic temp variable introduced by elvis desugaring and returns the
/// outer named variable instead. `None` simply means the result is used as
/// a pure expression.
pub fn get_variable_element(
    tree: &UastTree,
    call: NodeId,
    allow_chained_calls: bool,
    allow_fields: bool,
) -> Option<DeclId> {
    let start = tree.qualified_parent_or_self(call);
    let mut parent = tree.parent(start).and_then(|p| tree.skip_parens_up(p));

    if allow_chained_calls {
        while let Some(p) = parent {
            if !matches!(tree.kind(p), NodeKind::Qualified { .. }) {
                break;
            }
            let grandparent = tree.parent(p).and_then(|g| tree.skip_parens_up(g));
            match grandparent {
                Some(g) if matches!(tree.kind(g), NodeKind::Qualified { .. }) => {
                    parent = tree.parent(g).and_then(|n| tree.skip_parens_up(n));
                }
                Some(g)
                    if matches!(
                        tree.kind(g),
                        NodeKind::LocalVariable { .. } | NodeKind::Binary { .. }
                    ) =>
                {
                    parent = Some(g);
                    break;
                }
                _ => break,
            }
        }
    }

    let parent = parent?;
    match tree.kind(parent) {
        NodeKind::Binary {
            lhs,
            assignment: true,
            ..
        } => {
            let resolved = tree.try_resolve(*lhs)?;
            let kind = tree.decl(resolved).kind;
            match kind {
                DeclKind::Local | DeclKind::Parameter => Some(resolved),
                DeclKind::Field if allow_fields => Some(resolved),
                DeclKind::Field => None,
            }
        }
        NodeKind::LocalVariable { decl, .. } => {
            // Elvis desugaring wraps the initializer in a synthetic temp:
            // record the outer named variable, not the temp
            if let Some(elvis) = tree.parent(parent) {
                if matches!(tree.kind(elvis), NodeKind::Elvis { .. }) {
                    if let Some(outer) = tree.parent(elvis) {
                        if let NodeKind::LocalVariable { decl: outer_decl, .. } =
                            tree.kind(outer)
                        {
                            return Some(*outer_decl);
                        }
                    }
                }
            }
            Some(*decl)
        }
        _ => None,
    }
}
