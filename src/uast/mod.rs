//! Unified AST for Kotlin and Java sources.
//!
//! Both front ends lower their tree-sitter parse trees into this arena-based
//! representation so the analysis layer never has to care which language a
//! file was written in. Nodes are addressed by integer ids; parent links and
//! source locations live in side tables keyed by the same ids.

pub mod lower;

use std::collections::HashMap;

/// Identifies a node in a [`UastTree`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Identifies a declaration (local variable, parameter, or field).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(pub u32);

/// Source language of a compilation unit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    Kotlin,
    Java,
}

/// Line/column position within a source file (1-based line)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Postfix operators we distinguish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostfixOp {
    /// Kotlin `!!` not-null assertion
    NotNull,
    Other,
}

/// Kind of declaration a name can bind to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Local,
    Parameter,
    Field,
}

/// A declared variable, parameter, or field.
///
/// `alt` models front ends that expose two equivalent handles for one
/// logical variable; reference tracking records both so containment checks
/// succeed regardless of which handle a later resolution returns.
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    pub alt: Option<DeclId>,
    /// Compiler-introduced variable (e.g. the elvis desugaring temp)
    pub synthetic: bool,
}

/// Resolution info for a call, when the front end can provide it.
/// Used by the self-return heuristic.
#[derive(Debug, Clone)]
pub struct CallTarget {
    pub method: String,
    pub container: Option<String>,
    pub return_type: Option<String>,
}

/// Closed set of node kinds the analysis dispatches on.
///
/// Anything a front end cannot classify lowers to [`NodeKind::Other`] with
/// its children preserved, so traversal still reaches every subtree.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// A call; `receiver` is a back-link into the enclosing qualified
    /// expression's receiver and is not traversed from here (the
    /// [`NodeKind::Qualified`] wrapper owns it).
    Call {
        name: String,
        receiver: Option<NodeId>,
        args: Vec<NodeId>,
    },
    /// `a.b` / `a.b()`: receiver plus selector
    Qualified { receiver: NodeId, selector: NodeId },
    /// A simple name reference; bindings live in the resolution table
    Name { identifier: String },
    Lambda { body: NodeId },
    Block { statements: Vec<NodeId> },
    If {
        condition: Option<NodeId>,
        then_branch: Option<NodeId>,
        else_branch: Option<NodeId>,
        /// Expression-valued (Kotlin) vs statement-only (Java)
        expression: bool,
    },
    /// Desugared `a ?: b`: a synthetic temp holding `a`, and a check `If`
    /// that yields the temp or evaluates `b`
    Elvis { temp: NodeId, check: NodeId },
    Switch {
        subject: Option<NodeId>,
        clauses: Vec<NodeId>,
    },
    SwitchClause {
        body: Vec<NodeId>,
        /// True when the clause body is a statement list (Kotlin `when`)
        block_body: bool,
    },
    Return {
        value: Option<NodeId>,
        /// Implicit trailing-expression return inside a lambda
        implicit: bool,
    },
    Yield { value: Option<NodeId> },
    Labeled { label: String, expression: NodeId },
    Postfix { operand: NodeId, op: PostfixOp },
    Binary {
        lhs: NodeId,
        rhs: NodeId,
        assignment: bool,
    },
    LocalVariable {
        decl: DeclId,
        initializer: Option<NodeId>,
    },
    Parens { inner: NodeId },
    Other { children: Vec<NodeId> },
}

impl NodeKind {
    /// Children in source order. `Call::receiver` is deliberately absent:
    /// it is reached through the qualified wrapper.
    pub fn children(&self) -> Vec<NodeId> {
        match self {
            NodeKind::Call { args, .. } => args.clone(),
            NodeKind::Qualified { receiver, selector } => vec![*receiver, *selector],
            NodeKind::Name { .. } => Vec::new(),
            NodeKind::Lambda { body } => vec![*body],
            NodeKind::Block { statements } => statements.clone(),
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
                ..
            } => condition
                .iter()
                .chain(then_branch.iter())
                .chain(else_branch.iter())
                .copied()
                .collect(),
            NodeKind::Elvis { temp, check } => vec![*temp, *check],
            NodeKind::Switch { subject, clauses } => subject
                .iter()
                .copied()
                .chain(clauses.iter().copied())
                .collect(),
            NodeKind::SwitchClause { body, .. } => body.clone(),
            NodeKind::Return { value, .. } => value.iter().copied().collect(),
            NodeKind::Yield { value } => value.iter().copied().collect(),
            NodeKind::Labeled { expression, .. } => vec![*expression],
            NodeKind::Postfix { operand, .. } => vec![*operand],
            NodeKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            NodeKind::LocalVariable { initializer, .. } => {
                initializer.iter().copied().collect()
            }
            NodeKind::Parens { inner } => vec![*inner],
            NodeKind::Other { children } => children.clone(),
        }
    }
}

/// Arena-owned unified syntax tree for one compilation unit
#[derive(Debug, Default)]
pub struct UastTree {
    kinds: Vec<NodeKind>,
    parents: Vec<Option<NodeId>>,
    locations: Vec<Location>,
    decls: Vec<Declaration>,
    resolutions: HashMap<NodeId, DeclId>,
    targets: HashMap<NodeId, CallTarget>,
}

impl UastTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: NodeKind, location: Location) -> NodeId {
        let id = NodeId(self.kinds.len() as u32);
        self.kinds.push(kind);
        self.parents.push(None);
        self.locations.push(location);
        id
    }

    pub fn add_decl(&mut self, decl: Declaration) -> DeclId {
        let id = DeclId(self.decls.len() as u32);
        self.decls.push(decl);
        id
    }

    /// Record that `name` resolves to `decl`
    pub fn bind(&mut self, name: NodeId, decl: DeclId) {
        self.resolutions.insert(name, decl);
    }

    pub fn set_target(&mut self, call: NodeId, target: CallTarget) {
        self.targets.insert(call, target);
    }

    /// Recompute every parent link from the children relation. Must be
    /// called once after the last node is pushed.
    pub fn finish(&mut self) {
        for slot in self.parents.iter_mut() {
            *slot = None;
        }
        for index in 0..self.kinds.len() {
            let parent = NodeId(index as u32);
            for child in self.kinds[index].children() {
                self.parents[child.0 as usize] = Some(parent);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.kinds[id.0 as usize]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id.0 as usize]
    }

    pub fn location(&self, id: NodeId) -> Location {
        self.locations[id.0 as usize]
    }

    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.decls[id.0 as usize]
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    pub fn target(&self, call: NodeId) -> Option<&CallTarget> {
        self.targets.get(&call)
    }

    /// Resolve a reference expression to its declaration, if bound.
    /// Looks through parentheses and qualified selectors the way the
    /// front-end resolver does.
    pub fn try_resolve(&self, id: NodeId) -> Option<DeclId> {
        match self.kind(id) {
            NodeKind::Name { .. } => self.resolutions.get(&id).copied(),
            NodeKind::Parens { inner } => self.try_resolve(*inner),
            NodeKind::Qualified { selector, .. } => self.try_resolve(*selector),
            _ => None,
        }
    }

    /// True for nodes the resolver treats as reference expressions
    pub fn is_reference(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Name { .. })
    }

    /// Skip down through parenthesized wrappers
    pub fn skip_parens(&self, mut id: NodeId) -> NodeId {
        while let NodeKind::Parens { inner } = self.kind(id) {
            id = *inner;
        }
        id
    }

    /// Climb to the first non-parenthesized node at or above `id`
    pub fn skip_parens_up(&self, mut id: NodeId) -> Option<NodeId> {
        while matches!(self.kind(id), NodeKind::Parens { .. }) {
            id = self.parent(id)?;
        }
        Some(id)
    }

    /// The enclosing qualified expression when `id` is its selector,
    /// otherwise `id` itself
    pub fn qualified_parent_or_self(&self, id: NodeId) -> NodeId {
        if let Some(parent) = self.parent(id) {
            if let NodeKind::Qualified { selector, .. } = self.kind(parent) {
                if *selector == id {
                    return parent;
                }
            }
        }
        id
    }

    /// Walk up at most `max_depth` parents and return the first ancestor
    /// matching `pred`. The bound is explicit: callers that only unwrap a
    /// fixed number of wrapper layers must never degrade into an unbounded
    /// ancestor search.
    pub fn ancestor_within(
        &self,
        id: NodeId,
        max_depth: usize,
        pred: impl Fn(&NodeKind) -> bool,
    ) -> Option<NodeId> {
        let mut current = id;
        for _ in 0..max_depth {
            current = self.parent(current)?;
            if pred(self.kind(current)) {
                return Some(current);
            }
        }
        None
    }

    /// Unbounded ancestor search, for enclosing-construct lookups
    pub fn enclosing(&self, id: NodeId, pred: impl Fn(&NodeKind) -> bool) -> Option<NodeId> {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            if pred(self.kind(parent)) {
                return Some(parent);
            }
            current = parent;
        }
        None
    }

    /// All node ids, in push order
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.kinds.len() as u32).map(NodeId)
    }
}

/// A function or method body ready for analysis
#[derive(Debug, Clone)]
pub struct FunctionUnit {
    pub name: String,
    pub body: NodeId,
    pub location: Location,
}

/// One lowered compilation unit
#[derive(Debug)]
pub struct ParsedUnit {
    pub path: std::path::PathBuf,
    pub language: Language,
    pub tree: UastTree,
    pub functions: Vec<FunctionUnit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(tree: &mut UastTree, identifier: &str) -> NodeId {
        tree.push(
            NodeKind::Name {
                identifier: identifier.to_string(),
            },
            Location::default(),
        )
    }

    #[test]
    fn test_parent_links() {
        let mut tree = UastTree::new();
        let recv = name(&mut tree, "db");
        let call = tree.push(
            NodeKind::Call {
                name: "query".to_string(),
                receiver: Some(recv),
                args: vec![],
            },
            Location::default(),
        );
        let qualified = tree.push(
            NodeKind::Qualified {
                receiver: recv,
                selector: call,
            },
            Location::default(),
        );
        tree.finish();

        assert_eq!(tree.parent(recv), Some(qualified));
        assert_eq!(tree.parent(call), Some(qualified));
        assert_eq!(tree.parent(qualified), None);
        assert_eq!(tree.qualified_parent_or_self(call), qualified);
        assert_eq!(tree.qualified_parent_or_self(qualified), qualified);
    }

    #[test]
    fn test_resolution_through_parens() {
        let mut tree = UastTree::new();
        let decl = tree.add_decl(Declaration {
            name: "cursor".to_string(),
            kind: DeclKind::Local,
            alt: None,
            synthetic: false,
        });
        let reference = name(&mut tree, "cursor");
        tree.bind(reference, decl);
        let parens = tree.push(NodeKind::Parens { inner: reference }, Location::default());
        tree.finish();

        assert_eq!(tree.try_resolve(parens), Some(decl));
        assert_eq!(tree.skip_parens(parens), reference);
    }

    #[test]
    fn test_ancestor_walk_is_bounded() {
        let mut tree = UastTree::new();
        let leaf = name(&mut tree, "x");
        let mut wrapped = leaf;
        for _ in 0..4 {
            wrapped = tree.push(NodeKind::Parens { inner: wrapped }, Location::default());
        }
        tree.finish();

        let is_outermost = |tree: &UastTree, id: NodeId| tree.parent(id).is_none();
        let found = tree.ancestor_within(leaf, 2, |_| false);
        assert!(found.is_none());
        let found = tree.ancestor_within(leaf, 4, |k| matches!(k, NodeKind::Parens { .. }));
        assert!(found.is_some());
        assert!(!is_outermost(&tree, found.unwrap()));
    }
}
