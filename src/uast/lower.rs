//! Lowering from tree-sitter parse trees to the unified AST.
//!
//! The lowering is deliberately best-effort: every construct we do not
//! model becomes [`NodeKind::Other`] with its children preserved, so the
//! flow walk still reaches every subtree and simply sees no tracked
//! relationship there. Name resolution is lexical only (parameters,
//! locals, enclosing-class fields); cross-file resolution is out of scope.

use super::{
    DeclKind, Declaration, FunctionUnit, Language, Location, NodeId, NodeKind, ParsedUnit,
    PostfixOp, UastTree,
};
use crate::parser::{JavaParser, KotlinParser, SourceTree};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Parse and lower one source file
pub fn lower_file(path: &Path, source: &str, language: Language) -> Result<ParsedUnit> {
    let parsed = match language {
        Language::Kotlin => KotlinParser::new()
            .context("loading Kotlin grammar")?
            .parse(source)
            .with_context(|| format!("parsing {}", path.display()))?,
        Language::Java => JavaParser::new()
            .context("loading Java grammar")?
            .parse(source)
            .with_context(|| format!("parsing {}", path.display()))?,
    };
    lower_tree(path, &parsed, language)
}

/// Lower an already parsed file
pub fn lower_tree(path: &Path, parsed: &SourceTree, language: Language) -> Result<ParsedUnit> {
    let mut lowerer = Lowerer::new(&parsed.source, language);
    lowerer.lower_root(parsed.tree.root_node());
    let Lowerer {
        mut tree,
        functions,
        ..
    } = lowerer;
    tree.finish();
    debug!(
        path = %path.display(),
        nodes = tree.len(),
        functions = functions.len(),
        "lowered compilation unit"
    );
    Ok(ParsedUnit {
        path: path.to_path_buf(),
        language,
        tree,
        functions,
    })
}

struct Lowerer<'s> {
    source: &'s str,
    language: Language,
    tree: UastTree,
    /// Innermost scope last; slot 0 holds enclosing-class fields
    scopes: Vec<HashMap<String, super::DeclId>>,
    functions: Vec<FunctionUnit>,
    elvis_counter: u32,
}

impl<'s> Lowerer<'s> {
    fn new(source: &'s str, language: Language) -> Self {
        Self {
            source,
            language,
            tree: UastTree::new(),
            scopes: vec![HashMap::new()],
            functions: Vec::new(),
            elvis_counter: 0,
        }
    }

    fn text(&self, node: tree_sitter::Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or_default()
    }

    fn loc(&self, node: tree_sitter::Node) -> Location {
        let point = node.start_position();
        Location::new(point.row + 1, point.column + 1)
    }

    fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, kind: DeclKind, synthetic: bool) -> super::DeclId {
        let id = self.tree.add_decl(Declaration {
            name: name.to_string(),
            kind,
            alt: None,
            synthetic,
        });
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_string(), id);
        }
        id
    }

    fn lookup(&self, name: &str) -> Option<super::DeclId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    fn named_children<'t>(node: tree_sitter::Node<'t>) -> Vec<tree_sitter::Node<'t>> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor).collect()
    }

    fn all_children<'t>(node: tree_sitter::Node<'t>) -> Vec<tree_sitter::Node<'t>> {
        let mut cursor = node.walk();
        node.children(&mut cursor).collect()
    }

    // ------------------------------------------------------------------
    // Top level
    // ------------------------------------------------------------------

    fn lower_root(&mut self, root: tree_sitter::Node) {
        self.lower_container(root, None);
    }

    /// Walk declarations in a file, class body, or object body
    fn lower_container(&mut self, node: tree_sitter::Node, class_name: Option<&str>) {
        for child in Self::named_children(node) {
            match child.kind() {
                "function_declaration" | "method_declaration" => {
                    self.lower_function(child);
                }
                "class_declaration" | "object_declaration" | "companion_object"
                | "interface_declaration" | "enum_declaration" => {
                    let name = Self::named_children(child)
                        .iter()
                        .find(|c| {
                            c.kind() == "simple_identifier" || c.kind() == "identifier"
                        })
                        .map(|c| self.text(*c).to_string());
                    for body in Self::named_children(child) {
                        if matches!(
                            body.kind(),
                            "class_body" | "enum_class_body" | "interface_body"
                        ) {
                            self.lower_container(body, name.as_deref());
                        }
                    }
                }
                // Kotlin class-level property / Java field
                "property_declaration" if class_name.is_some() => {
                    if let Some(name) = self.declared_name(child) {
                        let name = name.to_string();
                        self.declare_field(&name);
                    }
                }
                "field_declaration" => {
                    for declarator in Self::named_children(child) {
                        if declarator.kind() == "variable_declarator" {
                            if let Some(name) = declarator.child_by_field_name("name") {
                                let name = self.text(name).to_string();
                                self.declare_field(&name);
                            }
                        }
                    }
                }
                "source_file" | "program" | "class_body" => {
                    self.lower_container(child, class_name);
                }
                _ => {}
            }
        }
    }

    fn declare_field(&mut self, name: &str) {
        let id = self.tree.add_decl(Declaration {
            name: name.to_string(),
            kind: DeclKind::Field,
            alt: None,
            synthetic: false,
        });
        // Fields live in the outermost scope so locals shadow them
        if let Some(scope) = self.scopes.first_mut() {
            scope.insert(name.to_string(), id);
        }
    }

    fn lower_function(&mut self, node: tree_sitter::Node) {
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .or_else(|| {
                Self::named_children(node)
                    .iter()
                    .find(|c| c.kind() == "simple_identifier")
                    .map(|c| self.text(*c).to_string())
            })
            .unwrap_or_else(|| "<anonymous>".to_string());

        self.push_scope();
        self.lower_parameters(node);

        let body = self.function_body(node);
        self.pop_scope();

        let Some(body) = body else {
            return; // abstract / interface method
        };
        self.functions.push(FunctionUnit {
            name,
            body,
            location: self.loc(node),
        });
    }

    fn lower_parameters(&mut self, function: tree_sitter::Node) {
        for child in Self::named_children(function) {
            if matches!(
                child.kind(),
                "function_value_parameters" | "formal_parameters"
            ) {
                for param in Self::named_children(child) {
                    if matches!(child.kind(), "formal_parameters") {
                        if let Some(name) = param.child_by_field_name("name") {
                            let name = self.text(name).to_string();
                            self.declare(&name, DeclKind::Parameter, false);
                        }
                        continue;
                    }
                    if let Some(identifier) = Self::named_children(param)
                        .iter()
                        .find(|c| c.kind() == "simple_identifier")
                    {
                        let name = self.text(*identifier).to_string();
                        self.declare(&name, DeclKind::Parameter, false);
                    }
                }
            }
        }
    }

    fn function_body(&mut self, function: tree_sitter::Node) -> Option<NodeId> {
        if let Some(body) = function.child_by_field_name("body") {
            return Some(self.lower_block_like(body));
        }
        Self::named_children(function)
            .into_iter()
            .find(|c| matches!(c.kind(), "function_body" | "block"))
            .map(|body| self.lower_block_like(body))
    }

    /// Lower a `{ ... }` body (or `= expr` Kotlin body) to a Block
    fn lower_block_like(&mut self, node: tree_sitter::Node) -> NodeId {
        let location = self.loc(node);
        // Kotlin function_body wraps either a statements block or an
        // expression body
        let statements_node = Self::named_children(node)
            .into_iter()
            .find(|c| c.kind() == "statements");
        let statements: Vec<NodeId> = match statements_node {
            Some(stmts) => Self::named_children(stmts)
                .into_iter()
                .map(|s| self.lower_statement(s))
                .collect(),
            None if node.kind() == "statements" => Self::named_children(node)
                .into_iter()
                .map(|s| self.lower_statement(s))
                .collect(),
            None if matches!(node.kind(), "block" | "function_body" | "control_structure_body") => {
                Self::named_children(node)
                    .into_iter()
                    .map(|s| self.lower_statement(s))
                    .collect()
            }
            None => vec![self.lower_statement(node)],
        };
        self.tree.push(NodeKind::Block { statements }, location)
    }

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------

    fn lower_statement(&mut self, node: tree_sitter::Node) -> NodeId {
        match node.kind() {
            "property_declaration" | "local_variable_declaration" => {
                self.lower_variable_declaration(node)
            }
            "expression_statement" => {
                let children = Self::named_children(node);
                match children.first() {
                    Some(inner) => self.lower_expression(*inner),
                    None => self.other(node),
                }
            }
            "return_statement" => {
                let value = Self::named_children(node)
                    .first()
                    .map(|v| self.lower_expression(*v));
                let location = self.loc(node);
                self.tree.push(
                    NodeKind::Return {
                        value,
                        implicit: false,
                    },
                    location,
                )
            }
            "if_statement" => self.lower_java_if(node),
            "block" => self.lower_block_like(node),
            _ => self.lower_expression(node),
        }
    }

    fn lower_variable_declaration(&mut self, node: tree_sitter::Node) -> NodeId {
        let location = self.loc(node);
        if self.language == Language::Java {
            // int c = db.query(...); possibly several declarators
            let mut declared = Vec::new();
            for declarator in Self::named_children(node) {
                if declarator.kind() != "variable_declarator" {
                    continue;
                }
                let name = declarator
                    .child_by_field_name("name")
                    .map(|n| self.text(n).to_string())
                    .unwrap_or_default();
                let initializer = declarator
                    .child_by_field_name("value")
                    .map(|v| self.lower_expression(v));
                let decl = self.declare(&name, DeclKind::Local, false);
                declared.push(self.tree.push(
                    NodeKind::LocalVariable { decl, initializer },
                    location,
                ));
            }
            return match declared.len() {
                1 => declared[0],
                _ => self.tree.push(NodeKind::Other { children: declared }, location),
            };
        }

        // Kotlin val/var
        let name = self
            .declared_name(node)
            .map(str::to_string)
            .unwrap_or_default();
        let initializer = self.kotlin_initializer(node);
        let decl = self.declare(&name, DeclKind::Local, false);
        self.tree
            .push(NodeKind::LocalVariable { decl, initializer }, location)
    }

    fn declared_name(&self, node: tree_sitter::Node) -> Option<&str> {
        for child in Self::named_children(node) {
            if child.kind() == "variable_declaration" {
                for inner in Self::named_children(child) {
                    if inner.kind() == "simple_identifier" {
                        return Some(self.text(inner));
                    }
                }
            }
            if child.kind() == "simple_identifier" {
                return Some(self.text(child));
            }
        }
        None
    }

    fn kotlin_initializer(&mut self, node: tree_sitter::Node) -> Option<NodeId> {
        // The initializer is the expression following '=', the last named
        // child that is not the variable_declaration itself
        let children = Self::named_children(node);
        let initializer = children
            .into_iter()
            .filter(|c| !matches!(c.kind(), "variable_declaration" | "modifiers" | "user_type"))
            .next_back()?;
        Some(self.lower_expression(initializer))
    }

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------

    fn lower_expression(&mut self, node: tree_sitter::Node) -> NodeId {
        let location = self.loc(node);
        match node.kind() {
            "simple_identifier" | "identifier" => {
                let identifier = self.text(node).to_string();
                let id = self.tree.push(
                    NodeKind::Name {
                        identifier: identifier.clone(),
                    },
                    location,
                );
                if let Some(decl) = self.lookup(&identifier) {
                    self.tree.bind(id, decl);
                }
                id
            }
            "call_expression" => self.lower_kotlin_call(node),
            "method_invocation" => self.lower_java_call(node),
            "navigation_expression" | "field_access" => self.lower_qualified_access(node),
            "lambda_literal" => {
                self.push_scope();
                let body = Self::named_children(node)
                    .into_iter()
                    .find(|c| c.kind() == "statements")
                    .map(|stmts| self.lower_block_like(stmts))
                    .unwrap_or_else(|| {
                        self.tree
                            .push(NodeKind::Block { statements: vec![] }, location)
                    });
                self.pop_scope();
                self.tree.push(NodeKind::Lambda { body }, location)
            }
            "if_expression" => self.lower_kotlin_if(node),
            "when_expression" => self.lower_when(node),
            "elvis_expression" => self.lower_elvis(node),
            "postfix_expression" => {
                let children = Self::all_children(node);
                let operand = children
                    .iter()
                    .find(|c| c.is_named())
                    .map(|c| self.lower_expression(*c));
                let not_null = children.iter().any(|c| c.kind() == "!!");
                match operand {
                    Some(operand) => self.tree.push(
                        NodeKind::Postfix {
                            operand,
                            op: if not_null {
                                PostfixOp::NotNull
                            } else {
                                PostfixOp::Other
                            },
                        },
                        location,
                    ),
                    None => self.other(node),
                }
            }
            "parenthesized_expression" => {
                match Self::named_children(node).first() {
                    Some(inner) => {
                        let inner = self.lower_expression(*inner);
                        self.tree.push(NodeKind::Parens { inner }, location)
                    }
                    None => self.other(node),
                }
            }
            "assignment" => self.lower_kotlin_assignment(node),
            "assignment_expression" => self.lower_java_assignment(node),
            "jump_expression" => {
                let text = self.text(node);
                if text.starts_with("return") {
                    let value = Self::named_children(node)
                        .first()
                        .map(|v| self.lower_expression(*v));
                    self.tree.push(
                        NodeKind::Return {
                            value,
                            implicit: false,
                        },
                        location,
                    )
                } else {
                    self.other(node)
                }
            }
            "return_statement" => self.lower_statement(node),
            "statements" | "block" | "control_structure_body" => self.lower_block_like(node),
            _ => self.other(node),
        }
    }

    fn other(&mut self, node: tree_sitter::Node) -> NodeId {
        let location = self.loc(node);
        let children = Self::named_children(node)
            .into_iter()
            .map(|c| self.lower_expression(c))
            .collect();
        self.tree.push(NodeKind::Other { children }, location)
    }

    /// Kotlin `a.b(args) { lambda }`: the callee is a navigation expression,
    /// arguments live in the call suffix
    fn lower_kotlin_call(&mut self, node: tree_sitter::Node) -> NodeId {
        let location = self.loc(node);
        let children = Self::named_children(node);
        let Some(callee) = children.first().copied() else {
            return self.other(node);
        };
        let suffix = children
            .iter()
            .copied()
            .find(|c| c.kind() == "call_suffix");
        let args = match suffix {
            Some(suffix) => self.lower_call_arguments(suffix),
            None => Vec::new(),
        };

        match callee.kind() {
            "simple_identifier" => {
                let name = self.text(callee).to_string();
                self.tree.push(
                    NodeKind::Call {
                        name,
                        receiver: None,
                        args,
                    },
                    location,
                )
            }
            "navigation_expression" => {
                let nav = Self::named_children(callee);
                let Some(target) = nav.first().copied() else {
                    return self.other(node);
                };
                let receiver = self.lower_expression(target);
                let name = nav
                    .iter()
                    .copied()
                    .find(|c| c.kind() == "navigation_suffix")
                    .and_then(|s| {
                        Self::named_children(s)
                            .into_iter()
                            .find(|c| c.kind() == "simple_identifier")
                    })
                    .map(|c| self.text(c).to_string())
                    .unwrap_or_default();
                let call = self.tree.push(
                    NodeKind::Call {
                        name,
                        receiver: Some(receiver),
                        args,
                    },
                    location,
                );
                self.tree
                    .push(NodeKind::Qualified { receiver, selector: call }, location)
            }
            _ => {
                let mut children = vec![self.lower_expression(callee)];
                children.extend(args);
                self.tree.push(NodeKind::Other { children }, location)
            }
        }
    }

    fn lower_call_arguments(&mut self, suffix: tree_sitter::Node) -> Vec<NodeId> {
        let mut args = Vec::new();
        for child in Self::named_children(suffix) {
            match child.kind() {
                "value_arguments" => {
                    for argument in Self::named_children(child) {
                        if argument.kind() == "value_argument" {
                            if let Some(inner) = Self::named_children(argument).last() {
                                args.push(self.lower_expression(*inner));
                            }
                        }
                    }
                }
                "annotated_lambda" => {
                    if let Some(lambda) = Self::named_children(child)
                        .into_iter()
                        .find(|c| c.kind() == "lambda_literal")
                    {
                        args.push(self.lower_expression(lambda));
                    }
                }
                "lambda_literal" => args.push(self.lower_expression(child)),
                _ => {}
            }
        }
        args
    }

    /// Java `a.b(args)`
    fn lower_java_call(&mut self, node: tree_sitter::Node) -> NodeId {
        let location = self.loc(node);
        let name = node
            .child_by_field_name("name")
            .map(|n| self.text(n).to_string())
            .unwrap_or_default();
        let args = match node.child_by_field_name("arguments") {
            Some(arguments) => Self::named_children(arguments)
                .into_iter()
                .map(|a| self.lower_expression(a))
                .collect(),
            None => Vec::new(),
        };
        match node.child_by_field_name("object") {
            Some(object) => {
                let receiver = self.lower_expression(object);
                let call = self.tree.push(
                    NodeKind::Call {
                        name,
                        receiver: Some(receiver),
                        args,
                    },
                    location,
                );
                self.tree
                    .push(NodeKind::Qualified { receiver, selector: call }, location)
            }
            None => self.tree.push(
                NodeKind::Call {
                    name,
                    receiver: None,
                    args,
                },
                location,
            ),
        }
    }

    /// `a.b` without a call, a qualified reference
    fn lower_qualified_access(&mut self, node: tree_sitter::Node) -> NodeId {
        let location = self.loc(node);
        let (target, selector_name) = if node.kind() == "field_access" {
            (
                node.child_by_field_name("object"),
                node.child_by_field_name("field").map(|f| self.text(f).to_string()),
            )
        } else {
            let children = Self::named_children(node);
            let target = children.first().copied();
            let selector = children
                .iter()
                .copied()
                .find(|c| c.kind() == "navigation_suffix")
                .and_then(|s| {
                    Self::named_children(s)
                        .into_iter()
                        .find(|c| c.kind() == "simple_identifier")
                })
                .map(|c| self.text(c).to_string());
            (target, selector)
        };

        let (Some(target), Some(selector_name)) = (target, selector_name) else {
            return self.other(node);
        };
        let receiver = self.lower_expression(target);
        let selector = self.tree.push(
            NodeKind::Name {
                identifier: selector_name.clone(),
            },
            location,
        );
        if let Some(decl) = self.lookup(&selector_name) {
            self.tree.bind(selector, decl);
        }
        self.tree
            .push(NodeKind::Qualified { receiver, selector }, location)
    }

    fn lower_kotlin_if(&mut self, node: tree_sitter::Node) -> NodeId {
        let location = self.loc(node);
        let children = Self::named_children(node);
        let condition = children
            .first()
            .map(|c| self.lower_expression(*c));
        let mut branches = children
            .iter()
            .copied()
            .filter(|c| c.kind() == "control_structure_body");
        let then_branch = branches.next().map(|b| self.lower_block_like(b));
        let else_branch = branches.next().map(|b| self.lower_block_like(b));
        self.tree.push(
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
                expression: true,
            },
            location,
        )
    }

    /// Java `if` is a statement: it produces no value the tracker could
    /// propagate
    fn lower_java_if(&mut self, node: tree_sitter::Node) -> NodeId {
        let location = self.loc(node);
        let condition = node
            .child_by_field_name("condition")
            .map(|c| self.lower_expression(c));
        let then_branch = node
            .child_by_field_name("consequence")
            .map(|b| self.lower_block_like(b));
        let else_branch = node
            .child_by_field_name("alternative")
            .map(|b| self.lower_block_like(b));
        self.tree.push(
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
                expression: false,
            },
            location,
        )
    }

    fn lower_when(&mut self, node: tree_sitter::Node) -> NodeId {
        let location = self.loc(node);
        let children = Self::named_children(node);
        let subject = children
            .iter()
            .copied()
            .find(|c| c.kind() == "when_subject")
            .and_then(|s| Self::named_children(s).first().copied())
            .map(|s| self.lower_expression(s));
        let mut clauses = Vec::new();
        for entry in children.iter().copied().filter(|c| c.kind() == "when_entry") {
            let entry_location = self.loc(entry);
            let body: Vec<NodeId> = Self::named_children(entry)
                .into_iter()
                .filter(|c| {
                    matches!(c.kind(), "control_structure_body" | "statements")
                })
                .flat_map(|body| match body.kind() {
                    "control_structure_body" | "statements" => {
                        let inner = Self::named_children(body);
                        let stmts = inner
                            .into_iter()
                            .flat_map(|c| {
                                if c.kind() == "statements" {
                                    Self::named_children(c)
                                } else {
                                    vec![c]
                                }
                            })
                            .collect::<Vec<_>>();
                        stmts
                    }
                    _ => vec![body],
                })
                .map(|s| self.lower_statement(s))
                .collect();
            clauses.push(self.tree.push(
                NodeKind::SwitchClause {
                    body,
                    // Kotlin `when` entries always carry a statement list
                    block_body: true,
                },
                entry_location,
            ));
        }
        self.tree
            .push(NodeKind::Switch { subject, clauses }, location)
    }

    /// Desugar `a ?: b` into the synthetic-temp + check-if shape the
    /// tracker understands
    fn lower_elvis(&mut self, node: tree_sitter::Node) -> NodeId {
        let location = self.loc(node);
        let children = Self::named_children(node);
        let (Some(lhs), Some(rhs)) = (children.first().copied(), children.get(1).copied())
        else {
            return self.other(node);
        };

        let initializer = self.lower_expression(lhs);
        self.elvis_counter += 1;
        let temp_name = format!("<elvis{}>", self.elvis_counter);
        let temp_decl = self.tree.add_decl(Declaration {
            name: temp_name.clone(),
            kind: DeclKind::Local,
            alt: None,
            synthetic: true,
        });
        let temp = self.tree.push(
            NodeKind::LocalVariable {
                decl: temp_decl,
                initializer: Some(initializer),
            },
            location,
        );
        let temp_ref = self.tree.push(
            NodeKind::Name {
                identifier: temp_name,
            },
            location,
        );
        self.tree.bind(temp_ref, temp_decl);
        let condition = self
            .tree
            .push(NodeKind::Other { children: vec![] }, location);
        let else_branch = self.lower_expression(rhs);
        let check = self.tree.push(
            NodeKind::If {
                condition: Some(condition),
                then_branch: Some(temp_ref),
                else_branch: Some(else_branch),
                expression: true,
            },
            location,
        );
        self.tree.push(NodeKind::Elvis { temp, check }, location)
    }

    fn lower_kotlin_assignment(&mut self, node: tree_sitter::Node) -> NodeId {
        let location = self.loc(node);
        let children = Self::named_children(node);
        let (Some(lhs_node), Some(rhs_node)) =
            (children.first().copied(), children.last().copied())
        else {
            return self.other(node);
        };
        // The LHS arrives wrapped in directly_assignable_expression
        let lhs_inner = if lhs_node.kind() == "directly_assignable_expression" {
            Self::named_children(lhs_node)
                .first()
                .copied()
                .unwrap_or(lhs_node)
        } else {
            lhs_node
        };
        let lhs = self.lower_expression(lhs_inner);
        let rhs = self.lower_expression(rhs_node);
        self.tree.push(
            NodeKind::Binary {
                lhs,
                rhs,
                assignment: true,
            },
            location,
        )
    }

    fn lower_java_assignment(&mut self, node: tree_sitter::Node) -> NodeId {
        let location = self.loc(node);
        let (Some(left), Some(right)) = (
            node.child_by_field_name("left"),
            node.child_by_field_name("right"),
        ) else {
            return self.other(node);
        };
        let lhs = self.lower_expression(left);
        let rhs = self.lower_expression(right);
        self.tree.push(
            NodeKind::Binary {
                lhs,
                rhs,
                assignment: true,
            },
            location,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn lower_kotlin(source: &str) -> ParsedUnit {
        lower_file(&PathBuf::from("test.kt"), source, Language::Kotlin)
            .expect("lowering should succeed")
    }

    fn lower_java(source: &str) -> ParsedUnit {
        lower_file(&PathBuf::from("Test.java"), source, Language::Java)
            .expect("lowering should succeed")
    }

    fn call_names(unit: &ParsedUnit) -> Vec<String> {
        unit.tree
            .nodes()
            .filter_map(|id| match unit.tree.kind(id) {
                NodeKind::Call { name, .. } => Some(name.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_kotlin_function_and_calls() {
        let unit = lower_kotlin(
            r#"
            fun readAll(db: Database) {
                val cursor = db.query()
                cursor.close()
            }
            "#,
        );
        assert_eq!(unit.functions.len(), 1);
        assert_eq!(unit.functions[0].name, "readAll");
        let names = call_names(&unit);
        assert!(names.contains(&"query".to_string()), "calls: {names:?}");
        assert!(names.contains(&"close".to_string()), "calls: {names:?}");
    }

    #[test]
    fn test_kotlin_local_variable_resolves() {
        let unit = lower_kotlin(
            r#"
            fun f(db: Database) {
                val cursor = db.query()
                cursor.close()
            }
            "#,
        );
        // The `cursor` receiver of close() must resolve to the local
        let resolved = unit
            .tree
            .nodes()
            .filter_map(|id| unit.tree.try_resolve(id))
            .any(|decl| unit.tree.decl(decl).name == "cursor");
        assert!(resolved, "cursor reference should resolve to its local");
    }

    #[test]
    fn test_java_method_and_calls() {
        let unit = lower_java(
            r#"
            class Repo {
                void read(Database db) {
                    Cursor c = db.query();
                    c.close();
                }
            }
            "#,
        );
        assert_eq!(unit.functions.len(), 1);
        let names = call_names(&unit);
        assert!(names.contains(&"query".to_string()), "calls: {names:?}");
        assert!(names.contains(&"close".to_string()), "calls: {names:?}");
    }

    #[test]
    fn test_java_if_is_statement_only() {
        let unit = lower_java(
            r#"
            class A {
                void f(boolean b) {
                    if (b) { g(); }
                }
            }
            "#,
        );
        let statement_ifs = unit
            .tree
            .nodes()
            .filter(|&id| {
                matches!(
                    unit.tree.kind(id),
                    NodeKind::If {
                        expression: false,
                        ..
                    }
                )
            })
            .count();
        assert_eq!(statement_ifs, 1);
    }

    #[test]
    fn test_unknown_constructs_lower_to_other() {
        // A for loop is not modeled; it must still produce a walkable node
        let unit = lower_kotlin(
            r#"
            fun f(items: List<Int>) {
                for (item in items) {
                    consume(item)
                }
            }
            "#,
        );
        assert_eq!(unit.functions.len(), 1);
        assert!(unit.tree.len() > 0);
    }
}
