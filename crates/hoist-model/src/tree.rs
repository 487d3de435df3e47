//! Syntax tree for one source unit.
//!
//! Nodes live in a flat arena (`Tree::nodes`) and refer to each other by
//! `NodeIndex`. Every node kind is a variant of the closed [`NodeKind`]
//! enum; [`Tree::children`] matches on all of them, so traversals that go
//! through it see every node without per-kind visitor methods.

use crate::symbols::TypeKind;
use crate::visibility::ModifierFlags;
use hoist_common::{Span, UnitId};
use serde::Serialize;
use smallvec::SmallVec;

/// Index of a node inside its tree's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeIndex(pub u32);

/// A bracketed list: `(a, b)`, `<T, U>` or `{ ... }`.
///
/// `open` and `close` are the offsets of the bracket characters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Delimited {
    pub open: u32,
    pub close: u32,
    pub items: Vec<NodeIndex>,
}

impl Delimited {
    /// Offset just after the opening bracket.
    #[must_use]
    pub const fn inner_start(&self) -> u32 {
        self.open + 1
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A single modifier keyword and where it is written.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ModifierKeyword {
    pub flag: ModifierFlags,
    pub span: Span,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Modifiers {
    pub flags: ModifierFlags,
    pub keywords: Vec<ModifierKeyword>,
    pub annotations: Vec<Span>,
}

impl Modifiers {
    /// Span of the written keyword for `flag`, if present.
    #[must_use]
    pub fn keyword_span(&self, flag: ModifierFlags) -> Option<Span> {
        self.keywords.iter().find(|k| k.flag == flag).map(|k| k.span)
    }

    /// Offset of the first modifier keyword.
    #[must_use]
    pub fn first_keyword_start(&self) -> Option<u32> {
        self.keywords.iter().map(|k| k.span.start).min()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TypeDecl {
    pub modifiers: Modifiers,
    pub kind: TypeKind,
    /// `class`, `interface`, `enum` or `@interface`; the body brace for
    /// anonymous types.
    pub keyword_span: Span,
    pub name: String,
    pub name_span: Span,
    pub type_params: Option<Delimited>,
    pub extends: Vec<NodeIndex>,
    pub implements: Vec<NodeIndex>,
    pub body: Delimited,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MethodDecl {
    pub modifiers: Modifiers,
    pub type_params: Option<Delimited>,
    /// `None` for constructors.
    pub return_type: Option<NodeIndex>,
    pub name: String,
    pub name_span: Span,
    pub params: Delimited,
    pub throws: Vec<NodeIndex>,
    pub body: Option<NodeIndex>,
    pub default_value: Option<NodeIndex>,
}

impl MethodDecl {
    #[must_use]
    pub const fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum CallKind {
    This,
    Super,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    // Declarations
    CompilationUnit {
        package: Option<NodeIndex>,
        imports: Vec<NodeIndex>,
        types: Vec<NodeIndex>,
    },
    PackageDecl {
        name: NodeIndex,
    },
    Import {
        is_static: bool,
        on_demand: bool,
        name: NodeIndex,
    },
    TypeDecl(Box<TypeDecl>),
    EnumConstant {
        name: String,
        name_span: Span,
        args: Option<Delimited>,
        body: Option<NodeIndex>,
    },
    Field {
        modifiers: Modifiers,
        ty: NodeIndex,
        fragments: Vec<NodeIndex>,
    },
    Fragment {
        name: String,
        name_span: Span,
        dims: u8,
        init: Option<NodeIndex>,
    },
    Method(Box<MethodDecl>),
    Initializer {
        is_static: bool,
        body: NodeIndex,
    },
    Parameter {
        modifiers: Modifiers,
        ty: NodeIndex,
        name: String,
        name_span: Span,
        varargs: bool,
    },
    TypeParam {
        name: String,
        name_span: Span,
        bounds: Vec<NodeIndex>,
    },

    // Statements
    Block {
        statements: Vec<NodeIndex>,
    },
    LocalVariable {
        modifiers: Modifiers,
        ty: NodeIndex,
        fragments: Vec<NodeIndex>,
    },
    ExpressionStatement {
        expr: NodeIndex,
    },
    ConstructorCall {
        kind: CallKind,
        qualifier: Option<NodeIndex>,
        args: Delimited,
    },
    Return {
        expr: Option<NodeIndex>,
    },
    If {
        cond: NodeIndex,
        then_branch: NodeIndex,
        else_branch: Option<NodeIndex>,
    },
    While {
        cond: NodeIndex,
        body: NodeIndex,
    },
    DoWhile {
        body: NodeIndex,
        cond: NodeIndex,
    },
    For {
        init: Vec<NodeIndex>,
        cond: Option<NodeIndex>,
        update: Vec<NodeIndex>,
        body: NodeIndex,
    },
    ForEach {
        var: NodeIndex,
        iterable: NodeIndex,
        body: NodeIndex,
    },
    Try {
        /// Resource declarations of `try (...)`.
        resources: Vec<NodeIndex>,
        body: NodeIndex,
        catches: Vec<NodeIndex>,
        finally: Option<NodeIndex>,
    },
    Catch {
        param: NodeIndex,
        body: NodeIndex,
    },
    Throw {
        expr: NodeIndex,
    },
    Switch {
        selector: NodeIndex,
        cases: Vec<NodeIndex>,
    },
    /// `case a, b:` or `default:` followed by its statements.
    SwitchCase {
        labels: Vec<NodeIndex>,
        statements: Vec<NodeIndex>,
    },
    Synchronized {
        lock: NodeIndex,
        body: NodeIndex,
    },
    Assert {
        cond: NodeIndex,
        message: Option<NodeIndex>,
    },
    Labeled {
        label: String,
        body: NodeIndex,
    },
    Jump {
        keyword: String,
    },
    Empty,

    // Expressions
    SimpleName {
        name: String,
    },
    FieldAccess {
        receiver: NodeIndex,
        name: String,
        name_span: Span,
    },
    MethodCall {
        receiver: Option<NodeIndex>,
        name: String,
        name_span: Span,
        args: Delimited,
    },
    This {
        qualifier: Option<NodeIndex>,
    },
    Super {
        qualifier: Option<NodeIndex>,
    },
    New {
        outer: Option<NodeIndex>,
        ty: NodeIndex,
        args: Delimited,
        body: Option<NodeIndex>,
    },
    NewArray {
        ty: NodeIndex,
        dims: Vec<NodeIndex>,
        init: Option<NodeIndex>,
    },
    ArrayInit {
        items: Vec<NodeIndex>,
    },
    ArrayAccess {
        array: NodeIndex,
        index: NodeIndex,
    },
    Assign {
        target: NodeIndex,
        op: String,
        value: NodeIndex,
    },
    Binary {
        left: NodeIndex,
        op: String,
        right: NodeIndex,
    },
    Unary {
        op: String,
        operand: NodeIndex,
        prefix: bool,
    },
    Conditional {
        cond: NodeIndex,
        then_expr: NodeIndex,
        else_expr: NodeIndex,
    },
    InstanceOf {
        expr: NodeIndex,
        ty: NodeIndex,
    },
    Cast {
        ty: NodeIndex,
        expr: NodeIndex,
    },
    ClassLiteral {
        ty: NodeIndex,
    },
    Literal {
        text: String,
    },
    Paren {
        expr: NodeIndex,
    },
    /// Parameters are `Parameter` nodes, or `SimpleName` nodes when the
    /// lambda leaves their types implicit.
    Lambda {
        params: Vec<NodeIndex>,
        body: NodeIndex,
    },
    /// `receiver::name`, where `name` may be `new`.
    MethodRef {
        receiver: NodeIndex,
        name: String,
        name_span: Span,
    },

    // Types and names
    /// A possibly qualified, possibly parameterized name: `p.Outer<A>.Inner[]`.
    /// Also used for package and import names.
    TypeRef {
        qualifier: Option<NodeIndex>,
        name: String,
        name_span: Span,
        args: Option<Delimited>,
        dims: u8,
    },
    PrimitiveType {
        name: String,
        dims: u8,
    },
    Wildcard {
        bound: Option<NodeIndex>,
        upper: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub span: Span,
    pub parent: Option<NodeIndex>,
}

/// Arena of nodes for one unit.
#[derive(Clone, Debug, Serialize)]
pub struct Tree {
    pub unit: UnitId,
    nodes: Vec<Node>,
    pub root: NodeIndex,
}

pub type Children = SmallVec<[NodeIndex; 4]>;

impl Tree {
    #[must_use]
    pub fn new(unit: UnitId) -> Self {
        Self {
            unit,
            nodes: Vec::new(),
            root: NodeIndex(0),
        }
    }

    pub fn add(&mut self, kind: NodeKind, span: Span) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            span,
            parent: None,
        });
        idx
    }

    /// Set the root and fill in parent links. Called once parsing is done.
    pub fn finish(&mut self, root: NodeIndex) {
        self.root = root;
        for i in 0..self.nodes.len() {
            let parent = NodeIndex(i as u32);
            for child in self.children(parent) {
                if let Some(node) = self.nodes.get_mut(child.0 as usize) {
                    node.parent = Some(parent);
                }
            }
        }
    }

    #[must_use]
    pub fn get(&self, idx: NodeIndex) -> Option<&Node> {
        self.nodes.get(idx.0 as usize)
    }

    pub fn get_mut(&mut self, idx: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(idx.0 as usize)
    }

    #[must_use]
    pub fn kind(&self, idx: NodeIndex) -> Option<&NodeKind> {
        self.get(idx).map(|n| &n.kind)
    }

    #[must_use]
    pub fn span(&self, idx: NodeIndex) -> Span {
        self.get(idx).map(|n| n.span).unwrap_or_default()
    }

    #[must_use]
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.get(idx).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        (0..self.nodes.len()).map(|i| NodeIndex(i as u32))
    }

    /// Direct children in source order.
    #[must_use]
    pub fn children(&self, idx: NodeIndex) -> Children {
        let mut out = Children::new();
        let Some(node) = self.get(idx) else {
            return out;
        };
        match &node.kind {
            NodeKind::CompilationUnit {
                package,
                imports,
                types,
            } => {
                out.extend(package.iter().copied());
                out.extend(imports.iter().copied());
                out.extend(types.iter().copied());
            }
            NodeKind::PackageDecl { name } => out.push(*name),
            NodeKind::Import { name, .. } => out.push(*name),
            NodeKind::TypeDecl(decl) => {
                if let Some(tp) = &decl.type_params {
                    out.extend(tp.items.iter().copied());
                }
                out.extend(decl.extends.iter().copied());
                out.extend(decl.implements.iter().copied());
                out.extend(decl.body.items.iter().copied());
            }
            NodeKind::EnumConstant { args, body, .. } => {
                if let Some(args) = args {
                    out.extend(args.items.iter().copied());
                }
                out.extend(body.iter().copied());
            }
            NodeKind::Field { ty, fragments, .. }
            | NodeKind::LocalVariable { ty, fragments, .. } => {
                out.push(*ty);
                out.extend(fragments.iter().copied());
            }
            NodeKind::Fragment { init, .. } => out.extend(init.iter().copied()),
            NodeKind::Method(decl) => {
                if let Some(tp) = &decl.type_params {
                    out.extend(tp.items.iter().copied());
                }
                out.extend(decl.return_type.iter().copied());
                out.extend(decl.params.items.iter().copied());
                out.extend(decl.throws.iter().copied());
                out.extend(decl.body.iter().copied());
                out.extend(decl.default_value.iter().copied());
            }
            NodeKind::Initializer { body, .. } => out.push(*body),
            NodeKind::Parameter { ty, .. } => out.push(*ty),
            NodeKind::TypeParam { bounds, .. } => out.extend(bounds.iter().copied()),
            NodeKind::Block { statements } => out.extend(statements.iter().copied()),
            NodeKind::ExpressionStatement { expr } | NodeKind::Throw { expr } => out.push(*expr),
            NodeKind::ConstructorCall {
                qualifier, args, ..
            } => {
                out.extend(qualifier.iter().copied());
                out.extend(args.items.iter().copied());
            }
            NodeKind::Return { expr } => out.extend(expr.iter().copied()),
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                out.push(*cond);
                out.push(*then_branch);
                out.extend(else_branch.iter().copied());
            }
            NodeKind::While { cond, body } | NodeKind::Synchronized { lock: cond, body } => {
                out.push(*cond);
                out.push(*body);
            }
            NodeKind::DoWhile { body, cond } => {
                out.push(*body);
                out.push(*cond);
            }
            NodeKind::For {
                init,
                cond,
                update,
                body,
            } => {
                out.extend(init.iter().copied());
                out.extend(cond.iter().copied());
                out.extend(update.iter().copied());
                out.push(*body);
            }
            NodeKind::ForEach {
                var,
                iterable,
                body,
            } => {
                out.push(*var);
                out.push(*iterable);
                out.push(*body);
            }
            NodeKind::Try {
                resources,
                body,
                catches,
                finally,
            } => {
                out.extend(resources.iter().copied());
                out.push(*body);
                out.extend(catches.iter().copied());
                out.extend(finally.iter().copied());
            }
            NodeKind::Catch { param, body } => {
                out.push(*param);
                out.push(*body);
            }
            NodeKind::Switch { selector, cases } => {
                out.push(*selector);
                out.extend(cases.iter().copied());
            }
            NodeKind::SwitchCase { labels, statements } => {
                out.extend(labels.iter().copied());
                out.extend(statements.iter().copied());
            }
            NodeKind::Assert { cond, message } => {
                out.push(*cond);
                out.extend(message.iter().copied());
            }
            NodeKind::Labeled { body, .. } => out.push(*body),
            NodeKind::Jump { .. } | NodeKind::Empty => {}
            NodeKind::SimpleName { .. } | NodeKind::Literal { .. } => {}
            NodeKind::FieldAccess { receiver, .. } => out.push(*receiver),
            NodeKind::MethodCall { receiver, args, .. } => {
                out.extend(receiver.iter().copied());
                out.extend(args.items.iter().copied());
            }
            NodeKind::This { qualifier } | NodeKind::Super { qualifier } => {
                out.extend(qualifier.iter().copied());
            }
            NodeKind::New {
                outer,
                ty,
                args,
                body,
            } => {
                out.extend(outer.iter().copied());
                out.push(*ty);
                out.extend(args.items.iter().copied());
                out.extend(body.iter().copied());
            }
            NodeKind::NewArray { ty, dims, init } => {
                out.push(*ty);
                out.extend(dims.iter().copied());
                out.extend(init.iter().copied());
            }
            NodeKind::ArrayInit { items } => out.extend(items.iter().copied()),
            NodeKind::ArrayAccess { array, index } => {
                out.push(*array);
                out.push(*index);
            }
            NodeKind::Assign { target, value, .. } => {
                out.push(*target);
                out.push(*value);
            }
            NodeKind::Binary { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::Unary { operand, .. } => out.push(*operand),
            NodeKind::Conditional {
                cond,
                then_expr,
                else_expr,
            } => {
                out.push(*cond);
                out.push(*then_expr);
                out.push(*else_expr);
            }
            NodeKind::InstanceOf { expr, ty } => {
                out.push(*expr);
                out.push(*ty);
            }
            NodeKind::Cast { ty, expr } => {
                out.push(*ty);
                out.push(*expr);
            }
            NodeKind::ClassLiteral { ty } => out.push(*ty),
            NodeKind::Paren { expr } => out.push(*expr),
            NodeKind::Lambda { params, body } => {
                out.extend(params.iter().copied());
                out.push(*body);
            }
            NodeKind::MethodRef { receiver, .. } => out.push(*receiver),
            NodeKind::TypeRef {
                qualifier, args, ..
            } => {
                out.extend(qualifier.iter().copied());
                if let Some(args) = args {
                    out.extend(args.items.iter().copied());
                }
            }
            NodeKind::PrimitiveType { .. } => {}
            NodeKind::Wildcard { bound, .. } => out.extend(bound.iter().copied()),
        }
        out
    }

    /// `idx` and all nodes below it, in pre-order.
    #[must_use]
    pub fn descendants(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out = Vec::new();
        let mut stack = vec![idx];
        while let Some(current) = stack.pop() {
            out.push(current);
            let children = self.children(current);
            stack.extend(children.into_iter().rev());
        }
        out
    }

    /// Parent chain of `idx`, nearest first, excluding `idx` itself.
    pub fn ancestors(&self, idx: NodeIndex) -> impl Iterator<Item = NodeIndex> + '_ {
        std::iter::successors(self.parent(idx), move |&n| self.parent(n))
    }

    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeIndex, idx: NodeIndex) -> bool {
        self.ancestors(idx).any(|a| a == ancestor)
    }

    #[must_use]
    pub fn type_decl(&self, idx: NodeIndex) -> Option<&TypeDecl> {
        match self.kind(idx) {
            Some(NodeKind::TypeDecl(decl)) => Some(decl),
            _ => None,
        }
    }

    #[must_use]
    pub fn method_decl(&self, idx: NodeIndex) -> Option<&MethodDecl> {
        match self.kind(idx) {
            Some(NodeKind::Method(decl)) => Some(decl),
            _ => None,
        }
    }

    /// The name token of a name-bearing node. Instance creations report
    /// the created type's name; `this(..)`/`super(..)` calls their whole span.
    #[must_use]
    pub fn name_span(&self, idx: NodeIndex) -> Option<Span> {
        match self.kind(idx)? {
            NodeKind::SimpleName { .. } | NodeKind::ConstructorCall { .. } => Some(self.span(idx)),
            NodeKind::FieldAccess { name_span, .. }
            | NodeKind::MethodCall { name_span, .. }
            | NodeKind::MethodRef { name_span, .. }
            | NodeKind::TypeRef { name_span, .. } => Some(*name_span),
            NodeKind::New { ty, .. } => self.name_span(*ty).or(Some(self.span(*ty))),
            _ => None,
        }
    }

    /// The name token of a declaration node.
    #[must_use]
    pub fn decl_name_span(&self, idx: NodeIndex) -> Option<Span> {
        match self.kind(idx)? {
            NodeKind::TypeDecl(decl) => Some(decl.name_span),
            NodeKind::Method(decl) => Some(decl.name_span),
            NodeKind::Fragment { name_span, .. }
            | NodeKind::EnumConstant { name_span, .. }
            | NodeKind::Parameter { name_span, .. }
            | NodeKind::TypeParam { name_span, .. } => Some(*name_span),
            _ => None,
        }
    }

    /// Explicit receiver of a field access, method call or method reference.
    #[must_use]
    pub fn receiver(&self, idx: NodeIndex) -> Option<NodeIndex> {
        match self.kind(idx)? {
            NodeKind::FieldAccess { receiver, .. } | NodeKind::MethodRef { receiver, .. } => {
                Some(*receiver)
            }
            NodeKind::MethodCall { receiver, .. } => *receiver,
            _ => None,
        }
    }

    /// Import declarations of the unit, in source order.
    #[must_use]
    pub fn imports(&self) -> &[NodeIndex] {
        match self.kind(self.root) {
            Some(NodeKind::CompilationUnit { imports, .. }) => imports,
            _ => &[],
        }
    }

    /// Top-level type declarations of the unit.
    #[must_use]
    pub fn top_level_types(&self) -> &[NodeIndex] {
        match self.kind(self.root) {
            Some(NodeKind::CompilationUnit { types, .. }) => types,
            _ => &[],
        }
    }

    #[must_use]
    pub fn package_decl(&self) -> Option<NodeIndex> {
        match self.kind(self.root) {
            Some(NodeKind::CompilationUnit { package, .. }) => *package,
            _ => None,
        }
    }

    /// Dotted text of a `TypeRef` chain without type arguments.
    #[must_use]
    pub fn dotted_name(&self, idx: NodeIndex) -> String {
        let mut segments = Vec::new();
        let mut current = Some(idx);
        while let Some(node) = current {
            match self.kind(node) {
                Some(NodeKind::TypeRef {
                    qualifier, name, ..
                }) => {
                    segments.push(name.as_str());
                    current = *qualifier;
                }
                Some(NodeKind::SimpleName { name }) => {
                    segments.push(name.as_str());
                    current = None;
                }
                Some(NodeKind::FieldAccess { receiver, name, .. }) => {
                    segments.push(name.as_str());
                    current = Some(*receiver);
                }
                _ => current = None,
            }
        }
        segments.reverse();
        segments.join(".")
    }
}

impl std::ops::Index<NodeIndex> for Tree {
    type Output = Node;

    fn index(&self, idx: NodeIndex) -> &Node {
        &self.nodes[idx.0 as usize]
    }
}

#[cfg(test)]
#[path = "../tests/tree_tests.rs"]
mod tree_tests;
