//! Function nodes and the lazily built body index.

use std::path::Path;

use once_cell::sync::OnceCell;
use smol_str::SmolStr;

use crate::base::Span;
use crate::semantic::type_ref::{ResolvedSymbol, SymbolKind, SymbolTarget, TypeDescriptor};
use crate::syntax::ast;

use super::expression::{ExpressionKind, ParsedExpression};
use super::items::{ParsedVariable, type_display};

/// A modifier applied to a function (`onlyOwner`, `initializer(3)`).
#[derive(Debug, Clone)]
pub struct ParsedModifierInvocation {
    pub name: SmolStr,
    pub span: Span,
}

/// A local variable together with the span over which it is visible:
/// from the end of its declaration to the end of the enclosing block.
#[derive(Debug)]
pub struct LocalVariable {
    pub variable: ParsedVariable,
    pub scope: Span,
}

/// Everything inside a function body that queries care about, computed once
/// per document version on first access.
#[derive(Debug, Default)]
pub struct BodyIndex {
    pub locals: Vec<LocalVariable>,
    /// Identifier / member / call chains in source order.
    pub expressions: Vec<ParsedExpression>,
}

#[derive(Debug)]
pub struct ParsedFunction {
    /// `None` for constructor, fallback, and receive.
    pub name: Option<SmolStr>,
    pub name_span: Option<Span>,
    pub kind: ast::FunctionKind,
    pub params: Vec<ParsedVariable>,
    /// Named return bindings only; visible in the body like parameters.
    pub returns: Vec<ParsedVariable>,
    /// Every declared return type in order, named or not.
    pub return_types: Vec<ast::TypeName>,
    pub modifiers: Vec<ParsedModifierInvocation>,
    pub attributes: Vec<SmolStr>,
    pub body: Option<ast::Block>,
    pub span: Span,
    body_index: OnceCell<BodyIndex>,
}

impl ParsedFunction {
    pub fn from_definition(def: &ast::FunctionDefinition) -> Self {
        Self {
            name: def.name.clone(),
            name_span: def.name_span,
            kind: def.kind,
            params: def
                .params
                .iter()
                .filter_map(ParsedVariable::from_parameter)
                .collect(),
            returns: def
                .returns
                .iter()
                .filter_map(ParsedVariable::from_parameter)
                .collect(),
            return_types: def.returns.iter().map(|p| p.type_name.clone()).collect(),
            modifiers: def
                .modifiers
                .iter()
                .map(|m| ParsedModifierInvocation {
                    name: m.name.clone(),
                    span: m.span,
                })
                .collect(),
            attributes: def.attributes.clone(),
            body: def.body.clone(),
            span: def.span,
            body_index: OnceCell::new(),
        }
    }

    pub fn display_name(&self) -> &str {
        match &self.name {
            Some(name) => name,
            None => match self.kind {
                ast::FunctionKind::Constructor => "constructor",
                ast::FunctionKind::Fallback => "fallback",
                ast::FunctionKind::Receive => "receive",
                _ => "",
            },
        }
    }

    pub fn signature(&self) -> String {
        let keyword = match self.kind {
            ast::FunctionKind::Function => "function ",
            ast::FunctionKind::Modifier => "modifier ",
            _ => "",
        };
        let params = self
            .params
            .iter()
            .map(|p| format!("{} {}", type_display(&p.type_name), p.name))
            .collect::<Vec<_>>()
            .join(", ");
        let mut out = format!("{}{}({})", keyword, self.display_name(), params);
        for attribute in &self.attributes {
            out.push(' ');
            out.push_str(attribute);
        }
        if !self.return_types.is_empty() {
            let returns = self
                .return_types
                .iter()
                .map(type_display)
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!(" returns ({})", returns));
        }
        out
    }

    pub fn symbol(&self, path: &Path) -> ResolvedSymbol {
        let kind = if self.kind == ast::FunctionKind::Modifier {
            SymbolKind::Modifier
        } else {
            SymbolKind::Function
        };
        let name_span = self.name_span.unwrap_or(self.span);
        let type_desc = self
            .return_types
            .first()
            .map(TypeDescriptor::from_type_name);
        ResolvedSymbol::new(
            SymbolTarget::new(path, SmolStr::new(self.display_name()), name_span),
            kind,
            type_desc,
            self.signature(),
        )
    }

    /// The body index, built on first access for this document version.
    pub fn body_index(&self) -> &BodyIndex {
        self.body_index.get_or_init(|| match &self.body {
            Some(block) => index_body(block),
            None => BodyIndex::default(),
        })
    }

    /// Locals visible at `offset`, innermost declaration last.
    pub fn locals_in_scope(&self, offset: usize) -> Vec<&ParsedVariable> {
        self.body_index()
            .locals
            .iter()
            .filter(|local| local.scope.contains(offset))
            .map(|local| &local.variable)
            .collect()
    }

    /// Deepest expression link whose name sits at `offset`.
    pub fn expression_at(&self, offset: usize) -> Option<&ParsedExpression> {
        self.body_index()
            .expressions
            .iter()
            .filter(|chain| chain.span.contains(offset))
            .find_map(|chain| chain.node_at(offset))
    }
}

fn index_body(block: &ast::Block) -> BodyIndex {
    let mut index = BodyIndex::default();
    index_statements(&block.statements, block.span.end, &mut index);
    index
}

fn index_statements(statements: &[ast::Statement], block_end: usize, index: &mut BodyIndex) {
    for statement in statements {
        index_statement(statement, block_end, index);
    }
}

fn index_statement(statement: &ast::Statement, block_end: usize, index: &mut BodyIndex) {
    match statement {
        ast::Statement::VariableDeclaration(decl) => {
            if let Some(initializer) = &decl.initializer {
                collect_expressions(initializer, &mut index.expressions);
            }
            index.locals.push(LocalVariable {
                variable: ParsedVariable::from_declaration(decl),
                scope: Span::new(decl.name_span.end, block_end),
            });
        }
        ast::Statement::Expression(expr) => collect_expressions(expr, &mut index.expressions),
        ast::Statement::If(stmt) => {
            collect_expressions(&stmt.condition, &mut index.expressions);
            index_statement(&stmt.then_branch, block_end, index);
            if let Some(else_branch) = &stmt.else_branch {
                index_statement(else_branch, block_end, index);
            }
        }
        ast::Statement::For(stmt) => {
            // The init declaration is scoped to the loop, not the outer block.
            if let Some(init) = &stmt.init {
                index_statement(init, stmt.span.end, index);
            }
            if let Some(condition) = &stmt.condition {
                collect_expressions(condition, &mut index.expressions);
            }
            if let Some(update) = &stmt.update {
                collect_expressions(update, &mut index.expressions);
            }
            index_statement(&stmt.body, block_end, index);
        }
        ast::Statement::While(stmt) => {
            collect_expressions(&stmt.condition, &mut index.expressions);
            index_statement(&stmt.body, block_end, index);
        }
        ast::Statement::Return(stmt) => {
            if let Some(value) = &stmt.value {
                collect_expressions(value, &mut index.expressions);
            }
        }
        ast::Statement::Emit(stmt) => collect_expressions(&stmt.call, &mut index.expressions),
        ast::Statement::Revert(stmt) => {
            if let Some(call) = &stmt.call {
                collect_expressions(call, &mut index.expressions);
            }
        }
        ast::Statement::Block(block) => {
            index_statements(&block.statements, block.span.end, index);
        }
    }
}

/// Record every identifier / member / call chain in an expression tree.
fn collect_expressions(expr: &ast::Expression, out: &mut Vec<ParsedExpression>) {
    match expr {
        ast::Expression::Identifier(_)
        | ast::Expression::MemberAccess(_)
        | ast::Expression::Call(_)
        | ast::Expression::Index(_) => {
            if let Some(chain) = lower_chain(expr, out) {
                out.push(chain);
            }
        }
        ast::Expression::Literal(_) | ast::Expression::New(_) => {}
        ast::Expression::Assignment(assignment) => {
            collect_expressions(&assignment.lhs, out);
            collect_expressions(&assignment.rhs, out);
        }
        ast::Expression::Binary(binary) => {
            collect_expressions(&binary.lhs, out);
            collect_expressions(&binary.rhs, out);
        }
        ast::Expression::Unary(unary) => collect_expressions(&unary.operand, out),
        ast::Expression::Tuple(tuple) => {
            for element in &tuple.elements {
                collect_expressions(element, out);
            }
        }
        ast::Expression::Ternary(ternary) => {
            collect_expressions(&ternary.condition, out);
            collect_expressions(&ternary.if_true, out);
            collect_expressions(&ternary.if_false, out);
        }
    }
}

/// Lower a chainable expression (identifier / member / call / index) to a
/// `ParsedExpression` chain. Non-chainable sub-expressions encountered along
/// the way are collected into `out` as their own chains.
fn lower_chain(expr: &ast::Expression, out: &mut Vec<ParsedExpression>) -> Option<ParsedExpression> {
    match expr {
        ast::Expression::Identifier(identifier) => Some(ParsedExpression::new(
            ExpressionKind::Identifier,
            identifier.name.clone(),
            identifier.span,
            identifier.span,
            None,
        )),
        ast::Expression::MemberAccess(member) => {
            let base = match lower_chain(&member.object, out) {
                Some(base) => Some(Box::new(base)),
                None => {
                    collect_expressions(&member.object, out);
                    None
                }
            };
            Some(ParsedExpression::new(
                ExpressionKind::Member,
                member.member.clone(),
                member.member_span,
                member.span,
                base,
            ))
        }
        ast::Expression::Call(call) => {
            for arg in &call.args {
                collect_expressions(arg, out);
            }
            match lower_chain(&call.callee, out) {
                Some(callee) => Some(ParsedExpression::new(
                    ExpressionKind::Call,
                    callee.name.clone(),
                    callee.name_span,
                    call.span,
                    callee.base,
                )),
                None => {
                    collect_expressions(&call.callee, out);
                    None
                }
            }
        }
        // `arr[i].push(x)` resolves against `arr`; the index expression is
        // its own chain.
        ast::Expression::Index(index) => {
            if let Some(idx) = &index.index {
                collect_expressions(idx, out);
            }
            lower_chain(&index.object, out)
        }
        _ => None,
    }
}
