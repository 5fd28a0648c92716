//! Raw syntax tree for Solidity source files.
//!
//! One `SourceUnit` per parsed file. Every node carries a byte-offset `Span`
//! into the source text it was parsed from. The tree is plain data: no back
//! pointers, no resolution state. Semantic wrappers live in `crate::semantic`.

use smol_str::SmolStr;

use crate::base::Span;

/// Root of a parsed file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceUnit {
    pub items: Vec<SourceItem>,
    pub span: Span,
}

/// A top-level declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceItem {
    Pragma(PragmaDirective),
    Import(ImportDirective),
    Contract(ContractDefinition),
    Function(FunctionDefinition),
    Variable(VariableDeclaration),
    Struct(StructDefinition),
    Enum(EnumDefinition),
    Event(EventDefinition),
    Error(ErrorDefinition),
    Using(UsingDirective),
    TypeDef(TypeDefinition),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PragmaDirective {
    pub name: SmolStr,
    pub value: String,
    pub span: Span,
}

/// `import "path";`, `import {A as B} from "path";`, `import * as ns from "path";`
#[derive(Debug, Clone, PartialEq)]
pub struct ImportDirective {
    pub path: String,
    /// Span of the string literal contents (without quotes), so the
    /// specifier can be rewritten in place.
    pub path_span: Span,
    pub symbols: Vec<ImportSymbol>,
    /// Namespace alias (`as ns`), if any.
    pub alias: Option<SmolStr>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSymbol {
    pub name: SmolStr,
    pub alias: Option<SmolStr>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractKind {
    Contract,
    Library,
    Interface,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContractDefinition {
    pub name: SmolStr,
    pub name_span: Span,
    pub kind: ContractKind,
    pub is_abstract: bool,
    pub inherits: Vec<InheritanceSpecifier>,
    pub members: Vec<ContractMember>,
    pub span: Span,
}

/// One entry of an `is` inheritance list. Constructor arguments, when
/// present, are kept for span coverage only.
#[derive(Debug, Clone, PartialEq)]
pub struct InheritanceSpecifier {
    pub name: SmolStr,
    pub args: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContractMember {
    Function(FunctionDefinition),
    Variable(VariableDeclaration),
    Struct(StructDefinition),
    Enum(EnumDefinition),
    Event(EventDefinition),
    Error(ErrorDefinition),
    Using(UsingDirective),
    TypeDef(TypeDefinition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Constructor,
    Fallback,
    Receive,
    Modifier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDefinition {
    /// `None` for constructor/fallback/receive.
    pub name: Option<SmolStr>,
    pub name_span: Option<Span>,
    pub kind: FunctionKind,
    pub params: Vec<Parameter>,
    pub returns: Vec<Parameter>,
    /// Modifier invocations (`onlyOwner`, `initializer(3)`), not attribute
    /// keywords like `public` or `view` — those go in `attributes`.
    pub modifiers: Vec<ModifierInvocation>,
    pub attributes: Vec<SmolStr>,
    /// `None` when the function is only declared (`;` body).
    pub body: Option<Block>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub type_name: TypeName,
    pub name: Option<SmolStr>,
    pub name_span: Option<Span>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModifierInvocation {
    pub name: SmolStr,
    pub args: Vec<Expression>,
    pub span: Span,
}

/// A type as written in source, reduced to what name resolution needs.
///
/// For mappings, `base` holds the value type's base name; keys are not
/// tracked. `base` keeps dotted names (`L.T`) as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeName {
    pub base: SmolStr,
    pub is_array: bool,
    pub is_mapping: bool,
    pub is_payable: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub type_name: TypeName,
    pub name: SmolStr,
    pub name_span: Span,
    /// `public`, `constant`, `immutable`, data locations, etc.
    pub attributes: Vec<SmolStr>,
    pub initializer: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructDefinition {
    pub name: SmolStr,
    pub name_span: Span,
    pub fields: Vec<StructField>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StructField {
    pub type_name: TypeName,
    pub name: SmolStr,
    pub name_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumDefinition {
    pub name: SmolStr,
    pub name_span: Span,
    pub values: Vec<EnumValue>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: SmolStr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventDefinition {
    pub name: SmolStr,
    pub name_span: Span,
    pub params: Vec<Parameter>,
    pub is_anonymous: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDefinition {
    pub name: SmolStr,
    pub name_span: Span,
    pub params: Vec<Parameter>,
    pub span: Span,
}

/// `type Price is uint128;`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: SmolStr,
    pub name_span: Span,
    pub underlying: TypeName,
    pub span: Span,
}

/// `using L for T;` — `target` is `None` for the wildcard form
/// (`using L for *;`).
#[derive(Debug, Clone, PartialEq)]
pub struct UsingDirective {
    pub library: SmolStr,
    pub library_span: Span,
    pub target: Option<TypeName>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    VariableDeclaration(VariableDeclaration),
    Expression(Expression),
    If(IfStatement),
    For(ForStatement),
    While(WhileStatement),
    Return(ReturnStatement),
    Emit(EmitStatement),
    Revert(RevertStatement),
    Block(Block),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_branch: Box<Statement>,
    pub else_branch: Option<Box<Statement>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub init: Option<Box<Statement>>,
    pub condition: Option<Expression>,
    pub update: Option<Expression>,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Box<Statement>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub value: Option<Expression>,
    pub span: Span,
}

/// `emit EventName(args);`
#[derive(Debug, Clone, PartialEq)]
pub struct EmitStatement {
    pub call: Expression,
    pub span: Span,
}

/// `revert CustomError(args);` or bare `revert(...)`.
#[derive(Debug, Clone, PartialEq)]
pub struct RevertStatement {
    pub call: Option<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    MemberAccess(MemberAccess),
    Call(FunctionCall),
    Index(IndexAccess),
    Literal(Literal),
    Assignment(Assignment),
    Binary(BinaryExpression),
    Unary(UnaryExpression),
    Tuple(TupleExpression),
    New(NewExpression),
    Ternary(TernaryExpression),
}

impl Expression {
    pub fn span(&self) -> Span {
        match self {
            Expression::Identifier(e) => e.span,
            Expression::MemberAccess(e) => e.span,
            Expression::Call(e) => e.span,
            Expression::Index(e) => e.span,
            Expression::Literal(e) => e.span,
            Expression::Assignment(e) => e.span,
            Expression::Binary(e) => e.span,
            Expression::Unary(e) => e.span,
            Expression::Tuple(e) => e.span,
            Expression::New(e) => e.span,
            Expression::Ternary(e) => e.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: SmolStr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberAccess {
    pub object: Box<Expression>,
    pub member: SmolStr,
    pub member_span: Span,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub callee: Box<Expression>,
    pub args: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexAccess {
    pub object: Box<Expression>,
    pub index: Option<Box<Expression>>,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    Number,
    String,
    Bool,
    HexNumber,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: SmolStr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub lhs: Box<Expression>,
    pub op: SmolStr,
    pub rhs: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub lhs: Box<Expression>,
    pub op: SmolStr,
    pub rhs: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub op: SmolStr,
    pub operand: Box<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TupleExpression {
    pub elements: Vec<Expression>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TernaryExpression {
    pub condition: Box<Expression>,
    pub if_true: Box<Expression>,
    pub if_false: Box<Expression>,
    pub span: Span,
}

/// `new Contract(...)` / `new uint256[](n)` — only the type name matters.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpression {
    pub type_name: TypeName,
    pub span: Span,
}
