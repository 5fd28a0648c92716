//! Recursive descent parser for Solidity.
//!
//! Strict: the first unexpected token aborts the parse with a `ParseError`
//! carrying the offending line/column. The semantic builder layers line-level
//! recovery on top of this.

use smol_str::SmolStr;

use super::lexer::{Lexer, Token, TokenKind};
use crate::base::{LineIndex, Span};
use crate::syntax::ParseError;
use crate::syntax::ast::*;

/// Parse Solidity source into a `SourceUnit`.
pub fn parse(input: &str) -> Result<SourceUnit, ParseError> {
    let tokens: Vec<_> = Lexer::new(input).filter(|t| !t.kind.is_trivia()).collect();
    let mut parser = Parser::new(input, &tokens);
    parser.parse_source_unit()
}

/// Attribute keywords that may follow a function header.
const FUNCTION_ATTRIBUTES: &[&str] = &[
    "public", "private", "internal", "external", "pure", "view", "payable", "constant", "virtual",
    "immutable",
];

/// Attribute keywords that may follow a variable type.
const VARIABLE_ATTRIBUTES: &[&str] = &[
    "public", "private", "internal", "constant", "immutable", "memory", "storage", "calldata",
    "transient", "override",
];

fn is_elementary_type(text: &str) -> bool {
    match text {
        "bool" | "string" | "address" | "byte" | "bytes" => true,
        _ => ["uint", "int", "bytes", "ufixed", "fixed"].iter().any(|p| {
            text.strip_prefix(p).is_some_and(|suffix| {
                !suffix.is_empty() && suffix.bytes().all(|b| b.is_ascii_digit() || b == b'x')
            })
        }),
    }
}

struct Parser<'a> {
    input: &'a str,
    tokens: &'a [Token<'a>],
    pos: usize,
    /// Token index where the current declaration or statement began.
    anchor: usize,
    line_index: LineIndex,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, tokens: &'a [Token<'a>]) -> Self {
        Self {
            input,
            tokens,
            pos: 0,
            anchor: 0,
            line_index: LineIndex::new(input),
        }
    }

    // =========================================================================
    // Token inspection
    // =========================================================================

    fn current(&self) -> Option<&Token<'a>> {
        self.tokens.get(self.pos)
    }

    fn current_kind(&self) -> TokenKind {
        self.current().map(|t| t.kind).unwrap_or(TokenKind::Error)
    }

    fn current_text(&self) -> &'a str {
        self.current().map(|t| t.text).unwrap_or("")
    }

    fn current_span(&self) -> Span {
        self.current()
            .map(|t| t.span())
            .unwrap_or_else(|| Span::new(self.input.len(), self.input.len()))
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.current_kind() == kind
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    /// Check for an identifier token with the exact given text.
    fn at_word(&self, word: &str) -> bool {
        self.at(TokenKind::Ident) && self.current_text() == word
    }

    fn nth_kind(&self, n: usize) -> TokenKind {
        self.tokens
            .get(self.pos + n)
            .map(|t| t.kind)
            .unwrap_or(TokenKind::Error)
    }

    // =========================================================================
    // Token consumption
    // =========================================================================

    fn bump(&mut self) -> Token<'a> {
        let token = self.tokens[self.pos];
        self.pos += 1;
        token
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if self.at_word(word) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind, what: &str) -> Result<Token<'a>, ParseError> {
        if self.at(kind) {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!("expected {what}")))
        }
    }

    fn expect_word(&mut self, word: &str) -> Result<Token<'a>, ParseError> {
        if self.at_word(word) {
            Ok(self.bump())
        } else {
            Err(self.error_here(format!("expected '{word}'")))
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<Token<'a>, ParseError> {
        self.expect(TokenKind::Ident, what)
    }

    // =========================================================================
    // Error handling
    // =========================================================================

    fn error_here(&self, message: impl Into<String>) -> ParseError {
        let offset = self
            .current()
            .map(|t| t.offset)
            .unwrap_or(self.input.len());
        let mut position = self.line_index.position_at(offset);
        // A half-typed declaration or statement errors at the first token of
        // the NEXT line. Recovery blanks whole lines, so once tokens of the
        // current production were consumed, charge the line they ended on.
        if self.pos > self.anchor {
            if let Some(prev) = self.tokens.get(self.pos - 1) {
                let prev_position = self
                    .line_index
                    .position_at(prev.span().end.saturating_sub(1));
                if position.line > prev_position.line {
                    position = prev_position;
                }
            }
        }
        ParseError::new(message, position.line, position.column)
    }

    fn prev_end(&self) -> usize {
        self.tokens
            .get(self.pos.saturating_sub(1))
            .map(|t| t.span().end)
            .unwrap_or(0)
    }

    // =========================================================================
    // Source unit
    // =========================================================================

    fn parse_source_unit(&mut self) -> Result<SourceUnit, ParseError> {
        let mut items = Vec::new();
        while !self.at_eof() {
            items.push(self.parse_source_item()?);
        }
        Ok(SourceUnit {
            items,
            span: Span::new(0, self.input.len()),
        })
    }

    fn parse_source_item(&mut self) -> Result<SourceItem, ParseError> {
        self.anchor = self.pos;
        match self.current_text() {
            "pragma" => Ok(SourceItem::Pragma(self.parse_pragma()?)),
            "import" => Ok(SourceItem::Import(self.parse_import()?)),
            "abstract" | "contract" | "library" | "interface" => {
                Ok(SourceItem::Contract(self.parse_contract()?))
            }
            "function" => Ok(SourceItem::Function(
                self.parse_function(FunctionKind::Function)?,
            )),
            "struct" => Ok(SourceItem::Struct(self.parse_struct()?)),
            "enum" => Ok(SourceItem::Enum(self.parse_enum()?)),
            "event" => Ok(SourceItem::Event(self.parse_event()?)),
            "error" if self.nth_kind(1) == TokenKind::Ident => {
                Ok(SourceItem::Error(self.parse_error_def()?))
            }
            "using" => Ok(SourceItem::Using(self.parse_using()?)),
            "type" if self.nth_kind(1) == TokenKind::Ident => {
                Ok(SourceItem::TypeDef(self.parse_type_def()?))
            }
            _ if self.looks_like_declaration() => {
                Ok(SourceItem::Variable(self.parse_variable_declaration()?))
            }
            _ => Err(self.error_here("expected a top-level declaration")),
        }
    }

    fn parse_pragma(&mut self) -> Result<PragmaDirective, ParseError> {
        let start = self.expect_word("pragma")?.span();
        let name_token = self.expect_ident("pragma name")?;
        let value_start = self.current().map(|t| t.offset).unwrap_or(self.prev_end());
        while !self.at_eof() && !self.at(TokenKind::Semicolon) {
            self.bump();
        }
        let value_end = self.prev_end().max(value_start);
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(PragmaDirective {
            name: SmolStr::new(name_token.text),
            value: self.input[value_start..value_end].to_string(),
            span: Span::new(start.start, self.prev_end()),
        })
    }

    fn parse_import(&mut self) -> Result<ImportDirective, ParseError> {
        let start = self.expect_word("import")?.span();
        let mut symbols = Vec::new();
        let mut alias = None;

        let path_token = if self.at(TokenKind::Str) {
            // import "path" (as alias)?
            let token = self.bump();
            if self.eat_word("as") {
                alias = Some(SmolStr::new(self.expect_ident("import alias")?.text));
            }
            token
        } else if self.eat(TokenKind::LBrace) {
            // import { A (as B)?, ... } from "path"
            loop {
                let name_token = self.expect_ident("imported symbol")?;
                let mut symbol = ImportSymbol {
                    name: SmolStr::new(name_token.text),
                    alias: None,
                    span: name_token.span(),
                };
                if self.eat_word("as") {
                    let alias_token = self.expect_ident("symbol alias")?;
                    symbol.alias = Some(SmolStr::new(alias_token.text));
                    symbol.span = symbol.span.cover(alias_token.span());
                }
                symbols.push(symbol);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.expect(TokenKind::RBrace, "'}'")?;
            self.expect_word("from")?;
            self.expect(TokenKind::Str, "import path")?
        } else if self.eat(TokenKind::Star) {
            // import * as ns from "path"
            self.expect_word("as")?;
            alias = Some(SmolStr::new(self.expect_ident("namespace alias")?.text));
            self.expect_word("from")?;
            self.expect(TokenKind::Str, "import path")?
        } else {
            return Err(self.error_here("expected import path"));
        };

        self.expect(TokenKind::Semicolon, "';'")?;

        let quoted = path_token.text;
        let path = quoted[1..quoted.len() - 1].to_string();
        let path_span = Span::new(path_token.offset + 1, path_token.offset + quoted.len() - 1);

        Ok(ImportDirective {
            path,
            path_span,
            symbols,
            alias,
            span: Span::new(start.start, self.prev_end()),
        })
    }

    // =========================================================================
    // Contracts
    // =========================================================================

    fn parse_contract(&mut self) -> Result<ContractDefinition, ParseError> {
        let start = self.current_span();
        let is_abstract = self.eat_word("abstract");
        let kind = match self.current_text() {
            "contract" => ContractKind::Contract,
            "library" => ContractKind::Library,
            "interface" => ContractKind::Interface,
            _ => return Err(self.error_here("expected 'contract', 'library' or 'interface'")),
        };
        self.bump();

        let name_token = self.expect_ident("contract name")?;
        let mut inherits = Vec::new();
        if self.eat_word("is") {
            loop {
                inherits.push(self.parse_inheritance_specifier()?);
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(TokenKind::LBrace, "'{'")?;
        let mut members = Vec::new();
        while !self.at_eof() && !self.at(TokenKind::RBrace) {
            members.push(self.parse_contract_member()?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;

        Ok(ContractDefinition {
            name: SmolStr::new(name_token.text),
            name_span: name_token.span(),
            kind,
            is_abstract,
            inherits,
            members,
            span: Span::new(start.start, self.prev_end()),
        })
    }

    fn parse_inheritance_specifier(&mut self) -> Result<InheritanceSpecifier, ParseError> {
        let name_token = self.expect_ident("base contract name")?;
        let mut name = name_token.text.to_string();
        let mut span = name_token.span();
        while self.at(TokenKind::Dot) && self.nth_kind(1) == TokenKind::Ident {
            self.bump();
            let part = self.bump();
            name.push('.');
            name.push_str(part.text);
            span = span.cover(part.span());
        }
        let mut args = Vec::new();
        if self.eat(TokenKind::LParen) {
            args = self.parse_expression_list(TokenKind::RParen)?;
            self.expect(TokenKind::RParen, "')'")?;
            span = Span::new(span.start, self.prev_end());
        }
        Ok(InheritanceSpecifier {
            name: SmolStr::new(name),
            args,
            span,
        })
    }

    fn parse_contract_member(&mut self) -> Result<ContractMember, ParseError> {
        self.anchor = self.pos;
        match self.current_text() {
            "function" => Ok(ContractMember::Function(
                self.parse_function(FunctionKind::Function)?,
            )),
            "modifier" => Ok(ContractMember::Function(
                self.parse_function(FunctionKind::Modifier)?,
            )),
            "constructor" => Ok(ContractMember::Function(
                self.parse_function(FunctionKind::Constructor)?,
            )),
            "fallback" => Ok(ContractMember::Function(
                self.parse_function(FunctionKind::Fallback)?,
            )),
            "receive" => Ok(ContractMember::Function(
                self.parse_function(FunctionKind::Receive)?,
            )),
            "struct" => Ok(ContractMember::Struct(self.parse_struct()?)),
            "enum" => Ok(ContractMember::Enum(self.parse_enum()?)),
            "event" => Ok(ContractMember::Event(self.parse_event()?)),
            "error" if self.nth_kind(1) == TokenKind::Ident => {
                Ok(ContractMember::Error(self.parse_error_def()?))
            }
            "using" => Ok(ContractMember::Using(self.parse_using()?)),
            "type" if self.nth_kind(1) == TokenKind::Ident => {
                Ok(ContractMember::TypeDef(self.parse_type_def()?))
            }
            _ if self.looks_like_declaration() => {
                Ok(ContractMember::Variable(self.parse_variable_declaration()?))
            }
            _ => Err(self.error_here("expected a contract member")),
        }
    }

    // =========================================================================
    // Functions
    // =========================================================================

    fn parse_function(&mut self, kind: FunctionKind) -> Result<FunctionDefinition, ParseError> {
        let start = self.bump().span(); // the introducing keyword

        let (name, name_span) = match kind {
            FunctionKind::Function | FunctionKind::Modifier => {
                let token = self.expect_ident("function name")?;
                (Some(SmolStr::new(token.text)), Some(token.span()))
            }
            _ => (None, None),
        };

        let mut params = Vec::new();
        // Modifiers may omit the parameter list entirely.
        if self.eat(TokenKind::LParen) {
            params = self.parse_parameter_list()?;
            self.expect(TokenKind::RParen, "')'")?;
        } else if kind != FunctionKind::Modifier {
            return Err(self.error_here("expected '('"));
        }

        let mut attributes = Vec::new();
        let mut modifiers = Vec::new();
        let mut returns = Vec::new();

        while self.at(TokenKind::Ident) {
            let word = self.current_text();
            if word == "returns" {
                self.bump();
                self.expect(TokenKind::LParen, "'('")?;
                returns = self.parse_parameter_list()?;
                self.expect(TokenKind::RParen, "')'")?;
            } else if word == "override" {
                attributes.push(SmolStr::new(word));
                self.bump();
                // override(Base1, Base2)
                if self.eat(TokenKind::LParen) {
                    while !self.at_eof() && !self.at(TokenKind::RParen) {
                        self.bump();
                    }
                    self.expect(TokenKind::RParen, "')'")?;
                }
            } else if FUNCTION_ATTRIBUTES.contains(&word) {
                attributes.push(SmolStr::new(word));
                self.bump();
            } else {
                modifiers.push(self.parse_modifier_invocation()?);
            }
        }

        let body = if self.eat(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_block()?)
        };

        Ok(FunctionDefinition {
            name,
            name_span,
            kind,
            params,
            returns,
            modifiers,
            attributes,
            body,
            span: Span::new(start.start, self.prev_end()),
        })
    }

    fn parse_modifier_invocation(&mut self) -> Result<ModifierInvocation, ParseError> {
        let name_token = self.expect_ident("modifier name")?;
        let mut span = name_token.span();
        let mut args = Vec::new();
        if self.eat(TokenKind::LParen) {
            args = self.parse_expression_list(TokenKind::RParen)?;
            self.expect(TokenKind::RParen, "')'")?;
            span = Span::new(span.start, self.prev_end());
        }
        Ok(ModifierInvocation {
            name: SmolStr::new(name_token.text),
            args,
            span,
        })
    }

    fn parse_parameter_list(&mut self) -> Result<Vec<Parameter>, ParseError> {
        let mut params = Vec::new();
        if self.at(TokenKind::RParen) {
            return Ok(params);
        }
        loop {
            let type_name = self.parse_type_name()?;
            let mut span = type_name.span;
            // Data location / indexed markers between type and name.
            while matches!(
                self.current_text(),
                "memory" | "storage" | "calldata" | "indexed"
            ) {
                span = span.cover(self.bump().span());
            }
            let (name, name_span) = if self.at(TokenKind::Ident) {
                let token = self.bump();
                span = span.cover(token.span());
                (Some(SmolStr::new(token.text)), Some(token.span()))
            } else {
                (None, None)
            };
            params.push(Parameter {
                type_name,
                name,
                name_span,
                span,
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(params)
    }

    // =========================================================================
    // Types
    // =========================================================================

    fn parse_type_name(&mut self) -> Result<TypeName, ParseError> {
        let start = self.current_span();
        let mut type_name = if self.at_word("mapping") {
            self.bump();
            self.expect(TokenKind::LParen, "'('")?;
            // Key type; nested mappings recurse on the value side.
            self.parse_type_name()?;
            self.expect(TokenKind::Arrow, "'=>'")?;
            let value = self.parse_type_name()?;
            self.expect(TokenKind::RParen, "')'")?;
            TypeName {
                base: value.base,
                is_array: false,
                is_mapping: true,
                is_payable: false,
                span: Span::new(start.start, self.prev_end()),
            }
        } else if self.at_word("address") {
            self.bump();
            let is_payable = self.eat_word("payable");
            TypeName {
                base: SmolStr::new("address"),
                is_array: false,
                is_mapping: false,
                is_payable,
                span: Span::new(start.start, self.prev_end()),
            }
        } else if self.at(TokenKind::Ident) {
            let first = self.bump();
            let mut base = first.text.to_string();
            while self.at(TokenKind::Dot) && self.nth_kind(1) == TokenKind::Ident {
                self.bump();
                base.push('.');
                base.push_str(self.bump().text);
            }
            TypeName {
                base: SmolStr::new(base),
                is_array: false,
                is_mapping: false,
                is_payable: false,
                span: Span::new(start.start, self.prev_end()),
            }
        } else {
            return Err(self.error_here("expected a type name"));
        };

        // Array suffixes: `[]` or `[<size>]`, possibly stacked.
        while self.at(TokenKind::LBracket) {
            self.bump();
            if !self.at(TokenKind::RBracket) {
                self.parse_expression()?;
            }
            self.expect(TokenKind::RBracket, "']'")?;
            type_name.is_array = true;
            type_name.span = Span::new(type_name.span.start, self.prev_end());
        }

        Ok(type_name)
    }

    // =========================================================================
    // Simple declarations
    // =========================================================================

    fn parse_variable_declaration(&mut self) -> Result<VariableDeclaration, ParseError> {
        let declaration = self.parse_variable_declaration_no_semi()?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(VariableDeclaration {
            span: Span::new(declaration.span.start, self.prev_end()),
            ..declaration
        })
    }

    fn parse_variable_declaration_no_semi(&mut self) -> Result<VariableDeclaration, ParseError> {
        let type_name = self.parse_type_name()?;
        let start = type_name.span.start;

        // Attribute words are only attributes while another identifier (a
        // further attribute or the variable name) still follows.
        let mut attributes = Vec::new();
        while self.at(TokenKind::Ident)
            && VARIABLE_ATTRIBUTES.contains(&self.current_text())
            && self.nth_kind(1) == TokenKind::Ident
        {
            attributes.push(SmolStr::new(self.bump().text));
        }

        let name_token = self.expect_ident("variable name")?;
        let initializer = if self.eat(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };

        Ok(VariableDeclaration {
            type_name,
            name: SmolStr::new(name_token.text),
            name_span: name_token.span(),
            attributes,
            initializer,
            span: Span::new(start, self.prev_end()),
        })
    }

    fn parse_struct(&mut self) -> Result<StructDefinition, ParseError> {
        let start = self.expect_word("struct")?.span();
        let name_token = self.expect_ident("struct name")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut fields = Vec::new();
        while !self.at_eof() && !self.at(TokenKind::RBrace) {
            let type_name = self.parse_type_name()?;
            let field_start = type_name.span.start;
            let field_name = self.expect_ident("field name")?;
            self.expect(TokenKind::Semicolon, "';'")?;
            fields.push(StructField {
                type_name,
                name: SmolStr::new(field_name.text),
                name_span: field_name.span(),
                span: Span::new(field_start, self.prev_end()),
            });
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(StructDefinition {
            name: SmolStr::new(name_token.text),
            name_span: name_token.span(),
            fields,
            span: Span::new(start.start, self.prev_end()),
        })
    }

    fn parse_enum(&mut self) -> Result<EnumDefinition, ParseError> {
        let start = self.expect_word("enum")?.span();
        let name_token = self.expect_ident("enum name")?;
        self.expect(TokenKind::LBrace, "'{'")?;
        let mut values = Vec::new();
        while self.at(TokenKind::Ident) {
            let value = self.bump();
            values.push(EnumValue {
                name: SmolStr::new(value.text),
                span: value.span(),
            });
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(EnumDefinition {
            name: SmolStr::new(name_token.text),
            name_span: name_token.span(),
            values,
            span: Span::new(start.start, self.prev_end()),
        })
    }

    fn parse_event(&mut self) -> Result<EventDefinition, ParseError> {
        let start = self.expect_word("event")?.span();
        let name_token = self.expect_ident("event name")?;
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_parameter_list()?;
        self.expect(TokenKind::RParen, "')'")?;
        let is_anonymous = self.eat_word("anonymous");
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(EventDefinition {
            name: SmolStr::new(name_token.text),
            name_span: name_token.span(),
            params,
            is_anonymous,
            span: Span::new(start.start, self.prev_end()),
        })
    }

    fn parse_error_def(&mut self) -> Result<ErrorDefinition, ParseError> {
        let start = self.expect_word("error")?.span();
        let name_token = self.expect_ident("error name")?;
        self.expect(TokenKind::LParen, "'('")?;
        let params = self.parse_parameter_list()?;
        self.expect(TokenKind::RParen, "')'")?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(ErrorDefinition {
            name: SmolStr::new(name_token.text),
            name_span: name_token.span(),
            params,
            span: Span::new(start.start, self.prev_end()),
        })
    }

    fn parse_type_def(&mut self) -> Result<TypeDefinition, ParseError> {
        let start = self.expect_word("type")?.span();
        let name_token = self.expect_ident("type name")?;
        self.expect_word("is")?;
        let underlying = self.parse_type_name()?;
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(TypeDefinition {
            name: SmolStr::new(name_token.text),
            name_span: name_token.span(),
            underlying,
            span: Span::new(start.start, self.prev_end()),
        })
    }

    fn parse_using(&mut self) -> Result<UsingDirective, ParseError> {
        let start = self.expect_word("using")?.span();
        let library_token = self.expect_ident("library name")?;
        self.expect_word("for")?;
        let target = if self.eat(TokenKind::Star) {
            None
        } else {
            Some(self.parse_type_name()?)
        };
        self.eat_word("global");
        self.expect(TokenKind::Semicolon, "';'")?;
        Ok(UsingDirective {
            library: SmolStr::new(library_token.text),
            library_span: library_token.span(),
            target,
            span: Span::new(start.start, self.prev_end()),
        })
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.expect(TokenKind::LBrace, "'{'")?.span();
        let mut statements = Vec::new();
        while !self.at_eof() && !self.at(TokenKind::RBrace) {
            statements.push(self.parse_statement()?);
        }
        self.expect(TokenKind::RBrace, "'}'")?;
        Ok(Block {
            statements,
            span: Span::new(start.start, self.prev_end()),
        })
    }

    fn parse_statement(&mut self) -> Result<Statement, ParseError> {
        self.anchor = self.pos;
        match self.current_text() {
            _ if self.at(TokenKind::LBrace) => Ok(Statement::Block(self.parse_block()?)),
            "unchecked" if self.nth_kind(1) == TokenKind::LBrace => {
                self.bump();
                Ok(Statement::Block(self.parse_block()?))
            }
            "if" => self.parse_if(),
            "for" => self.parse_for(),
            "while" => self.parse_while(),
            "return" => {
                let start = self.bump().span();
                let value = if self.at(TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Statement::Return(ReturnStatement {
                    value,
                    span: Span::new(start.start, self.prev_end()),
                }))
            }
            "emit" => {
                let start = self.bump().span();
                let call = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Statement::Emit(EmitStatement {
                    call,
                    span: Span::new(start.start, self.prev_end()),
                }))
            }
            // `revert CustomError(...)` — a bare `revert(...)` parses as a
            // plain call expression instead.
            "revert" if self.nth_kind(1) == TokenKind::Ident => {
                let start = self.bump().span();
                let call = Some(self.parse_expression()?);
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Statement::Revert(RevertStatement {
                    call,
                    span: Span::new(start.start, self.prev_end()),
                }))
            }
            _ if self.looks_like_declaration() => {
                let declaration = self.parse_variable_declaration()?;
                Ok(Statement::VariableDeclaration(declaration))
            }
            _ => {
                let expression = self.parse_expression()?;
                self.expect(TokenKind::Semicolon, "';'")?;
                Ok(Statement::Expression(expression))
            }
        }
    }

    fn parse_if(&mut self) -> Result<Statement, ParseError> {
        let start = self.expect_word("if")?.span();
        self.expect(TokenKind::LParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        let then_branch = Box::new(self.parse_statement()?);
        let else_branch = if self.eat_word("else") {
            Some(Box::new(self.parse_statement()?))
        } else {
            None
        };
        Ok(Statement::If(IfStatement {
            condition,
            then_branch,
            else_branch,
            span: Span::new(start.start, self.prev_end()),
        }))
    }

    fn parse_for(&mut self) -> Result<Statement, ParseError> {
        let start = self.expect_word("for")?.span();
        self.expect(TokenKind::LParen, "'('")?;

        let init = if self.eat(TokenKind::Semicolon) {
            None
        } else if self.looks_like_declaration() {
            let declaration = self.parse_variable_declaration()?;
            Some(Box::new(Statement::VariableDeclaration(declaration)))
        } else {
            let expression = self.parse_expression()?;
            self.expect(TokenKind::Semicolon, "';'")?;
            Some(Box::new(Statement::Expression(expression)))
        };

        let condition = if self.at(TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::Semicolon, "';'")?;

        let update = if self.at(TokenKind::RParen) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.expect(TokenKind::RParen, "')'")?;

        let body = Box::new(self.parse_statement()?);
        Ok(Statement::For(ForStatement {
            init,
            condition,
            update,
            body,
            span: Span::new(start.start, self.prev_end()),
        }))
    }

    fn parse_while(&mut self) -> Result<Statement, ParseError> {
        let start = self.expect_word("while")?.span();
        self.expect(TokenKind::LParen, "'('")?;
        let condition = self.parse_expression()?;
        self.expect(TokenKind::RParen, "')'")?;
        let body = Box::new(self.parse_statement()?);
        Ok(Statement::While(WhileStatement {
            condition,
            body,
            span: Span::new(start.start, self.prev_end()),
        }))
    }

    /// Lookahead: does the token stream at the cursor start a variable
    /// declaration rather than an expression? Declarations start with an
    /// elementary type, `mapping`, or a (dotted) identifier path followed by
    /// an optional array suffix and another identifier.
    fn looks_like_declaration(&self) -> bool {
        let text = self.current_text();
        if text == "mapping" || is_elementary_type(text) {
            return true;
        }
        if !self.at(TokenKind::Ident) {
            return false;
        }
        let mut i = 1;
        while self.nth_kind(i) == TokenKind::Dot && self.nth_kind(i + 1) == TokenKind::Ident {
            i += 2;
        }
        while self.nth_kind(i) == TokenKind::LBracket {
            if self.nth_kind(i + 1) == TokenKind::RBracket {
                i += 2;
            } else if self.nth_kind(i + 1) == TokenKind::Number
                && self.nth_kind(i + 2) == TokenKind::RBracket
            {
                i += 3;
            } else {
                return false;
            }
        }
        self.nth_kind(i) == TokenKind::Ident
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expression_list(&mut self, end: TokenKind) -> Result<Vec<Expression>, ParseError> {
        let mut expressions = Vec::new();
        if self.at(end) {
            return Ok(expressions);
        }
        loop {
            expressions.push(self.parse_expression()?);
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(expressions)
    }

    fn parse_expression(&mut self) -> Result<Expression, ParseError> {
        let lhs = self.parse_ternary()?;

        let op = match self.current_kind() {
            TokenKind::Eq
            | TokenKind::PlusEq
            | TokenKind::MinusEq
            | TokenKind::StarEq
            | TokenKind::SlashEq
            | TokenKind::PercentEq
            | TokenKind::AmpEq
            | TokenKind::PipeEq
            | TokenKind::CaretEq => SmolStr::new(self.current_text()),
            _ => return Ok(lhs),
        };
        self.bump();
        let rhs = self.parse_expression()?; // right-associative
        let span = lhs.span().cover(rhs.span());
        Ok(Expression::Assignment(Assignment {
            lhs: Box::new(lhs),
            op,
            rhs: Box::new(rhs),
            span,
        }))
    }

    fn parse_ternary(&mut self) -> Result<Expression, ParseError> {
        let condition = self.parse_binary(0)?;
        if !self.eat(TokenKind::Question) {
            return Ok(condition);
        }
        let if_true = self.parse_ternary()?;
        self.expect(TokenKind::Colon, "':'")?;
        let if_false = self.parse_ternary()?;
        let span = condition.span().cover(if_false.span());
        Ok(Expression::Ternary(TernaryExpression {
            condition: Box::new(condition),
            if_true: Box::new(if_true),
            if_false: Box::new(if_false),
            span,
        }))
    }

    fn binary_binding_power(kind: TokenKind) -> Option<u8> {
        let power = match kind {
            TokenKind::PipePipe => 1,
            TokenKind::AmpAmp => 2,
            TokenKind::EqEq | TokenKind::NotEq => 3,
            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => 4,
            TokenKind::Pipe => 5,
            TokenKind::Caret => 6,
            TokenKind::Amp => 7,
            TokenKind::Shl | TokenKind::Shr => 8,
            TokenKind::Plus | TokenKind::Minus => 9,
            TokenKind::Star | TokenKind::Slash | TokenKind::Percent => 10,
            TokenKind::StarStar => 11,
            _ => return None,
        };
        Some(power)
    }

    fn parse_binary(&mut self, min_power: u8) -> Result<Expression, ParseError> {
        let mut lhs = self.parse_unary()?;
        while let Some(power) = Self::binary_binding_power(self.current_kind()) {
            if power < min_power {
                break;
            }
            let op = SmolStr::new(self.current_text());
            self.bump();
            let rhs = self.parse_binary(power + 1)?;
            let span = lhs.span().cover(rhs.span());
            lhs = Expression::Binary(BinaryExpression {
                lhs: Box::new(lhs),
                op,
                rhs: Box::new(rhs),
                span,
            });
        }
        Ok(lhs)
    }

    fn parse_unary(&mut self) -> Result<Expression, ParseError> {
        match self.current_kind() {
            TokenKind::Bang
            | TokenKind::Tilde
            | TokenKind::Minus
            | TokenKind::Plus
            | TokenKind::PlusPlus
            | TokenKind::MinusMinus => {
                let op_token = self.bump();
                let operand = self.parse_unary()?;
                let span = op_token.span().cover(operand.span());
                Ok(Expression::Unary(UnaryExpression {
                    op: SmolStr::new(op_token.text),
                    operand: Box::new(operand),
                    span,
                }))
            }
            TokenKind::Ident if matches!(self.current_text(), "delete") => {
                let op_token = self.bump();
                let operand = self.parse_unary()?;
                let span = op_token.span().cover(operand.span());
                Ok(Expression::Unary(UnaryExpression {
                    op: SmolStr::new(op_token.text),
                    operand: Box::new(operand),
                    span,
                }))
            }
            TokenKind::Ident if self.at_word("new") => {
                let start = self.bump().span();
                let type_name = self.parse_type_name()?;
                let new_expr = Expression::New(NewExpression {
                    span: Span::new(start.start, type_name.span.end),
                    type_name,
                });
                self.parse_postfix(new_expr)
            }
            _ => {
                let primary = self.parse_primary()?;
                self.parse_postfix(primary)
            }
        }
    }

    fn parse_postfix(&mut self, mut expression: Expression) -> Result<Expression, ParseError> {
        loop {
            match self.current_kind() {
                TokenKind::Dot => {
                    if self.nth_kind(1) != TokenKind::Ident {
                        return Err(self.error_here("expected member name after '.'"));
                    }
                    self.bump();
                    let member = self.bump();
                    let span = expression.span().cover(member.span());
                    expression = Expression::MemberAccess(MemberAccess {
                        object: Box::new(expression),
                        member: SmolStr::new(member.text),
                        member_span: member.span(),
                        span,
                    });
                }
                TokenKind::LParen => {
                    self.bump();
                    let args = self.parse_expression_list(TokenKind::RParen)?;
                    self.expect(TokenKind::RParen, "')'")?;
                    let span = Span::new(expression.span().start, self.prev_end());
                    expression = Expression::Call(FunctionCall {
                        callee: Box::new(expression),
                        args,
                        span,
                    });
                }
                TokenKind::LBracket => {
                    self.bump();
                    let index = if self.at(TokenKind::RBracket) {
                        None
                    } else {
                        Some(Box::new(self.parse_expression()?))
                    };
                    self.expect(TokenKind::RBracket, "']'")?;
                    let span = Span::new(expression.span().start, self.prev_end());
                    expression = Expression::Index(IndexAccess {
                        object: Box::new(expression),
                        index,
                        span,
                    });
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let op_token = self.bump();
                    let span = expression.span().cover(op_token.span());
                    expression = Expression::Unary(UnaryExpression {
                        op: SmolStr::new(op_token.text),
                        operand: Box::new(expression),
                        span,
                    });
                }
                _ => return Ok(expression),
            }
        }
    }

    fn parse_primary(&mut self) -> Result<Expression, ParseError> {
        match self.current_kind() {
            TokenKind::Ident => {
                let token = self.bump();
                if token.text == "true" || token.text == "false" {
                    return Ok(Expression::Literal(Literal {
                        kind: LiteralKind::Bool,
                        text: SmolStr::new(token.text),
                        span: token.span(),
                    }));
                }
                Ok(Expression::Identifier(Identifier {
                    name: SmolStr::new(token.text),
                    span: token.span(),
                }))
            }
            TokenKind::Number => {
                let token = self.bump();
                // Unit suffixes: `1 ether`, `2 days`.
                if self.at(TokenKind::Ident)
                    && matches!(
                        self.current_text(),
                        "wei" | "gwei" | "ether" | "seconds" | "minutes" | "hours" | "days"
                            | "weeks"
                    )
                {
                    let unit = self.bump();
                    return Ok(Expression::Literal(Literal {
                        kind: LiteralKind::Number,
                        text: SmolStr::new(format!("{} {}", token.text, unit.text)),
                        span: token.span().cover(unit.span()),
                    }));
                }
                Ok(Expression::Literal(Literal {
                    kind: LiteralKind::Number,
                    text: SmolStr::new(token.text),
                    span: token.span(),
                }))
            }
            TokenKind::HexNumber => {
                let token = self.bump();
                Ok(Expression::Literal(Literal {
                    kind: LiteralKind::HexNumber,
                    text: SmolStr::new(token.text),
                    span: token.span(),
                }))
            }
            TokenKind::Str => {
                let token = self.bump();
                Ok(Expression::Literal(Literal {
                    kind: LiteralKind::String,
                    text: SmolStr::new(token.text),
                    span: token.span(),
                }))
            }
            TokenKind::LParen => {
                let start = self.bump().span();
                let mut elements = Vec::new();
                let mut saw_comma = false;
                // Tuples may have empty slots: `(, b) = f();`
                loop {
                    if self.at(TokenKind::RParen) {
                        break;
                    }
                    if self.eat(TokenKind::Comma) {
                        saw_comma = true;
                        continue;
                    }
                    elements.push(self.parse_expression()?);
                    if !self.eat(TokenKind::Comma) {
                        break;
                    }
                    saw_comma = true;
                }
                self.expect(TokenKind::RParen, "')'")?;
                if elements.len() == 1 && !saw_comma {
                    // Parenthesized expression, not a tuple.
                    return Ok(elements.pop().expect("one element"));
                }
                Ok(Expression::Tuple(TupleExpression {
                    elements,
                    span: Span::new(start.start, self.prev_end()),
                }))
            }
            TokenKind::LBracket => {
                // Array literal `[1, 2, 3]`.
                let start = self.bump().span();
                let elements = self.parse_expression_list(TokenKind::RBracket)?;
                self.expect(TokenKind::RBracket, "']'")?;
                Ok(Expression::Tuple(TupleExpression {
                    elements,
                    span: Span::new(start.start, self.prev_end()),
                }))
            }
            _ => Err(self.error_here("expected an expression")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(input: &str) -> SourceUnit {
        match parse(input) {
            Ok(unit) => unit,
            Err(e) => panic!("parse failed: {e}\n{input}"),
        }
    }

    #[test]
    fn test_parse_pragma_and_contract() {
        let unit = parse_ok("pragma solidity ^0.8.0;\ncontract A {}\n");
        assert_eq!(unit.items.len(), 2);
        match &unit.items[1] {
            SourceItem::Contract(c) => {
                assert_eq!(c.name, "A");
                assert_eq!(c.kind, ContractKind::Contract);
                assert!(!c.is_abstract);
            }
            other => panic!("expected contract, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_import_forms() {
        let unit = parse_ok(concat!(
            "import \"./Foo.sol\";\n",
            "import {A as B, C} from \"./Bar.sol\";\n",
            "import * as ns from \"lib/Baz.sol\";\n",
        ));
        let imports: Vec<_> = unit
            .items
            .iter()
            .filter_map(|i| match i {
                SourceItem::Import(import) => Some(import),
                _ => None,
            })
            .collect();
        assert_eq!(imports.len(), 3);
        assert_eq!(imports[0].path, "./Foo.sol");
        assert_eq!(imports[1].symbols.len(), 2);
        assert_eq!(imports[1].symbols[0].alias.as_deref(), Some("B"));
        assert_eq!(imports[2].alias.as_deref(), Some("ns"));
    }

    #[test]
    fn test_import_path_span_points_at_specifier() {
        let input = "import \"./Foo.sol\";";
        let unit = parse_ok(input);
        let SourceItem::Import(import) = &unit.items[0] else {
            panic!("expected import");
        };
        assert_eq!(&input[import.path_span.start..import.path_span.end], "./Foo.sol");
    }

    #[test]
    fn test_parse_inheritance() {
        let unit = parse_ok("abstract contract A is B, C.D {}");
        let SourceItem::Contract(c) = &unit.items[0] else {
            panic!()
        };
        assert!(c.is_abstract);
        assert_eq!(c.inherits.len(), 2);
        assert_eq!(c.inherits[0].name, "B");
        assert_eq!(c.inherits[1].name, "C.D");
    }

    #[test]
    fn test_parse_function_full_header() {
        let unit = parse_ok(
            "contract A {\n  function f(uint256 x, address to) public view onlyOwner returns (bool ok) { return true; }\n}",
        );
        let SourceItem::Contract(c) = &unit.items[0] else {
            panic!()
        };
        let ContractMember::Function(f) = &c.members[0] else {
            panic!()
        };
        assert_eq!(f.name.as_deref(), Some("f"));
        assert_eq!(f.params.len(), 2);
        assert_eq!(f.returns.len(), 1);
        assert_eq!(f.modifiers.len(), 1);
        assert_eq!(f.modifiers[0].name, "onlyOwner");
        assert!(f.attributes.iter().any(|a| a == "view"));
        assert!(f.body.is_some());
    }

    #[test]
    fn test_parse_special_functions() {
        let unit = parse_ok(
            "contract A { constructor(uint x) {} fallback() external payable {} receive() external payable {} modifier m { _; } }",
        );
        let SourceItem::Contract(c) = &unit.items[0] else {
            panic!()
        };
        let kinds: Vec<_> = c
            .members
            .iter()
            .filter_map(|m| match m {
                ContractMember::Function(f) => Some(f.kind),
                _ => None,
            })
            .collect();
        assert_eq!(
            kinds,
            vec![
                FunctionKind::Constructor,
                FunctionKind::Fallback,
                FunctionKind::Receive,
                FunctionKind::Modifier,
            ]
        );
    }

    #[test]
    fn test_parse_state_variables_and_mapping() {
        let unit = parse_ok(
            "contract A { uint256 public total; mapping(address => uint256) balances; address payable owner; }",
        );
        let SourceItem::Contract(c) = &unit.items[0] else {
            panic!()
        };
        let vars: Vec<_> = c
            .members
            .iter()
            .filter_map(|m| match m {
                ContractMember::Variable(v) => Some(v),
                _ => None,
            })
            .collect();
        assert_eq!(vars.len(), 3);
        assert_eq!(vars[0].attributes, vec![SmolStr::new("public")]);
        assert!(vars[1].type_name.is_mapping);
        assert_eq!(vars[1].type_name.base, "uint256");
        assert!(vars[2].type_name.is_payable);
        assert_eq!(vars[2].type_name.base, "address");
    }

    #[test]
    fn test_parse_struct_enum_event_error_using() {
        let unit = parse_ok(concat!(
            "struct S { uint a; address b; }\n",
            "enum E { A, B, C }\n",
            "contract X {\n",
            "  event Transfer(address indexed from, address indexed to, uint256 value);\n",
            "  error NotOwner(address caller);\n",
            "  using SafeMath for uint256;\n",
            "  using Everything for *;\n",
            "}\n",
        ));
        assert!(matches!(unit.items[0], SourceItem::Struct(_)));
        let SourceItem::Enum(e) = &unit.items[1] else {
            panic!()
        };
        assert_eq!(e.values.len(), 3);
        let SourceItem::Contract(c) = &unit.items[2] else {
            panic!()
        };
        assert!(matches!(c.members[0], ContractMember::Event(_)));
        assert!(matches!(c.members[1], ContractMember::Error(_)));
        let ContractMember::Using(u) = &c.members[2] else {
            panic!()
        };
        assert_eq!(u.library, "SafeMath");
        assert_eq!(u.target.as_ref().map(|t| t.base.as_str()), Some("uint256"));
        let ContractMember::Using(w) = &c.members[3] else {
            panic!()
        };
        assert!(w.target.is_none());
    }

    #[test]
    fn test_parse_statements_and_expressions() {
        let unit = parse_ok(
            "contract A { function f(uint n) public { uint acc = 0; for (uint i = 0; i < n; i++) { acc += i; } if (acc > 10) { emit Done(acc); } else { revert TooSmall(acc); } } event Done(uint v); error TooSmall(uint v); }",
        );
        let SourceItem::Contract(c) = &unit.items[0] else {
            panic!()
        };
        let ContractMember::Function(f) = &c.members[0] else {
            panic!()
        };
        let body = f.body.as_ref().expect("body");
        assert!(matches!(body.statements[0], Statement::VariableDeclaration(_)));
        assert!(matches!(body.statements[1], Statement::For(_)));
        assert!(matches!(body.statements[2], Statement::If(_)));
    }

    #[test]
    fn test_member_access_chain_shape() {
        let unit = parse_ok("contract A { function f() public { a.b.c(1); } }");
        let SourceItem::Contract(c) = &unit.items[0] else {
            panic!()
        };
        let ContractMember::Function(f) = &c.members[0] else {
            panic!()
        };
        let Statement::Expression(Expression::Call(call)) =
            &f.body.as_ref().unwrap().statements[0]
        else {
            panic!("expected call statement")
        };
        let Expression::MemberAccess(outer) = call.callee.as_ref() else {
            panic!("expected member access callee")
        };
        assert_eq!(outer.member, "c");
        let Expression::MemberAccess(inner) = outer.object.as_ref() else {
            panic!("expected nested member access")
        };
        assert_eq!(inner.member, "b");
        assert!(matches!(inner.object.as_ref(), Expression::Identifier(i) if i.name == "a"));
    }

    #[test]
    fn test_error_carries_line_and_column() {
        let err = parse("contract A {}\ncontract B { !!! }\n").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_dangling_statement_error_charges_its_own_line() {
        // The unexpected token is the `}` on the following line; the line
        // being typed is the one that must be reported.
        let err =
            parse("contract C {\n    function f() public {\n        emit \n    }\n}\n").unwrap_err();
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_free_function_and_constant() {
        let unit = parse_ok("uint256 constant LIMIT = 100;\nfunction helper(uint x) pure returns (uint) { return x + 1; }\n");
        assert!(matches!(unit.items[0], SourceItem::Variable(_)));
        assert!(matches!(unit.items[1], SourceItem::Function(_)));
    }

    #[test]
    fn test_spans_nest() {
        let input = "contract A { function f() public { } }";
        let unit = parse_ok(input);
        let SourceItem::Contract(c) = &unit.items[0] else {
            panic!()
        };
        let ContractMember::Function(f) = &c.members[0] else {
            panic!()
        };
        assert!(c.span.contains_span(f.span));
        assert!(unit.span.contains_span(c.span));
    }
}
