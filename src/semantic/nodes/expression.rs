//! Navigable expression chains with per-version memoized resolution.

use once_cell::sync::OnceCell;
use smol_str::SmolStr;

use crate::base::Span;
use crate::semantic::type_ref::ResolvedSymbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionKind {
    Identifier,
    /// `.name` on a base expression.
    Member,
    /// `name(...)` or `.name(...)`.
    Call,
}

/// One link of an identifier / member-access / call chain.
///
/// `a.b.c(1)` becomes a `Call` node named `c` whose `base` is the `Member`
/// node `b`, whose `base` is the `Identifier` node `a`. Call arguments are
/// indexed as separate chains by the body index, not as children here.
///
/// `resolved` is written at most once per document version; a memoized
/// `None` ("looked it up, found nothing") is as final as a hit.
#[derive(Debug)]
pub struct ParsedExpression {
    pub kind: ExpressionKind,
    pub name: SmolStr,
    pub name_span: Span,
    /// Span of the whole chain up to and including this link.
    pub span: Span,
    pub base: Option<Box<ParsedExpression>>,
    resolved: OnceCell<Option<ResolvedSymbol>>,
}

impl ParsedExpression {
    pub fn new(
        kind: ExpressionKind,
        name: SmolStr,
        name_span: Span,
        span: Span,
        base: Option<Box<ParsedExpression>>,
    ) -> Self {
        Self {
            kind,
            name,
            name_span,
            span,
            base,
            resolved: OnceCell::new(),
        }
    }

    /// The memoized resolution, computing it on first access.
    pub fn resolve_with<F>(&self, compute: F) -> Option<&ResolvedSymbol>
    where
        F: FnOnce(&ParsedExpression) -> Option<ResolvedSymbol>,
    {
        self.resolved.get_or_init(|| compute(self)).as_ref()
    }

    /// The memoized resolution if it has been computed already.
    pub fn resolved(&self) -> Option<&ResolvedSymbol> {
        self.resolved.get().and_then(|r| r.as_ref())
    }

    /// Deepest link whose name sits at `offset`.
    pub fn node_at(&self, offset: usize) -> Option<&ParsedExpression> {
        if let Some(base) = &self.base {
            if let Some(found) = base.node_at(offset) {
                return Some(found);
            }
        }
        if self.name_span.contains(offset) {
            Some(self)
        } else {
            None
        }
    }

    /// All links, base first.
    pub fn chain(&self) -> Vec<&ParsedExpression> {
        let mut links = match &self.base {
            Some(base) => base.chain(),
            None => Vec::new(),
        };
        links.push(self);
        links
    }
}
