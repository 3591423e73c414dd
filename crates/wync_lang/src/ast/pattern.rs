//! Destructuring patterns, shared by let-bindings, function parameters, and
//! `match` arms (spec.md §3, Expression variant `Pattern`).

use wync_base::{Span, Symbol};

use super::expr::Expr;

#[derive(Debug, Clone)]
pub enum Pattern {
    /// `42`, `"s"`, `true`, ... — matched by value equality.
    Literal(Box<Expr>),
    /// A plain binding name; always irrefutable.
    Ident { name: Symbol, span: Span },
    /// `_`; always irrefutable.
    Wildcard { span: Span },
    Struct {
        type_name: Symbol,
        fields: Vec<(Symbol, Pattern)>,
        span: Span,
    },
    Array {
        elements: Vec<Pattern>,
        rest: Option<Symbol>,
        span: Span,
    },
    Tuple {
        elements: Vec<Pattern>,
        span: Span,
    },
    /// `1..10`, `'a'..='z'`.
    Range {
        start: Box<Expr>,
        end: Box<Expr>,
        inclusive: bool,
        span: Span,
    },
    /// `Some(p)` / `None`.
    OptionSome {
        inner: Box<Pattern>,
        span: Span,
    },
    OptionNone {
        span: Span,
    },
    /// `p if guard`.
    Guarded {
        inner: Box<Pattern>,
        guard: Box<Expr>,
        span: Span,
    },
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Literal(e) => e.span(),
            Pattern::Ident { span, .. }
            | Pattern::Wildcard { span }
            | Pattern::Struct { span, .. }
            | Pattern::Array { span, .. }
            | Pattern::Tuple { span, .. }
            | Pattern::Range { span, .. }
            | Pattern::OptionSome { span, .. }
            | Pattern::OptionNone { span }
            | Pattern::Guarded { span, .. } => *span,
        }
    }

    /// True iff this pattern is guaranteed to match any value of its type
    /// (spec.md §4.3, "Pattern exhaustiveness and refutability"). Required
    /// in let-bindings and function parameters.
    pub fn is_irrefutable(&self) -> bool {
        match self {
            Pattern::Ident { .. } | Pattern::Wildcard { .. } => true,
            Pattern::Struct { fields, .. } => fields.iter().all(|(_, p)| p.is_irrefutable()),
            Pattern::Array { elements, rest, .. } => {
                rest.is_some() && elements.iter().all(Pattern::is_irrefutable)
            }
            Pattern::Tuple { elements, .. } => elements.iter().all(Pattern::is_irrefutable),
            Pattern::Literal(_)
            | Pattern::Range { .. }
            | Pattern::OptionSome { .. }
            | Pattern::OptionNone { .. }
            | Pattern::Guarded { .. } => false,
        }
    }

    /// Every binding name this pattern introduces, left to right.
    pub fn bound_names(&self) -> Vec<Symbol> {
        let mut names = Vec::new();
        self.collect_names(&mut names);
        names
    }

    fn collect_names(&self, out: &mut Vec<Symbol>) {
        match self {
            Pattern::Ident { name, .. } => out.push(*name),
            Pattern::Struct { fields, .. } => {
                for (_, p) in fields {
                    p.collect_names(out);
                }
            }
            Pattern::Array { elements, rest, .. } => {
                for p in elements {
                    p.collect_names(out);
                }
                if let Some(r) = rest {
                    out.push(*r);
                }
            }
            Pattern::Tuple { elements, .. } => {
                for p in elements {
                    p.collect_names(out);
                }
            }
            Pattern::OptionSome { inner, .. } | Pattern::Guarded { inner, .. } => {
                inner.collect_names(out);
            }
            Pattern::Wildcard { .. }
            | Pattern::Literal(_)
            | Pattern::Range { .. }
            | Pattern::OptionNone { .. } => {}
        }
    }
}
