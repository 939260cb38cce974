//! CASE WHEN builder.

use crate::expr::{Expr, ExprNode};
use crate::types::SqlType;

/// Start a `CASE WHEN cond THEN value …` chain.
///
/// Close with [`CaseBuilder::otherwise`] for a total expression, or
/// [`CaseBuilder::end`] to leave the ELSE branch NULL and get an optional.
pub fn case_when<T: SqlType>(
    cond: impl Into<Expr<bool>>,
    then: impl Into<Expr<T>>,
) -> CaseBuilder<T> {
    CaseBuilder {
        branches: vec![(cond.into().into_node(), then.into().into_node())],
        marker: std::marker::PhantomData,
    }
}

pub struct CaseBuilder<T> {
    branches: Vec<(ExprNode, ExprNode)>,
    marker: std::marker::PhantomData<fn() -> T>,
}

impl<T: SqlType> CaseBuilder<T> {
    /// Add another WHEN branch.
    pub fn when(mut self, cond: impl Into<Expr<bool>>, then: impl Into<Expr<T>>) -> Self {
        self.branches
            .push((cond.into().into_node(), then.into().into_node()));
        self
    }

    /// Close with an ELSE branch.
    pub fn otherwise(self, value: impl Into<Expr<T>>) -> Expr<T> {
        Expr::from_node(ExprNode::Case {
            branches: self.branches,
            otherwise: Some(Box::new(value.into().into_node())),
        })
    }

    /// Close without an ELSE branch; unmatched rows yield NULL.
    pub fn end(self) -> Expr<Option<T>> {
        Expr::from_node(ExprNode::Case {
            branches: self.branches,
            otherwise: None,
        })
    }
}
