//! SQL fragments: literal text interleaved with bound parameter slots.
//!
//! A [`Fragment`] never interpolates user data into its text. Values live
//! only in [`ParamSlot`]s, and the number and order of placeholders emitted
//! at the end equals the number and order of slots collected.

use crate::types::{SqlValue, TypeCode};

/// A value bound into a statement, tagged with its type mapper's code.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamSlot {
    pub value: SqlValue,
    pub code: TypeCode,
}

impl ParamSlot {
    pub fn new(value: SqlValue, code: TypeCode) -> Self {
        Self { value, code }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Lit(String),
    Param(ParamSlot),
}

/// An immutable-once-built sequence of SQL text chunks and parameter slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    parts: Vec<Part>,
    complete: bool,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fragment holding literal SQL text.
    pub fn lit(text: impl Into<String>) -> Self {
        let mut frag = Self::new();
        frag.push_sql(text);
        frag
    }

    /// Escape hatch for identifiers and keywords already validated by a
    /// name mapper. Semantically identical to [`Fragment::lit`]; the name
    /// records intent at call sites.
    pub fn raw(text: impl Into<String>) -> Self {
        Self::lit(text)
    }

    /// A fragment holding a single parameter slot.
    pub fn param(slot: ParamSlot) -> Self {
        let mut frag = Self::new();
        frag.push_param(slot);
        frag
    }

    pub fn push_sql(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        // Coalesce adjacent literal chunks so emission stays a flat pass.
        if let Some(Part::Lit(last)) = self.parts.last_mut() {
            last.push_str(&text);
        } else {
            self.parts.push(Part::Lit(text));
        }
    }

    pub fn push_param(&mut self, slot: ParamSlot) {
        self.parts.push(Part::Param(slot));
    }

    /// Append another fragment, preserving slot order.
    pub fn append(&mut self, other: Fragment) {
        for part in other.parts {
            match part {
                Part::Lit(text) => self.push_sql(text),
                Part::Param(slot) => self.push_param(slot),
            }
        }
        self.complete = self.complete || other.complete;
    }

    /// Join fragments with a literal separator.
    pub fn join(sep: &str, items: impl IntoIterator<Item = Fragment>) -> Fragment {
        let mut out = Fragment::new();
        for (i, item) in items.into_iter().enumerate() {
            if i > 0 {
                out.push_sql(sep);
            }
            out.append(item);
        }
        out
    }

    /// Mark this fragment as a complete statement, so no default select
    /// suffix is appended around it.
    pub fn mark_complete(&mut self) {
        self.complete = true;
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Number of parameter slots carried.
    pub fn param_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, Part::Param(_)))
            .count()
    }

    /// Flatten into final SQL text plus the ordered parameter vector.
    ///
    /// `placeholder` receives the 1-based index of each slot in emission
    /// order and returns the dialect's marker for it.
    pub fn emit(&self, mut placeholder: impl FnMut(usize) -> String) -> (String, Vec<ParamSlot>) {
        let mut sql = String::new();
        let mut params = Vec::new();
        for part in &self.parts {
            match part {
                Part::Lit(text) => sql.push_str(text),
                Part::Param(slot) => {
                    params.push(slot.clone());
                    sql.push_str(&placeholder(params.len()));
                }
            }
        }
        (sql, params)
    }
}
