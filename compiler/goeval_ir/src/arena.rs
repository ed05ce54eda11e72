//! Flat storage for one parsed expression.

use rustc_hash::FxHashMap;

use crate::{Expr, ExprId, ExprRange, FieldGroup, FieldRange, Name, NameRange};

/// Owns every node, child list and string of one syntax tree.
#[derive(Clone, Debug, Default)]
pub struct ExprArena {
    exprs: Vec<Expr>,
    expr_lists: Vec<ExprId>,
    fields: Vec<FieldGroup>,
    name_lists: Vec<Name>,
    strings: Vec<Box<str>>,
    string_ids: FxHashMap<Box<str>, Name>,
}

impl ExprArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a node and return its id.
    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId::new(self.exprs.len() as u32);
        self.exprs.push(expr);
        id
    }

    /// Look up a node. An id from another arena yields `None`.
    #[inline]
    pub fn get(&self, id: ExprId) -> Option<&Expr> {
        self.exprs.get(id.index())
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.exprs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exprs.is_empty()
    }

    pub fn alloc_expr_list(&mut self, ids: impl IntoIterator<Item = ExprId>) -> ExprRange {
        let start = self.expr_lists.len();
        self.expr_lists.extend(ids);
        let len = self.expr_lists.len() - start;
        ExprRange::new(start as u32, len as u16)
    }

    pub fn expr_list(&self, range: ExprRange) -> &[ExprId] {
        self.expr_lists.get(range.bounds()).unwrap_or(&[])
    }

    pub fn alloc_fields(&mut self, fields: impl IntoIterator<Item = FieldGroup>) -> FieldRange {
        let start = self.fields.len();
        self.fields.extend(fields);
        let len = self.fields.len() - start;
        FieldRange::new(start as u32, len as u16)
    }

    pub fn fields(&self, range: FieldRange) -> &[FieldGroup] {
        self.fields.get(range.bounds()).unwrap_or(&[])
    }

    pub fn alloc_names(&mut self, names: impl IntoIterator<Item = Name>) -> NameRange {
        let start = self.name_lists.len();
        self.name_lists.extend(names);
        let len = self.name_lists.len() - start;
        NameRange::new(start as u32, len as u16)
    }

    pub fn names(&self, range: NameRange) -> &[Name] {
        self.name_lists.get(range.bounds()).unwrap_or(&[])
    }

    /// Intern a string, returning the existing `Name` when already present.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&name) = self.string_ids.get(s) {
            return name;
        }
        let name = Name::new(self.strings.len() as u32);
        self.strings.push(s.into());
        self.string_ids.insert(s.into(), name);
        name
    }

    /// Resolve an interned string. Unknown names resolve to `""`.
    pub fn lookup(&self, name: Name) -> &str {
        self.strings.get(name.index()).map_or("", |s| &**s)
    }
}
