//! Pure tree-to-tree passes over [`sigil::ast`]: pool-call rewriting
//! (spec §4.3 step 4) and identifier renaming (spec §4.3 steps 3+5,
//! merged into one traversal — see DESIGN.md for why that's equivalent).

use std::collections::{BTreeMap, HashMap, HashSet};

use sigil::ast::*;

/// Looks up the replacement for an (already excluded-checked) name.
/// [`crate::names::NameMapper`] implements the forward direction
/// (assign-on-first-sight); [`ReverseResolver`] implements the inverse
/// used by the denormalizer.
pub trait Resolver {
    fn apply(&mut self, name: &str) -> String;
}

impl Resolver for crate::names::NameMapper {
    fn apply(&mut self, name: &str) -> String {
        self.resolve(name)
    }
}

/// Slot → original lookup. Falls back to the slot text unchanged if it
/// isn't in the map (can't happen for a well-formed stored overlay, but
/// keeps this total rather than panicking on corrupt input).
pub struct ReverseResolver<'a>(pub &'a BTreeMap<String, String>);

impl Resolver for ReverseResolver<'_> {
    fn apply(&mut self, name: &str) -> String {
        self.0.get(name).cloned().unwrap_or_else(|| name.to_string())
    }
}

/// Rewrites every call `alias(...)` where `alias` is a pool import's bound
/// name into `object_<HASH>._bb_v_0(...)`. Runs before renaming so it can
/// still see the alias as the caller wrote it.
pub fn rewrite_pool_calls(f: &mut FunctionDef, pool_aliases: &HashMap<String, String>) {
    for d in &mut f.decorators {
        rewrite_expr(d, pool_aliases);
    }
    for p in &mut f.params.items {
        if let Some(default) = &mut p.default {
            rewrite_expr(default, pool_aliases);
        }
    }
    rewrite_block(&mut f.body, pool_aliases);
}

fn rewrite_block(body: &mut [Stmt], pool_aliases: &HashMap<String, String>) {
    for s in body {
        rewrite_stmt(s, pool_aliases);
    }
}

fn rewrite_stmt(s: &mut Stmt, pa: &HashMap<String, String>) {
    match s {
        Stmt::Assign { targets, value } => {
            for t in targets {
                rewrite_expr(t, pa);
            }
            rewrite_expr(value, pa);
        }
        Stmt::AugAssign { target, value, .. } => {
            rewrite_expr(target, pa);
            rewrite_expr(value, pa);
        }
        Stmt::Return(Some(e)) | Stmt::ExprStmt(e) => rewrite_expr(e, pa),
        Stmt::Return(None) | Stmt::Pass | Stmt::Break | Stmt::Continue => {}
        Stmt::Delete(exprs) => exprs.iter_mut().for_each(|e| rewrite_expr(e, pa)),
        Stmt::Global(_) | Stmt::Nonlocal(_) => {}
        Stmt::Assert { test, msg } => {
            rewrite_expr(test, pa);
            if let Some(m) = msg {
                rewrite_expr(m, pa);
            }
        }
        Stmt::Raise { exc, cause } => {
            if let Some(e) = exc {
                rewrite_expr(e, pa);
            }
            if let Some(c) = cause {
                rewrite_expr(c, pa);
            }
        }
        Stmt::If { test, body, orelse } => {
            rewrite_expr(test, pa);
            rewrite_block(body, pa);
            rewrite_block(orelse, pa);
        }
        Stmt::While { test, body, orelse } => {
            rewrite_expr(test, pa);
            rewrite_block(body, pa);
            rewrite_block(orelse, pa);
        }
        Stmt::For {
            target,
            iter,
            body,
            orelse,
            ..
        } => {
            rewrite_expr(target, pa);
            rewrite_expr(iter, pa);
            rewrite_block(body, pa);
            rewrite_block(orelse, pa);
        }
        Stmt::Try {
            body,
            handlers,
            orelse,
            finalbody,
        } => {
            rewrite_block(body, pa);
            for h in handlers {
                if let Some(k) = &mut h.kind {
                    rewrite_expr(k, pa);
                }
                rewrite_block(&mut h.body, pa);
            }
            rewrite_block(orelse, pa);
            rewrite_block(finalbody, pa);
        }
        Stmt::With { items, body, .. } => {
            for i in items {
                rewrite_expr(&mut i.context, pa);
                if let Some(a) = &mut i.alias {
                    rewrite_expr(a, pa);
                }
            }
            rewrite_block(body, pa);
        }
        Stmt::FunctionDef(inner) => rewrite_pool_calls(inner, pa),
        Stmt::Raw(_) => {}
    }
}

fn rewrite_expr(e: &mut Expr, pa: &HashMap<String, String>) {
    if let Expr::Call { func, args, keywords } = e {
        if let Expr::Name(n) = func.as_ref() {
            if let Some(hash) = pa.get(n) {
                *func = Box::new(Expr::Attribute {
                    value: Box::new(Expr::Name(format!("{}{hash}", common::POOL_IMPORT_PREFIX))),
                    attr: common::outer_slot(),
                });
            }
        }
        rewrite_expr(func, pa);
        for a in args {
            rewrite_expr(a, pa);
        }
        for (_, v) in keywords {
            rewrite_expr(v, pa);
        }
        return;
    }
    walk_expr_children(e, |c| rewrite_expr(c, pa));
}

/// Applies `f` to every direct child expression of `e` (one level).
pub(crate) fn walk_expr_children(e: &mut Expr, mut f: impl FnMut(&mut Expr)) {
    match e {
        Expr::Tuple(items) | Expr::List(items) | Expr::Set(items) => {
            items.iter_mut().for_each(&mut f)
        }
        Expr::Dict(items) => {
            for (k, v) in items {
                if let Some(k) = k {
                    f(k);
                }
                f(v);
            }
        }
        Expr::Starred(inner) | Expr::DoubleStarred(inner) => f(inner),
        Expr::UnaryOp { operand, .. } => f(operand),
        Expr::BinOp { left, right, .. } => {
            f(left);
            f(right);
        }
        Expr::BoolOp { values, .. } => values.iter_mut().for_each(&mut f),
        Expr::Compare {
            left, comparators, ..
        } => {
            f(left);
            comparators.iter_mut().for_each(&mut f);
        }
        Expr::Call { func, args, keywords } => {
            f(func);
            args.iter_mut().for_each(&mut f);
            for (_, v) in keywords {
                f(v);
            }
        }
        Expr::Attribute { value, .. } => f(value),
        Expr::Subscript { value, index } => {
            f(value);
            f(index);
        }
        Expr::Slice { lower, upper, step } => {
            if let Some(l) = lower {
                f(l);
            }
            if let Some(u) = upper {
                f(u);
            }
            if let Some(s) = step {
                f(s);
            }
        }
        Expr::IfExp { test, body, orelse } => {
            f(test);
            f(body);
            f(orelse);
        }
        Expr::Lambda { body, .. } => f(body),
        Expr::Await(inner) | Expr::YieldFrom(inner) => f(inner),
        Expr::Yield(inner) => {
            if let Some(v) = inner {
                f(v);
            }
        }
        Expr::NamedExpr { target, value } => {
            f(target);
            f(value);
        }
        Expr::ListComp { elt, generators }
        | Expr::SetComp { elt, generators }
        | Expr::GeneratorExp { elt, generators } => {
            f(elt);
            for g in generators {
                f(&mut g.iter);
                for c in &mut g.ifs {
                    f(c);
                }
            }
        }
        Expr::DictComp {
            key,
            value,
            generators,
        } => {
            f(key);
            f(value);
            for g in generators {
                f(&mut g.iter);
                for c in &mut g.ifs {
                    f(c);
                }
            }
        }
        Expr::Paren(inner) => f(inner),
        Expr::Name(_)
        | Expr::Num(_)
        | Expr::Str(_)
        | Expr::Bool(_)
        | Expr::NoneLit
        | Expr::Ellipsis
        | Expr::Raw(_) => {}
    }
}

/// Renames every user-defined identifier to its canonical slot, assigning
/// slots in a single depth-first pre-order traversal. The outer function's
/// own name is always resolved first, guaranteeing it lands on `_bb_v_0`.
pub fn rename_function(
    f: &mut FunctionDef,
    excluded: &HashSet<String>,
    mapper: &mut impl Resolver,
) {
    rename_def(f, excluded, mapper);
}

fn resolve_or_keep(name: &str, excluded: &HashSet<String>, mapper: &mut impl Resolver) -> String {
    if excluded.contains(name) {
        name.to_string()
    } else {
        mapper.apply(name)
    }
}

fn rename_def(f: &mut FunctionDef, excluded: &HashSet<String>, mapper: &mut impl Resolver) {
    f.name = resolve_or_keep(&f.name, excluded, mapper);
    for d in &mut f.decorators {
        rename_expr(d, excluded, mapper);
    }
    for p in &mut f.params.items {
        p.name = resolve_or_keep(&p.name, excluded, mapper);
        if let Some(default) = &mut p.default {
            rename_expr(default, excluded, mapper);
        }
    }
    rename_block(&mut f.body, excluded, mapper);
}

fn rename_block(body: &mut [Stmt], excluded: &HashSet<String>, mapper: &mut impl Resolver) {
    for s in body {
        rename_stmt(s, excluded, mapper);
    }
}

fn rename_stmt(s: &mut Stmt, excluded: &HashSet<String>, mapper: &mut impl Resolver) {
    match s {
        Stmt::Assign { targets, value } => {
            for t in targets {
                rename_expr(t, excluded, mapper);
            }
            rename_expr(value, excluded, mapper);
        }
        Stmt::AugAssign { target, value, .. } => {
            rename_expr(target, excluded, mapper);
            rename_expr(value, excluded, mapper);
        }
        Stmt::Return(Some(e)) | Stmt::ExprStmt(e) => rename_expr(e, excluded, mapper),
        Stmt::Return(None) | Stmt::Pass | Stmt::Break | Stmt::Continue => {}
        Stmt::Delete(exprs) => exprs.iter_mut().for_each(|e| rename_expr(e, excluded, mapper)),
        Stmt::Global(names) | Stmt::Nonlocal(names) => {
            for n in names.iter_mut() {
                *n = resolve_or_keep(n, excluded, mapper);
            }
        }
        Stmt::Assert { test, msg } => {
            rename_expr(test, excluded, mapper);
            if let Some(m) = msg {
                rename_expr(m, excluded, mapper);
            }
        }
        Stmt::Raise { exc, cause } => {
            if let Some(e) = exc {
                rename_expr(e, excluded, mapper);
            }
            if let Some(c) = cause {
                rename_expr(c, excluded, mapper);
            }
        }
        Stmt::If { test, body, orelse } => {
            rename_expr(test, excluded, mapper);
            rename_block(body, excluded, mapper);
            rename_block(orelse, excluded, mapper);
        }
        Stmt::While { test, body, orelse } => {
            rename_expr(test, excluded, mapper);
            rename_block(body, excluded, mapper);
            rename_block(orelse, excluded, mapper);
        }
        Stmt::For {
            target,
            iter,
            body,
            orelse,
            ..
        } => {
            rename_expr(target, excluded, mapper);
            rename_expr(iter, excluded, mapper);
            rename_block(body, excluded, mapper);
            rename_block(orelse, excluded, mapper);
        }
        Stmt::Try {
            body,
            handlers,
            orelse,
            finalbody,
        } => {
            rename_block(body, excluded, mapper);
            for h in handlers {
                if let Some(k) = &mut h.kind {
                    rename_expr(k, excluded, mapper);
                }
                if let Some(n) = &mut h.name {
                    *n = resolve_or_keep(n, excluded, mapper);
                }
                rename_block(&mut h.body, excluded, mapper);
            }
            rename_block(orelse, excluded, mapper);
            rename_block(finalbody, excluded, mapper);
        }
        Stmt::With { items, body, .. } => {
            for i in items {
                rename_expr(&mut i.context, excluded, mapper);
                if let Some(a) = &mut i.alias {
                    rename_expr(a, excluded, mapper);
                }
            }
            rename_block(body, excluded, mapper);
        }
        Stmt::FunctionDef(inner) => rename_def(inner, excluded, mapper),
        Stmt::Raw(_) => {}
    }
}

fn rename_expr(e: &mut Expr, excluded: &HashSet<String>, mapper: &mut impl Resolver) {
    if let Expr::Name(n) = e {
        *n = resolve_or_keep(n, excluded, mapper);
        return;
    }
    if let Expr::Attribute { value, .. } = e {
        // Only the base is a name reference; `attr` is a member name, never renamed.
        rename_expr(value, excluded, mapper);
        return;
    }
    if let Expr::Lambda { params, body } = e {
        for p in &mut params.items {
            p.name = resolve_or_keep(&p.name, excluded, mapper);
            if let Some(default) = &mut p.default {
                rename_expr(default, excluded, mapper);
            }
        }
        rename_expr(body, excluded, mapper);
        return;
    }
    if let Expr::ListComp { elt, generators }
    | Expr::SetComp { elt, generators }
    | Expr::GeneratorExp { elt, generators } = e
    {
        rename_expr(elt, excluded, mapper);
        for g in generators {
            rename_expr(&mut g.target, excluded, mapper);
            rename_expr(&mut g.iter, excluded, mapper);
            for c in &mut g.ifs {
                rename_expr(c, excluded, mapper);
            }
        }
        return;
    }
    if let Expr::DictComp {
        key,
        value,
        generators,
    } = e
    {
        rename_expr(key, excluded, mapper);
        rename_expr(value, excluded, mapper);
        for g in generators {
            rename_expr(&mut g.target, excluded, mapper);
            rename_expr(&mut g.iter, excluded, mapper);
            for c in &mut g.ifs {
                rename_expr(c, excluded, mapper);
            }
        }
        return;
    }
    walk_expr_children(e, |c| rename_expr(c, excluded, mapper));
}
