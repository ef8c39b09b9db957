//! Spec §4.7: `canonical_code` + overlay → presented source text.

use std::collections::{BTreeMap, HashSet};

use sigil::ast::{Expr, FunctionDef, ImportStmt, Module, Stmt};
use sigil::UnitParser;

use common::PoolError;

use crate::names::builtin_set;
use crate::stringlit;
use crate::transform::{rename_function, walk_expr_children, ReverseResolver};

pub fn denormalize(
    canonical_code: &str,
    reverse: &BTreeMap<String, String>,
    alias_mapping: &BTreeMap<String, String>,
    docstring: &str,
) -> Result<String, PoolError> {
    let mut parser = UnitParser::new()?;
    let mut module = parser.parse_unit(canonical_code)?;

    if !docstring.is_empty() {
        module
            .function
            .body
            .insert(0, Stmt::ExprStmt(Expr::Str(stringlit::encode(docstring))));
    }

    let mut excluded: HashSet<String> = builtin_set();
    for imp in &module.imports {
        excluded.extend(imp.bound_names());
    }
    excluded.insert(common::outer_slot());

    let mut resolver = ReverseResolver(reverse);
    rename_function(&mut module.function, &excluded, &mut resolver);

    restore_pool_aliases(&mut module, alias_mapping);
    restore_pool_calls(&mut module.function, alias_mapping);

    Ok(sigil::emit_module(&module))
}

fn restore_pool_aliases(module: &mut Module, alias_mapping: &BTreeMap<String, String>) {
    for imp in &mut module.imports {
        if let ImportStmt::Pool(p) = imp {
            if let Some(alias) = alias_mapping.get(&p.hash) {
                if alias != &format!("{}{}", common::POOL_IMPORT_PREFIX, p.hash) {
                    p.alias = Some(alias.clone());
                }
            }
        }
    }
}

/// Inverse of `transform::rewrite_pool_calls`: turns
/// `object_<HASH>._bb_v_0(args)` back into `<alias>(args)`.
fn restore_pool_calls(f: &mut FunctionDef, alias_mapping: &BTreeMap<String, String>) {
    for d in &mut f.decorators {
        restore_expr(d, alias_mapping);
    }
    for p in &mut f.params.items {
        if let Some(default) = &mut p.default {
            restore_expr(default, alias_mapping);
        }
    }
    restore_block(&mut f.body, alias_mapping);
}

fn restore_block(body: &mut [Stmt], am: &BTreeMap<String, String>) {
    for s in body {
        restore_stmt(s, am);
    }
}

fn restore_stmt(s: &mut Stmt, am: &BTreeMap<String, String>) {
    match s {
        Stmt::Assign { targets, value } => {
            for t in targets {
                restore_expr(t, am);
            }
            restore_expr(value, am);
        }
        Stmt::AugAssign { target, value, .. } => {
            restore_expr(target, am);
            restore_expr(value, am);
        }
        Stmt::Return(Some(e)) | Stmt::ExprStmt(e) => restore_expr(e, am),
        Stmt::Return(None) | Stmt::Pass | Stmt::Break | Stmt::Continue => {}
        Stmt::Delete(exprs) => exprs.iter_mut().for_each(|e| restore_expr(e, am)),
        Stmt::Global(_) | Stmt::Nonlocal(_) => {}
        Stmt::Assert { test, msg } => {
            restore_expr(test, am);
            if let Some(m) = msg {
                restore_expr(m, am);
            }
        }
        Stmt::Raise { exc, cause } => {
            if let Some(e) = exc {
                restore_expr(e, am);
            }
            if let Some(c) = cause {
                restore_expr(c, am);
            }
        }
        Stmt::If { test, body, orelse } => {
            restore_expr(test, am);
            restore_block(body, am);
            restore_block(orelse, am);
        }
        Stmt::While { test, body, orelse } => {
            restore_expr(test, am);
            restore_block(body, am);
            restore_block(orelse, am);
        }
        Stmt::For {
            target,
            iter,
            body,
            orelse,
            ..
        } => {
            restore_expr(target, am);
            restore_expr(iter, am);
            restore_block(body, am);
            restore_block(orelse, am);
        }
        Stmt::Try {
            body,
            handlers,
            orelse,
            finalbody,
        } => {
            restore_block(body, am);
            for h in handlers {
                if let Some(k) = &mut h.kind {
                    restore_expr(k, am);
                }
                restore_block(&mut h.body, am);
            }
            restore_block(orelse, am);
            restore_block(finalbody, am);
        }
        Stmt::With { items, body, .. } => {
            for i in items {
                restore_expr(&mut i.context, am);
                if let Some(a) = &mut i.alias {
                    restore_expr(a, am);
                }
            }
            restore_block(body, am);
        }
        Stmt::FunctionDef(inner) => restore_pool_calls(inner, am),
        Stmt::Raw(_) => {}
    }
}

fn restore_expr(e: &mut Expr, am: &BTreeMap<String, String>) {
    if let Expr::Call { func, args, keywords } = e {
        if let Expr::Attribute { value, attr } = func.as_ref() {
            if attr == &common::outer_slot() {
                if let Expr::Name(obj) = value.as_ref() {
                    if let Some(hash) = obj.strip_prefix(common::POOL_IMPORT_PREFIX) {
                        if let Some(alias) = am.get(hash) {
                            *func = Box::new(Expr::Name(alias.clone()));
                        }
                    }
                }
            }
        }
        restore_expr(func, am);
        for a in args {
            restore_expr(a, am);
        }
        for (_, v) in keywords {
            restore_expr(v, am);
        }
        return;
    }
    walk_expr_children(e, |c| restore_expr(c, am));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::normalize;

    #[test]
    fn round_trips_cross_language_scenario() {
        let module = UnitParser::new()
            .unwrap()
            .parse_unit("def add(a, b):\n    \"\"\"Add two numbers\"\"\"\n    return a + b\n")
            .unwrap();
        let n = normalize(&module);
        let restored = denormalize(&n.canonical_code, &n.reverse, &n.alias_mapping, &n.docstring).unwrap();

        let reparsed = UnitParser::new().unwrap().parse_unit(&restored).unwrap();
        assert_eq!(reparsed.function.name, "add");
        let renormalized = normalize(&reparsed);
        assert_eq!(renormalized.canonical_code, n.canonical_code);
        assert_eq!(renormalized.docstring, "Add two numbers");
    }

    #[test]
    fn round_trips_pool_reference() {
        let src = "from bb.pool import object_aa as twice\n\ndef double_all(xs):\n    \"\"\"Double each element\"\"\"\n    return [twice(x) for x in xs]\n";
        let module = UnitParser::new().unwrap().parse_unit(src).unwrap();
        let n = normalize(&module);
        let restored = denormalize(&n.canonical_code, &n.reverse, &n.alias_mapping, &n.docstring).unwrap();
        assert!(restored.contains("from bb.pool import object_aa as twice"));
        assert!(restored.contains("twice(x)"));

        let reparsed = UnitParser::new().unwrap().parse_unit(&restored).unwrap();
        let renormalized = normalize(&reparsed);
        assert_eq!(renormalized.canonical_code, n.canonical_code);
    }
}
