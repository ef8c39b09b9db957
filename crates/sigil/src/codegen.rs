//! AST → source text.
//!
//! Output is deterministic and self-consistent, not a byte-for-byte replay
//! of whatever was parsed: spec compliance only requires that re-parsing
//! generated text reproduce the same tree (the round-trip property), never
//! that it matches the original author's formatting.
//!
//! Operator precedence is handled by always parenthesizing a compound
//! expression (`BinOp`, `BoolOp`, `UnaryOp`, `Compare`, `IfExp`, `Lambda`,
//! `NamedExpr`, `Yield`, `YieldFrom`) whenever it appears nested inside
//! another expression (call argument, operand, container element, ...).
//! Extra parentheses never change Python's semantics, so this is always
//! correct; it is applied only to nested positions so that the common case
//! (`return a + b`, not `return (a + b)`) stays uncluttered.

use std::fmt::Write as _;

use crate::ast::*;

const INDENT: &str = "    ";

pub fn emit_module(m: &Module) -> String {
    let mut out = String::new();
    for imp in &m.imports {
        emit_import(imp, &mut out);
        out.push('\n');
    }
    if !m.imports.is_empty() {
        out.push('\n');
    }
    emit_function(&m.function, 0, &mut out);
    out
}

fn emit_import(stmt: &ImportStmt, out: &mut String) {
    match stmt {
        ImportStmt::External(e) => {
            out.push_str(&e.text);
        }
        ImportStmt::Pool(p) => {
            let _ = write!(
                out,
                "from {} import {}{}",
                common::POOL_MODULE,
                common::POOL_IMPORT_PREFIX,
                p.hash
            );
            if let Some(alias) = &p.alias {
                let _ = write!(out, " as {alias}");
            }
        }
    }
}

fn emit_function(f: &FunctionDef, indent: usize, out: &mut String) {
    let pad = INDENT.repeat(indent);
    for dec in &f.decorators {
        let _ = writeln!(out, "{pad}@{}", render_expr(dec));
    }
    if f.is_async {
        out.push_str(&pad);
        out.push_str("async def ");
    } else {
        out.push_str(&pad);
        out.push_str("def ");
    }
    out.push_str(&f.name);
    out.push('(');
    out.push_str(&render_params(&f.params));
    out.push_str("):\n");
    if f.body.is_empty() {
        let _ = writeln!(out, "{pad}{INDENT}pass");
    } else {
        for stmt in &f.body {
            emit_stmt(stmt, indent + 1, out);
        }
    }
}

fn render_params(params: &Params) -> String {
    let mut parts = Vec::new();
    let mut emitted_star = false;
    for p in &params.items {
        if p.kind == ParamKind::KeywordOnly && !emitted_star {
            // KeywordOnly params without a preceding VarArgs need a bare `*`.
            let has_varargs_before = params
                .items
                .iter()
                .take_while(|x| !std::ptr::eq(*x, p))
                .any(|x| x.kind == ParamKind::VarArgs);
            if !has_varargs_before {
                parts.push("*".to_string());
            }
            emitted_star = true;
        }
        let mut s = String::new();
        match p.kind {
            ParamKind::VarArgs => s.push('*'),
            ParamKind::KwArgs => s.push_str("**"),
            _ => {}
        }
        s.push_str(&p.name);
        if let Some(ann) = &p.annotation {
            let _ = write!(s, ": {ann}");
        }
        if let Some(default) = &p.default {
            if p.annotation.is_some() {
                let _ = write!(s, " = {}", render_expr(default));
            } else {
                let _ = write!(s, "={}", render_expr(default));
            }
        }
        parts.push(s);
    }
    parts.join(", ")
}

fn emit_block(stmts: &[Stmt], indent: usize, out: &mut String) {
    if stmts.is_empty() {
        let pad = INDENT.repeat(indent);
        let _ = writeln!(out, "{pad}pass");
        return;
    }
    for s in stmts {
        emit_stmt(s, indent, out);
    }
}

fn emit_stmt(stmt: &Stmt, indent: usize, out: &mut String) {
    let pad = INDENT.repeat(indent);
    match stmt {
        Stmt::Assign { targets, value } => {
            let lhs = targets.iter().map(render_expr).collect::<Vec<_>>().join(" = ");
            let _ = writeln!(out, "{pad}{lhs} = {}", render_expr(value));
        }
        Stmt::AugAssign { target, op, value } => {
            let _ = writeln!(out, "{pad}{} {op} {}", render_expr(target), render_expr(value));
        }
        Stmt::Return(value) => match value {
            Some(v) => {
                let _ = writeln!(out, "{pad}return {}", render_expr(v));
            }
            None => {
                let _ = writeln!(out, "{pad}return");
            }
        },
        Stmt::Pass => {
            let _ = writeln!(out, "{pad}pass");
        }
        Stmt::Break => {
            let _ = writeln!(out, "{pad}break");
        }
        Stmt::Continue => {
            let _ = writeln!(out, "{pad}continue");
        }
        Stmt::Delete(targets) => {
            let body = targets.iter().map(render_expr).collect::<Vec<_>>().join(", ");
            let _ = writeln!(out, "{pad}del {body}");
        }
        Stmt::Global(names) => {
            let _ = writeln!(out, "{pad}global {}", names.join(", "));
        }
        Stmt::Nonlocal(names) => {
            let _ = writeln!(out, "{pad}nonlocal {}", names.join(", "));
        }
        Stmt::Assert { test, msg } => match msg {
            Some(m) => {
                let _ = writeln!(out, "{pad}assert {}, {}", render_expr(test), render_expr(m));
            }
            None => {
                let _ = writeln!(out, "{pad}assert {}", render_expr(test));
            }
        },
        Stmt::Raise { exc, cause } => match (exc, cause) {
            (Some(e), Some(c)) => {
                let _ = writeln!(out, "{pad}raise {} from {}", render_expr(e), render_expr(c));
            }
            (Some(e), None) => {
                let _ = writeln!(out, "{pad}raise {}", render_expr(e));
            }
            (None, _) => {
                let _ = writeln!(out, "{pad}raise");
            }
        },
        Stmt::ExprStmt(e) => {
            let _ = writeln!(out, "{pad}{}", render_expr(e));
        }
        Stmt::If { test, body, orelse } => {
            let _ = writeln!(out, "{pad}if {}:", render_expr(test));
            emit_block(body, indent + 1, out);
            emit_orelse(orelse, indent, out);
        }
        Stmt::While { test, body, orelse } => {
            let _ = writeln!(out, "{pad}while {}:", render_expr(test));
            emit_block(body, indent + 1, out);
            if !orelse.is_empty() {
                let _ = writeln!(out, "{pad}else:");
                emit_block(orelse, indent + 1, out);
            }
        }
        Stmt::For {
            is_async,
            target,
            iter,
            body,
            orelse,
        } => {
            let kw = if *is_async { "async for" } else { "for" };
            let _ = writeln!(
                out,
                "{pad}{kw} {} in {}:",
                render_expr(target),
                render_expr(iter)
            );
            emit_block(body, indent + 1, out);
            if !orelse.is_empty() {
                let _ = writeln!(out, "{pad}else:");
                emit_block(orelse, indent + 1, out);
            }
        }
        Stmt::Try {
            body,
            handlers,
            orelse,
            finalbody,
        } => {
            let _ = writeln!(out, "{pad}try:");
            emit_block(body, indent + 1, out);
            for h in handlers {
                match (&h.kind, &h.name) {
                    (Some(k), Some(n)) => {
                        let _ = writeln!(out, "{pad}except {} as {n}:", render_expr(k));
                    }
                    (Some(k), None) => {
                        let _ = writeln!(out, "{pad}except {}:", render_expr(k));
                    }
                    (None, _) => {
                        let _ = writeln!(out, "{pad}except:");
                    }
                }
                emit_block(&h.body, indent + 1, out);
            }
            if !orelse.is_empty() {
                let _ = writeln!(out, "{pad}else:");
                emit_block(orelse, indent + 1, out);
            }
            if !finalbody.is_empty() {
                let _ = writeln!(out, "{pad}finally:");
                emit_block(finalbody, indent + 1, out);
            }
        }
        Stmt::With {
            is_async,
            items,
            body,
        } => {
            let kw = if *is_async { "async with" } else { "with" };
            let rendered = items
                .iter()
                .map(|i| match &i.alias {
                    Some(a) => format!("{} as {}", render_expr(&i.context), render_expr(a)),
                    None => render_expr(&i.context),
                })
                .collect::<Vec<_>>()
                .join(", ");
            let _ = writeln!(out, "{pad}{kw} {rendered}:");
            emit_block(body, indent + 1, out);
        }
        Stmt::FunctionDef(f) => {
            emit_function(f, indent, out);
        }
        Stmt::Raw(text) => {
            for line in text.lines() {
                let _ = writeln!(out, "{pad}{line}");
            }
        }
    }
}

fn emit_orelse(orelse: &[Stmt], indent: usize, out: &mut String) {
    if orelse.is_empty() {
        return;
    }
    let pad = INDENT.repeat(indent);
    let _ = writeln!(out, "{pad}else:");
    emit_block(orelse, indent + 1, out);
}

fn is_compound(e: &Expr) -> bool {
    matches!(
        e,
        Expr::BinOp { .. }
            | Expr::BoolOp { .. }
            | Expr::UnaryOp { .. }
            | Expr::Compare { .. }
            | Expr::IfExp { .. }
            | Expr::Lambda { .. }
            | Expr::NamedExpr { .. }
            | Expr::Yield(_)
            | Expr::YieldFrom(_)
    )
}

/// Render `e` as a nested sub-expression: wraps in parens if compound.
fn render_sub(e: &Expr) -> String {
    if is_compound(e) {
        format!("({})", render_expr(e))
    } else {
        render_expr(e)
    }
}

fn render_expr(e: &Expr) -> String {
    match e {
        Expr::Name(n) => n.clone(),
        Expr::Num(n) => n.clone(),
        Expr::Str(s) => s.clone(),
        Expr::Bool(true) => "True".to_string(),
        Expr::Bool(false) => "False".to_string(),
        Expr::NoneLit => "None".to_string(),
        Expr::Ellipsis => "...".to_string(),
        Expr::Tuple(items) => {
            if items.len() == 1 {
                format!("({},)", render_sub(&items[0]))
            } else {
                format!(
                    "({})",
                    items.iter().map(render_sub).collect::<Vec<_>>().join(", ")
                )
            }
        }
        Expr::List(items) => format!(
            "[{}]",
            items.iter().map(render_sub).collect::<Vec<_>>().join(", ")
        ),
        Expr::Set(items) => {
            if items.is_empty() {
                "set()".to_string()
            } else {
                format!(
                    "{{{}}}",
                    items.iter().map(render_sub).collect::<Vec<_>>().join(", ")
                )
            }
        }
        Expr::Dict(items) => {
            let body = items
                .iter()
                .map(|(k, v)| match k {
                    Some(k) => format!("{}: {}", render_sub(k), render_sub(v)),
                    None => format!("**{}", render_sub(v)),
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("{{{body}}}")
        }
        Expr::Starred(inner) => format!("*{}", render_sub(inner)),
        Expr::DoubleStarred(inner) => format!("**{}", render_sub(inner)),
        Expr::UnaryOp { op, operand } => {
            if op == "not" {
                format!("not {}", render_sub(operand))
            } else {
                format!("{op}{}", render_sub(operand))
            }
        }
        Expr::BinOp { left, op, right } => {
            format!("{} {op} {}", render_sub(left), render_sub(right))
        }
        Expr::BoolOp { op, values } => values
            .iter()
            .map(render_sub)
            .collect::<Vec<_>>()
            .join(&format!(" {op} ")),
        Expr::Compare {
            left,
            ops,
            comparators,
        } => {
            let mut s = render_sub(left);
            for (op, comp) in ops.iter().zip(comparators.iter()) {
                let _ = write!(s, " {op} {}", render_sub(comp));
            }
            s
        }
        Expr::Call { func, args, keywords } => {
            let mut parts: Vec<String> = args.iter().map(render_sub).collect();
            for (name, value) in keywords {
                match name {
                    Some(n) => parts.push(format!("{n}={}", render_sub(value))),
                    None => parts.push(format!("**{}", render_sub(value))),
                }
            }
            format!("{}({})", render_sub(func), parts.join(", "))
        }
        Expr::Attribute { value, attr } => format!("{}.{attr}", render_sub(value)),
        Expr::Subscript { value, index } => format!("{}[{}]", render_sub(value), render_sub(index)),
        Expr::Slice { lower, upper, step } => {
            let l = lower.as_deref().map(render_sub).unwrap_or_default();
            let u = upper.as_deref().map(render_sub).unwrap_or_default();
            match step {
                Some(s) => format!("{l}:{u}:{}", render_sub(s)),
                None => format!("{l}:{u}"),
            }
        }
        Expr::IfExp { test, body, orelse } => {
            format!(
                "{} if {} else {}",
                render_sub(body),
                render_sub(test),
                render_sub(orelse)
            )
        }
        Expr::Lambda { params, body } => {
            let p = render_params(params);
            if p.is_empty() {
                format!("lambda: {}", render_sub(body))
            } else {
                format!("lambda {p}: {}", render_sub(body))
            }
        }
        Expr::Await(inner) => format!("await {}", render_sub(inner)),
        Expr::Yield(inner) => match inner {
            Some(v) => format!("yield {}", render_sub(v)),
            None => "yield".to_string(),
        },
        Expr::YieldFrom(inner) => format!("yield from {}", render_sub(inner)),
        Expr::NamedExpr { target, value } => {
            format!("{} := {}", render_sub(target), render_sub(value))
        }
        Expr::ListComp { elt, generators } => {
            format!("[{} {}]", render_sub(elt), render_generators(generators))
        }
        Expr::SetComp { elt, generators } => {
            format!("{{{} {}}}", render_sub(elt), render_generators(generators))
        }
        Expr::DictComp {
            key,
            value,
            generators,
        } => format!(
            "{{{}: {} {}}}",
            render_sub(key),
            render_sub(value),
            render_generators(generators)
        ),
        Expr::GeneratorExp { elt, generators } => {
            format!("({} {})", render_sub(elt), render_generators(generators))
        }
        Expr::Paren(inner) => format!("({})", render_expr(inner)),
        Expr::Raw(text) => text.clone(),
    }
}

fn render_generators(generators: &[Comprehension]) -> String {
    generators
        .iter()
        .map(|g| {
            let kw = if g.is_async { "async for" } else { "for" };
            let mut s = format!(
                "{kw} {} in {}",
                render_expr(&g.target),
                render_sub(&g.iter)
            );
            for cond in &g.ifs {
                let _ = write!(s, " if {}", render_sub(cond));
            }
            s
        })
        .collect::<Vec<_>>()
        .join(" ")
}
