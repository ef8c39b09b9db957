//! Tree-sitter CST → owned [`crate::ast`] translation.
//!
//! Every `translate_*` function is total: constructs outside the modeled
//! subset degrade to [`Stmt::Raw`] / [`Expr::Raw`] holding the exact
//! source text of the offending node, rather than failing the whole
//! parse. Only a top-level structural mismatch (not "imports + exactly
//! one function definition") is a hard error — see [`crate::parser`].

use tree_sitter::Node;

use crate::ast::*;

fn text<'a>(n: Node, src: &'a [u8]) -> &'a str {
    n.utf8_text(src).unwrap_or("")
}

fn has_async_child(n: Node) -> bool {
    let mut cursor = n.walk();
    let result = n.children(&mut cursor).any(|c| c.kind() == "async");
    result
}

// ---------------------------------------------------------------------
// Imports
// ---------------------------------------------------------------------

/// Splits dotted-name text on commas is not needed: the grammar already
/// gives one node per imported name. This collects the bound name for a
/// single import target node (`dotted_name`, `identifier`, or `aliased_import`).
fn import_target_bound_name(n: Node, src: &[u8]) -> String {
    match n.kind() {
        "aliased_import" => {
            if let Some(alias) = n.child_by_field_name("alias") {
                text(alias, src).to_string()
            } else {
                text(n, src).to_string()
            }
        }
        "dotted_name" => {
            // Last dotted component is the bound name for a bare `import a.b.c`.
            let full = text(n, src);
            full.rsplit('.').next().unwrap_or(full).to_string()
        }
        _ => text(n, src).to_string(),
    }
}

fn import_target_display(n: Node, src: &[u8]) -> String {
    text(n, src).to_string()
}

pub fn translate_import_statement(n: Node, src: &[u8]) -> ImportStmt {
    // `import_statement`: "import" (dotted_name | aliased_import) (, ...)*
    let mut names = Vec::new();
    let mut bound = Vec::new();
    let mut module_path = String::new();
    let mut cursor = n.walk();
    for child in n.named_children(&mut cursor) {
        if child.kind() == "dotted_name" || child.kind() == "aliased_import" {
            if module_path.is_empty() {
                module_path = match child.kind() {
                    "aliased_import" => child
                        .child_by_field_name("name")
                        .map(|c| text(c, src).to_string())
                        .unwrap_or_default(),
                    _ => text(child, src).to_string(),
                };
            }
            names.push(import_target_display(child, src));
            bound.push(import_target_bound_name(child, src));
        }
    }
    ImportStmt::External(ExternalImport {
        module_path,
        names,
        text: text(n, src).trim_end().to_string(),
        bound_names: bound,
    })
}

pub fn translate_import_from_statement(n: Node, src: &[u8]) -> ImportStmt {
    let module_node = n.child_by_field_name("module_name");
    let module_path = module_node
        .map(|m| text(m, src).to_string())
        .unwrap_or_default();

    // Collect every `name` field occurrence (there can be several).
    let mut name_nodes = Vec::new();
    for i in 0..n.child_count() {
        if n.field_name_for_child(i as u32) == Some("name") {
            if let Some(child) = n.child(i as u32) {
                name_nodes.push(child);
            }
        }
    }
    let mut cursor = n.walk();
    let is_wildcard = n
        .children(&mut cursor)
        .any(|c| c.kind() == "wildcard_import");

    if let [single] = name_nodes.as_slice() {
        if single.kind() == "dotted_name" || single.kind() == "aliased_import" {
            let raw_name = match single.kind() {
                "aliased_import" => single
                    .child_by_field_name("name")
                    .map(|c| text(c, src).to_string())
                    .unwrap_or_default(),
                _ => text(*single, src).to_string(),
            };
            if module_path == common::POOL_MODULE
                && raw_name.starts_with(common::POOL_IMPORT_PREFIX)
            {
                let hash = raw_name
                    .strip_prefix(common::POOL_IMPORT_PREFIX)
                    .unwrap_or(&raw_name)
                    .to_string();
                if common::validate::is_valid_hash(&hash) {
                    let alias = if single.kind() == "aliased_import" {
                        single
                            .child_by_field_name("alias")
                            .map(|c| text(c, src).to_string())
                    } else {
                        None
                    };
                    return ImportStmt::Pool(PoolImport { hash, alias });
                }
            }
        }
    }

    let mut names = Vec::new();
    let mut bound = Vec::new();
    if is_wildcard {
        names.push("*".to_string());
    }
    for nn in &name_nodes {
        names.push(import_target_display(*nn, src));
        bound.push(import_target_bound_name(*nn, src));
    }

    ImportStmt::External(ExternalImport {
        module_path,
        names,
        text: text(n, src).trim_end().to_string(),
        bound_names: bound,
    })
}

// ---------------------------------------------------------------------
// Function definition
// ---------------------------------------------------------------------

pub fn translate_function_def(n: Node, src: &[u8]) -> FunctionDef {
    let name = n
        .child_by_field_name("name")
        .map(|c| text(c, src).to_string())
        .unwrap_or_default();
    let is_async = has_async_child(n);
    let params = n
        .child_by_field_name("parameters")
        .map(|p| translate_params(p, src))
        .unwrap_or_default();
    let body = n
        .child_by_field_name("body")
        .map(|b| translate_block(b, src))
        .unwrap_or_default();
    FunctionDef {
        name,
        is_async,
        decorators: Vec::new(),
        params,
        body,
    }
}

fn translate_params(n: Node, src: &[u8]) -> Params {
    let mut items = Vec::new();
    let mut cursor = n.walk();
    let mut mode = ParamKind::Positional;
    for child in n.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => items.push(Param {
                name: text(child, src).to_string(),
                annotation: None,
                default: None,
                kind: mode,
            }),
            "typed_parameter" => {
                let inner = child.named_child(0);
                let name = inner.map(|i| text(i, src).to_string()).unwrap_or_default();
                let annotation = child
                    .child_by_field_name("type")
                    .map(|t| text(t, src).to_string());
                let kind = match inner.map(|i| i.kind()) {
                    Some("list_splat_pattern") => ParamKind::VarArgs,
                    Some("dictionary_splat_pattern") => ParamKind::KwArgs,
                    _ => mode,
                };
                let name = if name.is_empty() {
                    text(child, src)
                        .trim_start_matches(['*'])
                        .split(':')
                        .next()
                        .unwrap_or("")
                        .trim()
                        .to_string()
                } else {
                    name
                };
                items.push(Param {
                    name,
                    annotation,
                    default: None,
                    kind,
                });
                if kind == ParamKind::VarArgs {
                    mode = ParamKind::KeywordOnly;
                }
            }
            "default_parameter" => {
                let name_node = child.child_by_field_name("name");
                let value_node = child.child_by_field_name("value");
                items.push(Param {
                    name: name_node.map(|c| text(c, src).to_string()).unwrap_or_default(),
                    annotation: None,
                    default: value_node.map(|v| translate_expr(v, src)),
                    kind: mode,
                });
            }
            "typed_default_parameter" => {
                let name_node = child.child_by_field_name("name");
                let type_node = child.child_by_field_name("type");
                let value_node = child.child_by_field_name("value");
                items.push(Param {
                    name: name_node.map(|c| text(c, src).to_string()).unwrap_or_default(),
                    annotation: type_node.map(|t| text(t, src).to_string()),
                    default: value_node.map(|v| translate_expr(v, src)),
                    kind: mode,
                });
            }
            "list_splat_pattern" => {
                let inner = child.named_child(0);
                items.push(Param {
                    name: inner.map(|i| text(i, src).to_string()).unwrap_or_default(),
                    annotation: None,
                    default: None,
                    kind: ParamKind::VarArgs,
                });
                mode = ParamKind::KeywordOnly;
            }
            "dictionary_splat_pattern" => {
                let inner = child.named_child(0);
                items.push(Param {
                    name: inner.map(|i| text(i, src).to_string()).unwrap_or_default(),
                    annotation: None,
                    default: None,
                    kind: ParamKind::KwArgs,
                });
            }
            "keyword_separator" => {
                mode = ParamKind::KeywordOnly;
            }
            "positional_separator" => {}
            _ => {}
        }
    }
    Params { items }
}

fn translate_block(n: Node, src: &[u8]) -> Vec<Stmt> {
    let mut out = Vec::new();
    let mut cursor = n.walk();
    for child in n.named_children(&mut cursor) {
        out.push(translate_stmt(child, src));
    }
    out
}

// ---------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------

pub fn translate_stmt(n: Node, src: &[u8]) -> Stmt {
    match n.kind() {
        "expression_statement" => {
            if let Some(inner) = n.named_child(0) {
                match inner.kind() {
                    "assignment" => translate_assignment(inner, src),
                    "augmented_assignment" => translate_aug_assignment(inner, src),
                    _ => Stmt::ExprStmt(translate_expr(inner, src)),
                }
            } else {
                Stmt::Pass
            }
        }
        "return_statement" => {
            let value = n.named_child(0).map(|v| translate_expr(v, src));
            Stmt::Return(value)
        }
        "pass_statement" => Stmt::Pass,
        "break_statement" => Stmt::Break,
        "continue_statement" => Stmt::Continue,
        "delete_statement" => {
            let mut targets = Vec::new();
            let mut cursor = n.walk();
            for c in n.named_children(&mut cursor) {
                targets.push(translate_expr(c, src));
            }
            Stmt::Delete(targets)
        }
        "global_statement" => Stmt::Global(collect_identifiers(n, src)),
        "nonlocal_statement" => Stmt::Nonlocal(collect_identifiers(n, src)),
        "assert_statement" => {
            let mut cursor = n.walk();
            let mut children = n.named_children(&mut cursor);
            let test = children
                .next()
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            let msg = children.next().map(|c| translate_expr(c, src));
            Stmt::Assert { test, msg }
        }
        "raise_statement" => {
            let mut cursor = n.walk();
            let mut children = n.named_children(&mut cursor);
            let exc = children.next().map(|c| translate_expr(c, src));
            let cause = children.next().map(|c| translate_expr(c, src));
            Stmt::Raise { exc, cause }
        }
        "if_statement" => translate_if(n, src),
        "while_statement" => {
            let test = n
                .child_by_field_name("condition")
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            let body = n
                .child_by_field_name("body")
                .map(|b| translate_block(b, src))
                .unwrap_or_default();
            let orelse = n
                .child_by_field_name("alternative")
                .map(|a| {
                    a.child_by_field_name("body")
                        .map(|b| translate_block(b, src))
                        .unwrap_or_default()
                })
                .unwrap_or_default();
            Stmt::While { test, body, orelse }
        }
        "for_statement" => {
            let is_async = has_async_child(n);
            let target = n
                .child_by_field_name("left")
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            let iter = n
                .child_by_field_name("right")
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            let body = n
                .child_by_field_name("body")
                .map(|b| translate_block(b, src))
                .unwrap_or_default();
            let orelse = n
                .child_by_field_name("alternative")
                .map(|a| {
                    a.child_by_field_name("body")
                        .map(|b| translate_block(b, src))
                        .unwrap_or_default()
                })
                .unwrap_or_default();
            Stmt::For {
                is_async,
                target,
                iter,
                body,
                orelse,
            }
        }
        "try_statement" => translate_try(n, src),
        "with_statement" => translate_with(n, src),
        "function_definition" => Stmt::FunctionDef(Box::new(translate_function_def(n, src))),
        "decorated_definition" => {
            let mut decorators = Vec::new();
            let mut inner_def = None;
            let mut cursor = n.walk();
            for c in n.named_children(&mut cursor) {
                match c.kind() {
                    "decorator" => {
                        if let Some(e) = c.named_child(0) {
                            decorators.push(translate_expr(e, src));
                        }
                    }
                    "function_definition" => inner_def = Some(c),
                    _ => {}
                }
            }
            if let Some(def_node) = inner_def {
                let mut def = translate_function_def(def_node, src);
                def.decorators = decorators;
                Stmt::FunctionDef(Box::new(def))
            } else {
                Stmt::Raw(text(n, src).to_string())
            }
        }
        _ => Stmt::Raw(text(n, src).to_string()),
    }
}

fn collect_identifiers(n: Node, src: &[u8]) -> Vec<String> {
    let mut out = Vec::new();
    let mut cursor = n.walk();
    for c in n.named_children(&mut cursor) {
        if c.kind() == "identifier" {
            out.push(text(c, src).to_string());
        }
    }
    out
}

fn translate_assignment(n: Node, src: &[u8]) -> Stmt {
    let left = n
        .child_by_field_name("left")
        .map(|c| translate_expr(c, src))
        .unwrap_or(Expr::Raw(String::new()));
    let value = n
        .child_by_field_name("right")
        .map(|c| translate_expr(c, src))
        .unwrap_or(Expr::Raw(String::new()));
    Stmt::Assign {
        targets: vec![left],
        value,
    }
}

fn translate_aug_assignment(n: Node, src: &[u8]) -> Stmt {
    let target = n
        .child_by_field_name("left")
        .map(|c| translate_expr(c, src))
        .unwrap_or(Expr::Raw(String::new()));
    let op_node = n.child_by_field_name("operator");
    let op = op_node.map(|o| text(o, src).to_string()).unwrap_or_else(|| "+=".into());
    let value = n
        .child_by_field_name("right")
        .map(|c| translate_expr(c, src))
        .unwrap_or(Expr::Raw(String::new()));
    Stmt::AugAssign { target, op, value }
}

fn translate_if(n: Node, src: &[u8]) -> Stmt {
    let test = n
        .child_by_field_name("condition")
        .map(|c| translate_expr(c, src))
        .unwrap_or(Expr::Raw(String::new()));
    let body = n
        .child_by_field_name("consequence")
        .map(|b| translate_block(b, src))
        .unwrap_or_default();
    let orelse = match n.child_by_field_name("alternative") {
        Some(alt) if alt.kind() == "elif_clause" => vec![translate_elif(alt, src)],
        Some(alt) if alt.kind() == "else_clause" => alt
            .child_by_field_name("body")
            .map(|b| translate_block(b, src))
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    Stmt::If { test, body, orelse }
}

fn translate_elif(n: Node, src: &[u8]) -> Stmt {
    let test = n
        .child_by_field_name("condition")
        .map(|c| translate_expr(c, src))
        .unwrap_or(Expr::Raw(String::new()));
    let body = n
        .child_by_field_name("consequence")
        .map(|b| translate_block(b, src))
        .unwrap_or_default();
    let orelse = match n.child_by_field_name("alternative") {
        Some(alt) if alt.kind() == "elif_clause" => vec![translate_elif(alt, src)],
        Some(alt) if alt.kind() == "else_clause" => alt
            .child_by_field_name("body")
            .map(|b| translate_block(b, src))
            .unwrap_or_default(),
        _ => Vec::new(),
    };
    Stmt::If { test, body, orelse }
}

fn translate_try(n: Node, src: &[u8]) -> Stmt {
    let body = n
        .child_by_field_name("body")
        .map(|b| translate_block(b, src))
        .unwrap_or_default();
    let mut handlers = Vec::new();
    let mut orelse = Vec::new();
    let mut finalbody = Vec::new();
    let mut cursor = n.walk();
    for c in n.named_children(&mut cursor) {
        match c.kind() {
            "except_clause" => {
                let mut ccursor = c.walk();
                let mut kind = None;
                let mut name = None;
                for gc in c.named_children(&mut ccursor) {
                    match gc.kind() {
                        "block" => {}
                        "identifier" if kind.is_some() && name.is_none() => {
                            name = Some(text(gc, src).to_string());
                        }
                        "as_pattern" => {
                            if let Some(target) = gc.named_child(0) {
                                kind = Some(translate_expr(target, src));
                            }
                            if let Some(alias) = gc.child_by_field_name("alias") {
                                name = Some(text(alias, src).to_string());
                            }
                        }
                        _ if kind.is_none() => kind = Some(translate_expr(gc, src)),
                        _ => {}
                    }
                }
                let handler_body = c
                    .child_by_field_name("body")
                    .map(|b| translate_block(b, src))
                    .unwrap_or_default();
                handlers.push(ExceptHandler {
                    kind,
                    name,
                    body: handler_body,
                });
            }
            "else_clause" => {
                orelse = c
                    .child_by_field_name("body")
                    .map(|b| translate_block(b, src))
                    .unwrap_or_default();
            }
            "finally_clause" => {
                finalbody = c
                    .child_by_field_name("body")
                    .map(|b| translate_block(b, src))
                    .unwrap_or_default();
            }
            _ => {}
        }
    }
    Stmt::Try {
        body,
        handlers,
        orelse,
        finalbody,
    }
}

fn translate_with(n: Node, src: &[u8]) -> Stmt {
    let is_async = has_async_child(n);
    let mut items = Vec::new();
    let mut cursor = n.walk();
    for c in n.named_children(&mut cursor) {
        if c.kind() == "with_clause" {
            let mut wc = c.walk();
            for item in c.named_children(&mut wc) {
                if item.kind() == "with_item" {
                    if let Some(value) = item.named_child(0) {
                        if value.kind() == "as_pattern" {
                            let context = value
                                .named_child(0)
                                .map(|v| translate_expr(v, src))
                                .unwrap_or(Expr::Raw(String::new()));
                            let alias = value
                                .child_by_field_name("alias")
                                .map(|a| translate_expr(a, src));
                            items.push(WithItem { context, alias });
                        } else {
                            items.push(WithItem {
                                context: translate_expr(value, src),
                                alias: None,
                            });
                        }
                    }
                }
            }
        }
    }
    let body = n
        .child_by_field_name("body")
        .map(|b| translate_block(b, src))
        .unwrap_or_default();
    Stmt::With {
        is_async,
        items,
        body,
    }
}

// ---------------------------------------------------------------------
// Expressions
// ---------------------------------------------------------------------

pub fn translate_expr(n: Node, src: &[u8]) -> Expr {
    match n.kind() {
        "identifier" => Expr::Name(text(n, src).to_string()),
        "integer" | "float" => Expr::Num(text(n, src).to_string()),
        "string" | "concatenated_string" => Expr::Str(text(n, src).to_string()),
        "true" => Expr::Bool(true),
        "false" => Expr::Bool(false),
        "none" => Expr::NoneLit,
        "ellipsis" => Expr::Ellipsis,
        "tuple" | "expression_list" | "pattern_list" => Expr::Tuple(named_children_exprs(n, src)),
        "list" => Expr::List(named_children_exprs(n, src)),
        "set" => Expr::Set(named_children_exprs(n, src)),
        "dictionary" => {
            let mut items = Vec::new();
            let mut cursor = n.walk();
            for c in n.named_children(&mut cursor) {
                match c.kind() {
                    "pair" => {
                        let key = c.child_by_field_name("key").map(|k| translate_expr(k, src));
                        let value = c
                            .child_by_field_name("value")
                            .map(|v| translate_expr(v, src))
                            .unwrap_or(Expr::Raw(String::new()));
                        items.push((key, value));
                    }
                    "dictionary_splat" => {
                        if let Some(inner) = c.named_child(0) {
                            items.push((None, Expr::DoubleStarred(Box::new(translate_expr(inner, src)))));
                        }
                    }
                    _ => {}
                }
            }
            Expr::Dict(items)
        }
        "list_splat" => Expr::Starred(Box::new(
            n.named_child(0)
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new())),
        )),
        "dictionary_splat" => Expr::DoubleStarred(Box::new(
            n.named_child(0)
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new())),
        )),
        "unary_operator" | "not_operator" => {
            let op = if n.kind() == "not_operator" {
                "not".to_string()
            } else {
                n.child(0)
                    .map(|o| text(o, src).to_string())
                    .unwrap_or_default()
            };
            let operand = n
                .child_by_field_name("operand")
                .or_else(|| n.named_child(0))
                .map(|o| translate_expr(o, src))
                .unwrap_or(Expr::Raw(String::new()));
            Expr::UnaryOp {
                op,
                operand: Box::new(operand),
            }
        }
        "binary_operator" => {
            let left = n
                .child_by_field_name("left")
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            let op = n
                .child_by_field_name("operator")
                .map(|o| text(o, src).to_string())
                .unwrap_or_default();
            let right = n
                .child_by_field_name("right")
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            Expr::BinOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            }
        }
        "boolean_operator" => {
            let left = n
                .child_by_field_name("left")
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            let op = n
                .child_by_field_name("operator")
                .map(|o| text(o, src).to_string())
                .unwrap_or_default();
            let right = n
                .child_by_field_name("right")
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            Expr::BoolOp {
                op,
                values: vec![left, right],
            }
        }
        "comparison_operator" => {
            let mut cursor = n.walk();
            let mut children = n.children(&mut cursor);
            let left = children
                .next()
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            let mut ops = Vec::new();
            let mut comparators = Vec::new();
            let rest: Vec<Node> = children.collect();
            let mut i = 0;
            while i < rest.len() {
                let c = rest[i];
                if !c.is_named() {
                    ops.push(text(c, src).to_string());
                } else {
                    comparators.push(translate_expr(c, src));
                }
                i += 1;
            }
            Expr::Compare {
                left: Box::new(left),
                ops,
                comparators,
            }
        }
        "call" => {
            let func = n
                .child_by_field_name("function")
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            let mut args = Vec::new();
            let mut keywords = Vec::new();
            if let Some(arglist) = n.child_by_field_name("arguments") {
                let mut cursor = arglist.walk();
                for c in arglist.named_children(&mut cursor) {
                    match c.kind() {
                        "keyword_argument" => {
                            let name = c
                                .child_by_field_name("name")
                                .map(|nn| text(nn, src).to_string());
                            let value = c
                                .child_by_field_name("value")
                                .map(|v| translate_expr(v, src))
                                .unwrap_or(Expr::Raw(String::new()));
                            keywords.push((name, value));
                        }
                        "dictionary_splat" => {
                            if let Some(inner) = c.named_child(0) {
                                keywords.push((None, Expr::DoubleStarred(Box::new(translate_expr(inner, src)))));
                            }
                        }
                        _ => args.push(translate_expr(c, src)),
                    }
                }
            }
            Expr::Call {
                func: Box::new(func),
                args,
                keywords,
            }
        }
        "attribute" => {
            let value = n
                .child_by_field_name("object")
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            let attr = n
                .child_by_field_name("attribute")
                .map(|c| text(c, src).to_string())
                .unwrap_or_default();
            Expr::Attribute {
                value: Box::new(value),
                attr,
            }
        }
        "subscript" => {
            let value = n
                .child_by_field_name("value")
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            let index = n
                .child_by_field_name("subscript")
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            Expr::Subscript {
                value: Box::new(value),
                index: Box::new(index),
            }
        }
        "slice" => {
            let mut cursor = n.walk();
            let parts: Vec<Option<Node>> = {
                let mut v = Vec::new();
                let mut seen_colon = 0;
                for c in n.children(&mut cursor) {
                    if !c.is_named() && text(c, src) == ":" {
                        seen_colon += 1;
                        v.push(None);
                    } else if c.is_named() {
                        v.push(Some(c));
                    }
                    let _ = seen_colon;
                }
                v
            };
            let named: Vec<Node> = parts.into_iter().flatten().collect();
            let lower = named.first().map(|c| Box::new(translate_expr(*c, src)));
            let upper = named.get(1).map(|c| Box::new(translate_expr(*c, src)));
            let step = named.get(2).map(|c| Box::new(translate_expr(*c, src)));
            Expr::Slice { lower, upper, step }
        }
        "conditional_expression" => {
            let mut cursor = n.walk();
            let parts: Vec<Node> = n.named_children(&mut cursor).collect();
            if parts.len() == 3 {
                Expr::IfExp {
                    body: Box::new(translate_expr(parts[0], src)),
                    test: Box::new(translate_expr(parts[1], src)),
                    orelse: Box::new(translate_expr(parts[2], src)),
                }
            } else {
                Expr::Raw(text(n, src).to_string())
            }
        }
        "lambda" => {
            let params = n
                .child_by_field_name("parameters")
                .map(|p| translate_params(p, src))
                .unwrap_or_default();
            let body = n
                .child_by_field_name("body")
                .map(|b| translate_expr(b, src))
                .unwrap_or(Expr::Raw(String::new()));
            Expr::Lambda {
                params,
                body: Box::new(body),
            }
        }
        "await" => Expr::Await(Box::new(
            n.named_child(0)
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new())),
        )),
        "yield" => {
            if text(n, src).contains("from") {
                Expr::YieldFrom(Box::new(
                    n.named_child(0)
                        .map(|c| translate_expr(c, src))
                        .unwrap_or(Expr::Raw(String::new())),
                ))
            } else {
                Expr::Yield(n.named_child(0).map(|c| Box::new(translate_expr(c, src))))
            }
        }
        "named_expression" => {
            let target = n
                .child_by_field_name("name")
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            let value = n
                .child_by_field_name("value")
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new()));
            Expr::NamedExpr {
                target: Box::new(target),
                value: Box::new(value),
            }
        }
        "list_comprehension" => {
            let (elt, generators) = translate_comprehension_body(n, src);
            Expr::ListComp {
                elt: Box::new(elt),
                generators,
            }
        }
        "set_comprehension" => {
            let (elt, generators) = translate_comprehension_body(n, src);
            Expr::SetComp {
                elt: Box::new(elt),
                generators,
            }
        }
        "generator_expression" => {
            let (elt, generators) = translate_comprehension_body(n, src);
            Expr::GeneratorExp {
                elt: Box::new(elt),
                generators,
            }
        }
        "dictionary_comprehension" => {
            let body = n.named_child(0);
            let (key, value) = match body.map(|b| b.kind()) {
                Some("pair") => {
                    let b = body.unwrap();
                    (
                        b.child_by_field_name("key")
                            .map(|k| translate_expr(k, src))
                            .unwrap_or(Expr::Raw(String::new())),
                        b.child_by_field_name("value")
                            .map(|v| translate_expr(v, src))
                            .unwrap_or(Expr::Raw(String::new())),
                    )
                }
                _ => (Expr::Raw(String::new()), Expr::Raw(String::new())),
            };
            let generators = translate_comprehension_clauses(n, src);
            Expr::DictComp {
                key: Box::new(key),
                value: Box::new(value),
                generators,
            }
        }
        "parenthesized_expression" => Expr::Paren(Box::new(
            n.named_child(0)
                .map(|c| translate_expr(c, src))
                .unwrap_or(Expr::Raw(String::new())),
        )),
        _ => Expr::Raw(text(n, src).to_string()),
    }
}

fn named_children_exprs(n: Node, src: &[u8]) -> Vec<Expr> {
    let mut out = Vec::new();
    let mut cursor = n.walk();
    for c in n.named_children(&mut cursor) {
        out.push(translate_expr(c, src));
    }
    out
}

fn translate_comprehension_body(n: Node, src: &[u8]) -> (Expr, Vec<Comprehension>) {
    let elt = n
        .named_child(0)
        .map(|c| translate_expr(c, src))
        .unwrap_or(Expr::Raw(String::new()));
    (elt, translate_comprehension_clauses(n, src))
}

fn translate_comprehension_clauses(n: Node, src: &[u8]) -> Vec<Comprehension> {
    let mut generators = Vec::new();
    let mut cursor = n.walk();
    let mut current: Option<Comprehension> = None;
    for c in n.named_children(&mut cursor) {
        match c.kind() {
            "for_in_clause" => {
                if let Some(g) = current.take() {
                    generators.push(g);
                }
                let is_async = has_async_child(c);
                let target = c
                    .child_by_field_name("left")
                    .map(|t| translate_expr(t, src))
                    .unwrap_or(Expr::Raw(String::new()));
                let iter = c
                    .child_by_field_name("right")
                    .map(|t| translate_expr(t, src))
                    .unwrap_or(Expr::Raw(String::new()));
                current = Some(Comprehension {
                    target,
                    iter,
                    ifs: Vec::new(),
                    is_async,
                });
            }
            "if_clause" => {
                if let Some(g) = current.as_mut() {
                    if let Some(cond) = c.named_child(0) {
                        g.ifs.push(translate_expr(cond, src));
                    }
                }
            }
            _ => {}
        }
    }
    if let Some(g) = current.take() {
        generators.push(g);
    }
    generators
}
