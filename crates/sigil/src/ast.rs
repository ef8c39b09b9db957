//! # Owned AST model
//!
//! The original dynamic-dispatch visitor over a generic CST is replaced
//! here with a tagged variant over the known node kinds, matching the
//! systems-language redesign: [`Stmt`] and [`Expr`] are plain enums, the
//! normalizer and denormalizer walk them with exhaustive `match`, and
//! there is nothing resembling a source position to "clear" — the tree
//! is rebuilt from scratch by [`crate::codegen`], so it carries none.
//!
//! Constructs outside the modeled subset (e.g. `match` statements, walrus
//! assignment targets inside exotic expressions, f-string interpolation)
//! fall back to [`Stmt::Raw`] / [`Expr::Raw`], which hold their exact
//! source text unmodified. Identifier renaming does not descend into
//! `Raw` nodes — this is a deliberate scope boundary, not a parse
//! failure, and is documented in DESIGN.md.

/// A single parsed source unit: its (reordered-on-output) imports and the
/// one top-level function definition.
#[derive(Debug, Clone)]
pub struct Module {
    pub imports: Vec<ImportStmt>,
    pub function: FunctionDef,
}

#[derive(Debug, Clone)]
pub enum ImportStmt {
    External(ExternalImport),
    Pool(PoolImport),
}

impl ImportStmt {
    /// `(module_path, imported_names)` — the total order used by the
    /// normalizer's import-sorting pass (spec.md §4.3 step 1).
    pub fn sort_key(&self) -> (String, Vec<String>) {
        match self {
            ImportStmt::External(e) => (e.module_path.clone(), e.names.clone()),
            ImportStmt::Pool(p) => (
                common::POOL_MODULE.to_string(),
                vec![format!("{}{}", common::POOL_IMPORT_PREFIX, p.hash)],
            ),
        }
    }

    /// Names this import statement binds into the unit's scope.
    pub fn bound_names(&self) -> Vec<String> {
        match self {
            ImportStmt::External(e) => e.bound_names.clone(),
            ImportStmt::Pool(p) => vec![p.bound_name()],
        }
    }
}

/// A non-pool import, preserved verbatim: no renaming, no alias rewriting.
#[derive(Debug, Clone)]
pub struct ExternalImport {
    /// Dotted module path / relative-import text as written (e.g. `"os.path"`, `".utils"`).
    pub module_path: String,
    /// Imported-name entries as written, e.g. `["bar", "baz as qux"]`; empty for a bare `import foo`.
    pub names: Vec<String>,
    /// Exact original source text of the statement (no trailing newline).
    pub text: String,
    /// Names this statement binds into scope.
    pub bound_names: Vec<String>,
}

/// `from <pool_module> import object_<HEX> [as <alias>]`.
#[derive(Debug, Clone)]
pub struct PoolImport {
    /// The referenced function hash, without the `object_` prefix.
    pub hash: String,
    pub alias: Option<String>,
}

impl PoolImport {
    pub fn bound_name(&self) -> String {
        self.alias
            .clone()
            .unwrap_or_else(|| format!("{}{}", common::POOL_IMPORT_PREFIX, self.hash))
    }
}

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub is_async: bool,
    pub decorators: Vec<Expr>,
    pub params: Params,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Default)]
pub struct Params {
    pub items: Vec<Param>,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    /// Raw, unmodified type-annotation text (if any). Annotations are
    /// treated as opaque — not a renaming target. See DESIGN.md.
    pub annotation: Option<String>,
    pub default: Option<Expr>,
    pub kind: ParamKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Positional,
    VarArgs,
    KeywordOnly,
    KwArgs,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Assign {
        targets: Vec<Expr>,
        value: Expr,
    },
    AugAssign {
        target: Expr,
        op: String,
        value: Expr,
    },
    Return(Option<Expr>),
    Pass,
    Break,
    Continue,
    Delete(Vec<Expr>),
    Global(Vec<String>),
    Nonlocal(Vec<String>),
    Assert {
        test: Expr,
        msg: Option<Expr>,
    },
    Raise {
        exc: Option<Expr>,
        cause: Option<Expr>,
    },
    ExprStmt(Expr),
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    For {
        is_async: bool,
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    Try {
        body: Vec<Stmt>,
        handlers: Vec<ExceptHandler>,
        orelse: Vec<Stmt>,
        finalbody: Vec<Stmt>,
    },
    With {
        is_async: bool,
        items: Vec<WithItem>,
        body: Vec<Stmt>,
    },
    FunctionDef(Box<FunctionDef>),
    /// Verbatim fallback for constructs outside the modeled subset
    /// (e.g. `match` statements). Never renamed.
    Raw(String),
}

#[derive(Debug, Clone)]
pub struct ExceptHandler {
    pub kind: Option<Expr>,
    pub name: Option<String>,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub struct WithItem {
    pub context: Expr,
    pub alias: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
    pub is_async: bool,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Name(String),
    Num(String),
    /// Full literal text including quotes/prefix, verbatim.
    Str(String),
    Bool(bool),
    NoneLit,
    Ellipsis,
    Tuple(Vec<Expr>),
    List(Vec<Expr>),
    Set(Vec<Expr>),
    Dict(Vec<(Option<Expr>, Expr)>),
    Starred(Box<Expr>),
    DoubleStarred(Box<Expr>),
    UnaryOp {
        op: String,
        operand: Box<Expr>,
    },
    BinOp {
        left: Box<Expr>,
        op: String,
        right: Box<Expr>,
    },
    BoolOp {
        op: String,
        values: Vec<Expr>,
    },
    Compare {
        left: Box<Expr>,
        ops: Vec<String>,
        comparators: Vec<Expr>,
    },
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<(Option<String>, Expr)>,
    },
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    Lambda {
        params: Params,
        body: Box<Expr>,
    },
    Await(Box<Expr>),
    Yield(Option<Box<Expr>>),
    YieldFrom(Box<Expr>),
    NamedExpr {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    SetComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    GeneratorExp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    Paren(Box<Expr>),
    /// Verbatim fallback. Never renamed.
    Raw(String),
}
