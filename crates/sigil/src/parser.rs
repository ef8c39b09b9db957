//! Entry point: source text → [`crate::ast::Module`].
//!
//! A unit's top level must be zero or more import statements followed by
//! exactly one function definition (plain or decorated, sync or async).
//! Anything else at the top level — a class, a bare expression, two
//! functions, an import *after* the function — is `UnsupportedUnit`.

use tree_sitter::Parser;

use common::PoolError;

use crate::ast::Module;
use crate::translate::{translate_function_def, translate_import_from_statement, translate_import_statement, translate_stmt};
use crate::ast::Stmt;

pub struct UnitParser {
    parser: Parser,
}

impl UnitParser {
    pub fn new() -> Result<Self, PoolError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| PoolError::InvalidSource(format!("grammar load failed: {e}")))?;
        Ok(Self { parser })
    }

    /// Parses `source` into a [`Module`], enforcing the single-function
    /// top-level shape. This is the only place that shape is checked —
    /// everything downstream assumes it holds.
    pub fn parse_unit(&mut self, source: &str) -> Result<Module, PoolError> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| PoolError::InvalidSource("tree-sitter returned no tree".to_string()))?;
        let root = tree.root_node();
        if root.has_error() {
            return Err(PoolError::InvalidSource(
                "source contains a syntax error".to_string(),
            ));
        }

        let bytes = source.as_bytes();
        let mut imports = Vec::new();
        let mut function = None;
        let mut cursor = root.walk();

        for child in root.named_children(&mut cursor) {
            match child.kind() {
                "import_statement" => {
                    imports.push(translate_import_statement(child, bytes));
                }
                "import_from_statement" => {
                    imports.push(translate_import_from_statement(child, bytes));
                }
                "function_definition" => {
                    if function.is_some() {
                        return Err(PoolError::UnsupportedUnit(
                            "more than one top-level function definition".to_string(),
                        ));
                    }
                    function = Some(translate_function_def(child, bytes));
                }
                "decorated_definition" => {
                    match translate_stmt(child, bytes) {
                        Stmt::FunctionDef(f) => {
                            if function.is_some() {
                                return Err(PoolError::UnsupportedUnit(
                                    "more than one top-level function definition".to_string(),
                                ));
                            }
                            function = Some(*f);
                        }
                        _ => {
                            return Err(PoolError::UnsupportedUnit(
                                "decorated top-level definition is not a function".to_string(),
                            ))
                        }
                    }
                }
                "comment" => {}
                other => {
                    return Err(PoolError::UnsupportedUnit(format!(
                        "unsupported top-level construct: {other}"
                    )))
                }
            }
        }

        let function = function.ok_or_else(|| {
            PoolError::UnsupportedUnit("no top-level function definition found".to_string())
        })?;

        Ok(Module { imports, function })
    }
}

impl Default for UnitParser {
    fn default() -> Self {
        Self::new().expect("tree-sitter-python grammar must load")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_single_function() {
        let mut p = UnitParser::new().unwrap();
        let m = p.parse_unit("def add(a, b):\n    return a + b\n").unwrap();
        assert!(m.imports.is_empty());
        assert_eq!(m.function.name, "add");
    }

    #[test]
    fn accepts_imports_then_function() {
        let mut p = UnitParser::new().unwrap();
        let src = "import math\n\ndef hyp(a, b):\n    return math.sqrt(a * a + b * b)\n";
        let m = p.parse_unit(src).unwrap();
        assert_eq!(m.imports.len(), 1);
        assert_eq!(m.function.name, "hyp");
    }

    #[test]
    fn rejects_two_functions() {
        let mut p = UnitParser::new().unwrap();
        let src = "def a():\n    pass\ndef b():\n    pass\n";
        assert!(matches!(
            p.parse_unit(src),
            Err(PoolError::UnsupportedUnit(_))
        ));
    }

    #[test]
    fn rejects_class_definition() {
        let mut p = UnitParser::new().unwrap();
        let src = "class Foo:\n    pass\n";
        assert!(matches!(
            p.parse_unit(src),
            Err(PoolError::UnsupportedUnit(_))
        ));
    }

    #[test]
    fn rejects_syntax_error() {
        let mut p = UnitParser::new().unwrap();
        let src = "def broken(:\n    pass\n";
        assert!(matches!(
            p.parse_unit(src),
            Err(PoolError::InvalidSource(_))
        ));
    }

    #[test]
    fn accepts_decorated_async_function() {
        let mut p = UnitParser::new().unwrap();
        let src = "@retry\nasync def fetch(url):\n    return await get(url)\n";
        let m = p.parse_unit(src).unwrap();
        assert_eq!(m.function.name, "fetch");
        assert!(m.function.is_async);
        assert_eq!(m.function.decorators.len(), 1);
    }
}
