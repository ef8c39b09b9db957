//! # Sigil: Parsing a unit of source into the pool's AST
//!
//! A *unit* is the text of a single function definition, preceded by
//! zero or more import statements. [`parser::UnitParser`] turns that text
//! into the owned [`ast::Module`] tree; [`codegen::emit_module`] turns a
//! (possibly rewritten) tree back into text. Everything in between —
//! alpha-normalization, pool-call rewriting, hashing — lives in `forge`
//! and works purely on the tree, never on tree-sitter's CST.

pub mod ast;
pub mod codegen;
pub mod parser;
pub mod translate;

pub use codegen::emit_module;
pub use parser::UnitParser;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_then_emit_preserves_shape() {
        let mut p = UnitParser::new().unwrap();
        let src = "import math\n\ndef hyp(a, b):\n    return math.sqrt(a * a + b * b)\n";
        let module = p.parse_unit(src).unwrap();
        let emitted = emit_module(&module);

        let mut p2 = UnitParser::new().unwrap();
        let reparsed = p2.parse_unit(&emitted).unwrap();
        assert_eq!(reparsed.function.name, "hyp");
        assert_eq!(reparsed.imports.len(), 1);
    }
}
