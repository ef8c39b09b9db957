//! Orchestrates spec §4.3's eight-step normalizer over a parsed
//! [`sigil::ast::Module`].

use std::collections::{BTreeMap, HashMap};

use sigil::ast::{Expr, ImportStmt, Module, Stmt};

use crate::names::{builtin_set, NameMapper};
use crate::stringlit;
use crate::transform::{rename_function, rewrite_pool_calls};

/// Everything the normalizer produces: the hash preimage plus the overlay
/// data needed to reconstruct the original presentation later.
#[derive(Debug, Clone)]
pub struct NormalizedUnit {
    pub canonical_code: String,
    pub docstring: String,
    pub reverse: BTreeMap<String, String>,
    pub alias_mapping: BTreeMap<String, String>,
}

pub fn normalize(module: &Module) -> NormalizedUnit {
    let mut module = module.clone();

    // Capture alias information from the tree as written, before either
    // the import statements or the call sites referencing them change.
    let mut pool_aliases: HashMap<String, String> = HashMap::new();
    let mut alias_mapping: BTreeMap<String, String> = BTreeMap::new();
    for imp in &module.imports {
        if let ImportStmt::Pool(p) = imp {
            pool_aliases.insert(p.bound_name(), p.hash.clone());
            if let Some(alias) = &p.alias {
                alias_mapping.insert(p.hash.clone(), alias.clone());
            }
        }
    }

    // Step 1: sort imports.
    module.imports.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

    // Step 2: strip pool-import aliases.
    for imp in &mut module.imports {
        if let ImportStmt::Pool(p) = imp {
            p.alias = None;
        }
    }

    // Excluded-name set: builtins, every name an import binds, and the
    // canonical outer-slot name itself.
    let mut excluded = builtin_set();
    for imp in &module.imports {
        excluded.extend(imp.bound_names());
    }
    excluded.insert(common::outer_slot());

    // Step 4: rewrite pool call sites (before renaming, so it can still
    // see the alias as the source wrote it).
    rewrite_pool_calls(&mut module.function, &pool_aliases);

    // Steps 3+5: build the name mapping and apply it in one traversal —
    // equivalent because excluded names never receive a slot regardless
    // of when they're visited relative to the call-site rewrite.
    let mut mapper = NameMapper::new();
    rename_function(&mut module.function, &excluded, &mut mapper);

    // Step 7: extract the docstring, if the (now renamed) body opens with
    // a bare string literal.
    let docstring = match module.function.body.first() {
        Some(Stmt::ExprStmt(Expr::Str(lit))) => {
            let text = stringlit::decode(lit);
            module.function.body.remove(0);
            text
        }
        _ => String::new(),
    };

    // Step 8: emit canonical code from the transformed tree.
    let canonical_code = sigil::emit_module(&module);

    NormalizedUnit {
        canonical_code,
        docstring,
        reverse: mapper.reverse_map(),
        alias_mapping,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigil::UnitParser;

    fn normalize_src(src: &str) -> NormalizedUnit {
        let module = UnitParser::new().unwrap().parse_unit(src).unwrap();
        normalize(&module)
    }

    #[test]
    fn cross_language_identity() {
        let a = normalize_src("def add(a, b):\n    \"\"\"Add two numbers\"\"\"\n    return a + b\n");
        let b = normalize_src(
            "def additionner(x, y):\n    \"\"\"Additionne deux nombres\"\"\"\n    return x + y\n",
        );
        assert_eq!(a.canonical_code, b.canonical_code);
        assert_eq!(
            a.canonical_code,
            "def _bb_v_0(_bb_v_1, _bb_v_2):\n    return _bb_v_1 + _bb_v_2\n"
        );
        assert_ne!(a.docstring, b.docstring);
    }

    #[test]
    fn docstring_does_not_affect_canonical_code() {
        let with = normalize_src("def f(x):\n    \"\"\"doc\"\"\"\n    return x\n");
        let without = normalize_src("def f(x):\n    return x\n");
        assert_eq!(with.canonical_code, without.canonical_code);
    }

    #[test]
    fn pool_call_rewrite_law() {
        let src = "from bb.pool import object_aa as twice\n\ndef double_all(xs):\n    \"\"\"Double each element\"\"\"\n    return [twice(x) for x in xs]\n";
        let n = normalize_src(src);
        assert!(n.canonical_code.contains("from bb.pool import object_aa\n"));
        assert!(n.canonical_code.contains("object_aa._bb_v_0("));
        assert_eq!(n.alias_mapping.get("aa"), Some(&"twice".to_string()));
    }

    #[test]
    fn outer_function_always_slot_zero() {
        let n = normalize_src("def anything(q, w, e):\n    return q\n");
        assert_eq!(n.reverse.get("_bb_v_0"), Some(&"anything".to_string()));
    }

    #[test]
    fn tuple_unpack_targets_are_slot_renamed() {
        let a = normalize_src("def first(d):\n    for k, v in d.items():\n        return k\n");
        let b = normalize_src("def first(d):\n    for x, y in d.items():\n        return x\n");
        assert_eq!(a.canonical_code, b.canonical_code);
        assert_eq!(
            a.canonical_code,
            "def _bb_v_0(_bb_v_1):\n    for (_bb_v_2, _bb_v_3) in _bb_v_1.items():\n        return _bb_v_2\n"
        );
        assert_eq!(a.reverse.get("_bb_v_2"), Some(&"k".to_string()));
        assert_eq!(b.reverse.get("_bb_v_2"), Some(&"x".to_string()));

        let c = normalize_src("def pair(d):\n    a, b = d\n    return a\n");
        assert!(!c.canonical_code.contains("a, b"));
        assert_eq!(c.reverse.get("_bb_v_1"), Some(&"d".to_string()));
        assert_eq!(c.reverse.get("_bb_v_2"), Some(&"a".to_string()));
    }
}
