//! The excluded-name set and the slot-assigning name mapper (spec §4.4).

use std::collections::{HashMap, HashSet};

/// Built once per normalizer call from a fixed constant — never a
/// process-wide mutable (spec §9 Design Notes).
pub const PYTHON_BUILTINS: &[&str] = &[
    "self", "cls",
    "True", "False", "None", "NotImplemented", "Ellipsis", "__debug__",
    "abs", "aiter", "anext", "all", "any", "ascii", "bin", "bool", "breakpoint",
    "bytearray", "bytes", "callable", "chr", "classmethod", "compile", "complex",
    "delattr", "dict", "dir", "divmod", "enumerate", "eval", "exec", "filter",
    "float", "format", "frozenset", "getattr", "globals", "hasattr", "hash",
    "help", "hex", "id", "input", "int", "isinstance", "issubclass", "iter",
    "len", "list", "locals", "map", "max", "memoryview", "min", "next", "object",
    "oct", "open", "ord", "pow", "print", "property", "range", "repr", "reversed",
    "round", "set", "setattr", "slice", "sorted", "staticmethod", "str", "sum",
    "super", "tuple", "type", "vars", "zip", "__import__",
    "BaseException", "Exception", "ArithmeticError", "AssertionError",
    "AttributeError", "BlockingIOError", "BrokenPipeError", "BufferError",
    "BytesWarning", "ChildProcessError", "ConnectionAbortedError",
    "ConnectionError", "ConnectionRefusedError", "ConnectionResetError",
    "DeprecationWarning", "EOFError", "Ellipsis", "EnvironmentError",
    "FileExistsError", "FileNotFoundError", "FloatingPointError", "FutureWarning",
    "GeneratorExit", "IOError", "ImportError", "ImportWarning", "IndentationError",
    "IndexError", "InterruptedError", "IsADirectoryError", "KeyError",
    "KeyboardInterrupt", "LookupError", "MemoryError", "ModuleNotFoundError",
    "NameError", "NotADirectoryError", "NotImplementedError", "OSError",
    "OverflowError", "PendingDeprecationWarning", "PermissionError",
    "ProcessLookupError", "RecursionError", "ReferenceError", "ResourceWarning",
    "RuntimeError", "RuntimeWarning", "StopAsyncIteration", "StopIteration",
    "SyntaxError", "SyntaxWarning", "SystemError", "SystemExit", "TabError",
    "TimeoutError", "TypeError", "UnboundLocalError", "UnicodeDecodeError",
    "UnicodeEncodeError", "UnicodeError", "UnicodeTranslateError",
    "UnicodeWarning", "UserWarning", "ValueError", "Warning", "ZeroDivisionError",
];

pub fn builtin_set() -> HashSet<String> {
    PYTHON_BUILTINS.iter().map(|s| s.to_string()).collect()
}

/// Assigns canonical slots (`_bb_v_0`, `_bb_v_1`, …) to distinct original
/// names in first-encountered order. One mapper per normalizer call.
#[derive(Debug, Default)]
pub struct NameMapper {
    order: Vec<String>,
    index: HashMap<String, usize>,
}

impl NameMapper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the slot for `original`, assigning the next free slot the
    /// first time this name is seen.
    pub fn resolve(&mut self, original: &str) -> String {
        let idx = *self.index.entry(original.to_string()).or_insert_with(|| {
            let i = self.order.len();
            self.order.push(original.to_string());
            i
        });
        common::slot_name(idx)
    }

    /// `slot -> original`, one entry per distinct name assigned so far.
    pub fn reverse_map(&self) -> std::collections::BTreeMap<String, String> {
        self.order
            .iter()
            .enumerate()
            .map(|(i, name)| (common::slot_name(i), name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_resolved_name_gets_slot_zero() {
        let mut m = NameMapper::new();
        assert_eq!(m.resolve("add"), "_bb_v_0");
        assert_eq!(m.resolve("a"), "_bb_v_1");
        assert_eq!(m.resolve("b"), "_bb_v_2");
        assert_eq!(m.resolve("a"), "_bb_v_1", "repeat name reuses its slot");
    }
}
