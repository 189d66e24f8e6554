//! Variables of a program and their values.

use std::collections::HashMap;

use crate::instruction::ArithmeticOp;

/// Longest allowed variable name.
pub const MAX_NAME_LEN: usize = 10;

/// Stable handle to a variable in a [SymbolTable].
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct SymbolId(usize);

impl SymbolId {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub name: String,

    /// Current value. Zero until the variable is first assigned.
    pub value: i32,

    /// True once the variable has been assigned with `set`.
    pub is_set: bool,
}

/// Returned by [SymbolTable::declare] when the name is already taken.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlreadyDeclared(pub SymbolId);

/// Reasons why [SymbolTable::mutate] can fail.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MutateError {
    /// The variable has not been assigned yet.
    NotSet,

    /// The operation has no result, eg. division by zero.
    Arithmetic,
}

/// Variables of a program in declaration order.
#[derive(Default, Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    by_name: HashMap<String, SymbolId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        SymbolTable {
            symbols: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Declares a new unset variable with the value zero.
    pub fn declare(&mut self, name: &str) -> Result<SymbolId, AlreadyDeclared> {
        if let Some(id) = self.by_name.get(name) {
            return Err(AlreadyDeclared(*id));
        }

        let id = SymbolId(self.symbols.len());

        self.symbols.push(Symbol {
            name: name.to_string(),
            value: 0,
            is_set: false,
        });
        self.by_name.insert(name.to_string(), id);

        Ok(id)
    }

    /// Finds a declared variable.
    pub fn lookup_declared(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    /// Finds a declared variable that has been assigned a value.
    pub fn lookup_set(&self, name: &str) -> Option<SymbolId> {
        self.lookup_declared(name)
            .filter(|id| self.symbols[id.0].is_set)
    }

    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.0]
    }

    /// Returns the value of a variable if it is declared and set.
    pub fn value_of(&self, name: &str) -> Option<i32> {
        self.lookup_set(name).map(|id| self.symbols[id.0].value)
    }

    pub fn assign(&mut self, id: SymbolId, value: i32) {
        let symbol = &mut self.symbols[id.0];
        symbol.value = value;
        symbol.is_set = true;
    }

    /// Applies `op` with the right hand side `rhs` to a variable that has been set.
    pub fn mutate(&mut self, id: SymbolId, op: ArithmeticOp, rhs: i32) -> Result<i32, MutateError> {
        let symbol = &mut self.symbols[id.0];

        if !symbol.is_set {
            return Err(MutateError::NotSet);
        }

        symbol.value = op.apply(symbol.value, rhs)
            .ok_or(MutateError::Arithmetic)?;

        Ok(symbol.value)
    }

    /// Iterates over the variables in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.symbols.iter().map(|s| s.name.as_str())
    }
}

#[test]
fn test_declare_twice() {
    let mut table = SymbolTable::new();
    let id = table.declare("x").unwrap();

    assert_eq!(table.declare("x"), Err(AlreadyDeclared(id)));
    assert_eq!(table.len(), 1);
}

#[test]
fn test_lookup_set() {
    let mut table = SymbolTable::new();
    let x = table.declare("x").unwrap();

    assert_eq!(table.lookup_declared("x"), Some(x));
    assert_eq!(table.lookup_set("x"), None);
    assert_eq!(table.get(x).value, 0);

    table.assign(x, 5);

    assert_eq!(table.lookup_set("x"), Some(x));
    assert_eq!(table.value_of("x"), Some(5));
    assert_eq!(table.lookup_declared("y"), None);
}

#[test]
fn test_mutate() {
    let mut table = SymbolTable::new();
    let x = table.declare("x").unwrap();

    assert_eq!(table.mutate(x, ArithmeticOp::Add, 1), Err(MutateError::NotSet));
    assert!(!table.get(x).is_set);

    table.assign(x, 5);

    assert_eq!(table.mutate(x, ArithmeticOp::Add, 3), Ok(8));
    assert_eq!(table.mutate(x, ArithmeticOp::Subtract, 10), Ok(-2));
    assert_eq!(table.mutate(x, ArithmeticOp::Multiply, -1), Ok(2));
    assert_eq!(table.mutate(x, ArithmeticOp::Divide, 2), Ok(1));
    assert_eq!(table.mutate(x, ArithmeticOp::Divide, 0), Err(MutateError::Arithmetic));
    assert_eq!(table.value_of("x"), Some(1));
}

#[test]
fn test_iteration_order() {
    let mut table = SymbolTable::new();
    table.declare("b").unwrap();
    table.declare("a").unwrap();
    table.declare("c").unwrap();

    table.assign(SymbolId(1), 4);

    assert_eq!(table.names().collect::<Vec<_>>(), vec!["b", "a", "c"]);

    let set: Vec<_> = table.iter()
        .filter(|s| s.is_set)
        .map(|s| (s.name.as_str(), s.value))
        .collect();

    assert_eq!(set, vec![("a", 4)]);
}
