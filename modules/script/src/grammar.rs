//! The parts of a parsed graph the override builder depends on.

use super::variable::{Datum, VariableId};

/// A variable which is still alive after parsing the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedVariable {
    /// The identifier of the variable declared by the source graph.
    pub source_variable_id: VariableId,
    /// The value the parser resolved for it.
    pub datum: Datum,
}

/// The result of parsing a graph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AbstractCodeModel {
    variables: Vec<ParsedVariable>,
}

impl AbstractCodeModel {
    pub fn new() -> Self {
        AbstractCodeModel::default()
    }

    pub fn add_variable(&mut self, source_variable_id: VariableId, datum: Datum) {
        self.variables.push(ParsedVariable {
            source_variable_id,
            datum,
        });
    }

    #[inline]
    pub fn variables(&self) -> &[ParsedVariable] {
        &self.variables
    }

    /// Checks if the source variable `id` is used by the parsed graph.
    #[inline]
    pub fn is_used(&self, id: VariableId) -> bool {
        self.variables.iter().any(|v| v.source_variable_id == id)
    }
}
