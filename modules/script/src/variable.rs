//! Variables declared by visual-scripting graphs.

use std::collections::BTreeMap;

use spawnable::uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VariableId(pub Uuid);

impl VariableId {
    /// Creates a new, random identifier.
    pub fn new() -> Self {
        VariableId(Uuid::new_v4())
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        !self.0.is_nil()
    }
}

impl Default for VariableId {
    fn default() -> Self {
        VariableId(Uuid::nil())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    Number,
    String,
    EntityId,
    Vector3,
}

/// A typed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Datum {
    Boolean(bool),
    Number(f64),
    String(String),
    EntityId(u64),
    Vector3([f32; 3]),
}

impl Datum {
    pub fn data_type(&self) -> DataType {
        match *self {
            Datum::Boolean(_) => DataType::Boolean,
            Datum::Number(_) => DataType::Number,
            Datum::String(_) => DataType::String,
            Datum::EntityId(_) => DataType::EntityId,
            Datum::Vector3(_) => DataType::Vector3,
        }
    }
}

/// Where the initial value of a variable comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InitialValueSource {
    /// The value stored in the graph.
    Graph,
    /// A value which could be overridden by the component that runs the graph.
    Component,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphVariable {
    id: VariableId,
    name: String,
    datum: Datum,
    source: InitialValueSource,
}

impl GraphVariable {
    pub fn new<T: Into<String>>(id: VariableId, name: T, datum: Datum) -> Self {
        GraphVariable {
            id,
            name: name.into(),
            datum,
            source: InitialValueSource::Graph,
        }
    }

    #[inline]
    pub fn with_source(mut self, source: InitialValueSource) -> Self {
        self.source = source;
        self
    }

    #[inline]
    pub fn id(&self) -> VariableId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn datum(&self) -> &Datum {
        &self.datum
    }

    #[inline]
    pub fn set_datum(&mut self, datum: Datum) {
        self.datum = datum;
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.datum.data_type()
    }

    #[inline]
    pub fn initial_value_source(&self) -> InitialValueSource {
        self.source
    }

    /// Returns true if the value of this variable could be overridden per instance.
    #[inline]
    pub fn is_component_property(&self) -> bool {
        self.source == InitialValueSource::Component
    }
}

/// The variables declared by a graph, indexed by identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableData {
    variables: BTreeMap<VariableId, GraphVariable>,
}

impl VariableData {
    pub fn new() -> Self {
        VariableData::default()
    }

    /// Adds a variable. Returns false if its identifier has been used already.
    pub fn add_variable(&mut self, variable: GraphVariable) -> bool {
        if self.variables.contains_key(&variable.id()) {
            return false;
        }

        self.variables.insert(variable.id(), variable);
        true
    }

    #[inline]
    pub fn find_variable(&self, id: VariableId) -> Option<&GraphVariable> {
        self.variables.get(&id)
    }

    #[inline]
    pub fn variables(&self) -> impl Iterator<Item = &GraphVariable> {
        self.variables.values()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
