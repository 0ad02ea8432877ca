//! Session state: the named model graph built by one script.
//!
//! A [`Session`] owns one symbol table per entity category, the variable
//! table, the ordered recorder list, and the title and integration settings.
//! Each script gets its own session; nothing is shared between them.

mod recorder;

pub use recorder::{
    AtSpec, Destination, IntegrationMethod, IntegrationSettings, RecorderDescriptor,
    RelationshipType,
};

use core::fmt;

use hashbrown::HashMap;

use crate::{
    Value,
    engine::{
        CompGroupHandle, EdpHandle, FragFnHandle, FunctionHandle, ImHandle, LossFnHandle,
        ProbFnHandle, RecordTarget,
    },
};

/// The category keyword that selects a symbol table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Variable,
    DetFn,
    ProbFn,
    Im,
    Edp,
    FragFn,
    LossFn,
    CompGroup,
}

impl Category {
    pub const fn keyword(self) -> &'static str {
        match self {
            Category::Variable => "var",
            Category::DetFn => "detfn",
            Category::ProbFn => "probfn",
            Category::Im => "im",
            Category::Edp => "edp",
            Category::FragFn => "fragfn",
            Category::LossFn => "lossfn",
            Category::CompGroup => "compgroup",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Identifier to handle mapping for one category.
///
/// An identifier whose construction failed is kept as an undefined
/// placeholder, so a later lookup sees it as unresolved rather than seeing a
/// stale handle from an earlier declaration.
#[derive(Debug, Clone)]
pub struct SymbolTable<H> {
    entries: HashMap<String, Option<H>>,
}

impl<H> Default for SymbolTable<H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<H: Copy> SymbolTable<H> {
    /// Bind `id`, replacing any previous binding.
    pub fn bind(&mut self, id: &str, handle: H) {
        self.entries.insert(id.to_string(), Some(handle));
    }

    pub fn bind_undefined(&mut self, id: &str) {
        self.entries.insert(id.to_string(), None);
    }

    /// The handle bound to `id`, if it is bound and defined.
    pub fn get(&self, id: &str) -> Option<H> {
        self.entries.get(id).copied().flatten()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn is_undefined(&self, id: &str) -> bool {
        matches!(self.entries.get(id), Some(None))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub title: Option<String>,
    pub variables: HashMap<String, Value>,
    pub detfns: SymbolTable<FunctionHandle>,
    pub probfns: SymbolTable<ProbFnHandle>,
    pub ims: SymbolTable<ImHandle>,
    pub edps: SymbolTable<EdpHandle>,
    pub fragfns: SymbolTable<FragFnHandle>,
    pub lossfns: SymbolTable<LossFnHandle>,
    pub compgroups: SymbolTable<CompGroupHandle>,
    /// Append-only, in declaration order.
    pub recorders: Vec<RecorderDescriptor>,
    pub integration: Option<IntegrationSettings>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The value bound to a variable, or `Undefined`.
    pub fn variable(&self, id: &str) -> Value {
        self.variables.get(id).cloned().unwrap_or(Value::Undefined)
    }

    pub fn set_variable(&mut self, id: &str, value: Value) {
        self.variables.insert(id.to_string(), value);
    }

    /// Mark `id` as undefined in the table for `category`.
    pub fn bind_undefined(&mut self, category: Category, id: &str) {
        match category {
            Category::Variable => self.set_variable(id, Value::Undefined),
            Category::DetFn => self.detfns.bind_undefined(id),
            Category::ProbFn => self.probfns.bind_undefined(id),
            Category::Im => self.ims.bind_undefined(id),
            Category::Edp => self.edps.bind_undefined(id),
            Category::FragFn => self.fragfns.bind_undefined(id),
            Category::LossFn => self.lossfns.bind_undefined(id),
            Category::CompGroup => self.compgroups.bind_undefined(id),
        }
    }

    /// A printable description of the entity `id`, or `None` if it is absent
    /// or undefined.
    pub fn describe(&self, category: Category, id: &str) -> Option<String> {
        fn show<H: fmt::Display + Copy>(table: &SymbolTable<H>, id: &str) -> Option<String> {
            table.get(id).map(|handle| handle.to_string())
        }
        match category {
            Category::Variable => self
                .variables
                .get(id)
                .filter(|value| !value.is_undefined())
                .map(Value::to_string),
            Category::DetFn => show(&self.detfns, id),
            Category::ProbFn => show(&self.probfns, id),
            Category::Im => show(&self.ims, id),
            Category::Edp => show(&self.edps, id),
            Category::FragFn => show(&self.fragfns, id),
            Category::LossFn => show(&self.lossfns, id),
            Category::CompGroup => show(&self.compgroups, id),
        }
    }

    /// Resolve a recorder's target in the table its relationship type implies.
    pub fn record_target(&self, kind: RelationshipType, id: &str) -> RecordTarget {
        match kind {
            RelationshipType::DetFn => RecordTarget::DetFn(self.detfns.get(id)),
            RelationshipType::ProbFn => RecordTarget::ProbFn(self.probfns.get(id)),
            RelationshipType::ImRate => RecordTarget::Im(self.ims.get(id)),
            RelationshipType::EdpIm | RelationshipType::EdpRate => {
                RecordTarget::Edp(self.edps.get(id))
            }
            RelationshipType::DsEdp => RecordTarget::FragFn(self.fragfns.get(id)),
            RelationshipType::LossDs => RecordTarget::LossFn(self.lossfns.get(id)),
            RelationshipType::DsIm
            | RelationshipType::DsRate
            | RelationshipType::LossEdp
            | RelationshipType::LossIm => RecordTarget::CompGroup(self.compgroups.get(id)),
        }
    }
}
