//! Opaque handles issued by a model engine.

use core::fmt;

macro_rules! define_handle {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            pub const fn id(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "<{} #{}>", $label, self.0)
            }
        }
    };
}

define_handle!(
    /// A deterministic function.
    FunctionHandle,
    "deterministic function"
);
define_handle!(
    /// A lognormal probabilistic function.
    ProbFnHandle,
    "probabilistic function"
);
define_handle!(
    /// An IM-rate relationship.
    ImHandle,
    "IM"
);
define_handle!(
    /// An EDP relationship compounding an IM and a probabilistic function.
    EdpHandle,
    "EDP"
);
define_handle!(FragFnHandle, "fragility function");
define_handle!(LossFnHandle, "loss function");
define_handle!(CompGroupHandle, "component group");

/// The entity a recorder emits, resolved from the session.
///
/// `None` means the target identifier was not bound to a live handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTarget {
    DetFn(Option<FunctionHandle>),
    ProbFn(Option<ProbFnHandle>),
    Im(Option<ImHandle>),
    Edp(Option<EdpHandle>),
    FragFn(Option<FragFnHandle>),
    LossFn(Option<LossFnHandle>),
    CompGroup(Option<CompGroupHandle>),
}

impl RecordTarget {
    pub fn is_resolved(&self) -> bool {
        match self {
            RecordTarget::DetFn(h) => h.is_some(),
            RecordTarget::ProbFn(h) => h.is_some(),
            RecordTarget::Im(h) => h.is_some(),
            RecordTarget::Edp(h) => h.is_some(),
            RecordTarget::FragFn(h) => h.is_some(),
            RecordTarget::LossFn(h) => h.is_some(),
            RecordTarget::CompGroup(h) => h.is_some(),
        }
    }

    /// What kind of entity the target names.
    pub fn describe(&self) -> &'static str {
        match self {
            RecordTarget::DetFn(_) => "deterministic function",
            RecordTarget::ProbFn(_) => "probabilistic function",
            RecordTarget::Im(_) => "IM",
            RecordTarget::Edp(_) => "EDP",
            RecordTarget::FragFn(_) => "fragility function",
            RecordTarget::LossFn(_) => "loss function",
            RecordTarget::CompGroup(_) => "component group",
        }
    }
}
