//! Standard library for inline expressions.
//!
//! An expression can only see the names in the [`Namespace`] it is evaluated
//! against. There is no ambient scope: a name that was not registered here
//! simply does not exist, so the namespace is the whole capability surface of
//! the sublanguage.
//!
//! The default namespace provides two packages:
//! - `math`: constants and functions mirroring a scientific math module
//! - `numpy`: the small numeric subset scripts commonly use
//!
//! Each package is a flat table of constants and native functions.

use hashbrown::HashMap;

pub mod math;
pub mod numpy;

pub use math::build_math_package;
pub use numpy::build_numpy_package;

/// A native function over floats. Arity is checked before it is called.
pub type NativeFn = fn(&[f64]) -> f64;

#[derive(Debug, Clone, Copy)]
pub struct NativeFunction {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    /// Results are truncated to integers (floor, ceil, trunc).
    pub returns_int: bool,
    /// A NaN produced from non-NaN arguments is an error rather than a value.
    pub checks_domain: bool,
    func: NativeFn,
}

impl NativeFunction {
    pub fn new(name: &'static str, arity: usize, func: NativeFn) -> Self {
        Self {
            name,
            min_args: arity,
            max_args: arity,
            returns_int: false,
            checks_domain: false,
            func,
        }
    }

    pub fn with_optional_args(mut self, max_args: usize) -> Self {
        self.max_args = max_args;
        self
    }

    pub fn returning_int(mut self) -> Self {
        self.returns_int = true;
        self
    }

    pub fn checking_domain(mut self) -> Self {
        self.checks_domain = true;
        self
    }

    pub fn accepts(&self, count: usize) -> bool {
        (self.min_args..=self.max_args).contains(&count)
    }

    /// Human-readable arity, e.g. "1" or "1 to 2".
    pub fn arity(&self) -> String {
        if self.min_args == self.max_args {
            self.min_args.to_string()
        } else {
            format!("{} to {}", self.min_args, self.max_args)
        }
    }

    pub fn call(&self, args: &[f64]) -> f64 {
        (self.func)(args)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Member {
    Constant(f64),
    Function(NativeFunction),
}

/// A named table of constants and functions.
#[derive(Debug, Clone)]
pub struct Package {
    name: &'static str,
    members: HashMap<&'static str, Member>,
}

impl Package {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            members: HashMap::new(),
        }
    }

    pub fn constant(mut self, name: &'static str, value: f64) -> Self {
        self.members.insert(name, Member::Constant(value));
        self
    }

    pub fn function(mut self, function: NativeFunction) -> Self {
        self.members.insert(function.name, Member::Function(function));
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// The complete set of names visible to an expression.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    packages: HashMap<&'static str, Package>,
}

impl Namespace {
    /// A namespace with nothing in it. Only literals evaluate.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The `math` and `numpy` packages.
    pub fn standard() -> Self {
        let mut namespace = Self::empty();
        namespace.register(build_math_package());
        namespace.register(build_numpy_package());
        namespace
    }

    /// Register a package under its own name, replacing any previous one.
    pub fn register(&mut self, package: Package) {
        self.packages.insert(package.name(), package);
    }

    pub fn package(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }
}
