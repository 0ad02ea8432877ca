//! Math Package
//!
//! Constants: pi, e, tau, inf, nan
//! Functions: sqrt, exp, log, log10, log2, log1p, expm1, sin, cos, tan,
//!            asin, acos, atan, atan2, sinh, cosh, tanh, pow, fabs,
//!            floor, ceil, trunc, hypot, degrees, radians
//!
//! Every function checks its domain: `math.sqrt(-1)` is an error, not NaN.

use crate::stdlib::{NativeFn, NativeFunction, Package};

/// Generates a one-argument function that applies an `f64` method.
macro_rules! unary_fn {
    ($fname:ident, $method:ident) => {
        fn $fname(args: &[f64]) -> f64 {
            args[0].$method()
        }
    };
}

/// Generates a two-argument function that applies an `f64` method.
macro_rules! binary_fn {
    ($fname:ident, $method:ident) => {
        fn $fname(args: &[f64]) -> f64 {
            args[0].$method(args[1])
        }
    };
}

// ============================================================================
// Exponentials and Logarithms
// ============================================================================

unary_fn!(math_sqrt, sqrt);
unary_fn!(math_exp, exp);
unary_fn!(math_log10, log10);
unary_fn!(math_log2, log2);
unary_fn!(math_log1p, ln_1p);
unary_fn!(math_expm1, exp_m1);
binary_fn!(math_pow, powf);

/// Natural logarithm, or logarithm in the base given as the second argument.
fn math_log(args: &[f64]) -> f64 {
    match args {
        [x, base] => x.ln() / base.ln(),
        _ => args[0].ln(),
    }
}

// ============================================================================
// Trigonometry
// ============================================================================

unary_fn!(math_sin, sin);
unary_fn!(math_cos, cos);
unary_fn!(math_tan, tan);
unary_fn!(math_asin, asin);
unary_fn!(math_acos, acos);
unary_fn!(math_atan, atan);
binary_fn!(math_atan2, atan2);
unary_fn!(math_sinh, sinh);
unary_fn!(math_cosh, cosh);
unary_fn!(math_tanh, tanh);
binary_fn!(math_hypot, hypot);
unary_fn!(math_degrees, to_degrees);
unary_fn!(math_radians, to_radians);

// ============================================================================
// Rounding
// ============================================================================

unary_fn!(math_fabs, abs);
unary_fn!(math_floor, floor);
unary_fn!(math_ceil, ceil);
unary_fn!(math_trunc, trunc);

// ============================================================================
// Package Builder
// ============================================================================

pub fn build_math_package() -> Package {
    let unary = |name: &'static str, func: NativeFn| {
        NativeFunction::new(name, 1, func).checking_domain()
    };
    let binary = |name: &'static str, func: NativeFn| {
        NativeFunction::new(name, 2, func).checking_domain()
    };

    Package::new("math")
        // Constants
        .constant("pi", core::f64::consts::PI)
        .constant("e", core::f64::consts::E)
        .constant("tau", core::f64::consts::TAU)
        .constant("inf", f64::INFINITY)
        .constant("nan", f64::NAN)
        // Exponentials and logarithms
        .function(unary("sqrt", math_sqrt))
        .function(unary("exp", math_exp))
        .function(unary("log", math_log).with_optional_args(2))
        .function(unary("log10", math_log10))
        .function(unary("log2", math_log2))
        .function(unary("log1p", math_log1p))
        .function(unary("expm1", math_expm1))
        .function(binary("pow", math_pow))
        // Trigonometry
        .function(unary("sin", math_sin))
        .function(unary("cos", math_cos))
        .function(unary("tan", math_tan))
        .function(unary("asin", math_asin))
        .function(unary("acos", math_acos))
        .function(unary("atan", math_atan))
        .function(binary("atan2", math_atan2))
        .function(unary("sinh", math_sinh))
        .function(unary("cosh", math_cosh))
        .function(unary("tanh", math_tanh))
        .function(binary("hypot", math_hypot))
        .function(unary("degrees", math_degrees))
        .function(unary("radians", math_radians))
        // Rounding
        .function(unary("fabs", math_fabs))
        .function(unary("floor", math_floor).returning_int())
        .function(unary("ceil", math_ceil).returning_int())
        .function(unary("trunc", math_trunc).returning_int())
}
