//! Numpy Package
//!
//! The handful of numpy names that appear in loss-model scripts. Unlike
//! `math`, these follow IEEE semantics: `numpy.sqrt(-1)` is NaN.

use crate::stdlib::{NativeFunction, Package};

fn np_abs(args: &[f64]) -> f64 {
    args[0].abs()
}

fn np_power(args: &[f64]) -> f64 {
    args[0].powf(args[1])
}

pub fn build_numpy_package() -> Package {
    Package::new("numpy")
        .constant("pi", core::f64::consts::PI)
        .constant("e", core::f64::consts::E)
        .function(NativeFunction::new("exp", 1, |a| a[0].exp()))
        .function(NativeFunction::new("log", 1, |a| a[0].ln()))
        .function(NativeFunction::new("log10", 1, |a| a[0].log10()))
        .function(NativeFunction::new("sqrt", 1, |a| a[0].sqrt()))
        .function(NativeFunction::new("sin", 1, |a| a[0].sin()))
        .function(NativeFunction::new("cos", 1, |a| a[0].cos()))
        .function(NativeFunction::new("tan", 1, |a| a[0].tan()))
        .function(NativeFunction::new("abs", 1, np_abs))
        .function(NativeFunction::new("power", 2, np_power))
}
