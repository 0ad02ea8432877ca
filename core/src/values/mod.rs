mod value;

pub use value::Value;

#[cfg(test)]
mod value_test;
