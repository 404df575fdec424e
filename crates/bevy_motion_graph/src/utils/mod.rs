pub mod math;

#[cfg(test)]
pub(crate) mod fixtures;
