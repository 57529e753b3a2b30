pub mod board;
pub mod markup;

#[cfg(test)]
pub mod fake;
