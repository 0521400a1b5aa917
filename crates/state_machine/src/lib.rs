pub mod cause;
pub mod state;
pub mod switch;
pub mod transition;

#[cfg(test)]
mod tests;
