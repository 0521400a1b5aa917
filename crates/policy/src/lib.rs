pub mod decimal_policy;
pub mod write_back;
