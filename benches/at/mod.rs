pub mod frame;
pub mod matcher;
