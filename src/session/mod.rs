pub mod machine;
pub mod table;

pub use machine::SessionState;
pub use table::SessionTable;
