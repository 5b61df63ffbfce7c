pub mod rename;

pub use rename::{FileRenamer, RenameOutcome};
