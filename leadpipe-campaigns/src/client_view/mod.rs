//! Client portal operations

mod update;

pub use update::UpdateClientView;
