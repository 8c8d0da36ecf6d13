pub mod entities;
pub mod requests;

pub use entities::{Material, MaterialKind, NewMaterial};
pub use requests::MaterialListQuery;
