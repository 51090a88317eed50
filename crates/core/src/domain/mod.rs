pub mod approval;
pub mod directory;
pub mod entity;
