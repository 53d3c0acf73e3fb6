pub mod deserializers;
pub mod profile;
pub mod resume;
