pub mod deadline;
pub mod escapes;
pub mod links;
pub mod mime;
