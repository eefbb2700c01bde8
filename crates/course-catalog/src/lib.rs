pub mod download;
pub mod error;
pub mod lookup;
pub mod model;
pub mod parser;
pub mod pdf;
pub mod store;
pub mod tools;

pub use error::CatalogError;
pub use lookup::{PrerequisiteAnswer, PrerequisiteLookup};
pub use model::CourseRecord;
pub use store::CourseCatalog;
pub use tools::{ToolRegistry, course_tools};
