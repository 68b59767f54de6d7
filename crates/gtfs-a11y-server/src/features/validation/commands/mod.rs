pub mod validate_file;
pub mod validate_url;

pub use validate_file::ValidateFileCommand;
pub use validate_url::ValidateUrlCommand;
