pub mod checksum;
pub mod file_name;

pub use checksum::md5_hex;
pub use file_name::{output_file_name, sanitize_client_file_name};
