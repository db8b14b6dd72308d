mod copy;

pub use copy::{write_file, write_to_file, write_to_file_with};
