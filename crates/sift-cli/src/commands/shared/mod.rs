pub mod limit;
pub mod parse;
pub mod protocol_file;
