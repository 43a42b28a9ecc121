pub mod status_reader;
pub mod status_writer;
