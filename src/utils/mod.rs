pub mod configfile;
pub mod duration_fmt;
pub mod uuid_fmt;
