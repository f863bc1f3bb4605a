pub mod media;
pub mod s3;
