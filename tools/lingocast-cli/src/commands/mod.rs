pub mod frames;
pub mod info;
pub mod init;
pub mod markup;
pub mod timing;
pub mod validate;
