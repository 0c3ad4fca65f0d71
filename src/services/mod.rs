pub mod recent;
pub mod storage;
