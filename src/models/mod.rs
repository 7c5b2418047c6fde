pub mod config;
pub mod lab_result;
pub mod ocr_result;
