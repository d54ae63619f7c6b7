pub mod code;
pub mod review;
pub mod run_result;
