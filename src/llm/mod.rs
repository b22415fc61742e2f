pub mod distllm;
pub mod gateway;
