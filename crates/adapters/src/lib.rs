#![deny(unsafe_code)]

pub mod storage;
