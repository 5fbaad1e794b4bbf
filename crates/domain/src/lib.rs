#![forbid(unsafe_code)]

pub mod lag_alert;
