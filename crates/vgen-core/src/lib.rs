pub mod api;
pub mod clock;
pub mod config;
pub mod control;
pub mod job;
pub mod logging;
pub mod reference;
pub mod retry;
pub mod storage;
pub mod trace;
pub mod workflow;
