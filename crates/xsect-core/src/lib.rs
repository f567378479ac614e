pub mod common;
pub mod domain;
pub mod lines;
pub mod numerics;
pub mod synthesis;
