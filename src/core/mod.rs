//! 核心层：存储抽象

pub mod store;
