pub mod noop;
pub mod template;
