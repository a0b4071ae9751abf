#[cfg(feature = "serde")]
mod deserialize;
mod shell;
mod spec;
