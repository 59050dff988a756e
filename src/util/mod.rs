pub mod io;
pub mod listener;
pub mod terminator;

#[cfg(not(target_arch = "wasm32"))]
pub mod ctrlc_terminator;
