pub mod backend;
pub mod cli;
pub mod color;
pub mod font;
pub mod palette;
pub mod pipeline;
pub mod session;
pub mod tui;
