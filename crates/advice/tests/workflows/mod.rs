use super::*;

mod render;
mod resolve;
