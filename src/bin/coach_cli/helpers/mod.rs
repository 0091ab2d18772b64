// ABOUTME: Helper modules for coach-cli
// ABOUTME: Shared output formatting

pub mod display;
