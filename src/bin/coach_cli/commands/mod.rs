// ABOUTME: Command modules for coach-cli
// ABOUTME: Queue, cache, nutrition, and reminder operations over the local store

pub mod cache;
pub mod nutrition;
pub mod queue;
pub mod reminders;
