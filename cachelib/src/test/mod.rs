mod config;
mod lru;
mod tests;
