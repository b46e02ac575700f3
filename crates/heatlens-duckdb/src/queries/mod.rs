pub mod clicks;
pub mod pages;
pub mod search;
pub mod selectors;
pub mod sessions;
