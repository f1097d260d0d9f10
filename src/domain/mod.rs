pub mod article;
pub mod verdict;

pub use article::Article;
pub use verdict::{RunStats, Verdict};
