//! word-freq: count normalized words in text.
//!
//! ```
//! let counts = word_freq::count("apple apple_orange,Apple-OrAnGe");
//! assert_eq!(counts.get("apple"), Some(3));
//! assert_eq!(counts.get("orange"), Some(2));
//! ```

pub mod counts;
pub mod error;
pub mod fetch;
pub mod report;
pub mod tokenize;

pub use counts::{count, count_value, WordCounts};
pub use error::{Error, Result};
