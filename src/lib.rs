#![doc(html_root_url = "https://docs.rs/bound-list-dom/0.0.1")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

mod bound_list;
pub mod diff;
mod error;
pub mod mode;
pub mod registry;
mod temp_set;

pub use bound_list::BoundList;
pub use error::Error;
pub use mode::{Keyed, Mode};
