pub mod toml_loader;

pub use toml_loader::{load_all_exam_papers, load_exam_paper};
