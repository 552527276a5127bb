//! CLI - 命令行参数与文本页面

mod args;
mod pages;

pub use args::{Cli, Page};
pub use pages::{
    render_catalog, render_categories, render_mutation, render_product, run_page, Rendered,
};
