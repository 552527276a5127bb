//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::product::{NewProduct, ProductId, ProductQuery};

/// Shopfront - 商品目录命令行客户端
#[derive(Debug, Parser)]
#[command(name = "shopfront", version, about = "Browse and manage the product catalog")]
pub struct Cli {
    /// 配置文件路径（默认搜索 shopfront.toml / shopfront.local.toml）
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 覆盖 API 基础 URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// 覆盖访问令牌
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// 使用内置示例数据，不访问网络
    #[arg(long, global = true)]
    pub offline: bool,

    #[command(subcommand)]
    pub page: Page,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Page {
    /// 商品列表
    Catalog {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
        #[arg(long)]
        category: Option<String>,
    },
    /// 商品详情
    Product { id: ProductId },
    /// 搜索商品
    Search {
        #[arg(default_value = "")]
        keyword: String,
    },
    /// 首页：热销 + 推荐
    Home {
        #[arg(long, default_value_t = 5)]
        limit: u32,
    },
    /// 分类列表
    Categories,
    /// 创建商品
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, default_value_t = 0)]
        stock: u32,
    },
    /// 删除商品
    Delete { id: ProductId },
    /// 上传商品图片
    Upload { file: PathBuf },
}

impl Page {
    /// Catalog 页的查询参数
    pub fn catalog_query(
        page: Option<u32>,
        page_size: Option<u32>,
        category: Option<String>,
    ) -> ProductQuery {
        ProductQuery {
            page,
            page_size,
            category,
            sort: None,
        }
    }

    /// Create 页的载荷
    pub fn new_product(
        name: String,
        price: f64,
        description: Option<String>,
        category: Option<String>,
        stock: u32,
    ) -> NewProduct {
        NewProduct {
            description,
            category,
            stock,
            ..NewProduct::new(name, price)
        }
    }
}
