//! Pages - 基于 Hook 的文本页面
//!
//! 页面只通过 Hook 取数，render_* 函数是纯函数，只依赖 Hook 状态

use std::fmt::Write;
use std::path::Path;
use std::sync::Arc;

use crate::application::hooks::{use_api, use_mutation, FetchOptions, RequestState};
use crate::application::ports::{HttpClientPort, HttpError};
use crate::application::services::{endpoints, ProductService};
use crate::domain::product::{Category, NewProduct, Product, ProductId, ProductPage};

use super::args::Page;

/// 页面渲染结果
#[derive(Debug, Clone, PartialEq)]
pub struct Rendered {
    pub text: String,
    pub failed: bool,
}

impl Rendered {
    fn from_state<T>(state: &RequestState<T>, text: String) -> Self {
        Self {
            text,
            failed: state.is_error(),
        }
    }
}

/// 执行指定页面
pub async fn run_page(page: Page, service: &ProductService) -> Rendered {
    let client = service.client();
    match page {
        Page::Catalog {
            page,
            page_size,
            category,
        } => {
            let query = Page::catalog_query(page, page_size, category);
            let hook = use_api::<ProductPage>(
                client,
                endpoints::PRODUCTS,
                FetchOptions::with_params(query.to_params()),
            )
            .await;
            let state = hook.state();
            Rendered::from_state(&state, render_catalog(&state))
        }
        Page::Product { id } => {
            let hook =
                use_api::<Product>(client, endpoints::product(id), FetchOptions::default()).await;
            let state = hook.state();
            Rendered::from_state(&state, render_product(&state))
        }
        Page::Search { keyword } => search_page(client, &keyword).await,
        Page::Home { limit } => home_page(client, limit).await,
        Page::Categories => {
            let hook =
                use_api::<Vec<Category>>(client, endpoints::CATEGORIES, FetchOptions::default())
                    .await;
            let state = hook.state();
            Rendered::from_state(&state, render_categories(&state))
        }
        Page::Create {
            name,
            price,
            description,
            category,
            stock,
        } => {
            let product = Page::new_product(name, price, description, category, stock);
            let service = service.clone();
            let create = use_mutation(move |input: NewProduct| {
                let service = service.clone();
                async move { service.create_product(input).await }
            });
            let _ = create.mutate(product).await;
            let state = create.state();
            let text = render_mutation(&state, "Create product", |p: &Product| {
                format!("created #{} {}", p.id, p.name)
            });
            Rendered::from_state(&state, text)
        }
        Page::Delete { id } => delete_page(service, id).await,
        Page::Upload { file } => upload_page(service, &file).await,
    }
}

async fn search_page(client: Arc<dyn HttpClientPort>, keyword: &str) -> Rendered {
    let keyword = keyword.trim();
    // 关键字为空时 locator 为空，Hook 不会发起请求
    let locator = if keyword.is_empty() { "" } else { endpoints::SEARCH };
    let hook = use_api::<ProductPage>(
        client,
        locator,
        FetchOptions::default().param("keyword", keyword),
    )
    .await;
    let state = hook.state();
    let text = if state.is_idle() {
        "Enter a keyword to search.\n".to_string()
    } else {
        render_catalog(&state)
    };
    Rendered::from_state(&state, text)
}

async fn home_page(client: Arc<dyn HttpClientPort>, limit: u32) -> Rendered {
    let options = FetchOptions::default().param("limit", limit);
    let (hot, recommended) = tokio::join!(
        use_api::<ProductPage>(client.clone(), endpoints::HOT, options.clone()),
        use_api::<ProductPage>(client, endpoints::RECOMMENDED, options),
    );
    let hot = hot.state();
    let recommended = recommended.state();

    let mut text = String::new();
    let _ = writeln!(text, "== Hot ==");
    text.push_str(&render_catalog(&hot));
    let _ = writeln!(text, "== Recommended ==");
    text.push_str(&render_catalog(&recommended));

    Rendered {
        text,
        failed: hot.is_error() || recommended.is_error(),
    }
}

async fn delete_page(service: &ProductService, id: ProductId) -> Rendered {
    let service = service.clone();
    let delete = use_mutation(move |id: ProductId| {
        let service = service.clone();
        async move { service.delete_product(id).await.map(|()| id) }
    });
    let _ = delete.mutate(id).await;
    let state = delete.state();
    let text = render_mutation(&state, "Delete product", |id: &ProductId| {
        format!("deleted #{}", id)
    });
    Rendered::from_state(&state, text)
}

async fn upload_page(service: &ProductService, file: &Path) -> Rendered {
    let bytes = match tokio::fs::read(file).await {
        Ok(bytes) => bytes,
        Err(e) => {
            return Rendered {
                text: format!("Upload image failed: cannot read {}: {}\n", file.display(), e),
                failed: true,
            }
        }
    };
    let filename = file
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload.bin")
        .to_string();

    let service = service.clone();
    let upload = use_mutation(move |(filename, bytes): (String, Vec<u8>)| {
        let service = service.clone();
        async move { service.upload_image(&filename, bytes).await }
    });
    let _ = upload.mutate((filename, bytes)).await;
    let state = upload.state();
    let text = render_mutation(&state, "Upload image", |image| {
        format!("uploaded to {}", image.url)
    });
    Rendered::from_state(&state, text)
}

/// 加载/错误的公共分支；返回 None 表示可以渲染数据
fn render_status<T>(state: &RequestState<T>, what: &str) -> Option<String> {
    if state.loading {
        return Some(format!("Loading {}...\n", what));
    }
    if let Some(err) = &state.error {
        return Some(format!("Failed to load {}: {}\n", what, err));
    }
    if state.data.is_none() {
        return Some(format!("No {} loaded.\n", what));
    }
    None
}

fn product_line(product: &Product) -> String {
    let mut line = format!("#{:<4} {:<32} {:>10.2}", product.id, product.name, product.price);
    if let Some(category) = &product.category {
        let _ = write!(line, "  [{}]", category);
    }
    if !product.in_stock() {
        line.push_str("  (out of stock)");
    }
    line
}

pub fn render_catalog(state: &RequestState<ProductPage>) -> String {
    if let Some(status) = render_status(state, "products") {
        return status;
    }
    let Some(page) = state.data() else {
        return String::new();
    };

    let total = page.total();
    let items = match page {
        ProductPage::Bare(items) | ProductPage::Paged { items, .. } => items,
    };
    if items.is_empty() {
        return "No products found.\n".to_string();
    }

    let mut text = String::new();
    for product in items {
        let _ = writeln!(text, "{}", product_line(product));
    }
    let _ = writeln!(text, "Showing {} of {} products", items.len(), total);
    text
}

pub fn render_product(state: &RequestState<Product>) -> String {
    if let Some(status) = render_status(state, "product") {
        return status;
    }
    let Some(product) = state.data() else {
        return String::new();
    };

    let mut text = String::new();
    let _ = writeln!(text, "{} (#{})", product.name, product.id);
    let _ = writeln!(text, "Price: {:.2}", product.price);
    let _ = writeln!(text, "Stock: {}", product.stock);
    if let Some(category) = &product.category {
        let _ = writeln!(text, "Category: {}", category);
    }
    if let Some(description) = &product.description {
        let _ = writeln!(text, "{}", description);
    }
    if !product.tags.is_empty() {
        let _ = writeln!(text, "Tags: {}", product.tags.join(", "));
    }
    if let Some(image) = &product.image_url {
        let _ = writeln!(text, "Image: {}", image);
    }
    text
}

pub fn render_categories(state: &RequestState<Vec<Category>>) -> String {
    if let Some(status) = render_status(state, "categories") {
        return status;
    }
    let categories = state.data().map(Vec::as_slice).unwrap_or_default();
    if categories.is_empty() {
        return "No categories.\n".to_string();
    }

    let mut text = String::new();
    for category in categories {
        let _ = writeln!(text, "{:<24} {:>5}", category.name, category.product_count);
    }
    text
}

pub fn render_mutation<T>(
    state: &RequestState<T>,
    label: &str,
    describe: impl Fn(&T) -> String,
) -> String {
    if state.loading {
        return format!("{}: in progress...\n", label);
    }
    match (&state.error, state.data()) {
        (Some(HttpError::Unauthorized), _) => {
            format!("{} failed: unauthorized (set api.auth_token or --token)\n", label)
        }
        (Some(err), _) => format!("{} failed: {}\n", label, err),
        (None, Some(data)) => format!("{}: {}\n", label, describe(data)),
        (None, None) => format!("{}: not started\n", label),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::FakeHttpClient;
    use serde_json::json;

    fn product(id: u64, name: &str, stock: u32) -> Product {
        serde_json::from_value(json!({"id": id, "name": name, "price": 10.0, "stock": stock}))
            .unwrap()
    }

    fn loaded<T>(data: T) -> RequestState<T> {
        RequestState {
            data: Some(data),
            loading: false,
            error: None,
        }
    }

    #[test]
    fn test_render_catalog_states() {
        let loading = RequestState::<ProductPage> {
            loading: true,
            ..Default::default()
        };
        assert_eq!(render_catalog(&loading), "Loading products...\n");

        let failed = RequestState::<ProductPage> {
            error: Some(HttpError::Timeout),
            ..Default::default()
        };
        assert_eq!(
            render_catalog(&failed),
            "Failed to load products: Request timeout\n"
        );

        let empty = loaded(ProductPage::Bare(Vec::new()));
        assert_eq!(render_catalog(&empty), "No products found.\n");
    }

    #[test]
    fn test_render_catalog_lists_products() {
        let state = loaded(ProductPage::Paged {
            items: vec![product(1, "A", 3), product(2, "B", 0)],
            total: Some(10),
        });
        let text = render_catalog(&state);
        assert!(text.contains("#1"));
        assert!(text.contains("(out of stock)"));
        assert!(text.ends_with("Showing 2 of 10 products\n"));
    }

    #[test]
    fn test_render_product_detail() {
        let mut p = product(9, "Lamp", 1);
        p.tags = vec!["home".to_string(), "light".to_string()];
        let text = render_product(&loaded(p));
        assert!(text.starts_with("Lamp (#9)\n"));
        assert!(text.contains("Tags: home, light"));
    }

    #[test]
    fn test_render_mutation_outcomes() {
        let ok = loaded(5);
        assert_eq!(
            render_mutation(&ok, "Delete", |n| format!("#{}", n)),
            "Delete: #5\n"
        );

        let unauthorized = RequestState::<i32> {
            error: Some(HttpError::Unauthorized),
            ..Default::default()
        };
        assert!(render_mutation(&unauthorized, "Delete", |_| String::new()).contains("unauthorized"));

        let idle = RequestState::<i32>::default();
        assert_eq!(render_mutation(&idle, "Delete", |_| String::new()), "Delete: not started\n");
    }

    #[tokio::test]
    async fn test_catalog_page_end_to_end() {
        let service = ProductService::new(Arc::new(FakeHttpClient::with_demo_catalog()));
        let rendered = run_page(
            Page::Catalog {
                page: None,
                page_size: None,
                category: None,
            },
            &service,
        )
        .await;
        assert!(!rendered.failed);
        assert!(rendered.text.contains("Mechanical Keyboard"));
        assert!(rendered.text.contains("Showing 4 of 4 products"));
    }

    #[tokio::test]
    async fn test_blank_search_issues_no_request() {
        let client = Arc::new(FakeHttpClient::with_demo_catalog());
        let service = ProductService::new(client.clone());
        let rendered = run_page(
            Page::Search {
                keyword: "  ".to_string(),
            },
            &service,
        )
        .await;
        assert_eq!(rendered.text, "Enter a keyword to search.\n");
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_home_page_renders_both_sections() {
        let client = Arc::new(FakeHttpClient::with_demo_catalog());
        let service = ProductService::new(client.clone());
        let rendered = run_page(Page::Home { limit: 3 }, &service).await;
        assert!(rendered.text.contains("== Hot =="));
        assert!(rendered.text.contains("USB-C Hub"));
        assert_eq!(client.call_count(), 2);
    }

    #[tokio::test]
    async fn test_create_page_reports_failure() {
        let client = Arc::new(FakeHttpClient::new());
        client.fail("POST", "/products", HttpError::network("NetworkError"));
        let service = ProductService::new(client);
        let rendered = run_page(
            Page::Create {
                name: "B".to_string(),
                price: 1.0,
                description: None,
                category: None,
                stock: 0,
            },
            &service,
        )
        .await;
        assert!(rendered.failed);
        assert_eq!(
            rendered.text,
            "Create product failed: Network error: NetworkError\n"
        );
    }

    #[tokio::test]
    async fn test_upload_missing_file() {
        let service = ProductService::new(Arc::new(FakeHttpClient::new()));
        let rendered = run_page(
            Page::Upload {
                file: "/nonexistent/picture.png".into(),
            },
            &service,
        )
        .await;
        assert!(rendered.failed);
        assert!(rendered.text.starts_with("Upload image failed"));
    }
}
