mod repo;
pub mod repo_types;
pub mod services;

pub use repo_types::{Product, ProductFilter, ProductInput};
pub use services::{
    add_product, delete_product, get_product_by_id, get_product_by_name, list_products,
    search_products, update_product,
};
