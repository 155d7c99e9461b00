use tracing::{debug, info, instrument};

use crate::db::Store;
use crate::error::Result;
use crate::events::StoreEvent;
use crate::products::repo_types::{Product, ProductFilter, ProductInput};

/// Inserts a product with zero stock. Field validation is the caller's job (see `forms`).
#[instrument(skip(st, input), fields(name = %input.name))]
pub async fn add_product(st: &Store, input: &ProductInput) -> Result<i64> {
    let id = Product::insert(&st.db, input).await?;
    info!(product_id = id, "product added");
    st.publish(StoreEvent::ProductAdded { product_id: id });
    Ok(id)
}

/// Overwrites name, category, type and price. An unknown id is a silent no-op.
#[instrument(skip(st, input))]
pub async fn update_product(st: &Store, id: i64, input: &ProductInput) -> Result<()> {
    let affected = Product::update(&st.db, id, input).await?;
    info!(product_id = id, affected, "product updated");
    if affected > 0 {
        st.publish(StoreEvent::ProductUpdated { product_id: id });
    }
    Ok(())
}

/// Removes the product. Its sales and inventory logs are kept and keep the dangling id.
#[instrument(skip(st))]
pub async fn delete_product(st: &Store, id: i64) -> Result<()> {
    let affected = Product::delete(&st.db, id).await?;
    info!(product_id = id, affected, "product deleted");
    if affected > 0 {
        st.publish(StoreEvent::ProductDeleted { product_id: id });
    }
    Ok(())
}

pub async fn list_products(st: &Store) -> Result<Vec<Product>> {
    let products = Product::list(&st.db).await?;
    debug!(count = products.len(), "products fetched");
    Ok(products)
}

/// Name-substring and category filtered catalog, ordered by name.
#[instrument(skip(st))]
pub async fn search_products(st: &Store, filter: &ProductFilter) -> Result<Vec<Product>> {
    let search = non_blank(&filter.search);
    let category = non_blank(&filter.category);
    let products = Product::search(&st.db, search, category).await?;
    debug!(count = products.len(), "products searched");
    Ok(products)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

pub async fn get_product_by_id(st: &Store, id: i64) -> Result<Option<Product>> {
    let product = Product::find_by_id(&st.db, id).await?;
    debug!(product_id = id, found = product.is_some(), "product lookup by id");
    Ok(product)
}

pub async fn get_product_by_name(st: &Store, name: &str) -> Result<Option<Product>> {
    let product = Product::find_by_name(&st.db, name).await?;
    debug!(name, found = product.is_some(), "product lookup by name");
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_store;

    #[tokio::test]
    async fn list_is_ordered_by_name() {
        let st = test_store().await;
        let names: Vec<String> = list_products(&st)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "5 inch Solid Block",
                "6 inch Solid Block",
                "9 inch Solid Block",
                "Dangote Cement",
                "Ghacem Cement",
            ]
        );
    }

    #[tokio::test]
    async fn search_matches_name_substring_and_category() {
        let st = test_store().await;
        let names = |rows: Vec<Product>| rows.into_iter().map(|p| p.name).collect::<Vec<_>>();

        let by_name = ProductFilter { search: Some("SOLID".into()), category: None };
        assert_eq!(
            names(search_products(&st, &by_name).await.unwrap()),
            vec!["5 inch Solid Block", "6 inch Solid Block", "9 inch Solid Block"]
        );

        let cement = ProductFilter { search: None, category: Some("Cement".into()) };
        assert_eq!(
            names(search_products(&st, &cement).await.unwrap()),
            vec!["Dangote Cement", "Ghacem Cement"]
        );

        let both = ProductFilter { search: Some("ghacem".into()), category: Some("Cement".into()) };
        assert_eq!(names(search_products(&st, &both).await.unwrap()), vec!["Ghacem Cement"]);

        let mismatch = ProductFilter { search: Some("ghacem".into()), category: Some("Block".into()) };
        assert!(search_products(&st, &mismatch).await.unwrap().is_empty());

        let blank = ProductFilter { search: Some("  ".into()), category: None };
        assert_eq!(search_products(&st, &blank).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn add_starts_with_zero_stock_and_notifies() {
        let st = test_store().await;
        let mut events = st.subscribe();

        let input = ProductInput::new("Hollow Block", "Block", "6 inch Hollow", 5.5);
        let id = add_product(&st, &input).await.unwrap();

        let p = get_product_by_id(&st, id).await.unwrap().expect("inserted");
        assert_eq!(p.name, "Hollow Block");
        assert_eq!(p.kind, "6 inch Hollow");
        assert_eq!(p.unit_price, 5.5);
        assert_eq!(p.stock, 0);
        assert_eq!(events.recv().await.unwrap(), StoreEvent::ProductAdded { product_id: id });
    }

    #[tokio::test]
    async fn update_keeps_stock_and_id() {
        let st = test_store().await;
        let p = get_product_by_name(&st, "Ghacem Cement").await.unwrap().unwrap();
        sqlx::query("UPDATE products SET stock = 12 WHERE id = ?")
            .bind(p.id)
            .execute(&st.db)
            .await
            .unwrap();

        let input = ProductInput::new("Ghacem Extra", "Cement", "Ghacem Extra", 88.0);
        update_product(&st, p.id, &input).await.unwrap();

        let updated = get_product_by_id(&st, p.id).await.unwrap().unwrap();
        assert_eq!(updated.name, "Ghacem Extra");
        assert_eq!(updated.unit_price, 88.0);
        assert_eq!(updated.stock, 12);
    }

    #[tokio::test]
    async fn update_and_delete_of_unknown_id_succeed_silently() {
        let st = test_store().await;
        let mut events = st.subscribe();
        let input = ProductInput::new("Ghost", "Block", "none", 1.0);

        update_product(&st, 9_999, &input).await.unwrap();
        delete_product(&st, 9_999).await.unwrap();

        assert!(events.try_recv().is_err());
        assert_eq!(list_products(&st).await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn delete_removes_product() {
        let st = test_store().await;
        let p = get_product_by_name(&st, "5 inch Solid Block").await.unwrap().unwrap();
        delete_product(&st, p.id).await.unwrap();
        assert!(get_product_by_id(&st, p.id).await.unwrap().is_none());
        assert!(get_product_by_name(&st, "5 inch Solid Block").await.unwrap().is_none());
    }
}
