//! Public catalogue and checkout reference data.

use app_shop_core::checkout::{City, DeliveryType, PaymentType};
use app_shop_core::pagination::ListParams;
use app_shop_core::product::Product;
use serde::Deserialize;
use tracing::instrument;

use super::{ApiClient, ApiError, CacheKey, CacheValue};

#[derive(Deserialize)]
struct ProductList {
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PaymentTypeList {
    #[serde(default)]
    payment_types: Vec<PaymentType>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeliveryTypeList {
    #[serde(default)]
    delivery_types: Vec<DeliveryType>,
}

#[derive(Deserialize)]
struct CityList {
    #[serde(default)]
    cities: Vec<City>,
}

impl ApiClient {
    /// All public products, unpaginated.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn public_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.cached(&CacheKey::Products).await {
            return Ok(products);
        }

        let list: ProductList = self
            .get("products/public", &ListParams::ALL.query_pairs(), None)
            .await?;

        self.remember(CacheKey::Products, CacheValue::Products(list.products.clone()))
            .await;
        Ok(list.products)
    }

    /// One public product by slug.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if no product has this slug.
    #[instrument(skip(self), fields(slug = %slug))]
    pub async fn product_by_slug(&self, slug: &str) -> Result<Product, ApiError> {
        let key = CacheKey::Product(slug.to_string());
        if let Some(CacheValue::Product(product)) = self.cached(&key).await {
            return Ok(*product);
        }

        let path = format!("products/public/slug/{}", urlencoding::encode(slug));
        let product: Option<Product> = self.get(&path, &[], None).await?;
        let product = product.ok_or_else(|| ApiError::NotFound(format!("product {slug}")))?;

        self.remember(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Every payment method.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn payment_types(&self) -> Result<Vec<PaymentType>, ApiError> {
        if let Some(CacheValue::PaymentTypes(list)) = self.cached(&CacheKey::PaymentTypes).await {
            return Ok(list);
        }

        let list: PaymentTypeList = self
            .get("payment-type", &ListParams::ALL.query_pairs(), None)
            .await?;

        self.remember(
            CacheKey::PaymentTypes,
            CacheValue::PaymentTypes(list.payment_types.clone()),
        )
        .await;
        Ok(list.payment_types)
    }

    /// Every delivery method with its price.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn delivery_types(&self) -> Result<Vec<DeliveryType>, ApiError> {
        if let Some(CacheValue::DeliveryTypes(list)) = self.cached(&CacheKey::DeliveryTypes).await
        {
            return Ok(list);
        }

        let list: DeliveryTypeList = self
            .get("delivery-type", &ListParams::ALL.query_pairs(), None)
            .await?;

        self.remember(
            CacheKey::DeliveryTypes,
            CacheValue::DeliveryTypes(list.delivery_types.clone()),
        )
        .await;
        Ok(list.delivery_types)
    }

    /// Every city.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn cities(&self) -> Result<Vec<City>, ApiError> {
        if let Some(CacheValue::Cities(list)) = self.cached(&CacheKey::Cities).await {
            return Ok(list);
        }

        let list: CityList = self
            .get("city", &ListParams::ALL.query_pairs(), None)
            .await?;

        self.remember(CacheKey::Cities, CacheValue::Cities(list.cities.clone()))
            .await;
        Ok(list.cities)
    }
}
