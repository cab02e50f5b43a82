//! 购物车变更模型
//!
//! 对存储文档的纯内存变更：读取-变更-条件写入 循环中的"变更"一步。
//! 不触碰存储，便于单独验证不变量：
//!
//! - 同一 `product_id` 至多一个条目，重复添加在数量上合并
//! - 存储态数量恒 >= 1，更新为 0 即移除
//! - 每次变更刷新 `updated_at`，`created_at` 保持不变

use chrono::{DateTime, Utc};
use thiserror::Error;

use shared::models::{Cart, CartItem};
use shared::{AppError, AppResult, ErrorCode};

/// 单价上限
pub const MAX_PRICE: f64 = 1_000_000.0;
/// 单条目数量上限
pub const MAX_QUANTITY: i32 = 9999;

/// 变更错误
#[derive(Error, Debug, PartialEq, Eq)]
pub enum MutationError {
    #[error("item {0} not found")]
    ItemNotFound(String),
}

/// 校验通过的添加条目输入
#[derive(Debug, Clone)]
pub struct NewItem {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub image_url: Option<String>,
}

impl NewItem {
    /// 字段边界校验
    ///
    /// 价格允许为 0 (免费商品)；添加时数量必须 >= 1。
    pub fn validate(&self) -> AppResult<()> {
        if self.product_id.is_empty() {
            return Err(AppError::required_field("productId"));
        }
        if self.name.is_empty() {
            return Err(AppError::required_field("name"));
        }
        require_finite(self.price, "price")?;
        if self.price < 0.0 {
            return Err(
                AppError::validation("price must be non-negative").with_detail("field", "price")
            );
        }
        if self.price > MAX_PRICE {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("price exceeds maximum allowed ({})", MAX_PRICE),
            )
            .with_detail("field", "price"));
        }
        if self.quantity < 1 {
            return Err(AppError::validation("quantity must be positive")
                .with_detail("field", "quantity"));
        }
        if self.quantity > MAX_QUANTITY {
            return Err(AppError::with_message(
                ErrorCode::ValueOutOfRange,
                format!("quantity exceeds maximum allowed ({})", MAX_QUANTITY),
            )
            .with_detail("field", "quantity"));
        }
        Ok(())
    }
}

/// 校验更新操作的数量值 (0 为合法的移除信号)
pub fn validate_update_quantity(quantity: i32) -> AppResult<()> {
    if quantity < 0 {
        return Err(
            AppError::validation("quantity must be non-negative").with_detail("field", "quantity")
        );
    }
    if quantity > MAX_QUANTITY {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("quantity exceeds maximum allowed ({})", MAX_QUANTITY),
        )
        .with_detail("field", "quantity"));
    }
    Ok(())
}

fn require_finite(value: f64, field_name: &str) -> AppResult<()> {
    if !value.is_finite() {
        return Err(AppError::validation(format!(
            "{} must be a finite number",
            field_name
        ))
        .with_detail("field", field_name.to_string()));
    }
    Ok(())
}

/// 添加条目：已存在同 `product_id` 时数量累加，否则追加新条目
pub fn add_item(cart: &mut Cart, item: NewItem, now: DateTime<Utc>) {
    match cart.find_item_mut(&item.product_id) {
        Some(existing) => {
            existing.quantity = existing.quantity.saturating_add(item.quantity);
        }
        None => {
            cart.items.push(CartItem {
                product_id: item.product_id,
                name: item.name,
                price: item.price,
                quantity: item.quantity,
                image_url: item.image_url,
            });
        }
    }
    cart.updated_at = now;
}

/// 绝对设置条目数量 (非累加)；0 移除该条目
pub fn set_item_quantity(
    cart: &mut Cart,
    product_id: &str,
    quantity: i32,
    now: DateTime<Utc>,
) -> Result<(), MutationError> {
    if cart.find_item(product_id).is_none() {
        return Err(MutationError::ItemNotFound(product_id.to_string()));
    }

    if quantity == 0 {
        cart.items.retain(|i| i.product_id != product_id);
    } else if let Some(item) = cart.find_item_mut(product_id) {
        item.quantity = quantity;
    }

    cart.updated_at = now;
    Ok(())
}

/// 移除条目
pub fn remove_item(
    cart: &mut Cart,
    product_id: &str,
    now: DateTime<Utc>,
) -> Result<(), MutationError> {
    if cart.find_item(product_id).is_none() {
        return Err(MutationError::ItemNotFound(product_id.to_string()));
    }

    cart.items.retain(|i| i.product_id != product_id);
    cart.updated_at = now;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn new_item(product_id: &str, price: f64, quantity: i32) -> NewItem {
        NewItem {
            product_id: product_id.to_string(),
            name: format!("Product {}", product_id),
            price,
            quantity,
            image_url: None,
        }
    }

    fn t(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_add_appends_new_item() {
        let mut cart = Cart::empty("u1", t(0));
        add_item(&mut cart, new_item("p1", 9.99, 2), t(1));

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(cart.updated_at, t(1));
        assert_eq!(cart.created_at, t(0));
    }

    #[test]
    fn test_add_merges_quantity() {
        let mut cart = Cart::empty("u1", t(0));
        add_item(&mut cart, new_item("p1", 9.99, 2), t(1));
        add_item(&mut cart, new_item("p1", 9.99, 3), t(2));

        // 合并不变量：同一商品至多一个条目，数量为添加量之和
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.updated_at, t(2));
    }

    #[test]
    fn test_add_distinct_products() {
        let mut cart = Cart::empty("u1", t(0));
        add_item(&mut cart, new_item("p1", 9.99, 1), t(1));
        add_item(&mut cart, new_item("p2", 5.00, 4), t(2));

        assert_eq!(cart.items.len(), 2);
        assert_eq!(cart.find_item("p1").unwrap().quantity, 1);
        assert_eq!(cart.find_item("p2").unwrap().quantity, 4);
    }

    #[test]
    fn test_set_quantity_absolute() {
        let mut cart = Cart::empty("u1", t(0));
        add_item(&mut cart, new_item("p1", 9.99, 5), t(1));

        set_item_quantity(&mut cart, "p1", 1, t(2)).unwrap();
        // 绝对设置，不是累加
        assert_eq!(cart.find_item("p1").unwrap().quantity, 1);
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::empty("u1", t(0));
        add_item(&mut cart, new_item("p1", 9.99, 5), t(1));
        add_item(&mut cart, new_item("p2", 1.00, 1), t(1));

        set_item_quantity(&mut cart, "p1", 0, t(2)).unwrap();
        assert!(cart.find_item("p1").is_none());
        assert_eq!(cart.items.len(), 1);
    }

    #[test]
    fn test_set_quantity_zero_equals_remove() {
        let mut a = Cart::empty("u1", t(0));
        add_item(&mut a, new_item("p1", 9.99, 5), t(1));
        let mut b = a.clone();

        set_item_quantity(&mut a, "p1", 0, t(2)).unwrap();
        remove_item(&mut b, "p1", t(2)).unwrap();

        assert_eq!(a, b);
    }

    #[test]
    fn test_set_quantity_missing_item() {
        let mut cart = Cart::empty("u1", t(0));
        let err = set_item_quantity(&mut cart, "p1", 3, t(1)).unwrap_err();
        assert_eq!(err, MutationError::ItemNotFound("p1".to_string()));
    }

    #[test]
    fn test_remove_item() {
        let mut cart = Cart::empty("u1", t(0));
        add_item(&mut cart, new_item("p1", 9.99, 2), t(1));

        remove_item(&mut cart, "p1", t(2)).unwrap();
        assert!(cart.items.is_empty());
        assert_eq!(cart.updated_at, t(2));
    }

    #[test]
    fn test_remove_missing_item() {
        let mut cart = Cart::empty("u1", t(0));
        let err = remove_item(&mut cart, "p1", t(1)).unwrap_err();
        assert_eq!(err, MutationError::ItemNotFound("p1".to_string()));
    }

    #[test]
    fn test_validate_accepts_zero_price() {
        // 免费商品合法
        assert!(new_item("p1", 0.0, 1).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        assert!(new_item("p1", 9.99, 0).validate().is_err());
        assert!(new_item("p1", 9.99, -1).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        assert!(new_item("p1", -0.01, 1).validate().is_err());
        assert!(new_item("p1", MAX_PRICE + 1.0, 1).validate().is_err());
        assert!(new_item("p1", 9.99, MAX_QUANTITY + 1).validate().is_err());
        assert!(new_item("p1", f64::NAN, 1).validate().is_err());
        assert!(new_item("p1", f64::INFINITY, 1).validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        assert!(new_item("", 9.99, 1).validate().is_err());

        let mut item = new_item("p1", 9.99, 1);
        item.name = String::new();
        assert!(item.validate().is_err());
    }

    #[test]
    fn test_validate_update_quantity() {
        assert!(validate_update_quantity(0).is_ok());
        assert!(validate_update_quantity(1).is_ok());
        assert!(validate_update_quantity(MAX_QUANTITY).is_ok());
        assert!(validate_update_quantity(-1).is_err());
        assert!(validate_update_quantity(MAX_QUANTITY + 1).is_err());
    }
}
