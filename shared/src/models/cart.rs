//! 购物车数据模型
//!
//! [`Cart`] 是唯一持久化的文档：每个用户一份，以 JSON 形式存储。
//! [`CartView`] 是读取路径上派生的响应视图 (总价、数量汇总)，本身不持久化。
//!
//! # 金额计算
//!
//! 所有金额计算内部使用 `Decimal`，序列化时转换为 `f64`，
//! 避免浮点累加误差 (例如 0.1 + 0.2)。

use chrono::{DateTime, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// 购物车中的一个条目
///
/// 同一购物车内 `product_id` 唯一，重复添加在数量上合并。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// 商品 ID
    pub product_id: String,
    /// 商品名称
    pub name: String,
    /// 单价 (>= 0, 0 为合法值)
    pub price: f64,
    /// 数量 (存储态恒 >= 1)
    pub quantity: i32,
    /// 商品图片 URL (可选)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl CartItem {
    /// 条目小计 (price × quantity)，Decimal 精度
    pub fn line_total(&self) -> Decimal {
        to_decimal(self.price) * Decimal::from(self.quantity)
    }
}

/// 持久化的购物车文档
///
/// 每个用户一份，键为 `cart:{userId}`；不存在即视为空购物车。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    /// 所属用户 ID
    pub user_id: String,
    /// 条目列表
    pub items: Vec<CartItem>,
    /// 首次创建时间 (创建后不变)
    pub created_at: DateTime<Utc>,
    /// 最后一次变更时间 (每次变更刷新)
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// 创建空购物车 (不持久化，首次 add 时才落库)
    pub fn empty(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            items: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// 按商品 ID 查找条目
    pub fn find_item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id == product_id)
    }

    /// 按商品 ID 查找条目 (可变)
    pub fn find_item_mut(&mut self, product_id: &str) -> Option<&mut CartItem> {
        self.items.iter_mut().find(|i| i.product_id == product_id)
    }
}

/// 购物车响应视图
///
/// 读取路径上从 [`Cart`] 派生：`total = round(Σ price×quantity, 2)`，
/// `item_count = Σ quantity`。时间戳以 ISO-8601 字符串输出。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    /// 所属用户 ID
    pub user_id: String,
    /// 条目列表
    pub items: Vec<CartItem>,
    /// 总价 (2 位小数，四舍五入)
    pub total: f64,
    /// 数量合计
    pub item_count: i64,
    /// 首次创建时间
    pub created_at: DateTime<Utc>,
    /// 最后一次变更时间
    pub updated_at: DateTime<Utc>,
}

impl CartView {
    /// 从存储文档派生视图 (纯计算，无副作用)
    pub fn project(cart: &Cart) -> Self {
        let total: Decimal = cart.items.iter().map(CartItem::line_total).sum();
        let item_count: i64 = cart.items.iter().map(|i| i64::from(i.quantity)).sum();

        Self {
            user_id: cart.user_id.clone(),
            items: cart.items.clone(),
            total: to_f64(total),
            item_count,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self::project(cart)
    }
}

/// Convert f64 to Decimal (NaN/Infinity become zero)
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64, rounded to 2 decimal places (half-up)
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(product_id: &str, price: f64, quantity: i32) -> CartItem {
        CartItem {
            product_id: product_id.to_string(),
            name: format!("Product {}", product_id),
            price,
            quantity,
            image_url: None,
        }
    }

    #[test]
    fn test_empty_cart_projection() {
        let cart = Cart::empty("user-1", Utc::now());
        let view = CartView::project(&cart);

        assert_eq!(view.total, 0.0);
        assert_eq!(view.item_count, 0);
        assert!(view.items.is_empty());
        assert_eq!(view.user_id, "user-1");
    }

    #[test]
    fn test_projection_totals() {
        let mut cart = Cart::empty("user-1", Utc::now());
        cart.items.push(item("p1", 9.99, 2));
        cart.items.push(item("p2", 1.50, 3));

        let view = CartView::project(&cart);
        assert_eq!(view.total, 24.48); // 19.98 + 4.50
        assert_eq!(view.item_count, 5);
    }

    #[test]
    fn test_projection_accumulation_precision() {
        // 0.1 × 3 accumulated in f64 would be 0.30000000000000004
        let mut cart = Cart::empty("user-1", Utc::now());
        cart.items.push(item("p1", 0.1, 3));

        let view = CartView::project(&cart);
        assert_eq!(view.total, 0.3);
    }

    #[test]
    fn test_projection_rounding_half_up() {
        // 3 × 1.005 = 3.015 → rounds up to 3.02
        let mut cart = Cart::empty("user-1", Utc::now());
        cart.items.push(item("p1", 1.005, 3));

        let view = CartView::project(&cart);
        assert_eq!(view.total, 3.02);
    }

    #[test]
    fn test_projection_zero_price_item() {
        // Free items are valid and contribute quantity but no total
        let mut cart = Cart::empty("user-1", Utc::now());
        cart.items.push(item("promo", 0.0, 2));

        let view = CartView::project(&cart);
        assert_eq!(view.total, 0.0);
        assert_eq!(view.item_count, 2);
    }

    #[test]
    fn test_cart_serialization_camel_case() {
        let mut cart = Cart::empty("user-1", Utc::now());
        cart.items.push(item("p1", 9.99, 1));

        let json = serde_json::to_string(&cart).unwrap();
        assert!(json.contains("\"userId\":\"user-1\""));
        assert!(json.contains("\"productId\":\"p1\""));
        assert!(json.contains("\"createdAt\""));
        assert!(json.contains("\"updatedAt\""));
        // image_url absent → key omitted entirely
        assert!(!json.contains("imageUrl"));
    }

    #[test]
    fn test_cart_roundtrip() {
        let mut cart = Cart::empty("user-1", Utc::now());
        cart.items.push(CartItem {
            product_id: "p1".to_string(),
            name: "Widget".to_string(),
            price: 9.99,
            quantity: 2,
            image_url: Some("https://cdn.example.com/p1.png".to_string()),
        });

        let json = serde_json::to_string(&cart).unwrap();
        let parsed: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(cart, parsed);
    }

    #[test]
    fn test_find_item() {
        let mut cart = Cart::empty("user-1", Utc::now());
        cart.items.push(item("p1", 9.99, 1));
        cart.items.push(item("p2", 5.00, 2));

        assert!(cart.find_item("p1").is_some());
        assert!(cart.find_item("p3").is_none());

        let found = cart.find_item_mut("p2").unwrap();
        found.quantity = 7;
        assert_eq!(cart.find_item("p2").unwrap().quantity, 7);
    }

    #[test]
    fn test_view_timestamps_iso8601() {
        let cart = Cart::empty("user-1", Utc::now());
        let view = CartView::project(&cart);

        let json = serde_json::to_string(&view).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let created = value.get("createdAt").unwrap().as_str().unwrap();
        // RFC 3339 / ISO-8601: "2026-01-01T00:00:00Z" style
        assert!(created.contains('T'));
        assert!(created.ends_with('Z') || created.contains('+'));
    }
}
