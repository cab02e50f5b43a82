//! Cart API Handlers
//!
//! 每个变更处理器执行 读取 → 纯内存变更 → 条件写入。条件写入失败说明
//! 同一用户的另一请求先行落库，重新读取后重放变更，有限次重试。

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::cart::mutation::{self, MutationError, NewItem};
use crate::cart::StoreError;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult, ErrorCode};
use shared::models::{Cart, CartView};

/// 条件写入冲突时的最大重试次数
const MAX_WRITE_ATTEMPTS: usize = 3;

/// 添加条目请求体
///
/// 字段全部可选以便区分 "缺失" 和 "非法"：缺失的必填字段统一回 400。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: Option<String>,
    pub name: Option<String>,
    pub price: Option<f64>,
    pub quantity: Option<i32>,
    pub image_url: Option<String>,
}

impl AddItemRequest {
    fn into_validated(self) -> AppResult<NewItem> {
        let item = NewItem {
            product_id: self.product_id.ok_or_else(|| AppError::required_field("productId"))?,
            name: self.name.ok_or_else(|| AppError::required_field("name"))?,
            price: self.price.ok_or_else(|| AppError::required_field("price"))?,
            quantity: self
                .quantity
                .ok_or_else(|| AppError::required_field("quantity"))?,
            image_url: self.image_url,
        };
        item.validate()?;
        Ok(item)
    }
}

/// 更新条目请求体
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateItemRequest {
    pub quantity: Option<i32>,
}

/// GET /api/cart - 获取购物车
///
/// 购物车不存在时返回合成的空购物车 (不落库)。读取无副作用。
pub async fn get_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<CartView>> {
    let record = state
        .cart_store
        .load(&user.id)
        .await
        .map_err(storage_error)?;

    let view = match record {
        Some(r) => CartView::project(&r.cart),
        None => CartView::project(&Cart::empty(&user.id, Utc::now())),
    };

    Ok(Json(view))
}

/// POST /api/cart/items - 添加条目
///
/// 购物车不存在时隐式创建；已有同商品时数量累加。
pub async fn add_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<AddItemRequest>,
) -> AppResult<Json<CartView>> {
    let item = payload.into_validated()?;

    let cart = mutate_cart(&state, &user.id, true, |cart| {
        mutation::add_item(cart, item.clone(), Utc::now());
        Ok(())
    })
    .await?;

    Ok(Json(CartView::project(&cart)))
}

/// PUT /api/cart/items/{product_id} - 设置条目数量
///
/// 绝对设置 (非累加)；数量 0 等价于移除该条目。
pub async fn update_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
    Json(payload): Json<UpdateItemRequest>,
) -> AppResult<Json<CartView>> {
    let quantity = payload
        .quantity
        .ok_or_else(|| AppError::required_field("quantity"))?;
    mutation::validate_update_quantity(quantity)?;

    let cart = mutate_cart(&state, &user.id, false, |cart| {
        mutation::set_item_quantity(cart, &product_id, quantity, Utc::now())
            .map_err(item_not_found)
    })
    .await?;

    Ok(Json(CartView::project(&cart)))
}

/// DELETE /api/cart/items/{product_id} - 移除条目
pub async fn remove_item(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
) -> AppResult<Json<CartView>> {
    let cart = mutate_cart(&state, &user.id, false, |cart| {
        mutation::remove_item(cart, &product_id, Utc::now()).map_err(item_not_found)
    })
    .await?;

    Ok(Json(CartView::project(&cart)))
}

/// DELETE /api/cart - 清空购物车
///
/// 无条件删除存储文档 (幂等)，返回合成的空购物车视图。
pub async fn clear_cart(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<CartView>> {
    state
        .cart_store
        .delete(&user.id)
        .await
        .map_err(storage_error)?;

    Ok(Json(CartView::project(&Cart::empty(&user.id, Utc::now()))))
}

/// 读取-变更-条件写入 循环
///
/// `create_if_missing` 为 false 且购物车不存在时回 404。
/// 条件写入冲突时重新读取并重放 `apply`，超过 [`MAX_WRITE_ATTEMPTS`]
/// 次仍冲突则回 409。
async fn mutate_cart<F>(
    state: &ServerState,
    user_id: &str,
    create_if_missing: bool,
    mut apply: F,
) -> AppResult<Cart>
where
    F: FnMut(&mut Cart) -> AppResult<()>,
{
    for attempt in 1..=MAX_WRITE_ATTEMPTS {
        let record = state
            .cart_store
            .load(user_id)
            .await
            .map_err(storage_error)?;

        let (mut cart, etag) = match record {
            Some(r) => (r.cart, Some(r.etag)),
            None if create_if_missing => (Cart::empty(user_id, Utc::now()), None),
            None => return Err(AppError::cart_not_found()),
        };

        apply(&mut cart)?;

        let written = state
            .cart_store
            .save_if(&cart, etag.as_deref())
            .await
            .map_err(storage_error)?;

        if written {
            return Ok(cart);
        }

        tracing::debug!(user_id, attempt, "cart write conflict, retrying");
    }

    Err(AppError::cart_modified())
}

fn item_not_found(err: MutationError) -> AppError {
    match err {
        MutationError::ItemNotFound(product_id) => AppError::item_not_found(product_id),
    }
}

/// 存储层失败：记录细节，对外只回泛化的 500
fn storage_error(err: StoreError) -> AppError {
    tracing::error!(error = %err, "cart store operation failed");
    AppError::new(ErrorCode::StorageError)
}
