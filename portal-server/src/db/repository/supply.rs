//! Supply Repository (耗材 + 耗材分类)

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Supply, SupplyCategory, SupplyCategoryInput, SupplyInput};
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

const COLUMNS: &str = "id, name, category_id, total_stock, current_stock, unit, min_stock_threshold, description, created_at, is_available";

// ── SupplyCategory ──────────────────────────────────────────

pub async fn find_categories(pool: &SqlitePool) -> RepoResult<Vec<SupplyCategory>> {
    let rows = sqlx::query_as::<_, SupplyCategory>(
        "SELECT id, name, description FROM supply_categories ORDER BY id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_category(pool: &SqlitePool, id: i64) -> RepoResult<Option<SupplyCategory>> {
    let row = sqlx::query_as::<_, SupplyCategory>(
        "SELECT id, name, description FROM supply_categories WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

pub async fn create_category(
    pool: &SqlitePool,
    data: &SupplyCategoryInput,
) -> RepoResult<SupplyCategory> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO supply_categories (name, description) VALUES (?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.description)
    .fetch_one(pool)
    .await?;
    find_category(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create supply category".into()))
}

pub async fn update_category(
    pool: &SqlitePool,
    id: i64,
    data: &SupplyCategoryInput,
) -> RepoResult<SupplyCategory> {
    let rows = sqlx::query("UPDATE supply_categories SET name = ?, description = ? WHERE id = ?")
        .bind(&data.name)
        .bind(&data.description)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(category_not_found(id));
    }
    find_category(pool, id)
        .await?
        .ok_or_else(|| category_not_found(id))
}

/// 删除分类；仍有耗材引用时拒绝
pub async fn delete_category(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let in_use: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM supplies WHERE category_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if in_use > 0 {
        return Err(RepoError::Business(
            ErrorCode::SupplyCategoryInUse,
            "该分类下还有耗材，无法删除！".into(),
        ));
    }

    let rows = sqlx::query("DELETE FROM supply_categories WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(category_not_found(id));
    }
    Ok(())
}

fn category_not_found(id: i64) -> RepoError {
    RepoError::Business(
        ErrorCode::SupplyCategoryNotFound,
        format!("Supply category {id} not found"),
    )
}

// ── Supply ──────────────────────────────────────────────────

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Supply>> {
    let rows = sqlx::query_as::<_, Supply>(&format!("SELECT {COLUMNS} FROM supplies ORDER BY id"))
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// 可申领的耗材
pub async fn find_available(pool: &SqlitePool) -> RepoResult<Vec<Supply>> {
    let rows = sqlx::query_as::<_, Supply>(&format!(
        "SELECT {COLUMNS} FROM supplies WHERE is_available = 1 ORDER BY id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(db: impl SqliteExecutor<'_>, id: i64) -> RepoResult<Option<Supply>> {
    let row = sqlx::query_as::<_, Supply>(&format!("SELECT {COLUMNS} FROM supplies WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;
    Ok(row)
}

pub async fn create(pool: &SqlitePool, data: &SupplyInput) -> RepoResult<Supply> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO supplies (name, category_id, total_stock, current_stock, unit, min_stock_threshold, description, created_at, is_available) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, 1) RETURNING id",
    )
    .bind(&data.name)
    .bind(data.category_id)
    .bind(data.total_stock)
    .bind(data.current_stock)
    .bind(&data.unit)
    .bind(data.min_stock_threshold)
    .bind(&data.description)
    .bind(shared::util::now_millis())
    .fetch_one(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create supply".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: &SupplyInput) -> RepoResult<Supply> {
    let rows = sqlx::query(
        "UPDATE supplies SET name = ?, category_id = ?, total_stock = ?, current_stock = ?, unit = ?, \
         min_stock_threshold = ?, description = ? WHERE id = ?",
    )
    .bind(&data.name)
    .bind(data.category_id)
    .bind(data.total_stock)
    .bind(data.current_stock)
    .bind(&data.unit)
    .bind(data.min_stock_threshold)
    .bind(&data.description)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(supply_not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| supply_not_found(id))
}

/// 启用 / 停用
pub async fn set_available(pool: &SqlitePool, id: i64, available: bool) -> RepoResult<Supply> {
    let rows = sqlx::query("UPDATE supplies SET is_available = ? WHERE id = ?")
        .bind(available)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(supply_not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| supply_not_found(id))
}

/// 入库: 当前库存与总库存同时增加
pub async fn add_stock(pool: &SqlitePool, id: i64, quantity: i64) -> RepoResult<Supply> {
    let rows = sqlx::query(
        "UPDATE supplies SET current_stock = current_stock + ?1, total_stock = total_stock + ?1 \
         WHERE id = ?2 AND is_available = 1",
    )
    .bind(quantity)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(supply_not_found(id));
    }
    find_by_id(pool, id).await?.ok_or_else(|| supply_not_found(id))
}

/// 条件扣减库存；库存不足时不修改并返回 false
pub async fn take_stock(conn: &mut SqliteConnection, id: i64, quantity: i64) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE supplies SET current_stock = current_stock - ?1 WHERE id = ?2 AND current_stock >= ?1",
    )
    .bind(quantity)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// 可用且 `current_stock <= min_stock_threshold` 的耗材数
pub async fn count_low_stock(pool: &SqlitePool) -> RepoResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM supplies WHERE is_available = 1 AND current_stock <= min_stock_threshold",
    )
    .fetch_one(pool)
    .await?;
    Ok(count)
}

fn supply_not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::SupplyNotFound, format!("Supply {id} not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn input(name: &str, current: i64, threshold: i64) -> SupplyInput {
        SupplyInput {
            name: name.into(),
            category_id: None,
            total_stock: current,
            current_stock: current,
            unit: "个".into(),
            min_stock_threshold: threshold,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_take_stock_never_goes_negative() {
        let pool = testing::pool_with_roles().await;
        let supply = create(&pool, &input("签字笔", 5, 1)).await.unwrap();

        let mut conn = pool.acquire().await.unwrap();
        assert!(!take_stock(&mut conn, supply.id, 10).await.unwrap());
        assert!(take_stock(&mut conn, supply.id, 5).await.unwrap());
        drop(conn);

        let supply = find_by_id(&pool, supply.id).await.unwrap().unwrap();
        assert_eq!(supply.current_stock, 0);
    }

    #[tokio::test]
    async fn test_inbound_raises_both_counters() {
        let pool = testing::pool_with_roles().await;
        let supply = create(&pool, &input("A4打印纸", 10, 10)).await.unwrap();
        let supply = add_stock(&pool, supply.id, 15).await.unwrap();
        assert_eq!(supply.current_stock, 25);
        assert_eq!(supply.total_stock, 25);
    }

    #[tokio::test]
    async fn test_low_stock_counts_available_only() {
        let pool = testing::pool_with_roles().await;
        create(&pool, &input("瓶装水", 150, 50)).await.unwrap();
        let low = create(&pool, &input("U盘", 5, 5)).await.unwrap();
        let disabled = create(&pool, &input("订书钉", 0, 10)).await.unwrap();
        set_available(&pool, disabled.id, false).await.unwrap();

        assert_eq!(count_low_stock(&pool).await.unwrap(), 1);
        assert!(find_available(&pool).await.unwrap().iter().all(|s| s.id != disabled.id));
        assert!(find_by_id(&pool, low.id).await.unwrap().unwrap().is_low_stock());
    }

    #[tokio::test]
    async fn test_category_in_use_cannot_be_deleted() {
        let pool = testing::pool_with_roles().await;
        let category = create_category(
            &pool,
            &SupplyCategoryInput {
                name: "办公文具".into(),
                description: None,
            },
        )
        .await
        .unwrap();
        let mut data = input("签字笔", 10, 1);
        data.category_id = Some(category.id);
        let supply = create(&pool, &data).await.unwrap();

        let err = delete_category(&pool, category.id).await.unwrap_err();
        assert!(matches!(
            err,
            RepoError::Business(ErrorCode::SupplyCategoryInUse, _)
        ));

        data.category_id = None;
        update(&pool, supply.id, &data).await.unwrap();
        delete_category(&pool, category.id).await.unwrap();
        assert!(find_categories(&pool).await.unwrap().is_empty());
    }
}
