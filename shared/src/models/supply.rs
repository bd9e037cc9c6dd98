//! Supply Models (耗材 / 耗材分类)

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Supply category
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SupplyCategory {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SupplyCategoryInput {
    #[validate(length(min = 1, max = 100, message = "请输入分类名称"))]
    pub name: String,
    pub description: Option<String>,
}

/// Supply (stock item)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Supply {
    pub id: i64,
    pub name: String,
    pub category_id: Option<i64>,
    pub total_stock: i64,
    pub current_stock: i64,
    pub unit: String,
    pub min_stock_threshold: i64,
    pub description: Option<String>,
    pub created_at: i64,
    pub is_available: bool,
}

impl Supply {
    /// 库存低于阈值
    pub fn is_low_stock(&self) -> bool {
        self.current_stock <= self.min_stock_threshold
    }
}

/// Create / edit payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SupplyInput {
    #[validate(length(min = 1, max = 255, message = "请输入耗材名称"))]
    pub name: String,
    pub category_id: Option<i64>,
    #[validate(range(min = 0))]
    pub total_stock: i64,
    #[validate(range(min = 0))]
    pub current_stock: i64,
    #[validate(length(min = 1, max = 50))]
    pub unit: String,
    #[validate(range(min = 0))]
    pub min_stock_threshold: i64,
    pub description: Option<String>,
}

/// Stock inbound (入库)
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SupplyInbound {
    pub supply_id: i64,
    #[validate(range(min = 1, message = "数量必须大于0"))]
    pub quantity: i64,
}

/// Supplies page: available supplies plus categories
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyCatalog {
    pub supplies: Vec<Supply>,
    pub categories: Vec<SupplyCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_low_stock_is_inclusive() {
        let mut supply = Supply {
            id: 1,
            name: "A4纸".into(),
            category_id: None,
            total_stock: 100,
            current_stock: 10,
            unit: "包".into(),
            min_stock_threshold: 10,
            description: None,
            created_at: 0,
            is_available: true,
        };
        assert!(supply.is_low_stock());
        supply.current_stock = 11;
        assert!(!supply.is_low_stock());
    }
}
