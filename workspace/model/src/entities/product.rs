use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;

/// A pantry or household item whose stock level is tracked.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: i32,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((16, 4)))")]
    pub current_stock: Decimal,
    pub unit: String,
    /// Stock level at or below which the product counts as running low.
    /// `None` disables low-stock alerts for this product.
    #[sea_orm(column_type = "Decimal(Some((16, 4)))", nullable)]
    pub low_stock_threshold: Option<Decimal>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
