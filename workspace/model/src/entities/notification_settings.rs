use sea_orm::entity::prelude::*;

/// Per-user reminder configuration, one row per user.
///
/// Each category carries an `enabled` flag and a wall-clock `time` (`HH:mm`)
/// at which scheduled runs pick it up. Window columns are optional; when unset
/// the evaluator falls back to its defaults.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "notification_settings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub user_id: i32,
    pub transactions_enabled: bool,
    pub transactions_time: Option<String>,
    /// Lookahead window in days for planned transactions.
    pub transactions_reminder_days: Option<i32>,
    pub low_stock_enabled: bool,
    pub low_stock_time: Option<String>,
    pub events_enabled: bool,
    pub events_time: Option<String>,
    /// Lookahead window in days for birthdays and special events.
    pub events_days_before: Option<i32>,
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
