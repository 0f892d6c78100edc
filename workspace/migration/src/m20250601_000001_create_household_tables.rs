use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Username).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create notification_settings table (one row per user)
        manager
            .create_table(
                Table::create()
                    .table(NotificationSettings::Table)
                    .if_not_exists()
                    .col(pk_auto(NotificationSettings::Id))
                    .col(integer(NotificationSettings::UserId).unique_key())
                    .col(boolean(NotificationSettings::TransactionsEnabled).default(false))
                    .col(string_null(NotificationSettings::TransactionsTime))
                    .col(integer_null(NotificationSettings::TransactionsReminderDays))
                    .col(boolean(NotificationSettings::LowStockEnabled).default(false))
                    .col(string_null(NotificationSettings::LowStockTime))
                    .col(boolean(NotificationSettings::EventsEnabled).default(false))
                    .col(string_null(NotificationSettings::EventsTime))
                    .col(integer_null(NotificationSettings::EventsDaysBefore))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notification_settings_user")
                            .from(NotificationSettings::Table, NotificationSettings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create device_tokens table
        manager
            .create_table(
                Table::create()
                    .table(DeviceTokens::Table)
                    .if_not_exists()
                    .col(pk_auto(DeviceTokens::Id))
                    .col(integer(DeviceTokens::UserId))
                    .col(string(DeviceTokens::Token))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_device_token_user")
                            .from(DeviceTokens::Table, DeviceTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_device_tokens_user_token")
                    .table(DeviceTokens::Table)
                    .col(DeviceTokens::UserId)
                    .col(DeviceTokens::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create incomes table
        manager
            .create_table(
                Table::create()
                    .table(Incomes::Table)
                    .if_not_exists()
                    .col(pk_auto(Incomes::Id))
                    .col(integer(Incomes::UserId))
                    .col(string(Incomes::Description))
                    .col(decimal_len(Incomes::Amount, 16, 4))
                    .col(string(Incomes::Date))
                    .col(string(Incomes::Status))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_income_user")
                            .from(Incomes::Table, Incomes::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create expenses table
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(pk_auto(Expenses::Id))
                    .col(integer(Expenses::UserId))
                    .col(string(Expenses::Description))
                    .col(decimal_len(Expenses::Amount, 16, 4))
                    .col(string(Expenses::Date))
                    .col(string(Expenses::Status))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_user")
                            .from(Expenses::Table, Expenses::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create products table
        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(pk_auto(Products::Id))
                    .col(integer(Products::UserId))
                    .col(string(Products::Name))
                    .col(decimal_len(Products::CurrentStock, 16, 4))
                    .col(string(Products::Unit))
                    .col(decimal_len_null(Products::LowStockThreshold, 16, 4))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_product_user")
                            .from(Products::Table, Products::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create family_members table
        manager
            .create_table(
                Table::create()
                    .table(FamilyMembers::Table)
                    .if_not_exists()
                    .col(pk_auto(FamilyMembers::Id))
                    .col(integer(FamilyMembers::UserId))
                    .col(string(FamilyMembers::Name))
                    .col(string_null(FamilyMembers::AvatarUrl))
                    .col(string_null(FamilyMembers::Birthday))
                    .col(string_null(FamilyMembers::SpecialEventDate))
                    .col(string_null(FamilyMembers::SpecialEventName))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_family_member_user")
                            .from(FamilyMembers::Table, FamilyMembers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order to avoid foreign key constraints
        manager
            .drop_table(Table::drop().table(FamilyMembers::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Incomes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(DeviceTokens::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(NotificationSettings::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
pub(crate) enum Users {
    Table,
    Id,
    Username,
}

#[derive(DeriveIden)]
enum NotificationSettings {
    Table,
    Id,
    UserId,
    TransactionsEnabled,
    TransactionsTime,
    TransactionsReminderDays,
    LowStockEnabled,
    LowStockTime,
    EventsEnabled,
    EventsTime,
    EventsDaysBefore,
}

#[derive(DeriveIden)]
enum DeviceTokens {
    Table,
    Id,
    UserId,
    Token,
}

#[derive(DeriveIden)]
enum Incomes {
    Table,
    Id,
    UserId,
    Description,
    Amount,
    Date,
    Status,
}

#[derive(DeriveIden)]
enum Expenses {
    Table,
    Id,
    UserId,
    Description,
    Amount,
    Date,
    Status,
}

#[derive(DeriveIden)]
enum Products {
    Table,
    Id,
    UserId,
    Name,
    CurrentStock,
    Unit,
    LowStockThreshold,
}

#[derive(DeriveIden)]
enum FamilyMembers {
    Table,
    Id,
    UserId,
    Name,
    AvatarUrl,
    Birthday,
    SpecialEventDate,
    SpecialEventName,
}
