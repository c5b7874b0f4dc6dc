use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_reference_tables::Migration),
            Box::new(m20240601_000002_create_production_plans_table::Migration),
            Box::new(m20240601_000003_create_production_records_table::Migration),
            Box::new(m20240601_000004_create_record_comments_table::Migration),
        ]
    }
}

mod m20240601_000001_create_reference_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_reference_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Employees::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Employees::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Employees::Name).string_len(100).not_null())
                        .col(
                            ColumnDef::new(Employees::Position)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Employees::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_employees_name")
                        .table(Employees::Table)
                        .col(Employees::Name)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Processes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Processes::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Processes::Name).string_len(100).not_null())
                        .col(ColumnDef::new(Processes::Description).string_len(200).null())
                        .col(
                            ColumnDef::new(Processes::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_processes_name")
                        .table(Processes::Table)
                        .col(Processes::Name)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Products::Name).string_len(200).not_null())
                        .col(ColumnDef::new(Products::Description).string_len(500).null())
                        .col(
                            ColumnDef::new(Products::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_name")
                        .table(Products::Table)
                        .col(Products::Name)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Processes::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Employees::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Employees {
        Table,
        Id,
        Name,
        Position,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Processes {
        Table,
        Id,
        Name,
        Description,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    enum Products {
        Table,
        Id,
        Name,
        Description,
        CreatedAt,
    }
}

mod m20240601_000002_create_production_plans_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_production_plans_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductionPlans::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionPlans::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ProductionPlans::Product)
                                .string_len(200)
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProductionPlans::Process1).string_len(100).null())
                        .col(
                            ColumnDef::new(ProductionPlans::Qty1)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ProductionPlans::Process2).string_len(100).null())
                        .col(
                            ColumnDef::new(ProductionPlans::Qty2)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ProductionPlans::Process3).string_len(100).null())
                        .col(
                            ColumnDef::new(ProductionPlans::Qty3)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ProductionPlans::Process4).string_len(100).null())
                        .col(
                            ColumnDef::new(ProductionPlans::Qty4)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ProductionPlans::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionPlans::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            // At most one plan per product
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_plans_product")
                        .table(ProductionPlans::Table)
                        .col(ProductionPlans::Product)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductionPlans::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum ProductionPlans {
        Table,
        Id,
        Product,
        Process1,
        Qty1,
        Process2,
        Qty2,
        Process3,
        Qty3,
        Process4,
        Qty4,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000003_create_production_records_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_production_records_table"
        }
    }

    fn text_col(col: ProductionRecords) -> ColumnDef {
        ColumnDef::new(col)
            .string_len(20)
            .not_null()
            .default("")
            .to_owned()
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProductionRecords::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProductionRecords::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(ProductionRecords::Date).date().not_null())
                        .col(
                            ColumnDef::new(ProductionRecords::Name)
                                .string_len(100)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionRecords::Position)
                                .string_len(100)
                                .not_null()
                                .default(""),
                        )
                        .col(ColumnDef::new(ProductionRecords::Product).text().not_null())
                        .col(
                            ColumnDef::new(ProductionRecords::Process)
                                .string_len(200)
                                .not_null(),
                        )
                        .col(&mut text_col(ProductionRecords::TheoreticalRuntime))
                        .col(&mut text_col(ProductionRecords::ActualRuntime))
                        .col(&mut text_col(ProductionRecords::SingleTime))
                        .col(&mut text_col(ProductionRecords::TheoreticalQty))
                        .col(&mut text_col(ProductionRecords::ActualQty))
                        .col(&mut text_col(ProductionRecords::TotalWeight))
                        .col(&mut text_col(ProductionRecords::UnitWeight))
                        .col(&mut text_col(ProductionRecords::TareWeight))
                        .col(&mut text_col(ProductionRecords::CapacityRate))
                        .col(&mut text_col(ProductionRecords::TimeRate))
                        .col(&mut text_col(ProductionRecords::DowntimeDuration))
                        .col(&mut text_col(ProductionRecords::AdjustmentTime))
                        .col(
                            ColumnDef::new(ProductionRecords::AdjustmentMaster)
                                .string_len(100)
                                .not_null()
                                .default(""),
                        )
                        .col(
                            ColumnDef::new(ProductionRecords::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ProductionRecords::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_records_product_process")
                        .table(ProductionRecords::Table)
                        .col(ProductionRecords::Product)
                        .col(ProductionRecords::Process)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_production_records_date")
                        .table(ProductionRecords::Table)
                        .col(ProductionRecords::Date)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProductionRecords::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden, Clone, Copy)]
    enum ProductionRecords {
        Table,
        Id,
        Date,
        Name,
        Position,
        Product,
        Process,
        TheoreticalRuntime,
        ActualRuntime,
        SingleTime,
        TheoreticalQty,
        ActualQty,
        TotalWeight,
        UnitWeight,
        TareWeight,
        CapacityRate,
        TimeRate,
        DowntimeDuration,
        AdjustmentTime,
        AdjustmentMaster,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240601_000004_create_record_comments_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000004_create_record_comments_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(RecordComments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(RecordComments::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(RecordComments::RecordId).integer().not_null())
                        .col(
                            ColumnDef::new(RecordComments::ColumnKey)
                                .string_len(50)
                                .not_null(),
                        )
                        .col(ColumnDef::new(RecordComments::CommentText).text().not_null())
                        .col(
                            ColumnDef::new(RecordComments::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(RecordComments::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_record_comments_record_id")
                                .from(RecordComments::Table, RecordComments::RecordId)
                                .to(ProductionRecords::Table, ProductionRecords::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_record_comments_record_column")
                        .table(RecordComments::Table)
                        .col(RecordComments::RecordId)
                        .col(RecordComments::ColumnKey)
                        .unique()
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(RecordComments::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum RecordComments {
        Table,
        Id,
        RecordId,
        ColumnKey,
        CommentText,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ProductionRecords {
        Table,
        Id,
    }
}
