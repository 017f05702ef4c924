use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobDetails::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobDetails::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobDetails::JobId).uuid().not_null())
                    .col(ColumnDef::new(JobDetails::Sequence).integer().not_null())
                    .col(ColumnDef::new(JobDetails::Item).string().not_null())
                    .col(
                        ColumnDef::new(JobDetails::InProgress)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(JobDetails::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(JobDetails::Message).text().null())
                    .col(ColumnDef::new(JobDetails::PrimaryStatus).string().null())
                    .col(ColumnDef::new(JobDetails::SecondaryStatus).string().null())
                    .col(ColumnDef::new(JobDetails::PricingStrategy).string().null())
                    .col(ColumnDef::new(JobDetails::TransactionId).string().null())
                    .col(ColumnDef::new(JobDetails::ProviderDatetime).string().null())
                    .col(ColumnDef::new(JobDetails::RawData).json().null())
                    .col(
                        ColumnDef::new(JobDetails::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_details_job_id")
                            .from(JobDetails::Table, JobDetails::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_job_details_job_sequence")
                    .table(JobDetails::Table)
                    .col(JobDetails::JobId)
                    .col(JobDetails::Sequence)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_job_details_status")
                    .table(JobDetails::Table)
                    .col(JobDetails::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(JobDetails::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum JobDetails {
    Table,
    Id,
    JobId,
    Sequence,
    Item,
    InProgress,
    Status,
    Message,
    PrimaryStatus,
    SecondaryStatus,
    PricingStrategy,
    TransactionId,
    ProviderDatetime,
    RawData,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
}
