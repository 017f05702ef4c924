use crate::core::jobs::store::JobStore;
use crate::core::jobs::types::{
    DateRange, DetailQuery, DetailStatus, DetailUpdate, Job, JobDetail, JobQuery, JobStatus,
    StatusCounts, Visibility,
};
use crate::utils::error::{GatewayError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::{Expr, SelectStatement};
use sea_orm::*;
use tracing::debug;
use uuid::Uuid;

use super::super::entities::{self, job, job_detail};
use super::types::SeaOrmJobStore;

/// Rows per multi-row insert; keeps bind parameters under SQLite's limit
const INSERT_CHUNK: usize = 64;

fn job_condition(visibility: &Visibility, range: &DateRange) -> Condition {
    let mut condition = match *visibility {
        Visibility::Scope(scope_id) => Condition::all().add(job::Column::ScopeId.eq(scope_id)),
        Visibility::Owner { owner_id, scope_id } => Condition::all()
            .add(job::Column::ScopeId.eq(scope_id))
            .add(job::Column::OwnerId.eq(owner_id)),
    };
    if let Some(from) = range.from {
        condition = condition.add(job::Column::CreatedAt.gte(from.fixed_offset()));
    }
    if let Some(to) = range.to {
        condition = condition.add(job::Column::CreatedAt.lte(to.fixed_offset()));
    }
    condition
}

fn visible_job_ids(visibility: &Visibility, range: &DateRange) -> SelectStatement {
    entities::Job::find()
        .select_only()
        .column(job::Column::Id)
        .filter(job_condition(visibility, range))
        .into_query()
}

fn job_from_model(model: job::Model) -> Result<Job> {
    Ok(Job {
        id: model.id,
        product: model.product.parse().map_err(GatewayError::persistence)?,
        total: model.total as u64,
        success_count: model.success_count as u64,
        status: model.status.parse().map_err(GatewayError::persistence)?,
        owner_id: model.owner_id,
        scope_id: model.scope_id,
        created_at: model.created_at.with_timezone(&Utc),
        end_at: model.end_at.map(|at| at.with_timezone(&Utc)),
    })
}

fn detail_from_model(model: job_detail::Model) -> Result<JobDetail> {
    Ok(JobDetail {
        id: model.id,
        job_id: model.job_id,
        sequence: model.sequence as u32,
        item: model.item,
        in_progress: model.in_progress,
        status: model.status.parse().map_err(GatewayError::persistence)?,
        message: model.message,
        primary_status: model.primary_status,
        secondary_status: model.secondary_status,
        pricing_strategy: model.pricing_strategy,
        transaction_id: model.transaction_id,
        provider_datetime: model.provider_datetime,
        raw_data: model.raw_data,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

fn details_from_models(models: Vec<job_detail::Model>) -> Result<Vec<JobDetail>> {
    models.into_iter().map(detail_from_model).collect()
}

fn detail_active_model(detail: &JobDetail) -> job_detail::ActiveModel {
    job_detail::ActiveModel {
        id: Set(detail.id),
        job_id: Set(detail.job_id),
        sequence: Set(detail.sequence as i32),
        item: Set(detail.item.clone()),
        in_progress: Set(detail.in_progress),
        status: Set(detail.status.as_str().to_string()),
        message: Set(detail.message.clone()),
        primary_status: Set(detail.primary_status.clone()),
        secondary_status: Set(detail.secondary_status.clone()),
        pricing_strategy: Set(detail.pricing_strategy.clone()),
        transaction_id: Set(detail.transaction_id.clone()),
        provider_datetime: Set(detail.provider_datetime.clone()),
        raw_data: Set(detail.raw_data.clone()),
        created_at: Set(detail.created_at.fixed_offset()),
    }
}

fn counts_from_rows(rows: Vec<(String, i64)>) -> Result<StatusCounts> {
    let mut counts = StatusCounts::default();
    for (status, count) in rows {
        let count = count as u64;
        match status
            .parse::<DetailStatus>()
            .map_err(GatewayError::persistence)?
        {
            DetailStatus::Pending => counts.pending += count,
            DetailStatus::Success => counts.success += count,
            DetailStatus::Fail => counts.fail += count,
            DetailStatus::Error => counts.error += count,
        }
    }
    Ok(counts)
}

impl SeaOrmJobStore {
    async fn count_details_where(&self, condition: Condition) -> Result<StatusCounts> {
        let rows: Vec<(String, i64)> = entities::JobDetail::find()
            .select_only()
            .column(job_detail::Column::Status)
            .column_as(job_detail::Column::Id.count(), "count")
            .filter(condition)
            .group_by(job_detail::Column::Status)
            .into_tuple()
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        counts_from_rows(rows)
    }
}

#[async_trait]
impl JobStore for SeaOrmJobStore {
    async fn create_job(&self, job: &Job, details: &[JobDetail]) -> Result<()> {
        debug!(job_id = %job.id, details = details.len(), "Inserting job");

        let txn = self.db.begin().await.map_err(GatewayError::Database)?;

        let job_model = job::ActiveModel {
            id: Set(job.id),
            product: Set(job.product.as_str().to_string()),
            total: Set(job.total as i64),
            success_count: Set(job.success_count as i64),
            status: Set(job.status.as_str().to_string()),
            owner_id: Set(job.owner_id),
            scope_id: Set(job.scope_id),
            created_at: Set(job.created_at.fixed_offset()),
            end_at: Set(job.end_at.map(|at| at.fixed_offset())),
        };
        entities::Job::insert(job_model)
            .exec(&txn)
            .await
            .map_err(GatewayError::Database)?;

        for chunk in details.chunks(INSERT_CHUNK) {
            entities::JobDetail::insert_many(chunk.iter().map(detail_active_model))
                .exec(&txn)
                .await
                .map_err(GatewayError::Database)?;
        }

        txn.commit().await.map_err(GatewayError::Database)?;
        Ok(())
    }

    async fn find_job(&self, job_id: Uuid) -> Result<Option<Job>> {
        entities::Job::find_by_id(job_id)
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?
            .map(job_from_model)
            .transpose()
    }

    async fn list_jobs(&self, query: &JobQuery) -> Result<(Vec<Job>, u64)> {
        let mut select =
            entities::Job::find().filter(job_condition(&query.visibility, &query.range));
        if let Some(product) = query.product {
            select = select.filter(job::Column::Product.eq(product.as_str()));
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        let models = select
            .order_by_desc(job::Column::CreatedAt)
            .order_by_asc(job::Column::Id)
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        let jobs = models
            .into_iter()
            .map(job_from_model)
            .collect::<Result<Vec<_>>>()?;
        Ok((jobs, total))
    }

    async fn find_detail(&self, detail_id: Uuid) -> Result<Option<JobDetail>> {
        entities::JobDetail::find_by_id(detail_id)
            .one(&self.db)
            .await
            .map_err(GatewayError::Database)?
            .map(detail_from_model)
            .transpose()
    }

    async fn list_details(
        &self,
        job_id: Uuid,
        query: &DetailQuery,
    ) -> Result<(Vec<JobDetail>, u64)> {
        let mut select =
            entities::JobDetail::find().filter(job_detail::Column::JobId.eq(job_id));
        if let Some(keyword) = &query.keyword {
            select = select.filter(
                Condition::any()
                    .add(job_detail::Column::Item.contains(keyword))
                    .add(job_detail::Column::Message.contains(keyword)),
            );
        }
        if let Some(status) = query.status {
            select = select.filter(job_detail::Column::Status.eq(status.as_str()));
        }

        let total = select
            .clone()
            .count(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        let models = select
            .order_by_asc(job_detail::Column::Sequence)
            .offset(query.offset)
            .limit(query.limit)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        Ok((details_from_models(models)?, total))
    }

    async fn details_for_job(&self, job_id: Uuid) -> Result<Vec<JobDetail>> {
        let models = entities::JobDetail::find()
            .filter(job_detail::Column::JobId.eq(job_id))
            .order_by_asc(job_detail::Column::Sequence)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        details_from_models(models)
    }

    async fn details_in_range(
        &self,
        visibility: &Visibility,
        range: &DateRange,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<JobDetail>> {
        let models = entities::JobDetail::find()
            .inner_join(entities::Job)
            .filter(job_condition(visibility, range))
            .order_by_asc(job::Column::CreatedAt)
            .order_by_asc(job::Column::Id)
            .order_by_asc(job_detail::Column::Sequence)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        details_from_models(models)
    }

    async fn count_details(&self, job_id: Uuid) -> Result<StatusCounts> {
        self.count_details_where(Condition::all().add(job_detail::Column::JobId.eq(job_id)))
            .await
    }

    async fn count_details_in_range(
        &self,
        visibility: &Visibility,
        range: &DateRange,
    ) -> Result<StatusCounts> {
        self.count_details_where(
            Condition::all()
                .add(job_detail::Column::JobId.in_subquery(visible_job_ids(visibility, range))),
        )
        .await
    }

    async fn count_jobs(&self, visibility: &Visibility, range: &DateRange) -> Result<u64> {
        entities::Job::find()
            .filter(job_condition(visibility, range))
            .count(&self.db)
            .await
            .map_err(GatewayError::Database)
    }

    async fn mark_detail_in_progress(&self, detail_id: Uuid) -> Result<()> {
        let result = entities::JobDetail::update_many()
            .col_expr(job_detail::Column::InProgress, Expr::value(true))
            .filter(job_detail::Column::Id.eq(detail_id))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        if result.rows_affected == 0 {
            return Err(GatewayError::not_found(format!("job detail {}", detail_id)));
        }
        Ok(())
    }

    async fn complete_detail(&self, detail_id: Uuid, update: &DetailUpdate) -> Result<()> {
        let result = entities::JobDetail::update_many()
            .col_expr(job_detail::Column::InProgress, Expr::value(false))
            .col_expr(job_detail::Column::Status, Expr::value(update.status.as_str()))
            .col_expr(job_detail::Column::Message, Expr::value(update.message.clone()))
            .col_expr(
                job_detail::Column::PrimaryStatus,
                Expr::value(update.primary_status.clone()),
            )
            .col_expr(
                job_detail::Column::SecondaryStatus,
                Expr::value(update.secondary_status.clone()),
            )
            .col_expr(
                job_detail::Column::PricingStrategy,
                Expr::value(update.pricing_strategy.clone()),
            )
            .col_expr(
                job_detail::Column::TransactionId,
                Expr::value(update.transaction_id.clone()),
            )
            .col_expr(
                job_detail::Column::ProviderDatetime,
                Expr::value(update.provider_datetime.clone()),
            )
            .col_expr(job_detail::Column::RawData, Expr::value(update.raw_data.clone()))
            .filter(job_detail::Column::Id.eq(detail_id))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        if result.rows_affected == 0 {
            return Err(GatewayError::not_found(format!("job detail {}", detail_id)));
        }
        Ok(())
    }

    async fn finalize_job(
        &self,
        job_id: Uuid,
        status: JobStatus,
        success_count: u64,
        end_at: DateTime<Utc>,
    ) -> Result<()> {
        let result = entities::Job::update_many()
            .col_expr(job::Column::Status, Expr::value(status.as_str()))
            .col_expr(job::Column::SuccessCount, Expr::value(success_count as i64))
            .col_expr(job::Column::EndAt, Expr::value(end_at.fixed_offset()))
            .filter(job::Column::Id.eq(job_id))
            .exec(&self.db)
            .await
            .map_err(GatewayError::Database)?;

        if result.rows_affected == 0 {
            return Err(GatewayError::not_found(format!("job {}", job_id)));
        }
        Ok(())
    }
}
