//! Existence checks for the rows comments attach to.

use std::future::Future;

use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::{PgClient, PgError, PgResult, schema};

/// Repository for checking vehicles and posts.
pub trait TargetRepository {
    /// Returns whether the vehicle exists.
    fn vehicle_exists(&self, vehicle_id: i64) -> impl Future<Output = PgResult<bool>> + Send;

    /// Returns whether the post exists.
    fn post_exists(&self, post_id: i64) -> impl Future<Output = PgResult<bool>> + Send;
}

impl TargetRepository for PgClient {
    async fn vehicle_exists(&self, vehicle_id: i64) -> PgResult<bool> {
        let mut conn = self.get_connection().await?;

        use schema::vehicles::{self, dsl};

        diesel::select(exists(vehicles::table.filter(dsl::id.eq(vehicle_id))))
            .get_result(&mut **conn)
            .await
            .map_err(PgError::from)
    }

    async fn post_exists(&self, post_id: i64) -> PgResult<bool> {
        let mut conn = self.get_connection().await?;

        use schema::posts::{self, dsl};

        diesel::select(exists(posts::table.filter(dsl::id.eq(post_id))))
            .get_result(&mut **conn)
            .await
            .map_err(PgError::from)
    }
}
