use diesel::prelude::*;
use diesel::sqlite::Sqlite;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::{
    domain::retailer::{
        NewRetailer as DomainNewRetailer, Retailer as DomainRetailer, RetailerListQuery,
        RetailerSummary, UpdateRetailer as DomainUpdateRetailer,
    },
    models::retailer::{
        NewRetailer as DbNewRetailer, Retailer as DbRetailer, UpdateRetailer as DbUpdateRetailer,
    },
    repository::{DieselRepository, RetailerReader, RetailerWriter, contains_pattern, window},
    schema::retailers,
};

fn filtered(query: &RetailerListQuery) -> retailers::BoxedQuery<'static, Sqlite> {
    let mut items = retailers::table.into_boxed::<Sqlite>();

    if let Some(location) = query.location {
        items = items.filter(retailers::location.eq(location.as_str()));
    }

    if let Some(wholesale) = query.wholesale {
        items = items.filter(retailers::wholesale.eq(wholesale.as_str()));
    }

    if let Some(shopify) = query.shopify {
        items = items.filter(retailers::shopify.eq(shopify));
    }

    if let Some(term) = query.search.as_ref() {
        items = items.filter(retailers::name.like(contains_pattern(term)));
    }

    items
}

impl RetailerReader for DieselRepository {
    fn get_retailer_by_id(&self, id: i32) -> RepositoryResult<Option<DomainRetailer>> {
        let mut conn = self.conn()?;
        let retailer = retailers::table
            .filter(retailers::id.eq(id))
            .first::<DbRetailer>(&mut conn)
            .optional()?;
        Ok(retailer.map(Into::into))
    }

    fn get_retailer_by_name(&self, name: &str) -> RepositoryResult<Option<DomainRetailer>> {
        let mut conn = self.conn()?;
        let retailer = retailers::table
            .filter(retailers::name.eq(name))
            .first::<DbRetailer>(&mut conn)
            .optional()?;
        Ok(retailer.map(Into::into))
    }

    fn list_retailers(
        &self,
        query: RetailerListQuery,
    ) -> RepositoryResult<(usize, Vec<DomainRetailer>)> {
        let mut conn = self.conn()?;

        let total = filtered(&query).count().get_result::<i64>(&mut conn)? as usize;

        let mut items = filtered(&query).order(retailers::name.asc());
        if let Some((offset, limit)) = window(&query.pagination) {
            items = items.offset(offset).limit(limit);
        }

        let rows = items.load::<DbRetailer>(&mut conn)?;
        Ok((total, rows.into_iter().map(Into::into).collect()))
    }

    fn retailer_summary(&self) -> RepositoryResult<RetailerSummary> {
        let mut conn = self.conn()?;
        let rows = retailers::table.load::<DbRetailer>(&mut conn)?;
        let retailers: Vec<DomainRetailer> = rows.into_iter().map(Into::into).collect();
        Ok(RetailerSummary::from_retailers(&retailers))
    }
}

impl RetailerWriter for DieselRepository {
    fn create_retailer(
        &self,
        new_retailer: &DomainNewRetailer,
    ) -> RepositoryResult<DomainRetailer> {
        let mut conn = self.conn()?;
        let db_new = DbNewRetailer::from(new_retailer);

        let created = diesel::insert_into(retailers::table)
            .values(&db_new)
            .get_result::<DbRetailer>(&mut conn)?;

        Ok(created.into())
    }

    fn import_retailers(&self, new_retailers: &[DomainNewRetailer]) -> RepositoryResult<usize> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let mut inserted = 0;
            for new_retailer in new_retailers {
                let exists = retailers::table
                    .filter(retailers::name.eq(&new_retailer.name))
                    .count()
                    .get_result::<i64>(conn)?
                    > 0;
                if exists {
                    continue;
                }
                inserted += diesel::insert_into(retailers::table)
                    .values(&DbNewRetailer::from(new_retailer))
                    .execute(conn)?;
            }
            Ok(inserted)
        })
    }

    fn update_retailer(
        &self,
        id: i32,
        updates: &DomainUpdateRetailer,
    ) -> RepositoryResult<DomainRetailer> {
        let mut conn = self.conn()?;
        let target = retailers::table.filter(retailers::id.eq(id));

        if updates.is_empty() {
            return target
                .first::<DbRetailer>(&mut conn)
                .optional()?
                .map(Into::into)
                .ok_or(RepositoryError::NotFound);
        }

        let updated = diesel::update(target)
            .set(&DbUpdateRetailer::from(updates))
            .get_result::<DbRetailer>(&mut conn)
            .optional()?;

        updated.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    fn delete_retailer(&self, id: i32) -> RepositoryResult<()> {
        let mut conn = self.conn()?;

        let deleted =
            diesel::delete(retailers::table.filter(retailers::id.eq(id))).execute(&mut conn)?;
        if deleted == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
