use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use crate::models::NewEquitySnapshot;
use crate::schema::equity_snapshots::dsl::*;

pub type PgPoolConn = PooledConnection<ConnectionManager<PgConnection>>;

pub fn upsert(conn: &mut PgPoolConn, new_rec: &NewEquitySnapshot) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(equity_snapshots)
        .values(new_rec)
        .on_conflict(item_cd)
        .do_update()
        .set(new_rec)
        .execute(conn)
}
