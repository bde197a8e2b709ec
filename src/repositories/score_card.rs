use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};

use crate::models::NewScoreCard;
use crate::schema::score_cards::dsl::*;

pub type PgPoolConn = PooledConnection<ConnectionManager<PgConnection>>;

pub fn upsert(conn: &mut PgPoolConn, new_rec: &NewScoreCard) -> Result<usize, diesel::result::Error> {
    diesel::insert_into(score_cards)
        .values(new_rec)
        .on_conflict((item_cd, stck_bsop_date))
        .do_update()
        .set(new_rec)
        .execute(conn)
}
