use diesel::prelude::*;

use crate::schema::score_cards;

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = score_cards)]
pub struct NewScoreCard {
    pub item_cd: String,
    pub stck_bsop_date: String,
    pub sheet_score: i32,
    pub trend_score: i32,
    pub price_score: i32,
    pub kpi_score: i32,
    pub buy_score: i32,
    pub avls_score: i32,
    pub per_score: i32,
    pub pbr_score: i32,
    pub total_score: i32,
}
