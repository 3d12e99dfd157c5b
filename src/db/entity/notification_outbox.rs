use sea_orm::entity::prelude::*;
use serde::{ Deserialize, Serialize };

/// Withdrawal e-mail waiting for (or done with) delivery.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_outbox")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub withdrawal_id: Uuid,
    pub recipient: String,
    pub event: String,
    pub amount: Decimal,
    pub naira_amount: Decimal,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub sent_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::withdrawal::Entity",
        from = "Column::WithdrawalId",
        to = "super::withdrawal::Column::Id"
    )]
    Withdrawal,
}

impl Related<super::withdrawal::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Withdrawal.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
