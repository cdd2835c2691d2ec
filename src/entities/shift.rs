//! Operating shift enum shared by every table that freezes a shift at write time.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One of the three front desk shifts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Shift {
    /// 07:00 to 14:00
    #[sea_orm(string_value = "Matutino")]
    Matutino,
    /// 14:00 to 21:00
    #[sea_orm(string_value = "Vespertino")]
    Vespertino,
    /// 21:00 to 07:00, attributed to the day it started
    #[sea_orm(string_value = "Nocturno")]
    Nocturno,
}

impl Shift {
    /// All shifts in the order they occur within an operational day.
    pub const ALL: [Self; 3] = [Self::Matutino, Self::Vespertino, Self::Nocturno];

    /// Display name as used on reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Matutino => "Matutino",
            Self::Vespertino => "Vespertino",
            Self::Nocturno => "Nocturno",
        }
    }
}
